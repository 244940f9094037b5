// Outgoing messages and their delivery status

use log::{debug, info};
use std::path::Path;

use super::{clock_time, Session, SessionError};
use crate::models::{DeliveryStatus, Message, MessageId, MessageKind, Sender, VOICE_NOTE_LABEL};

impl Session {
    /// Append a text message from the local user.
    ///
    /// Blank or whitespace-only text is rejected. The text is stored as typed.
    pub fn send_text(&mut self, content: &str) -> Result<MessageId, SessionError> {
        if content.trim().is_empty() {
            return Err(SessionError::EmptyMessage);
        }
        Ok(self.push_own(MessageKind::Text, content.to_string(), None))
    }

    /// Append a file message. Only the final component of `path` is kept;
    /// the file itself is never opened.
    pub fn send_file(&mut self, path: &str) -> Result<MessageId, SessionError> {
        let trimmed = path.trim();
        let name = Path::new(trimmed)
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::trim)
            .unwrap_or("");
        if name.is_empty() {
            return Err(SessionError::EmptyFileName);
        }
        let name = name.to_string();
        Ok(self.push_own(MessageKind::File, name.clone(), Some(name)))
    }

    pub fn send_voice_note(&mut self) -> MessageId {
        self.push_own(MessageKind::Voice, VOICE_NOTE_LABEL.to_string(), None)
    }

    fn push_own(&mut self, kind: MessageKind, text: String, file_name: Option<String>) -> MessageId {
        let id = self.next_message_id;
        self.next_message_id += 1;

        self.messages.push(Message {
            id,
            text,
            sender: Sender::Me,
            timestamp: clock_time(),
            kind,
            file_name,
            status: Some(DeliveryStatus::Sent),
        });
        info!("Queued {:?} message {}", kind, id);
        id
    }

    /// Move message `id` forward to `status`.
    ///
    /// Returns false, changing nothing, when the message is gone, was not
    /// written locally, or is already at or past `status`.
    pub fn advance_status(&mut self, id: MessageId, status: DeliveryStatus) -> bool {
        let Some(message) = self.messages.iter_mut().find(|m| m.id == id) else {
            debug!("Receipt for unknown message {} ignored", id);
            return false;
        };

        match message.status {
            Some(current) if current < status => {
                debug!("Message {} status {:?} -> {:?}", id, current, status);
                message.status = Some(status);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::Seed;

    fn session() -> Session {
        Session::new(0, "Me", Seed::demo(0))
    }

    #[test]
    fn test_send_text_appends_sent_message() {
        let mut session = session();
        let before = session.messages().len();

        let id = session.send_text("Hello there").unwrap();

        assert_eq!(session.messages().len(), before + 1);
        let message = session.message(id).unwrap();
        assert_eq!(message.text, "Hello there");
        assert_eq!(message.sender, Sender::Me);
        assert_eq!(message.kind, MessageKind::Text);
        assert_eq!(message.file_name, None);
        assert_eq!(message.status, Some(DeliveryStatus::Sent));
    }

    #[test]
    fn test_blank_text_rejected() {
        let mut session = session();
        let before = session.messages().len();

        assert_eq!(session.send_text(""), Err(SessionError::EmptyMessage));
        assert_eq!(session.send_text("   "), Err(SessionError::EmptyMessage));
        assert_eq!(session.send_text("\t\n"), Err(SessionError::EmptyMessage));
        assert_eq!(session.messages().len(), before);
    }

    #[test]
    fn test_ids_are_sequential_after_seed() {
        let mut session = session();
        let a = session.send_text("one").unwrap();
        let b = session.send_voice_note();
        let c = session.send_file("notes.txt").unwrap();
        assert_eq!((a, b, c), (5, 6, 7));
    }

    #[test]
    fn test_send_file_keeps_only_name() {
        let mut session = session();
        let id = session.send_file("/home/me/reports/q3 summary.pdf").unwrap();

        let message = session.message(id).unwrap();
        assert_eq!(message.kind, MessageKind::File);
        assert_eq!(message.text, "q3 summary.pdf");
        assert_eq!(message.file_name.as_deref(), Some("q3 summary.pdf"));
        assert_eq!(message.status, Some(DeliveryStatus::Sent));
    }

    #[test]
    fn test_send_file_rejects_blank_name() {
        let mut session = session();
        let before = session.messages().len();
        assert_eq!(session.send_file("  "), Err(SessionError::EmptyFileName));
        assert_eq!(session.send_file("/"), Err(SessionError::EmptyFileName));
        assert_eq!(session.messages().len(), before);
    }

    #[test]
    fn test_voice_note() {
        let mut session = session();
        let id = session.send_voice_note();
        let message = session.message(id).unwrap();
        assert_eq!(message.kind, MessageKind::Voice);
        assert_eq!(message.text, VOICE_NOTE_LABEL);
        assert!(message.file_name.is_none());
    }

    #[test]
    fn test_status_only_moves_forward() {
        let mut session = session();
        let id = session.send_text("hi").unwrap();

        assert!(session.advance_status(id, DeliveryStatus::Delivered));
        assert!(!session.advance_status(id, DeliveryStatus::Delivered));
        assert!(!session.advance_status(id, DeliveryStatus::Sent));
        assert_eq!(session.message(id).unwrap().status, Some(DeliveryStatus::Delivered));

        assert!(session.advance_status(id, DeliveryStatus::Read));
        assert!(!session.advance_status(id, DeliveryStatus::Delivered));
        assert_eq!(session.message(id).unwrap().status, Some(DeliveryStatus::Read));
    }

    #[test]
    fn test_status_of_missing_or_incoming_message_is_untouched() {
        let mut session = session();
        assert!(!session.advance_status(999, DeliveryStatus::Read));

        // Message 1 in the demo thread came from the other party
        assert!(!session.advance_status(1, DeliveryStatus::Delivered));
        assert_eq!(session.message(1).unwrap().status, None);
    }
}
