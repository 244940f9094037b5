// Fixed start-up data for a session. Nothing here is ever loaded from or
// written to disk.

use std::collections::BTreeSet;

use crate::models::{
    Chat, ChatId, Contact, DeliveryStatus, Group, Invitation, Message, MessageId, MessageKind, Sender,
    UserId,
};

/// Everything a [`Session`](crate::session::Session) starts with
#[derive(Debug, Clone, Default)]
pub struct Seed {
    pub chats: Vec<Chat>,
    pub contacts: Vec<Contact>,
    pub messages: Vec<Message>,
    pub groups: Vec<Group>,
    pub invitations: Vec<Invitation>,
    pub selected_chat: Option<ChatId>,
}

impl Seed {
    /// The demo data set shown on a normal start.
    ///
    /// `me` is the id of the local user; it must not collide with a contact id.
    pub fn demo(me: UserId) -> Self {
        Seed {
            chats: demo_chats(),
            contacts: demo_contacts(),
            messages: demo_messages(),
            groups: demo_groups(me),
            invitations: vec![Invitation {
                id: 1,
                group_id: 3,
                group_name: "Book club".to_string(),
                from_name: "Dmitry Ivanov".to_string(),
                invitee: me,
                sent_at: "12:10".to_string(),
            }],
            selected_chat: Some(1),
        }
    }
}

fn chat(id: ChatId, name: &str, last_message: &str, time: &str, unread: u32, online: bool) -> Chat {
    Chat {
        id,
        name: name.to_string(),
        last_message: last_message.to_string(),
        time: time.to_string(),
        unread,
        online,
    }
}

fn demo_chats() -> Vec<Chat> {
    vec![
        chat(1, "Anna Smirnova", "Documentation.pdf", "14:35", 0, true),
        chat(2, "Dev team", "Ready for the call at 15:00", "13:22", 3, false),
        chat(3, "Mikhail Petrov", "Thanks for the help!", "Yesterday", 0, false),
        chat(4, "Design discussion", "Check out the new mockups", "Yesterday", 1, false),
    ]
}

fn contact(id: UserId, name: &str, status: &str, online: bool) -> Contact {
    Contact {
        id,
        name: name.to_string(),
        status: status.to_string(),
        online,
    }
}

fn demo_contacts() -> Vec<Contact> {
    vec![
        contact(1, "Anna Smirnova", "Online", true),
        contact(2, "Mikhail Petrov", "Last seen 2 hours ago", false),
        contact(3, "Elena Kozlova", "Online", true),
        contact(4, "Dmitry Ivanov", "Last seen yesterday", false),
    ]
}

fn demo_messages() -> Vec<Message> {
    let text = |id: MessageId, text: &str, sender: Sender, timestamp: &str| Message {
        id,
        text: text.to_string(),
        sender,
        timestamp: timestamp.to_string(),
        kind: MessageKind::Text,
        file_name: None,
        status: (sender == Sender::Me).then_some(DeliveryStatus::Read),
    };

    vec![
        text(1, "Hi! How are you?", Sender::Other, "14:30"),
        text(2, "Great! Working on a new project", Sender::Me, "14:32"),
        text(3, "Sounds interesting, tell me more", Sender::Other, "14:33"),
        Message {
            id: 4,
            text: "Documentation.pdf".to_string(),
            sender: Sender::Me,
            timestamp: "14:35".to_string(),
            kind: MessageKind::File,
            file_name: Some("Documentation.pdf".to_string()),
            status: Some(DeliveryStatus::Read),
        },
    ]
}

fn demo_groups(me: UserId) -> Vec<Group> {
    let members = |ids: &[UserId]| ids.iter().copied().collect::<BTreeSet<_>>();

    vec![
        Group {
            id: 1,
            name: "Dev team".to_string(),
            members: members(&[me, 1, 2]),
            admin: me,
            last_message: "Ready for the call at 15:00".to_string(),
            time: "13:22".to_string(),
        },
        Group {
            id: 2,
            name: "Design discussion".to_string(),
            members: members(&[me, 3, 4]),
            admin: 3,
            last_message: "Check out the new mockups".to_string(),
            time: "Yesterday".to_string(),
        },
        // The local user is not a member yet; see the pending invitation
        Group {
            id: 3,
            name: "Book club".to_string(),
            members: members(&[2, 4]),
            admin: 4,
            last_message: "Next meeting on Friday".to_string(),
            time: "Yesterday".to_string(),
        },
    ]
}
