use std::collections::BTreeSet;

pub type MessageId = u64;
pub type ChatId = u64;
pub type UserId = u64;
pub type GroupId = u64;
pub type InvitationId = u64;

/// Label stored on voice notes; no audio is ever recorded
pub const VOICE_NOTE_LABEL: &str = "Voice message";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    Me,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Text,
    File,
    Voice,
}

/// Delivery stage of a locally-authored message.
///
/// The ordering is the delivery chain: a receipt only ever moves a message
/// forward, never back.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub enum DeliveryStatus {
    Sent = 1,      // Accepted by the composer
    Delivered = 2, // Reached the other party
    Read = 3,      // Seen by the other party
}

impl DeliveryStatus {
    /// The next stage in the chain, `None` once `Read`
    pub fn next(self) -> Option<DeliveryStatus> {
        match self {
            DeliveryStatus::Sent => Some(DeliveryStatus::Delivered),
            DeliveryStatus::Delivered => Some(DeliveryStatus::Read),
            DeliveryStatus::Read => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    pub sender: Sender,
    pub timestamp: String, // Local HH:MM at creation
    pub kind: MessageKind,
    pub file_name: Option<String>,
    pub status: Option<DeliveryStatus>,
}

impl Message {
    pub fn is_mine(&self) -> bool {
        self.sender == Sender::Me
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chat {
    pub id: ChatId,
    pub name: String,
    pub last_message: String,
    pub time: String,
    pub unread: u32,
    pub online: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    pub id: UserId,
    pub name: String,
    pub status: String,
    pub online: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub members: BTreeSet<UserId>,
    pub admin: UserId,
    pub last_message: String,
    pub time: String,
}

impl Group {
    pub fn is_member(&self, user: UserId) -> bool {
        self.members.contains(&user)
    }

    pub fn is_admin(&self, user: UserId) -> bool {
        self.admin == user
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Invitation {
    pub id: InvitationId,
    pub group_id: GroupId,
    pub group_name: String,
    pub from_name: String,
    pub invitee: UserId,
    pub sent_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Initials shown in place of an avatar, e.g. "Anna Smirnova" -> "AS"
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|part| part.chars().next())
        .collect()
}
