// src/session/mod.rs
//! Application state for one messaging session
//!
//! A [`Session`] owns every list the UI shows: chats, contacts, groups, the
//! invitation inbox and the message thread. Its `&mut self` methods are the
//! only way to change any of it. Rejected actions return a [`SessionError`]
//! and leave the state untouched; the UI never surfaces these to the user.

use chrono::Local;
use log::debug;
use thiserror::Error;

use crate::models::{
    Chat, ChatId, Contact, Group, GroupId, Invitation, InvitationId, Message, MessageId, Theme,
    UserId,
};
use crate::seed::Seed;

pub mod composer;
pub mod groups;

/// Reasons a session mutation was not performed
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Message text is empty")]
    EmptyMessage,

    #[error("File name is empty")]
    EmptyFileName,

    #[error("Group name is empty")]
    EmptyGroupName,

    #[error("A group needs at least one member")]
    NoMembers,

    #[error("No chat with id {0}")]
    UnknownChat(ChatId),

    #[error("No contact with id {0}")]
    UnknownContact(UserId),

    #[error("No group with id {0}")]
    UnknownGroup(GroupId),

    #[error("No pending invitation with id {0}")]
    UnknownInvitation(InvitationId),

    #[error("User {user} is not the admin of group {group}")]
    NotAdmin { group: GroupId, user: UserId },

    #[error("User {user} is already a member of group {group}")]
    AlreadyMember { group: GroupId, user: UserId },

    #[error("User {user} already has a pending invitation to group {group}")]
    AlreadyInvited { group: GroupId, user: UserId },

    #[error("User {user} is not a member of group {group}")]
    NotAMember { group: GroupId, user: UserId },
}

/// Current local time as shown next to messages, e.g. "09:05"
pub fn clock_time() -> String {
    Local::now().format("%H:%M").to_string()
}

pub struct Session {
    current_user: UserId,
    display_name: String,
    chats: Vec<Chat>,
    contacts: Vec<Contact>,
    groups: Vec<Group>,
    invitations: Vec<Invitation>,
    messages: Vec<Message>,
    selected_chat: Option<ChatId>,
    theme: Theme,
    next_message_id: MessageId,
    next_group_id: GroupId,
    next_invitation_id: InvitationId,
}

impl Session {
    pub fn new(current_user: UserId, display_name: &str, seed: Seed) -> Self {
        let next_message_id = seed.messages.iter().map(|m| m.id).max().unwrap_or(0) + 1;
        let next_group_id = seed.groups.iter().map(|g| g.id).max().unwrap_or(0) + 1;
        let next_invitation_id = seed.invitations.iter().map(|i| i.id).max().unwrap_or(0) + 1;

        // Keep the selection only if it points at a real chat
        let selected_chat = seed
            .selected_chat
            .filter(|id| seed.chats.iter().any(|c| c.id == *id));

        Session {
            current_user,
            display_name: display_name.to_string(),
            chats: seed.chats,
            contacts: seed.contacts,
            groups: seed.groups,
            invitations: seed.invitations,
            messages: seed.messages,
            selected_chat,
            theme: Theme::Light,
            next_message_id,
            next_group_id,
            next_invitation_id,
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn current_user(&self) -> UserId {
        self.current_user
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn chats(&self) -> &[Chat] {
        &self.chats
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn contact(&self, id: UserId) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.id == id)
    }

    /// Display name for any user id, including the local user
    pub fn user_name(&self, id: UserId) -> String {
        if id == self.current_user {
            return self.display_name.clone();
        }
        self.contact(id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| format!("User {}", id))
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn message(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Every group, including those the local user cannot see
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    /// Groups listed for the local user: those they are a member of
    pub fn visible_groups(&self) -> impl Iterator<Item = &Group> {
        let me = self.current_user;
        self.groups.iter().filter(move |g| g.is_member(me))
    }

    /// All pending invitations, incoming and outgoing
    pub fn invitations(&self) -> &[Invitation] {
        &self.invitations
    }

    /// Invitations waiting for the local user to accept or decline
    pub fn pending_invitations(&self) -> impl Iterator<Item = &Invitation> {
        let me = self.current_user;
        self.invitations.iter().filter(move |i| i.invitee == me)
    }

    pub fn selected_chat_id(&self) -> Option<ChatId> {
        self.selected_chat
    }

    pub fn active_chat(&self) -> Option<&Chat> {
        self.selected_chat
            .and_then(|id| self.chats.iter().find(|c| c.id == id))
    }

    /// Make `id` the active chat. Unknown ids keep the current selection.
    pub fn select_chat(&mut self, id: ChatId) -> Result<(), SessionError> {
        if !self.chats.iter().any(|c| c.id == id) {
            return Err(SessionError::UnknownChat(id));
        }
        debug!("Selected chat {}", id);
        self.selected_chat = Some(id);
        Ok(())
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        debug!("Theme switched to {:?}", self.theme);
        self.theme
    }
}
