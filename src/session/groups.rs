// Group membership and invitations
//
// Every mutating group operation goes through `require_admin` first, except
// answering an invitation, which only the invitee can do.

use log::{debug, info, warn};
use std::collections::BTreeSet;

use super::{clock_time, Session, SessionError};
use crate::models::{Group, GroupId, Invitation, InvitationId, UserId};

impl Session {
    /// The group, if the local user is its admin
    pub fn require_admin(&self, group_id: GroupId) -> Result<&Group, SessionError> {
        let group = self
            .group(group_id)
            .ok_or(SessionError::UnknownGroup(group_id))?;
        if !group.is_admin(self.current_user) {
            return Err(SessionError::NotAdmin {
                group: group_id,
                user: self.current_user,
            });
        }
        Ok(group)
    }

    /// Create a group administered by the local user.
    ///
    /// Members are the local user plus `member_ids`, which must all be known
    /// contacts (or the local user).
    pub fn create_group(&mut self, name: &str, member_ids: &[UserId]) -> Result<GroupId, SessionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::EmptyGroupName);
        }
        if member_ids.is_empty() {
            return Err(SessionError::NoMembers);
        }
        if let Some(unknown) = member_ids
            .iter()
            .find(|id| **id != self.current_user && self.contact(**id).is_none())
        {
            return Err(SessionError::UnknownContact(*unknown));
        }

        let mut members: BTreeSet<UserId> = member_ids.iter().copied().collect();
        members.insert(self.current_user);

        let member_count = members.len();

        let id = self.next_group_id;
        self.next_group_id += 1;
        self.groups.push(Group {
            id,
            name: name.to_string(),
            members,
            admin: self.current_user,
            last_message: "Group created".to_string(),
            time: clock_time(),
        });
        info!("Created group {} '{}' with {} member(s)", id, name, member_count);
        Ok(id)
    }

    /// Invite a contact to a group the local user administers.
    /// Membership is unchanged until the invitation is accepted.
    pub fn invite_to_group(&mut self, group_id: GroupId, contact_id: UserId) -> Result<InvitationId, SessionError> {
        let group = self.require_admin(group_id)?;
        if group.is_member(contact_id) {
            return Err(SessionError::AlreadyMember {
                group: group_id,
                user: contact_id,
            });
        }
        let group_name = group.name.clone();

        if self.contact(contact_id).is_none() {
            return Err(SessionError::UnknownContact(contact_id));
        }
        if self
            .invitations
            .iter()
            .any(|i| i.group_id == group_id && i.invitee == contact_id)
        {
            return Err(SessionError::AlreadyInvited {
                group: group_id,
                user: contact_id,
            });
        }

        let id = self.next_invitation_id;
        self.next_invitation_id += 1;
        self.invitations.push(Invitation {
            id,
            group_id,
            group_name,
            from_name: self.display_name.clone(),
            invitee: contact_id,
            sent_at: clock_time(),
        });
        info!("Invited user {} to group {} (invitation {})", contact_id, group_id, id);
        Ok(id)
    }

    fn take_incoming_invitation(&mut self, invitation_id: InvitationId) -> Result<Invitation, SessionError> {
        let me = self.current_user;
        let index = self
            .invitations
            .iter()
            .position(|i| i.id == invitation_id && i.invitee == me)
            .ok_or(SessionError::UnknownInvitation(invitation_id))?;
        Ok(self.invitations.remove(index))
    }

    /// Join the invitation's group and drop the invitation
    pub fn accept_invitation(&mut self, invitation_id: InvitationId) -> Result<GroupId, SessionError> {
        let invitation = self.take_incoming_invitation(invitation_id)?;
        let me = self.current_user;

        match self.groups.iter_mut().find(|g| g.id == invitation.group_id) {
            Some(group) => {
                if group.members.insert(me) {
                    info!("Joined group {} '{}'", group.id, group.name);
                } else {
                    debug!("Already a member of group {}", group.id);
                }
            }
            None => warn!(
                "Invitation {} pointed at missing group {}; discarded",
                invitation_id, invitation.group_id
            ),
        }
        Ok(invitation.group_id)
    }

    pub fn decline_invitation(&mut self, invitation_id: InvitationId) -> Result<(), SessionError> {
        let invitation = self.take_incoming_invitation(invitation_id)?;
        info!("Declined invitation to '{}'", invitation.group_name);
        Ok(())
    }

    /// Remove a member from a group the local user administers.
    ///
    /// The admin may remove themselves; the group then keeps its admin id but
    /// drops out of the admin's visible groups.
    pub fn remove_member(&mut self, group_id: GroupId, member_id: UserId) -> Result<(), SessionError> {
        self.require_admin(group_id)?;
        let group = self
            .groups
            .iter_mut()
            .find(|g| g.id == group_id)
            .ok_or(SessionError::UnknownGroup(group_id))?;

        if !group.members.remove(&member_id) {
            return Err(SessionError::NotAMember {
                group: group_id,
                user: member_id,
            });
        }
        info!("Removed user {} from group {}", member_id, group_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Contact;
    use crate::seed::Seed;

    fn contacts(ids: &[UserId]) -> Vec<Contact> {
        ids.iter()
            .map(|id| Contact {
                id: *id,
                name: format!("Contact {}", id),
                status: "Online".to_string(),
                online: true,
            })
            .collect()
    }

    /// Local user 1 with contacts 2..=5 and no groups
    fn session() -> Session {
        let seed = Seed {
            contacts: contacts(&[2, 3, 4, 5]),
            ..Seed::default()
        };
        Session::new(1, "Me", seed)
    }

    fn members(session: &Session, id: GroupId) -> Vec<UserId> {
        session.group(id).unwrap().members.iter().copied().collect()
    }

    #[test]
    fn test_create_group() {
        let mut session = session();
        let id = session.create_group("Team", &[2, 3]).unwrap();

        let group = session.group(id).unwrap();
        assert_eq!(group.name, "Team");
        assert_eq!(group.admin, 1);
        assert_eq!(members(&session, id), vec![1, 2, 3]);
        assert_eq!(session.visible_groups().count(), 1);
    }

    #[test]
    fn test_create_group_rejections() {
        let mut session = session();

        assert_eq!(session.create_group("", &[2]), Err(SessionError::EmptyGroupName));
        assert_eq!(session.create_group("   ", &[2]), Err(SessionError::EmptyGroupName));
        assert_eq!(session.create_group("Team", &[]), Err(SessionError::NoMembers));
        assert_eq!(session.create_group("Team", &[2, 42]), Err(SessionError::UnknownContact(42)));
        assert!(session.groups().is_empty());
    }

    #[test]
    fn test_create_group_with_self_listed() {
        let mut session = session();
        let id = session.create_group("Pair", &[1, 2]).unwrap();
        assert_eq!(members(&session, id), vec![1, 2]);
    }

    #[test]
    fn test_admin_can_invite() {
        let mut session = session();
        let group = session.create_group("Team", &[2]).unwrap();

        let invitation = session.invite_to_group(group, 4).unwrap();

        let pending = &session.invitations()[0];
        assert_eq!(pending.id, invitation);
        assert_eq!(pending.group_name, "Team");
        assert_eq!(pending.from_name, "Me");
        assert_eq!(pending.invitee, 4);
        // Membership only changes on accept
        assert_eq!(members(&session, group), vec![1, 2]);
        // Outgoing, so not in the local user's inbox
        assert_eq!(session.pending_invitations().count(), 0);
    }

    #[test]
    fn test_invite_rejections() {
        let mut session = session();
        let group = session.create_group("Team", &[2]).unwrap();

        assert_eq!(
            session.invite_to_group(group, 2),
            Err(SessionError::AlreadyMember { group, user: 2 })
        );
        assert_eq!(session.invite_to_group(group, 42), Err(SessionError::UnknownContact(42)));
        assert_eq!(session.invite_to_group(99, 3), Err(SessionError::UnknownGroup(99)));

        session.invite_to_group(group, 3).unwrap();
        assert_eq!(
            session.invite_to_group(group, 3),
            Err(SessionError::AlreadyInvited { group, user: 3 })
        );
        assert_eq!(session.invitations().len(), 1);
    }

    #[test]
    fn test_non_admin_cannot_invite_or_remove() {
        let mut session = Session::new(0, "Me", Seed::demo(0));
        // Group 2 is administered by contact 3
        let before = members(&session, 2);

        assert_eq!(
            session.invite_to_group(2, 1),
            Err(SessionError::NotAdmin { group: 2, user: 0 })
        );
        assert_eq!(
            session.remove_member(2, 4),
            Err(SessionError::NotAdmin { group: 2, user: 0 })
        );
        assert_eq!(members(&session, 2), before);
        assert_eq!(session.invitations().len(), 1);
    }

    #[test]
    fn test_admin_removes_member() {
        let mut session = session();
        let group = session.create_group("Team", &[2, 3]).unwrap();

        session.remove_member(group, 3).unwrap();
        assert_eq!(members(&session, group), vec![1, 2]);

        assert_eq!(
            session.remove_member(group, 3),
            Err(SessionError::NotAMember { group, user: 3 })
        );
    }

    #[test]
    fn test_admin_may_remove_themselves() {
        let mut session = session();
        let group = session.create_group("Team", &[2]).unwrap();

        session.remove_member(group, 1).unwrap();

        assert_eq!(members(&session, group), vec![2]);
        assert_eq!(session.group(group).unwrap().admin, 1);
        assert_eq!(session.visible_groups().count(), 0);
    }

    #[test]
    fn test_accept_invitation_joins_group() {
        let mut session = Session::new(0, "Me", Seed::demo(0));
        let before = session.group(3).unwrap().member_count();

        assert_eq!(session.accept_invitation(1), Ok(3));

        assert_eq!(session.group(3).unwrap().member_count(), before + 1);
        assert!(session.group(3).unwrap().is_member(0));
        assert!(session.invitations().is_empty());
        assert!(session.visible_groups().any(|g| g.id == 3));

        // Gone now
        assert_eq!(session.accept_invitation(1), Err(SessionError::UnknownInvitation(1)));
    }

    #[test]
    fn test_accept_when_already_member() {
        let mut seed = Seed::demo(0);
        seed.invitations[0].group_id = 1;
        let mut session = Session::new(0, "Me", seed);
        let before = session.group(1).unwrap().member_count();

        session.accept_invitation(1).unwrap();

        assert_eq!(session.group(1).unwrap().member_count(), before);
        assert!(session.invitations().is_empty());
    }

    #[test]
    fn test_accept_for_missing_group_discards_invitation() {
        let mut seed = Seed::demo(0);
        seed.invitations[0].group_id = 50;
        let mut session = Session::new(0, "Me", seed);

        assert_eq!(session.accept_invitation(1), Ok(50));
        assert!(session.invitations().is_empty());
    }

    #[test]
    fn test_decline_invitation() {
        let mut session = Session::new(0, "Me", Seed::demo(0));
        let snapshot: Vec<Vec<UserId>> = session
            .groups()
            .iter()
            .map(|g| g.members.iter().copied().collect())
            .collect();

        session.decline_invitation(1).unwrap();

        assert!(session.invitations().is_empty());
        let after: Vec<Vec<UserId>> = session
            .groups()
            .iter()
            .map(|g| g.members.iter().copied().collect())
            .collect();
        assert_eq!(snapshot, after);
        assert_eq!(session.decline_invitation(1), Err(SessionError::UnknownInvitation(1)));
    }

    #[test]
    fn test_outgoing_invitation_cannot_be_answered_locally() {
        let mut session = session();
        let group = session.create_group("Team", &[2]).unwrap();
        let invitation = session.invite_to_group(group, 3).unwrap();

        assert_eq!(
            session.accept_invitation(invitation),
            Err(SessionError::UnknownInvitation(invitation))
        );
        assert_eq!(session.invitations().len(), 1);
        assert_eq!(members(&session, group), vec![1, 2]);
    }
}
