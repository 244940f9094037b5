// Group roles and the invitation inbox, driven through the public API

mod common;
use common::{demo_client, demo_session, session_with_contacts, setup_logging, ME};

use messenger::{SessionError, Theme};
use std::collections::BTreeSet;

#[test]
fn test_create_group_adds_creator_as_admin() {
    setup_logging();
    let mut session = session_with_contacts(1, &[2, 3]);

    let id = session.create_group("Team", &[2, 3]).unwrap();
    let group = session.group(id).unwrap();

    assert_eq!(group.name, "Team");
    assert_eq!(group.admin, 1);
    assert_eq!(group.members, BTreeSet::from([1, 2, 3]));
    assert_eq!(group.last_message, "Group created");
    assert!(session.visible_groups().any(|g| g.id == id));
}

#[test]
fn test_create_group_rejections_leave_no_trace() {
    setup_logging();
    let mut session = session_with_contacts(1, &[2, 3]);

    assert_eq!(session.create_group("   ", &[2]), Err(SessionError::EmptyGroupName));
    assert_eq!(session.create_group("Team", &[]), Err(SessionError::NoMembers));
    assert_eq!(
        session.create_group("Team", &[2, 42]),
        Err(SessionError::UnknownContact(42))
    );
    assert!(session.groups().is_empty());
}

#[test]
fn test_group_ids_are_unique_and_increasing() {
    let mut session = demo_session();
    let existing: BTreeSet<_> = session.groups().iter().map(|g| g.id).collect();

    let a = session.create_group("Alpha", &[1]).unwrap();
    let b = session.create_group("Beta", &[2]).unwrap();

    assert!(!existing.contains(&a) && !existing.contains(&b));
    assert!(b > a);
}

#[test]
fn test_non_admin_cannot_invite_or_remove() {
    setup_logging();
    let mut session = demo_session();
    // "Design discussion" is administered by contact 3
    let before = session.group(2).unwrap().clone();
    let invitations = session.invitations().len();

    assert_eq!(
        session.invite_to_group(2, 1),
        Err(SessionError::NotAdmin { group: 2, user: ME })
    );
    assert_eq!(
        session.remove_member(2, 4),
        Err(SessionError::NotAdmin { group: 2, user: ME })
    );

    assert_eq!(session.group(2).unwrap(), &before);
    assert_eq!(session.invitations().len(), invitations);
}

#[test]
fn test_admin_invite_then_remove() {
    let mut session = demo_session();

    // Contact 3 is not in "Dev team" yet
    let invitation = session.invite_to_group(1, 3).unwrap();
    assert!(!session.group(1).unwrap().is_member(3));
    assert_eq!(
        session.invite_to_group(1, 3),
        Err(SessionError::AlreadyInvited { group: 1, user: 3 })
    );
    assert!(session.invitations().iter().any(|i| i.id == invitation && i.invitee == 3));
    // Outgoing invitations are not in the local inbox
    assert!(session.pending_invitations().all(|i| i.id != invitation));

    session.remove_member(1, 2).unwrap();
    assert!(!session.group(1).unwrap().is_member(2));
    assert_eq!(
        session.remove_member(1, 2),
        Err(SessionError::NotAMember { group: 1, user: 2 })
    );
}

#[test]
fn test_invite_existing_member_or_stranger() {
    let mut session = demo_session();

    assert_eq!(
        session.invite_to_group(1, 1),
        Err(SessionError::AlreadyMember { group: 1, user: 1 })
    );
    assert_eq!(session.invite_to_group(1, 77), Err(SessionError::UnknownContact(77)));
    assert_eq!(session.invite_to_group(99, 3), Err(SessionError::UnknownGroup(99)));
}

#[test]
fn test_accept_invitation_joins_group() {
    setup_logging();
    let mut session = demo_session();
    let invitation = session.pending_invitations().next().unwrap().clone();
    assert!(!session.visible_groups().any(|g| g.id == invitation.group_id));

    let group_id = session.accept_invitation(invitation.id).unwrap();

    assert_eq!(group_id, invitation.group_id);
    assert!(session.group(group_id).unwrap().is_member(ME));
    assert!(session.visible_groups().any(|g| g.id == group_id));
    assert_eq!(session.pending_invitations().count(), 0);
    // Joining does not make us the admin
    assert!(session.require_admin(group_id).is_err());
}

#[test]
fn test_decline_invitation_only_drops_it() {
    let mut session = demo_session();
    let invitation = session.pending_invitations().next().unwrap().clone();
    let members = session.group(invitation.group_id).unwrap().members.clone();

    session.decline_invitation(invitation.id).unwrap();

    assert_eq!(session.pending_invitations().count(), 0);
    assert_eq!(session.group(invitation.group_id).unwrap().members, members);
    assert_eq!(
        session.decline_invitation(invitation.id),
        Err(SessionError::UnknownInvitation(invitation.id))
    );
    assert_eq!(
        session.accept_invitation(invitation.id),
        Err(SessionError::UnknownInvitation(invitation.id))
    );
}

#[test]
fn test_admin_removing_self_hides_group() {
    let mut session = demo_session();

    session.remove_member(1, ME).unwrap();

    let group = session.group(1).unwrap();
    assert!(!group.is_member(ME));
    assert_eq!(group.admin, ME);
    assert!(!session.visible_groups().any(|g| g.id == 1));
}

#[test]
fn test_chat_selection() {
    let mut session = demo_session();
    assert_eq!(session.selected_chat_id(), Some(1));

    session.select_chat(3).unwrap();
    assert_eq!(session.active_chat().map(|c| c.name.as_str()), Some("Mikhail Petrov"));

    assert_eq!(session.select_chat(42), Err(SessionError::UnknownChat(42)));
    assert_eq!(session.selected_chat_id(), Some(3));
}

#[test]
fn test_theme_toggle_round_trip() {
    let mut session = demo_session();
    assert_eq!(session.theme(), Theme::Light);
    assert_eq!(session.toggle_theme(), Theme::Dark);
    assert_eq!(session.toggle_theme(), Theme::Light);
}

#[tokio::test]
async fn test_group_changes_through_client() {
    let mut client = demo_client();

    let id = client.session_mut().create_group("Weekend", &[1, 4]).unwrap();
    client.send_text("See you all on Saturday").unwrap();

    let session = client.session();
    assert_eq!(session.group(id).unwrap().member_count(), 3);
    assert_eq!(
        session.messages().last().map(|m| m.text.as_str()),
        Some("See you all on Saturday")
    );

    client.shutdown();
}
