use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::debug;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs},
    Frame,
};
use std::{collections::BTreeSet, io, time::Duration};
use textwrap::wrap;
use tui_input::{backend::crossterm::EventHandler, Input};

use messenger::models::{
    initials, ChatId, DeliveryStatus, GroupId, InvitationId, Message, MessageKind, Theme, UserId,
};
use messenger::session::Session;

// Export types needed by main module
pub use ratatui::backend::CrosstermBackend;
pub use ratatui::Terminal;

/// What the user asked for; main applies it to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    Quit,
    SendText(String),
    SendFile(String),
    SendVoiceNote,
    SelectChat(ChatId),
    CreateGroup { name: String, members: Vec<UserId> },
    Invite { group_id: GroupId, contact_id: UserId },
    AcceptInvitation(InvitationId),
    DeclineInvitation(InvitationId),
    RemoveMember { group_id: GroupId, member_id: UserId },
    ToggleTheme,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Chats,
    Contacts,
    Groups,
    Invites,
    Settings,
}

const TABS: [Tab; 5] = [Tab::Chats, Tab::Contacts, Tab::Groups, Tab::Invites, Tab::Settings];

impl Tab {
    fn title(self) -> &'static str {
        match self {
            Tab::Chats => "Chats",
            Tab::Contacts => "Contacts",
            Tab::Groups => "Groups",
            Tab::Invites => "Invites",
            Tab::Settings => "Settings",
        }
    }

    fn index(self) -> usize {
        TABS.iter().position(|t| *t == self).unwrap_or(0)
    }

    fn next(self) -> Tab {
        TABS[(self.index() + 1) % TABS.len()]
    }

    fn prev(self) -> Tab {
        TABS[(self.index() + TABS.len() - 1) % TABS.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Sidebar,
    Search,
    Composer,
}

struct FileDialog {
    input: Input,
}

struct GroupDialog {
    name: Input,
    selected: BTreeSet<UserId>,
    cursor: usize,
    editing_name: bool,
}

struct InviteDialog {
    group_id: GroupId,
    candidates: Vec<UserId>,
    cursor: usize,
}

struct MembersDialog {
    group_id: GroupId,
    cursor: usize,
}

struct HelpDialog {}

/// Colours for the current theme
struct Palette {
    text: Color,
    background: Color,
    accent: Color,
    muted: Color,
    selected_bg: Color,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Palette {
                text: Color::Black,
                background: Color::White,
                accent: Color::Blue,
                muted: Color::DarkGray,
                selected_bg: Color::Gray,
            },
            Theme::Dark => Palette {
                text: Color::White,
                background: Color::Black,
                accent: Color::Cyan,
                muted: Color::Gray,
                selected_bg: Color::DarkGray,
            },
        }
    }

    fn base(&self) -> Style {
        Style::default().fg(self.text).bg(self.background)
    }

    fn dim(&self) -> Style {
        Style::default().fg(self.muted)
    }

    fn border(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.accent)
        } else {
            Style::default().fg(self.muted)
        }
    }
}

pub struct ChatUI {
    input: Input,
    search: Input, // Rendered and editable, not wired to filtering
    active_tab: Tab,
    focus: Focus,
    sidebar_index: usize,
    file_dialog: Option<FileDialog>,
    group_dialog: Option<GroupDialog>,
    invite_dialog: Option<InviteDialog>,
    members_dialog: Option<MembersDialog>,
    help_dialog: Option<HelpDialog>,
}

impl ChatUI {
    pub fn new() -> Self {
        ChatUI {
            input: Input::default(),
            search: Input::default(),
            active_tab: Tab::Chats,
            focus: Focus::Sidebar,
            sidebar_index: 0,
            file_dialog: None,
            group_dialog: None,
            invite_dialog: None,
            members_dialog: None,
            help_dialog: None,
        }
    }

    /// Shows a popup asking for the path of a file to attach
    pub fn show_file_dialog(&mut self) {
        debug!("UI: Showing file dialog");
        self.file_dialog = Some(FileDialog {
            input: Input::default(),
        });
    }

    pub fn show_group_dialog(&mut self) {
        debug!("UI: Showing new group dialog");
        self.group_dialog = Some(GroupDialog {
            name: Input::default(),
            selected: BTreeSet::new(),
            cursor: 0,
            editing_name: true,
        });
    }

    /// Shows the contacts that could still be invited to `group_id`
    pub fn show_invite_dialog(&mut self, session: &Session, group_id: GroupId) {
        let candidates = match session.group(group_id) {
            Some(group) => session
                .contacts()
                .iter()
                .filter(|c| !group.is_member(c.id))
                .map(|c| c.id)
                .collect(),
            None => return,
        };
        debug!("UI: Showing invite dialog for group {}", group_id);
        self.invite_dialog = Some(InviteDialog {
            group_id,
            candidates,
            cursor: 0,
        });
    }

    pub fn show_members_dialog(&mut self, group_id: GroupId) {
        debug!("UI: Showing members of group {}", group_id);
        self.members_dialog = Some(MembersDialog {
            group_id,
            cursor: 0,
        });
    }

    pub fn show_help_dialog(&mut self) {
        self.help_dialog = Some(HelpDialog {});
    }

    fn has_dialog(&self) -> bool {
        self.file_dialog.is_some()
            || self.group_dialog.is_some()
            || self.invite_dialog.is_some()
            || self.members_dialog.is_some()
            || self.help_dialog.is_some()
    }

    /// Poll the terminal briefly and translate a key press into an action
    pub fn handle_input(&mut self, session: &Session) -> Result<Option<UiAction>> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                return Ok(self.handle_key(key, session));
            }
        }
        Ok(None)
    }

    pub fn handle_key(&mut self, key: KeyEvent, session: &Session) -> Option<UiAction> {
        if key.kind != KeyEventKind::Press {
            return None;
        }

        // Dialogs swallow every key while open
        if self.help_dialog.is_some() {
            self.help_dialog = None;
            return None;
        }
        if self.file_dialog.is_some() {
            return self.handle_file_dialog_key(key);
        }
        if self.group_dialog.is_some() {
            return self.handle_group_dialog_key(key, session);
        }
        if self.invite_dialog.is_some() {
            return self.handle_invite_dialog_key(key);
        }
        if self.members_dialog.is_some() {
            return self.handle_members_dialog_key(key, session);
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => return Some(UiAction::Quit),
            KeyCode::Char('h') if ctrl => {
                self.show_help_dialog();
                return None;
            }
            KeyCode::Char('t') if ctrl => return Some(UiAction::ToggleTheme),
            KeyCode::Char('g') if ctrl => {
                self.show_group_dialog();
                return None;
            }
            KeyCode::Char('f') if ctrl => {
                if session.active_chat().is_some() {
                    self.show_file_dialog();
                }
                return None;
            }
            KeyCode::Char('v') if ctrl => {
                return session.active_chat().map(|_| UiAction::SendVoiceNote);
            }
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Sidebar | Focus::Search if session.active_chat().is_some() => Focus::Composer,
                    _ => Focus::Sidebar,
                };
                return None;
            }
            _ => {}
        }

        match self.focus {
            Focus::Sidebar => self.handle_sidebar_key(key, session),
            Focus::Search => {
                match key.code {
                    KeyCode::Esc | KeyCode::Enter => self.focus = Focus::Sidebar,
                    _ => {
                        self.search.handle_event(&Event::Key(key));
                    }
                }
                None
            }
            Focus::Composer => self.handle_composer_key(key),
        }
    }

    fn sidebar_len(&self, session: &Session) -> usize {
        match self.active_tab {
            Tab::Chats => session.chats().len(),
            Tab::Contacts => session.contacts().len(),
            Tab::Groups => session.visible_groups().count(),
            Tab::Invites => session.pending_invitations().count(),
            Tab::Settings => 1,
        }
    }

    /// Selected row, clamped because lists shrink (accepted invitations etc.)
    fn sidebar_row(&self, session: &Session) -> Option<usize> {
        let len = self.sidebar_len(session);
        if len == 0 {
            None
        } else {
            Some(self.sidebar_index.min(len - 1))
        }
    }

    fn selected_group(&self, session: &Session) -> Option<GroupId> {
        let row = self.sidebar_row(session)?;
        session.visible_groups().nth(row).map(|g| g.id)
    }

    fn selected_invitation(&self, session: &Session) -> Option<InvitationId> {
        let row = self.sidebar_row(session)?;
        session.pending_invitations().nth(row).map(|i| i.id)
    }

    fn handle_sidebar_key(&mut self, key: KeyEvent, session: &Session) -> Option<UiAction> {
        let len = self.sidebar_len(session);
        match key.code {
            KeyCode::Esc => return Some(UiAction::Quit),
            KeyCode::Char('/') => self.focus = Focus::Search,
            KeyCode::Left => {
                self.active_tab = self.active_tab.prev();
                self.sidebar_index = 0;
            }
            KeyCode::Right => {
                self.active_tab = self.active_tab.next();
                self.sidebar_index = 0;
            }
            KeyCode::Up if len > 0 => {
                let current = self.sidebar_index.min(len - 1);
                self.sidebar_index = (current + len - 1) % len;
            }
            KeyCode::Down if len > 0 => {
                let current = self.sidebar_index.min(len - 1);
                self.sidebar_index = (current + 1) % len;
            }
            KeyCode::Enter => match self.active_tab {
                Tab::Chats => {
                    let row = self.sidebar_row(session)?;
                    let chat_id = session.chats()[row].id;
                    self.focus = Focus::Composer;
                    return Some(UiAction::SelectChat(chat_id));
                }
                Tab::Groups => {
                    if let Some(group_id) = self.selected_group(session) {
                        self.show_members_dialog(group_id);
                    }
                }
                Tab::Invites => {
                    return self.selected_invitation(session).map(UiAction::AcceptInvitation);
                }
                Tab::Settings => return Some(UiAction::ToggleTheme),
                Tab::Contacts => {}
            },
            KeyCode::Char('n') if self.active_tab == Tab::Groups => self.show_group_dialog(),
            KeyCode::Char('i') if self.active_tab == Tab::Groups => {
                if let Some(group_id) = self.selected_group(session) {
                    self.show_invite_dialog(session, group_id);
                }
            }
            KeyCode::Char('a') if self.active_tab == Tab::Invites => {
                return self.selected_invitation(session).map(UiAction::AcceptInvitation);
            }
            KeyCode::Char('d') if self.active_tab == Tab::Invites => {
                return self.selected_invitation(session).map(UiAction::DeclineInvitation);
            }
            _ => {}
        }
        None
    }

    fn handle_composer_key(&mut self, key: KeyEvent) -> Option<UiAction> {
        match key.code {
            KeyCode::Esc => self.focus = Focus::Sidebar,
            KeyCode::Enter => {
                // Blank input stays in the box, like a disabled send button
                if self.input.value().trim().is_empty() {
                    return None;
                }
                let text = self.input.value().to_string();
                self.input = Input::default();
                return Some(UiAction::SendText(text));
            }
            _ => {
                self.input.handle_event(&Event::Key(key));
            }
        }
        None
    }

    fn handle_file_dialog_key(&mut self, key: KeyEvent) -> Option<UiAction> {
        let dialog = self.file_dialog.as_mut()?;
        match key.code {
            KeyCode::Esc => self.file_dialog = None,
            KeyCode::Enter => {
                let path = dialog.input.value().trim().to_string();
                if !path.is_empty() {
                    self.file_dialog = None;
                    return Some(UiAction::SendFile(path));
                }
            }
            _ => {
                dialog.input.handle_event(&Event::Key(key));
            }
        }
        None
    }

    fn handle_group_dialog_key(&mut self, key: KeyEvent, session: &Session) -> Option<UiAction> {
        let contact_count = session.contacts().len();
        let dialog = self.group_dialog.as_mut()?;
        match key.code {
            KeyCode::Esc => self.group_dialog = None,
            KeyCode::Tab => dialog.editing_name = !dialog.editing_name,
            KeyCode::Enter => {
                let name = dialog.name.value().to_string();
                let members: Vec<UserId> = dialog.selected.iter().copied().collect();
                self.group_dialog = None;
                return Some(UiAction::CreateGroup { name, members });
            }
            _ if dialog.editing_name => {
                dialog.name.handle_event(&Event::Key(key));
            }
            KeyCode::Up if contact_count > 0 => {
                dialog.cursor = (dialog.cursor + contact_count - 1) % contact_count;
            }
            KeyCode::Down if contact_count > 0 => {
                dialog.cursor = (dialog.cursor + 1) % contact_count;
            }
            KeyCode::Char(' ') => {
                if let Some(contact) = session.contacts().get(dialog.cursor) {
                    if !dialog.selected.remove(&contact.id) {
                        dialog.selected.insert(contact.id);
                    }
                }
            }
            _ => {}
        }
        None
    }

    fn handle_invite_dialog_key(&mut self, key: KeyEvent) -> Option<UiAction> {
        let dialog = self.invite_dialog.as_mut()?;
        let count = dialog.candidates.len();
        match key.code {
            KeyCode::Esc => self.invite_dialog = None,
            KeyCode::Up if count > 0 => dialog.cursor = (dialog.cursor + count - 1) % count,
            KeyCode::Down if count > 0 => dialog.cursor = (dialog.cursor + 1) % count,
            KeyCode::Enter => {
                let group_id = dialog.group_id;
                let contact_id = dialog.candidates.get(dialog.cursor).copied();
                self.invite_dialog = None;
                return contact_id.map(|contact_id| UiAction::Invite { group_id, contact_id });
            }
            _ => {}
        }
        None
    }

    fn handle_members_dialog_key(&mut self, key: KeyEvent, session: &Session) -> Option<UiAction> {
        let group_id = self.members_dialog.as_ref()?.group_id;
        let (members, admin): (Vec<UserId>, UserId) = match session.group(group_id) {
            Some(group) => (group.members.iter().copied().collect(), group.admin),
            None => {
                self.members_dialog = None;
                return None;
            }
        };
        let count = members.len();
        let dialog = self.members_dialog.as_mut()?;

        match key.code {
            KeyCode::Esc => self.members_dialog = None,
            KeyCode::Up if count > 0 => dialog.cursor = (dialog.cursor + count - 1) % count,
            KeyCode::Down if count > 0 => dialog.cursor = (dialog.cursor + 1) % count,
            KeyCode::Char('x') | KeyCode::Delete => {
                let member_id = members.get(dialog.cursor.min(count.saturating_sub(1))).copied()?;
                // The admin row has no remove option
                if member_id == admin {
                    return None;
                }
                return Some(UiAction::RemoveMember { group_id, member_id });
            }
            KeyCode::Char('i') => {
                self.members_dialog = None;
                self.show_invite_dialog(session, group_id);
            }
            _ => {}
        }
        None
    }

    pub fn draw<B: Backend>(&self, frame: &mut Frame<B>, session: &Session) {
        let size = frame.size();
        let palette = Palette::for_theme(session.theme());
        frame.render_widget(Block::default().style(palette.base()), size);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(32), // Sidebar
                Constraint::Percentage(68), // Chat panel
            ])
            .split(size);

        self.draw_sidebar(frame, chunks[0], session, &palette);

        if session.active_chat().is_some() {
            self.draw_chat_view(frame, chunks[1], session, &palette);
        } else {
            draw_placeholder(frame, chunks[1], &palette);
        }

        if let Some(dialog) = &self.file_dialog {
            draw_file_dialog(frame, dialog, size, &palette);
        }
        if let Some(dialog) = &self.group_dialog {
            draw_group_dialog(frame, dialog, session, size, &palette);
        }
        if let Some(dialog) = &self.invite_dialog {
            draw_invite_dialog(frame, dialog, session, size, &palette);
        }
        if let Some(dialog) = &self.members_dialog {
            draw_members_dialog(frame, dialog, session, size, &palette);
        }
        if self.help_dialog.is_some() {
            draw_help_dialog(frame, size, &palette);
        }
    }

    fn draw_sidebar<B: Backend>(&self, frame: &mut Frame<B>, area: Rect, session: &Session, palette: &Palette) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Search box
                Constraint::Length(3), // Tabs
                Constraint::Min(3),    // List
            ])
            .split(area);

        let search = Paragraph::new(self.search.value())
            .block(
                Block::default()
                    .title("Messenger (/ to search)")
                    .borders(Borders::ALL)
                    .border_style(palette.border(self.focus == Focus::Search)),
            )
            .style(palette.base());
        frame.render_widget(search, chunks[0]);

        let titles: Vec<Line> = TABS
            .iter()
            .map(|t| {
                let label = match t {
                    Tab::Invites if session.pending_invitations().count() > 0 => {
                        format!("{} ({})", t.title(), session.pending_invitations().count())
                    }
                    _ => t.title().to_string(),
                };
                Line::from(label)
            })
            .collect();
        let tabs = Tabs::new(titles)
            .block(Block::default().borders(Borders::ALL).border_style(palette.border(false)))
            .select(self.active_tab.index())
            .style(palette.dim())
            .highlight_style(Style::default().fg(palette.accent).add_modifier(Modifier::BOLD));
        frame.render_widget(tabs, chunks[1]);

        let items = self.sidebar_items(session, palette);
        let hint = match self.active_tab {
            Tab::Groups => " (Enter members, n new, i invite)",
            Tab::Invites => " (a accept, d decline)",
            Tab::Settings => " (Enter toggle)",
            _ => "",
        };
        let list = List::new(items)
            .block(
                Block::default()
                    .title(format!("{}{}", self.active_tab.title(), hint))
                    .borders(Borders::ALL)
                    .border_style(palette.border(self.focus == Focus::Sidebar && !self.has_dialog())),
            )
            .highlight_style(Style::default().bg(palette.selected_bg).add_modifier(Modifier::BOLD));

        let mut state = ListState::default();
        state.select(self.sidebar_row(session));
        frame.render_stateful_widget(list, chunks[2], &mut state);

        if self.focus == Focus::Search {
            frame.set_cursor(chunks[0].x + self.search.cursor() as u16 + 1, chunks[0].y + 1);
        }
    }

    fn sidebar_items(&self, session: &Session, palette: &Palette) -> Vec<ListItem<'static>> {
        let online_dot = |online: bool| {
            if online {
                Span::styled("● ", Style::default().fg(Color::Green))
            } else {
                Span::styled("○ ", palette.dim())
            }
        };

        match self.active_tab {
            Tab::Chats => session
                .chats()
                .iter()
                .map(|chat| {
                    let marker = if session.selected_chat_id() == Some(chat.id) { "> " } else { "  " };
                    let mut title = vec![
                        Span::raw(marker.to_string()),
                        online_dot(chat.online),
                        Span::styled(
                            format!("[{}] {}", initials(&chat.name), chat.name),
                            Style::default().add_modifier(Modifier::BOLD),
                        ),
                        Span::styled(format!("  {}", chat.time), palette.dim()),
                    ];
                    if chat.unread > 0 {
                        title.push(Span::styled(
                            format!(" ({})", chat.unread),
                            Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
                        ));
                    }
                    ListItem::new(Text::from(vec![
                        Line::from(title),
                        Line::from(Span::styled(format!("    {}", chat.last_message), palette.dim())),
                    ]))
                })
                .collect(),
            Tab::Contacts => session
                .contacts()
                .iter()
                .map(|contact| {
                    ListItem::new(Text::from(vec![
                        Line::from(vec![
                            online_dot(contact.online),
                            Span::raw(format!("[{}] {}", initials(&contact.name), contact.name)),
                        ]),
                        Line::from(Span::styled(format!("    {}", contact.status), palette.dim())),
                    ]))
                })
                .collect(),
            Tab::Groups => session
                .visible_groups()
                .map(|group| {
                    let role = if group.is_admin(session.current_user()) { " (admin)" } else { "" };
                    ListItem::new(Text::from(vec![
                        Line::from(vec![
                            Span::styled(group.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
                            Span::styled(role.to_string(), Style::default().fg(palette.accent)),
                            Span::styled(format!("  {}", group.time), palette.dim()),
                        ]),
                        Line::from(Span::styled(
                            format!("  {} members · {}", group.member_count(), group.last_message),
                            palette.dim(),
                        )),
                    ]))
                })
                .collect(),
            Tab::Invites => session
                .pending_invitations()
                .map(|invitation| {
                    ListItem::new(Text::from(vec![
                        Line::from(Span::styled(
                            invitation.group_name.clone(),
                            Style::default().add_modifier(Modifier::BOLD),
                        )),
                        Line::from(Span::styled(
                            format!("  from {} at {}", invitation.from_name, invitation.sent_at),
                            palette.dim(),
                        )),
                    ]))
                })
                .collect(),
            Tab::Settings => {
                let theme = match session.theme() {
                    Theme::Light => "Light",
                    Theme::Dark => "Dark",
                };
                vec![ListItem::new(Text::from(vec![
                    Line::from(format!("Theme: {}", theme)),
                    Line::from(Span::styled(
                        format!("  Profile: {} (online)", session.display_name()),
                        palette.dim(),
                    )),
                ]))]
            }
        }
    }

    fn draw_chat_view<B: Backend>(&self, frame: &mut Frame<B>, area: Rect, session: &Session, palette: &Palette) {
        let Some(chat) = session.active_chat() else {
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Chat header
                Constraint::Min(5),    // Messages area
                Constraint::Length(3), // Input box
                Constraint::Length(1), // Help line
            ])
            .split(area);

        let presence = if chat.online { "Online" } else { "Last seen recently" };
        let header = Paragraph::new(Line::from(vec![
            Span::styled(
                format!("[{}] {}", initials(&chat.name), chat.name),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  {}", presence), palette.dim()),
        ]))
        .block(Block::default().borders(Borders::ALL).border_style(palette.border(false)));
        frame.render_widget(header, chunks[0]);

        draw_messages(frame, session.messages(), &chat.name, chunks[1], palette);

        let input_widget = Paragraph::new(self.input.value())
            .block(
                Block::default()
                    .title("Message")
                    .borders(Borders::ALL)
                    .border_style(palette.border(self.focus == Focus::Composer && !self.has_dialog())),
            )
            .style(palette.base());
        frame.render_widget(input_widget, chunks[2]);

        let help = Paragraph::new(Line::from(vec![Span::styled(
            "ESC quit | TAB focus | ←/→ tabs | Ctrl+F file | Ctrl+V voice | Ctrl+G group | Ctrl+T theme | Ctrl+H help",
            palette.dim(),
        )]));
        frame.render_widget(help, chunks[3]);

        if self.focus == Focus::Composer && !self.has_dialog() {
            frame.set_cursor(chunks[2].x + self.input.cursor() as u16 + 1, chunks[2].y + 1);
        }
    }
}

fn status_ticks(status: Option<DeliveryStatus>) -> &'static str {
    match status {
        Some(DeliveryStatus::Sent) => " ✓",
        Some(DeliveryStatus::Delivered) => " ✓✓",
        Some(DeliveryStatus::Read) => " ✓✓✓",
        None => "",
    }
}

/// One-line body of a message, by kind
fn message_body(message: &Message) -> String {
    match message.kind {
        MessageKind::Text => message.text.clone(),
        MessageKind::File => format!(
            "[file] {}",
            message.file_name.as_deref().unwrap_or(&message.text)
        ),
        MessageKind::Voice => "[voice] ━━━━━━━━ 0:15".to_string(),
    }
}

fn draw_messages<B: Backend>(f: &mut Frame<B>, messages: &[Message], peer: &str, area: Rect, palette: &Palette) {
    let wrap_width = (area.width.saturating_sub(2) as usize).max(1); // Account for borders

    let items: Vec<ListItem> = messages
        .iter()
        .flat_map(|m| {
            let author = if m.is_mine() { "You" } else { peer };
            let full_content = format!(
                "[{}] {}: {}{}",
                m.timestamp,
                author,
                message_body(m),
                status_ticks(m.status)
            );

            let wrapped_lines: Vec<String> = wrap(&full_content, wrap_width)
                .into_iter()
                .map(|l| l.into_owned())
                .collect();

            let style = if m.is_mine() {
                match m.status {
                    Some(DeliveryStatus::Read) => Style::default().fg(Color::Green),
                    Some(DeliveryStatus::Delivered) => Style::default().fg(palette.accent),
                    _ => Style::default().fg(palette.muted),
                }
            } else {
                Style::default().fg(palette.text)
            };

            wrapped_lines
                .into_iter()
                .map(move |line| ListItem::new(Text::from(line)).style(style))
        })
        .collect();

    // Select the last line so the list scrolls to the newest message
    let mut list_state = ListState::default();
    if !items.is_empty() {
        list_state.select(Some(items.len() - 1));
    }

    let messages_list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Messages").border_style(palette.border(false)))
        .highlight_style(Style::default());

    f.render_stateful_widget(messages_list, area, &mut list_state);
}

fn draw_placeholder<B: Backend>(f: &mut Frame<B>, area: Rect, palette: &Palette) {
    let block = Block::default().borders(Borders::ALL).border_style(palette.border(false));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);
    let text = Paragraph::new("Select a chat to start messaging")
        .alignment(Alignment::Center)
        .style(palette.dim());
    f.render_widget(text, rows[1]);
}

/// Centered popup area, shrunk to fit small terminals
fn popup_area(width: u16, height: u16, area: Rect) -> Rect {
    let popup_width = width.min(area.width.saturating_sub(4));
    let popup_height = height.min(area.height.saturating_sub(4));
    let popup_x = area.x + (area.width - popup_width) / 2;
    let popup_y = area.y + (area.height - popup_height) / 2;
    Rect::new(popup_x, popup_y, popup_width, popup_height)
}

fn draw_popup_frame<B: Backend>(f: &mut Frame<B>, title: &str, popup: Rect, palette: &Palette) -> Rect {
    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.accent))
        .style(palette.base());
    f.render_widget(Clear, popup); // Clear the area first
    f.render_widget(block, popup);
    popup.inner(&Margin {
        vertical: 1,
        horizontal: 2,
    })
}

fn draw_file_dialog<B: Backend>(f: &mut Frame<B>, dialog: &FileDialog, area: Rect, palette: &Palette) {
    let popup = popup_area(60, 7, area);
    let inner = draw_popup_frame(f, "Attach File", popup, palette);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(3)])
        .split(inner);

    f.render_widget(
        Paragraph::new("Path of the file to send (only its name is shared):").style(palette.dim()),
        chunks[0],
    );
    let input_widget = Paragraph::new(dialog.input.value())
        .block(Block::default().borders(Borders::ALL).border_style(palette.border(true)));
    f.render_widget(input_widget, chunks[1]);

    f.set_cursor(chunks[1].x + dialog.input.cursor() as u16 + 1, chunks[1].y + 1);
}

fn draw_group_dialog<B: Backend>(f: &mut Frame<B>, dialog: &GroupDialog, session: &Session, area: Rect, palette: &Palette) {
    let contacts = session.contacts();
    let popup = popup_area(60, contacts.len() as u16 + 10, area);
    let inner = draw_popup_frame(f, "New Group", popup, palette);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Name
            Constraint::Min(1),    // Members
            Constraint::Length(1), // Hint
        ])
        .split(inner);

    let name_widget = Paragraph::new(dialog.name.value()).block(
        Block::default()
            .title("Name")
            .borders(Borders::ALL)
            .border_style(palette.border(dialog.editing_name)),
    );
    f.render_widget(name_widget, chunks[0]);

    let items: Vec<ListItem> = contacts
        .iter()
        .map(|c| {
            let mark = if dialog.selected.contains(&c.id) { "[x]" } else { "[ ]" };
            ListItem::new(format!("{} {}", mark, c.name))
        })
        .collect();
    let mut state = ListState::default();
    if !dialog.editing_name && !items.is_empty() {
        state.select(Some(dialog.cursor));
    }
    let list = List::new(items)
        .block(
            Block::default()
                .title("Members")
                .borders(Borders::ALL)
                .border_style(palette.border(!dialog.editing_name)),
        )
        .highlight_style(Style::default().bg(palette.selected_bg));
    f.render_stateful_widget(list, chunks[1], &mut state);

    f.render_widget(
        Paragraph::new("Tab name/members | Space select | Enter create | Esc cancel").style(palette.dim()),
        chunks[2],
    );

    if dialog.editing_name {
        f.set_cursor(chunks[0].x + dialog.name.cursor() as u16 + 1, chunks[0].y + 1);
    }
}

fn draw_invite_dialog<B: Backend>(f: &mut Frame<B>, dialog: &InviteDialog, session: &Session, area: Rect, palette: &Palette) {
    let group_name = session
        .group(dialog.group_id)
        .map(|g| g.name.clone())
        .unwrap_or_default();
    let popup = popup_area(50, dialog.candidates.len() as u16 + 6, area);
    let inner = draw_popup_frame(f, &format!("Invite to {}", group_name), popup, palette);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    let items: Vec<ListItem> = if dialog.candidates.is_empty() {
        vec![ListItem::new(Span::styled("Every contact is already a member", palette.dim()))]
    } else {
        dialog
            .candidates
            .iter()
            .map(|id| ListItem::new(session.user_name(*id)))
            .collect()
    };
    let mut state = ListState::default();
    if !dialog.candidates.is_empty() {
        state.select(Some(dialog.cursor));
    }
    let list = List::new(items).highlight_style(Style::default().bg(palette.selected_bg));
    f.render_stateful_widget(list, chunks[0], &mut state);

    f.render_widget(
        Paragraph::new("Enter invite | Esc cancel").style(palette.dim()),
        chunks[1],
    );
}

fn draw_members_dialog<B: Backend>(f: &mut Frame<B>, dialog: &MembersDialog, session: &Session, area: Rect, palette: &Palette) {
    let Some(group) = session.group(dialog.group_id) else {
        return;
    };
    let is_admin = group.is_admin(session.current_user());
    let popup = popup_area(50, group.member_count() as u16 + 6, area);
    let inner = draw_popup_frame(f, &format!("{} members", group.name), popup, palette);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    let members: Vec<UserId> = group.members.iter().copied().collect();
    let items: Vec<ListItem> = members
        .iter()
        .map(|id| {
            let role = if group.is_admin(*id) { " (admin)" } else { "" };
            ListItem::new(format!("{}{}", session.user_name(*id), role))
        })
        .collect();
    let mut state = ListState::default();
    let cursor_row = dialog.cursor.min(members.len().saturating_sub(1));
    if !items.is_empty() {
        state.select(Some(cursor_row));
    }
    let list = List::new(items).highlight_style(Style::default().bg(palette.selected_bg));
    f.render_stateful_widget(list, chunks[0], &mut state);

    // Only admins get the management keys, and never on their own row
    let on_admin_row = members.get(cursor_row).map_or(false, |id| group.is_admin(*id));
    let hint = match (is_admin, on_admin_row) {
        (true, false) => "x remove | i invite | Esc close",
        (true, true) => "i invite | Esc close",
        (false, _) => "Esc close",
    };
    f.render_widget(Paragraph::new(hint).style(palette.dim()), chunks[1]);
}

fn draw_help_dialog<B: Backend>(f: &mut Frame<B>, area: Rect, palette: &Palette) {
    let popup = popup_area(70, 24, area);
    let inner = draw_popup_frame(f, "Keyboard Shortcuts", popup, palette);

    let shortcuts = vec![
        ("General", ""),
        ("ESC", "Quit (from the sidebar) / leave the message box"),
        ("Tab", "Switch focus between sidebar and message box"),
        ("←/→", "Switch sidebar tab"),
        ("↑/↓", "Move through the current list"),
        ("/", "Focus the search box"),
        ("", ""),
        ("Messages", ""),
        ("Enter", "Send message / open selected chat"),
        ("Ctrl+F", "Attach a file"),
        ("Ctrl+V", "Send a voice message"),
        ("", ""),
        ("Groups", ""),
        ("Ctrl+G", "Create a group"),
        ("Enter", "Show members of the selected group"),
        ("a / d", "Accept / decline the selected invitation"),
        ("", ""),
        ("Other", ""),
        ("Ctrl+T", "Toggle light/dark theme"),
        ("Ctrl+H", "Show this help"),
        ("", ""),
        ("Press any key to close this dialog", ""),
    ];

    let items: Vec<ListItem> = shortcuts
        .iter()
        .map(|(key, desc)| {
            if desc.is_empty() {
                if key.is_empty() {
                    ListItem::new("")
                } else {
                    // Category header
                    ListItem::new(Text::styled(
                        key.to_string(),
                        Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
                    ))
                }
            } else {
                let formatted_key = format!("{:<10}", key);
                ListItem::new(Line::from(vec![
                    Span::styled(formatted_key, Style::default().fg(Color::Green)),
                    Span::raw(desc.to_string()),
                ]))
            }
        })
        .collect();

    f.render_widget(List::new(items), inner);
}

pub fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

pub fn restore_terminal(mut terminal: Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
