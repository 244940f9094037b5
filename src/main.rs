use anyhow::{bail, Result};
use clap::Parser;
use log::{debug, info, LevelFilter};
use std::{io, path::PathBuf};

mod ui;
mod utils;

use crate::ui::{ChatUI, UiAction};
use messenger::{
    config::{self, Settings},
    seed::Seed,
    MessengerClient, Session, SessionError,
};

/// Command line arguments for Messenger
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Messenger: a terminal chat client running on demo data.",
    long_about = "Messenger is a terminal chat client backed by in-memory demo data.\n\n\
    Nothing is sent over the network and nothing is kept between runs; delivery\n\
    receipts are simulated.\n\
    Use -h or --help to see all options."
)]
struct Args {
    /// Settings file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// File to write logs to (the terminal is used by the UI)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[arg(long, value_name = "LEVEL", default_value = "debug")]
    log_level: LevelFilter,

    /// Start with the dark theme
    #[arg(long)]
    dark: bool,

    /// Write the effective settings to the settings file and exit
    #[arg(long)]
    write_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = config::resolve_config_path(args.config.as_deref())?;
    let mut settings = config::load_settings(&config_path)?;
    if args.dark {
        settings.dark_mode = true;
    }
    if let Some(path) = &args.log_file {
        settings.log_file = Some(path.clone());
    }

    let log_file_path = settings
        .log_file
        .clone()
        .unwrap_or_else(|| PathBuf::from("messenger.log"));
    utils::setup_logging(&log_file_path, args.log_level)?;

    info!("Messenger starting up");
    info!("System information: {} {}", std::env::consts::OS, std::env::consts::ARCH);
    info!("Logging to file: {}", log_file_path.display());
    info!("Settings file: {}", config_path.display());

    if args.write_config {
        config::save_settings(&settings, &config_path)?;
        println!("Settings written to {}", config_path.display());
        return Ok(());
    }

    let mut client = build_client(&settings)?;

    let mut terminal = ui::setup_terminal()?;
    let mut chat_ui = ChatUI::new();

    let result = run_main_loop(&mut chat_ui, &mut terminal, &mut client).await;

    // Restore terminal before reporting any loop error
    client.shutdown();
    ui::restore_terminal(terminal)?;
    result?;

    println!("Chat session ended.");
    Ok(())
}

fn build_client(settings: &Settings) -> Result<MessengerClient> {
    let me = settings.current_user_id;
    let seed = Seed::demo(me);
    if seed.contacts.iter().any(|c| c.id == me) {
        bail!("current_user_id {} collides with a demo contact id", me);
    }

    let session = Session::new(me, &settings.display_name, seed).with_theme(settings.theme());
    info!(
        "Session ready for {} ({} chats, {} contacts)",
        session.display_name(),
        session.chats().len(),
        session.contacts().len()
    );
    Ok(MessengerClient::new(session, settings.receipt_timings()))
}

async fn run_main_loop(
    chat_ui: &mut ChatUI,
    terminal: &mut ui::Terminal<ui::CrosstermBackend<io::Stdout>>,
    client: &mut MessengerClient,
) -> Result<()> {
    loop {
        terminal.draw(|f| chat_ui.draw(f, client.session()))?;

        if let Some(action) = chat_ui.handle_input(client.session())? {
            if action == UiAction::Quit {
                info!("Quit requested");
                break;
            }
            apply_action(client, action);
        }

        // Receipt timers fire on the runtime's worker threads
        let applied = client.drain_receipts();
        if applied > 0 {
            debug!("Applied {} delivery receipt(s)", applied);
        }

        tokio::task::yield_now().await;
    }
    Ok(())
}

/// Apply one UI action. Rejected actions are logged and otherwise ignored.
fn apply_action(client: &mut MessengerClient, action: UiAction) {
    debug!("UI action: {:?}", action);

    let result: Result<(), SessionError> = match action {
        UiAction::Quit => Ok(()),
        UiAction::SendText(text) => client.send_text(&text).map(|_| ()),
        UiAction::SendFile(path) => client.send_file(&path).map(|_| ()),
        UiAction::SendVoiceNote => {
            client.send_voice_note();
            Ok(())
        }
        UiAction::SelectChat(chat_id) => client.session_mut().select_chat(chat_id),
        UiAction::CreateGroup { name, members } => client
            .session_mut()
            .create_group(&name, &members)
            .map(|_| ()),
        UiAction::Invite { group_id, contact_id } => client
            .session_mut()
            .invite_to_group(group_id, contact_id)
            .map(|_| ()),
        UiAction::AcceptInvitation(id) => client.session_mut().accept_invitation(id).map(|_| ()),
        UiAction::DeclineInvitation(id) => client.session_mut().decline_invitation(id),
        UiAction::RemoveMember { group_id, member_id } => {
            client.session_mut().remove_member(group_id, member_id)
        }
        UiAction::ToggleTheme => {
            client.session_mut().toggle_theme();
            Ok(())
        }
    };

    if let Err(e) = result {
        debug!("Action not performed: {}", e);
    }
}
