// Common test utilities for integration tests
#![allow(dead_code)]

use std::sync::Once;

use log::LevelFilter;

use messenger::{
    models::{Contact, UserId},
    seed::Seed,
    MessengerClient, ReceiptTimings, Session,
};

// Initialize logging once
static INIT_LOGGER: Once = Once::new();

/// Set up the logger for the tests
pub fn setup_logging() {
    INIT_LOGGER.call_once(|| {
        let _ = env_logger::Builder::new()
            .filter_level(LevelFilter::Debug)
            .is_test(true)
            .try_init();
    });
}

/// Local user id used by the demo session
pub const ME: UserId = 0;

pub fn demo_session() -> Session {
    Session::new(ME, "Me", Seed::demo(ME))
}

/// A client over the demo data with the default 1s / 2s receipt timings
pub fn demo_client() -> MessengerClient {
    setup_logging();
    MessengerClient::new(demo_session(), ReceiptTimings::default())
}

/// Local user `me` with plain contacts `ids` and nothing else
pub fn session_with_contacts(me: UserId, ids: &[UserId]) -> Session {
    let contacts = ids
        .iter()
        .map(|id| Contact {
            id: *id,
            name: format!("Contact {}", id),
            status: "Online".to_string(),
            online: true,
        })
        .collect();
    let seed = Seed {
        contacts,
        ..Seed::default()
    };
    Session::new(me, "Me", seed)
}
