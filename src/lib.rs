// Re-export needed modules for testing
pub mod client;
pub mod config;
pub mod models;
pub mod scheduler;
pub mod seed;
pub mod session;

// Re-export main types for convenience
pub use client::{MessengerClient, ReceiptEvent, ReceiptTimings};
pub use models::*;
pub use session::{Session, SessionError};
