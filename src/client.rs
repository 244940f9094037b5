// src/client.rs
//! Session owner and delivery-receipt simulator
//!
//! There is no counterparty, so every outgoing message gets two fake receipts:
//! `Delivered` after [`ReceiptTimings::delivered_after`] and `Read` after
//! [`ReceiptTimings::read_after`], both measured from the moment it was sent.
//! Receipts for different messages are independent.

use log::{debug, info};
use tokio::sync::mpsc;
use tokio::time::Duration;

use crate::models::{DeliveryStatus, MessageId};
use crate::scheduler::DelayedScheduler;
use crate::session::{Session, SessionError};

/// A scheduled status change for one message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptEvent {
    pub message_id: MessageId,
    pub status: DeliveryStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptTimings {
    pub delivered_after: Duration,
    pub read_after: Duration,
}

impl Default for ReceiptTimings {
    fn default() -> Self {
        ReceiptTimings {
            delivered_after: Duration::from_millis(1000),
            read_after: Duration::from_millis(2000),
        }
    }
}

pub struct MessengerClient {
    session: Session,
    timings: ReceiptTimings,
    scheduler: DelayedScheduler<MessageId, ReceiptEvent>,
    receipt_rx: mpsc::Receiver<ReceiptEvent>,
}

impl MessengerClient {
    pub fn new(session: Session, timings: ReceiptTimings) -> Self {
        let (scheduler, receipt_rx) = DelayedScheduler::new();
        MessengerClient {
            session,
            timings,
            scheduler,
            receipt_rx,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Mutable access for operations that need no receipts (groups, selection, theme)
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn timings(&self) -> ReceiptTimings {
        self.timings
    }

    pub fn send_text(&mut self, content: &str) -> Result<MessageId, SessionError> {
        let id = self.session.send_text(content)?;
        self.schedule_receipts(id);
        Ok(id)
    }

    pub fn send_file(&mut self, path: &str) -> Result<MessageId, SessionError> {
        let id = self.session.send_file(path)?;
        self.schedule_receipts(id);
        Ok(id)
    }

    pub fn send_voice_note(&mut self) -> MessageId {
        let id = self.session.send_voice_note();
        self.schedule_receipts(id);
        id
    }

    fn schedule_receipts(&mut self, message_id: MessageId) {
        debug!(
            "Scheduling receipts for message {} at +{:?} and +{:?}",
            message_id, self.timings.delivered_after, self.timings.read_after
        );
        self.scheduler.schedule(
            message_id,
            self.timings.delivered_after,
            ReceiptEvent {
                message_id,
                status: DeliveryStatus::Delivered,
            },
        );
        self.scheduler.schedule(
            message_id,
            self.timings.read_after,
            ReceiptEvent {
                message_id,
                status: DeliveryStatus::Read,
            },
        );
    }

    /// Apply one receipt to the session; false if it changed nothing
    pub fn apply_receipt(&mut self, event: ReceiptEvent) -> bool {
        self.session.advance_status(event.message_id, event.status)
    }

    /// Apply every receipt that has already fired, without waiting.
    /// Returns how many were received.
    pub fn drain_receipts(&mut self) -> usize {
        let mut received = 0;
        while let Ok(event) = self.receipt_rx.try_recv() {
            self.apply_receipt(event);
            received += 1;
        }
        received
    }

    /// Wait for the next receipt and apply it
    pub async fn next_receipt(&mut self) -> Option<ReceiptEvent> {
        let event = self.receipt_rx.recv().await?;
        self.apply_receipt(event);
        Some(event)
    }

    /// Stop any receipts still pending for a message
    pub fn cancel_receipts(&mut self, message_id: MessageId) -> usize {
        self.scheduler.cancel(&message_id)
    }

    pub fn pending_receipts(&self, message_id: MessageId) -> usize {
        self.scheduler.pending(&message_id)
    }

    /// Abort every outstanding timer so nothing fires after the session ends
    pub fn shutdown(&mut self) {
        let aborted = self.scheduler.cancel_all();
        info!("Session closed ({} receipt timer(s) aborted)", aborted);
    }
}
