use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{error, info};
use uuid::Uuid;

pub mod outbox;

/// Domain events emitted by the waybill and pickup workflows.
///
/// Notification delivery hangs off these: the outbox worker replays
/// committed events onto this channel, so a crashed dispatch is retried
/// rather than lost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    WaybillCommitted {
        waybill_id: Uuid,
        waybill_number: i64,
        company_id: Uuid,
        user_id: Uuid,
        document_path: Option<String>,
    },
    PickupRequested {
        pickup_request_id: Uuid,
        waybill_id: Uuid,
        skid_count: usize,
    },
    DocumentGenerationFailed {
        waybill_id: Uuid,
        reason: String,
        occurred_at: DateTime<Utc>,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Processes events from the receiver channel. Notification handlers live
/// here; a real deployment wires a mailer behind these branches.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::WaybillCommitted {
                waybill_id,
                waybill_number,
                company_id,
                user_id,
                document_path,
            } => {
                info!(
                    %waybill_id,
                    waybill_number,
                    %company_id,
                    %user_id,
                    document = document_path.as_deref().unwrap_or("<pending>"),
                    "Dispatching waybill notification"
                );
            }
            Event::PickupRequested {
                pickup_request_id,
                waybill_id,
                skid_count,
            } => {
                info!(
                    %pickup_request_id,
                    %waybill_id,
                    skid_count,
                    "Dispatching pickup request notification"
                );
            }
            Event::DocumentGenerationFailed {
                waybill_id, reason, ..
            } => {
                error!(%waybill_id, reason, "Document generation failed; queued for retry");
            }
        }
    }

    info!("Event processing loop stopped");
}
