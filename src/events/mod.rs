use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::entities::request::RequestStatus;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
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

    /// Sends an event, logging instead of failing when the processor is gone.
    /// Used after a commit, where the write must not be reported as failed.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!(error = %e, "event dropped");
        }
    }
}

/// Domain events emitted by the services
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    UserCreated(Uuid),
    PackageCreated(Uuid),
    RequestCreated {
        request_id: Uuid,
        package_id: Uuid,
        tracking_number: String,
    },
    RequestStatusChanged {
        request_id: Uuid,
        old_status: RequestStatus,
        new_status: RequestStatus,
        at: DateTime<Utc>,
    },
    PartnerAssigned {
        request_id: Uuid,
        partner_id: Uuid,
    },
    RequestVerified(Uuid),
    FranchiseHandoffRecorded {
        request_id: Uuid,
        franchise_tracking_id: String,
    },
    ReviewCreated {
        review_id: Uuid,
        request_id: Uuid,
        partner_id: Uuid,
        rating: i32,
    },
}

/// Drains the event channel, logging each event until every sender is dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match event {
            Event::RequestStatusChanged {
                request_id,
                old_status,
                new_status,
                at,
            } => {
                info!(%request_id, %old_status, %new_status, %at, "request status changed");
                if matches!(new_status, RequestStatus::Cancelled | RequestStatus::Rejected) {
                    warn!(%request_id, status = %new_status, "request ended before delivery");
                }
            }
            Event::ReviewCreated {
                review_id,
                partner_id,
                rating,
                ..
            } => {
                info!(%review_id, %partner_id, rating, "review recorded");
                if rating <= 2 {
                    warn!(%partner_id, rating, "low rating received");
                }
            }
            other => info!("Received event: {:?}", other),
        }
    }

    warn!("Event processing loop has ended");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sender_delivers_to_receiver() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);
        let id = Uuid::new_v4();

        sender.send(Event::RequestVerified(id)).await.unwrap();
        assert_eq!(rx.recv().await, Some(Event::RequestVerified(id)));
    }

    #[tokio::test]
    async fn send_fails_once_the_receiver_is_dropped() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);

        assert!(sender.send(Event::UserCreated(Uuid::new_v4())).await.is_err());
        // does not panic or error
        sender.send_or_log(Event::UserCreated(Uuid::new_v4())).await;
    }

    #[tokio::test]
    async fn processor_exits_when_senders_close() {
        let (tx, rx) = mpsc::channel(4);
        let handle = tokio::spawn(process_events(rx));
        tx.send(Event::PackageCreated(Uuid::new_v4())).await.unwrap();
        drop(tx);
        handle.await.unwrap();
    }
}
