use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

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

// The events emitted after a state change commits. Emission is
// best-effort; the durable record is the enquiry_events table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Enquiry events
    EnquiryCreated(Uuid),
    EnquiryUpdated(Uuid),
    SellerAccepted(Uuid),
    BuyerConfirmed(Uuid),
    ResponsibilityPlanSaved {
        enquiry_id: Uuid,
        changed_fields: Vec<String>,
    },
    EnquiryStatusChanged {
        enquiry_id: Uuid,
        old_status: String,
        new_status: String,
    },
    EnquiryAssigned {
        enquiry_id: Uuid,
        employee_id: Uuid,
    },
    SupplierCommitSet {
        enquiry_id: Uuid,
        commit_until: DateTime<Utc>,
    },
    EnquiryConverted {
        enquiry_id: Uuid,
        order_id: Uuid,
    },

    // Order events
    OrderStatusChanged {
        order_id: Uuid,
        old_status: String,
        new_status: String,
    },
    OrderLogisticsUpdated(Uuid),

    // Generic event for custom messages
    Generic {
        message: String,
        timestamp: DateTime<Utc>,
        metadata: serde_json::Value,
    },
}

impl Event {
    /// Create a generic event with string data
    pub fn with_data(data: String) -> Self {
        Event::Generic {
            message: data,
            timestamp: Utc::now(),
            metadata: serde_json::Value::Null,
        }
    }
}

// Handlers implementing this trait process events asynchronously.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle_event(&self, event: Event) -> Result<(), String>;
}

// Drains the event channel and logs each event. Downstream consumers
// (notifications, analytics) hook in here.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::EnquiryConverted {
                enquiry_id,
                order_id,
            } => {
                info!(enquiry_id = %enquiry_id, order_id = %order_id, "Enquiry converted to order");
            }
            Event::EnquiryStatusChanged {
                enquiry_id,
                old_status,
                new_status,
            } => {
                info!(
                    enquiry_id = %enquiry_id,
                    old_status = %old_status,
                    new_status = %new_status,
                    "Enquiry status changed"
                );
            }
            Event::OrderStatusChanged {
                order_id,
                old_status,
                new_status,
            } => {
                info!(
                    order_id = %order_id,
                    old_status = %old_status,
                    new_status = %new_status,
                    "Order status changed"
                );
            }
            other => {
                debug!("Received event: {:?}", other);
            }
        }
    }

    info!("Event processing loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sender_delivers_events_in_order() {
        let (tx, mut rx) = mpsc::channel(8);
        let sender = EventSender::new(tx);

        let id = Uuid::new_v4();
        sender.send(Event::EnquiryCreated(id)).await.unwrap();
        sender.send(Event::SellerAccepted(id)).await.unwrap();

        assert!(matches!(rx.recv().await, Some(Event::EnquiryCreated(got)) if got == id));
        assert!(matches!(rx.recv().await, Some(Event::SellerAccepted(got)) if got == id));
    }

    #[tokio::test]
    async fn send_fails_after_receiver_drop() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);
        assert!(sender.send(Event::EnquiryUpdated(Uuid::new_v4())).await.is_err());
    }
}
