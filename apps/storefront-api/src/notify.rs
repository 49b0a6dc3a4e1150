//! # New-Order Notifications
//!
//! Fire-and-forget dispatch of "new order" notices to the store owner.
//!
//! ```text
//! place_order ── insert order ── COMMIT ──► return Order to the buyer
//!                                   │
//!                                   └─► tokio::spawn(notifier.notify_new_order(..))
//!                                              │
//!                                              ├── Ok  → debug!
//!                                              └── Err → warn!, dropped (no retry)
//! ```
//!
//! The order is the source of truth; the notification is best effort.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use storefront_core::{Money, Order};
use tracing::{debug, info, warn};

/// What the store owner is told about a new order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderNotification {
    pub tenant_id: String,
    pub store_name: String,
    pub recipient: String,
    pub order_id: String,
    pub customer_name: String,
    pub phone: String,
    pub quantity: i64,
    #[serde(with = "storefront_core::money::fixed2")]
    pub total: Money,
}

impl OrderNotification {
    pub fn for_order(order: &Order, store_name: impl Into<String>, recipient: impl Into<String>) -> Self {
        OrderNotification {
            tenant_id: order.tenant_id.clone(),
            store_name: store_name.into(),
            recipient: recipient.into(),
            order_id: order.id.clone(),
            customer_name: order.customer_name.clone(),
            phone: order.phone.clone(),
            quantity: order.quantity,
            total: order.total(),
        }
    }
}

/// Notification failure. Logged, never surfaced to the buyer.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Delivery failed: {0}")]
    Delivery(String),
}

/// Delivers new-order notices.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_new_order(&self, notification: OrderNotification) -> Result<(), NotifyError>;
}

/// Records notifications through tracing. Email delivery is external.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify_new_order(&self, notification: OrderNotification) -> Result<(), NotifyError> {
        info!(
            tenant_id = %notification.tenant_id,
            order_id = %notification.order_id,
            recipient = %notification.recipient,
            total = %notification.total,
            "New order notification"
        );
        Ok(())
    }
}

/// Spawns delivery and returns immediately.
pub fn dispatch(notifier: Arc<dyn Notifier>, notification: OrderNotification) {
    tokio::spawn(async move {
        let order_id = notification.order_id.clone();
        match notifier.notify_new_order(notification).await {
            Ok(()) => debug!(order_id = %order_id, "Order notification delivered"),
            Err(e) => warn!(order_id = %order_id, error = %e, "Order notification dropped"),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    struct ChannelNotifier(mpsc::UnboundedSender<OrderNotification>);

    #[async_trait]
    impl Notifier for ChannelNotifier {
        async fn notify_new_order(&self, notification: OrderNotification) -> Result<(), NotifyError> {
            self.0
                .send(notification)
                .map_err(|e| NotifyError::Delivery(e.to_string()))
        }
    }

    fn notification() -> OrderNotification {
        OrderNotification {
            tenant_id: "t-1".into(),
            store_name: "Rina Fashion".into(),
            recipient: "owner@rina.test".into(),
            order_id: "o-1".into(),
            customer_name: "Karim".into(),
            phone: "01712345678".into(),
            quantity: 2,
            total: Money::from_cents(106_000),
        }
    }

    #[tokio::test]
    async fn test_dispatch_delivers_in_background() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        dispatch(Arc::new(ChannelNotifier(tx)), notification());

        let received = rx.recv().await.unwrap();
        assert_eq!(received.order_id, "o-1");
    }

    #[test]
    fn test_total_serializes_as_fixed2() {
        let json = serde_json::to_value(notification()).unwrap();
        assert_eq!(json["total"], "1060.00");
        assert_eq!(json["orderId"], "o-1");
    }
}
