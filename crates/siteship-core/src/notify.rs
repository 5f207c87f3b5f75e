//! Outbound customer notifications.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// A notification handed to the mail collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub to: String,
    pub subject: String,
    pub message: String,
    pub customer_name: String,
}

/// Delivery seam for customer notifications.
///
/// Notification delivery is best-effort: callers log a failure and carry on,
/// a publish never fails because mail did.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<()>;
}
