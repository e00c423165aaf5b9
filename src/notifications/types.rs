use chrono::{DateTime, Utc};
use serde::Serialize;

/// One entry of the dashboard notification log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: u64,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}
