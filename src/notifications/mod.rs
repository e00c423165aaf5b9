/// In-memory notification log
///
/// Append-only; ids start at 1 and increase by one per `add`. Readers get
/// copies, newest first.
pub mod types;

pub use types::Notification;

use crate::clock::SharedClock;
use crate::logger::{self, LogTag};
use parking_lot::RwLock;

struct Inner {
    items: Vec<Notification>,
    next_id: u64,
}

pub struct NotificationStore {
    inner: RwLock<Inner>,
    clock: SharedClock,
}

impl NotificationStore {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            inner: RwLock::new(Inner {
                items: Vec::new(),
                next_id: 1,
            }),
            clock,
        }
    }

    pub fn add(&self, title: &str, message: &str) -> Notification {
        let timestamp = self.clock.utc_now();
        let mut inner = self.inner.write();

        let notification = Notification {
            id: inner.next_id,
            title: title.to_string(),
            message: message.to_string(),
            timestamp,
        };
        inner.next_id += 1;
        inner.items.push(notification.clone());

        logger::debug(
            LogTag::Notifications,
            &format!("Added notification #{}: {}", notification.id, notification.title),
        );
        notification
    }

    /// Newest first
    pub fn get_all(&self) -> Vec<Notification> {
        self.inner.read().items.iter().rev().cloned().collect()
    }

    pub fn count(&self) -> usize {
        self.inner.read().items.len()
    }

    /// Drop all entries; ids keep increasing
    pub fn clear(&self) {
        self.inner.write().items.clear();
    }
}
