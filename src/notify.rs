use std::collections::VecDeque;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Info,
}

/// One transient message. Every notification carries its own timestamp, so
/// several can be on screen at once without overwriting each other.
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub severity: Severity,
    pub created_at: Instant,
}

pub struct Notifications {
    items: VecDeque<Notification>,
    ttl: Duration,
    max_visible: usize,
    next_id: u64,
}

impl Notifications {
    pub fn new(ttl: Duration, max_visible: usize) -> Self {
        Self {
            items: VecDeque::new(),
            ttl,
            max_visible: max_visible.max(1),
            next_id: 1,
        }
    }

    /// Queue a message; returns its id. The oldest entry is evicted when the
    /// stack is full.
    pub fn notify(&mut self, message: impl Into<String>, severity: Severity) -> u64 {
        self.notify_at(message, severity, Instant::now())
    }

    pub fn notify_at(&mut self, message: impl Into<String>, severity: Severity, now: Instant) -> u64 {
        let message = message.into();
        match severity {
            Severity::Error => tracing::warn!("notify: {}", message),
            _ => tracing::info!("notify: {}", message),
        }

        let id = self.next_id;
        self.next_id += 1;
        self.items.push_back(Notification {
            id,
            message,
            severity,
            created_at: now,
        });
        while self.items.len() > self.max_visible {
            self.items.pop_front();
        }
        id
    }

    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.notify(message, Severity::Success)
    }

    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.notify(message, Severity::Error)
    }

    pub fn info(&mut self, message: impl Into<String>) -> u64 {
        self.notify(message, Severity::Info)
    }

    /// Drop expired notifications.
    pub fn prune(&mut self) {
        self.prune_at(Instant::now());
    }

    pub fn prune_at(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.items
            .retain(|n| now.saturating_duration_since(n.created_at) < ttl);
    }

    pub fn dismiss(&mut self, id: u64) {
        self.items.retain(|n| n.id != id);
    }

    /// Oldest first.
    pub fn visible(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
