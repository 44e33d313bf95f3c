//! Unread-notification feeds with explicit subscription handles.
//!
//! A [`Notifier`] keeps one `tokio::sync::watch` channel per user carrying
//! that user's unread notification count (the badge number). Callers
//! obtain a [`Subscription`] and own it; closing or dropping the handle
//! unregisters it. There is no process-wide listener state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use tokio::sync::watch;
use tracing::debug;

use lostfound_core::store::ReportStore;

struct Feed {
    tx: watch::Sender<usize>,
    subscribers: usize,
}

/// Publishes per-user unread counts to live subscribers.
#[derive(Clone, Default)]
pub struct Notifier {
    feeds: Arc<Mutex<HashMap<String, Feed>>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to `owner_id`'s unread count.
    ///
    /// `initial` seeds the feed if no one else is subscribed yet; otherwise
    /// the latest published value wins.
    pub fn subscribe(&self, owner_id: &str, initial: usize) -> Subscription {
        let mut feeds = self.feeds.lock().unwrap_or_else(|e| e.into_inner());
        let feed = feeds.entry(owner_id.to_string()).or_insert_with(|| Feed {
            tx: watch::channel(initial).0,
            subscribers: 0,
        });
        feed.subscribers += 1;
        let rx = feed.tx.subscribe();
        debug!(owner = owner_id, subscribers = feed.subscribers, "feed subscribed");

        Subscription {
            owner_id: owner_id.to_string(),
            rx,
            notifier: Some(self.clone()),
        }
    }

    /// Push a new unread count to every subscriber of `owner_id`.
    ///
    /// A no-op when nobody is subscribed.
    pub fn publish(&self, owner_id: &str, unread: usize) {
        let feeds = self.feeds.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(feed) = feeds.get(owner_id) {
            feed.tx.send_replace(unread);
            debug!(owner = owner_id, unread, "unread count published");
        }
    }

    /// Number of users with at least one open subscription.
    pub fn active_feeds(&self) -> usize {
        self.feeds.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn release(&self, owner_id: &str) {
        let mut feeds = self.feeds.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(feed) = feeds.get_mut(owner_id) {
            feed.subscribers = feed.subscribers.saturating_sub(1);
            if feed.subscribers == 0 {
                feeds.remove(owner_id);
                debug!(owner = owner_id, "feed removed");
            }
        }
    }

    /// Recount `owner_id`'s unread notifications from the store and publish.
    pub async fn refresh<S: ReportStore + ?Sized>(&self, store: &S, owner_id: &str) -> Result<usize> {
        let unread = store.unread_count(owner_id).await?;
        self.publish(owner_id, unread);
        Ok(unread)
    }
}

/// A caller-owned handle on one user's unread-count feed.
pub struct Subscription {
    owner_id: String,
    rx: watch::Receiver<usize>,
    notifier: Option<Notifier>,
}

impl Subscription {
    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// The most recent unread count.
    pub fn current(&self) -> usize {
        *self.rx.borrow()
    }

    /// Wait for the next published count.
    ///
    /// Returns `None` once the subscription is closed.
    pub async fn changed(&mut self) -> Option<usize> {
        self.notifier.as_ref()?;
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }

    pub fn is_closed(&self) -> bool {
        self.notifier.is_none()
    }

    /// Unregister from the feed. Safe to call more than once.
    pub fn close(&mut self) {
        if let Some(notifier) = self.notifier.take() {
            notifier.release(&self.owner_id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.close();
    }
}
