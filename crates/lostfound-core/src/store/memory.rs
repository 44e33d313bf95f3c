//! In-memory [`ReportStore`] implementation for testing and embedding.
//!
//! Uses `Vec`s behind `std::sync::RwLock` for thread safety. Queries are
//! linear scans; insertion order is preserved.

use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::models::{normalize, ItemReport, Notification, Status};

use super::ReportStore;

/// In-memory store for tests and single-process use.
pub struct InMemoryStore {
    reports: RwLock<Vec<(String, ItemReport)>>,
    notifications: RwLock<Vec<Notification>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            reports: RwLock::new(Vec::new()),
            notifications: RwLock::new(Vec::new()),
        }
    }

    /// Build a store pre-populated with `(id, report)` pairs.
    pub fn with_reports(reports: Vec<(String, ItemReport)>) -> Self {
        Self {
            reports: RwLock::new(reports),
            notifications: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: T) -> anyhow::Error {
    anyhow!("in-memory store lock poisoned")
}

/// Sort notifications newest first, breaking ties by id for stable output.
pub fn sort_newest_first(notifications: &mut [Notification]) {
    notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
}

#[async_trait]
impl ReportStore for InMemoryStore {
    async fn insert_report(&self, report: &ItemReport) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let mut stored = report.clone();
        if stored.created_at.is_none() {
            stored.created_at = Some(Utc::now());
        }
        self.reports.write().map_err(poisoned)?.push((id.clone(), stored));
        Ok(id)
    }

    async fn get_report(&self, id: &str) -> Result<Option<ItemReport>> {
        let reports = self.reports.read().map_err(poisoned)?;
        Ok(reports.iter().find(|(rid, _)| rid == id).map(|(_, r)| r.clone()))
    }

    async fn find_candidates(&self, status: Status, item_type: &str) -> Result<Vec<(String, ItemReport)>> {
        let wanted = normalize(item_type);
        let reports = self.reports.read().map_err(poisoned)?;
        Ok(reports
            .iter()
            .filter(|(_, r)| r.status == status && r.normalized_type() == wanted)
            .cloned()
            .collect())
    }

    async fn reports_by_owner(&self, owner_id: &str) -> Result<Vec<(String, ItemReport)>> {
        let reports = self.reports.read().map_err(poisoned)?;
        Ok(reports
            .iter()
            .filter(|(_, r)| r.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn insert_notification(&self, notification: &Notification) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let mut stored = notification.clone();
        stored.id = id.clone();
        self.notifications.write().map_err(poisoned)?.push(stored);
        Ok(id)
    }

    async fn notifications_for(&self, owner_id: &str) -> Result<Vec<Notification>> {
        let notifications = self.notifications.read().map_err(poisoned)?;
        let mut out: Vec<Notification> = notifications
            .iter()
            .filter(|n| n.to_uid == owner_id)
            .cloned()
            .collect();
        sort_newest_first(&mut out);
        Ok(out)
    }

    async fn mark_notification_read(&self, id: &str) -> Result<Option<Notification>> {
        let mut notifications = self.notifications.write().map_err(poisoned)?;
        Ok(notifications.iter_mut().find(|n| n.id == id).map(|n| {
            n.read = true;
            n.clone()
        }))
    }

    async fn unread_count(&self, owner_id: &str) -> Result<usize> {
        let notifications = self.notifications.read().map_err(poisoned)?;
        Ok(notifications
            .iter()
            .filter(|n| n.to_uid == owner_id && !n.read)
            .count())
    }
}
