//! JSON-file-backed [`ReportStore`] implementation.
//!
//! The whole store lives in one JSON document:
//!
//! ```json
//! { "reports": [ { "id": "...", "status": "lost", ... } ], "notifications": [ ... ] }
//! ```
//!
//! The file is read once at open and rewritten after every mutation via a
//! temporary file and rename, so a crash mid-write leaves the previous
//! version intact. Mutations are applied to a copy of the snapshot and only
//! become visible once the write has succeeded. A missing file is an empty
//! store.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use lostfound_core::models::{normalize, ItemReport, Notification, Status};
use lostfound_core::store::memory::sort_newest_first;
use lostfound_core::store::ReportStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredReport {
    id: String,
    #[serde(flatten)]
    report: ItemReport,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Snapshot {
    #[serde(default)]
    reports: Vec<StoredReport>,
    #[serde(default)]
    notifications: Vec<Notification>,
}

/// File-backed store used by the `lf` CLI and HTTP server.
pub struct JsonStore {
    path: PathBuf,
    state: Mutex<Snapshot>,
}

impl JsonStore {
    /// Open (or lazily create) the store at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let state = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read store file: {}", path.display()))?;
            if content.trim().is_empty() {
                Snapshot::default()
            } else {
                serde_json::from_str(&content)
                    .with_context(|| format!("Failed to parse store file: {}", path.display()))?
            }
        } else {
            Snapshot::default()
        };

        debug!(
            path = %path.display(),
            reports = state.reports.len(),
            notifications = state.notifications.len(),
            "store opened"
        );

        Ok(Self {
            path: path.to_path_buf(),
            state: Mutex::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, Snapshot>> {
        self.state
            .lock()
            .map_err(|e| anyhow!("store lock poisoned: {}", e))
    }

    fn persist(&self, snapshot: &Snapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
        }

        let json = serde_json::to_string_pretty(snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace store file: {}", self.path.display()))?;
        Ok(())
    }

    /// Apply `change` to a copy of the snapshot, persist it, then swap it in.
    /// On a failed write the shared state is left untouched.
    fn commit<T>(&self, change: impl FnOnce(&mut Snapshot) -> T) -> Result<T> {
        let mut state = self.lock()?;
        let mut next = state.clone();
        let out = change(&mut next);
        self.persist(&next)?;
        *state = next;
        Ok(out)
    }
}

#[async_trait]
impl ReportStore for JsonStore {
    async fn insert_report(&self, report: &ItemReport) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let mut stored = report.clone();
        if stored.created_at.is_none() {
            stored.created_at = Some(Utc::now());
        }

        self.commit(|snapshot| {
            snapshot.reports.push(StoredReport {
                id: id.clone(),
                report: stored,
            })
        })?;
        Ok(id)
    }

    async fn get_report(&self, id: &str) -> Result<Option<ItemReport>> {
        let state = self.lock()?;
        Ok(state
            .reports
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.report.clone()))
    }

    async fn find_candidates(&self, status: Status, item_type: &str) -> Result<Vec<(String, ItemReport)>> {
        let wanted = normalize(item_type);
        let state = self.lock()?;
        Ok(state
            .reports
            .iter()
            .filter(|r| r.report.status == status && r.report.normalized_type() == wanted)
            .map(|r| (r.id.clone(), r.report.clone()))
            .collect())
    }

    async fn reports_by_owner(&self, owner_id: &str) -> Result<Vec<(String, ItemReport)>> {
        let state = self.lock()?;
        Ok(state
            .reports
            .iter()
            .filter(|r| r.report.owner_id == owner_id)
            .map(|r| (r.id.clone(), r.report.clone()))
            .collect())
    }

    async fn insert_notification(&self, notification: &Notification) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let mut stored = notification.clone();
        stored.id = id.clone();

        self.commit(|snapshot| snapshot.notifications.push(stored))?;
        Ok(id)
    }

    async fn notifications_for(&self, owner_id: &str) -> Result<Vec<Notification>> {
        let state = self.lock()?;
        let mut out: Vec<Notification> = state
            .notifications
            .iter()
            .filter(|n| n.to_uid == owner_id)
            .cloned()
            .collect();
        sort_newest_first(&mut out);
        Ok(out)
    }

    async fn mark_notification_read(&self, id: &str) -> Result<Option<Notification>> {
        let known = self.lock()?.notifications.iter().any(|n| n.id == id);
        if !known {
            return Ok(None);
        }
        self.commit(|snapshot| {
            snapshot.notifications.iter_mut().find(|n| n.id == id).map(|n| {
                n.read = true;
                n.clone()
            })
        })
    }

    async fn unread_count(&self, owner_id: &str) -> Result<usize> {
        let state = self.lock()?;
        Ok(state
            .notifications
            .iter()
            .filter(|n| n.to_uid == owner_id && !n.read)
            .count())
    }
}
