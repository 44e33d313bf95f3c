//! Storage abstraction for Lost & Found.
//!
//! The [`ReportStore`] trait defines the store operations the posting and
//! notification pipeline needs, enabling pluggable backends (in-memory,
//! JSON file, or a hosted document database).
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{ItemReport, Notification, Status};

/// Abstract storage backend for reports and notifications.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`insert_report`](ReportStore::insert_report) | Store a new report, returning its id |
/// | [`get_report`](ReportStore::get_report) | Fetch a report by id |
/// | [`find_candidates`](ReportStore::find_candidates) | Query by status and item type |
/// | [`reports_by_owner`](ReportStore::reports_by_owner) | A user's own postings |
/// | [`insert_notification`](ReportStore::insert_notification) | Store a notification |
/// | [`notifications_for`](ReportStore::notifications_for) | A user's notifications, newest first |
/// | [`mark_notification_read`](ReportStore::mark_notification_read) | Flag a notification as read |
/// | [`unread_count`](ReportStore::unread_count) | Unread notifications for a user |
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Insert a report. Returns the newly generated id.
    async fn insert_report(&self, report: &ItemReport) -> Result<String>;

    async fn get_report(&self, id: &str) -> Result<Option<ItemReport>>;

    /// Reports with the given status whose normalized item type equals
    /// `normalize(item_type)`, in insertion order.
    async fn find_candidates(&self, status: Status, item_type: &str) -> Result<Vec<(String, ItemReport)>>;

    async fn reports_by_owner(&self, owner_id: &str) -> Result<Vec<(String, ItemReport)>>;

    /// Insert a notification. Returns the newly generated id.
    async fn insert_notification(&self, notification: &Notification) -> Result<String>;

    /// Notifications addressed to `owner_id`, newest first.
    async fn notifications_for(&self, owner_id: &str) -> Result<Vec<Notification>>;

    /// Flag a notification as read, returning its updated form, or `None`
    /// if no notification has this id.
    async fn mark_notification_read(&self, id: &str) -> Result<Option<Notification>>;

    async fn unread_count(&self, owner_id: &str) -> Result<usize>;
}
