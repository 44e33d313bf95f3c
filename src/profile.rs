//! A user's own postings and notifications.
//!
//! Used by `lf items`, `lf notifications`, `lf read`, and the matching
//! HTTP endpoints.

use anyhow::{bail, Result};
use serde::Serialize;

use lostfound_core::models::{ItemReport, Notification};
use lostfound_core::store::ReportStore;

use crate::config::Config;
use crate::json_store::JsonStore;
use crate::notify::Notifier;

/// One of the user's own reports, with its store id.
#[derive(Debug, Clone, Serialize)]
pub struct OwnedReport {
    pub id: String,
    #[serde(flatten)]
    pub report: ItemReport,
}

/// Notification list plus the badge count.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationList {
    pub unread: usize,
    pub notifications: Vec<Notification>,
}

pub async fn my_items<S: ReportStore + ?Sized>(store: &S, owner_id: &str) -> Result<Vec<OwnedReport>> {
    if owner_id.trim().is_empty() {
        bail!("owner must not be empty");
    }
    let reports = store.reports_by_owner(owner_id).await?;
    Ok(reports
        .into_iter()
        .map(|(id, report)| OwnedReport { id, report })
        .collect())
}

pub async fn my_notifications<S: ReportStore + ?Sized>(
    store: &S,
    owner_id: &str,
) -> Result<NotificationList> {
    if owner_id.trim().is_empty() {
        bail!("owner must not be empty");
    }
    let notifications = store.notifications_for(owner_id).await?;
    let unread = notifications.iter().filter(|n| !n.read).count();
    Ok(NotificationList {
        unread,
        notifications,
    })
}

/// Mark a notification as read and republish the recipient's badge count.
///
/// Errors if no notification has this id.
pub async fn mark_read<S: ReportStore + ?Sized>(store: &S, notifier: &Notifier, id: &str) -> Result<Notification> {
    let Some(notification) = store.mark_notification_read(id).await? else {
        bail!("notification not found: {}", id);
    };
    notifier.refresh(store, &notification.to_uid).await?;
    Ok(notification)
}

/// CLI entry point for `lf items`.
pub async fn run_items(config: &Config, owner_id: &str, json: bool) -> Result<()> {
    let store = JsonStore::open(&config.store.path)?;
    let items = my_items(&store, owner_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if items.is_empty() {
        println!("No reports.");
        return Ok(());
    }
    for item in &items {
        println!(
            "[{}] {} {} ({}) at {} on {}",
            item.id,
            item.report.status.as_str().to_uppercase(),
            item.report.item_name_text(),
            item.report.item_type,
            item.report.location_text(),
            item.report.date
        );
    }
    Ok(())
}

/// CLI entry point for `lf notifications`.
pub async fn run_notifications(config: &Config, owner_id: &str, json: bool) -> Result<()> {
    let store = JsonStore::open(&config.store.path)?;
    let list = my_notifications(&store, owner_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }

    if list.notifications.is_empty() {
        println!("No notifications yet.");
        return Ok(());
    }
    println!("{} unread", list.unread);
    for n in &list.notifications {
        let marker = if n.read { " " } else { "*" };
        println!(
            "{} [{}] {} ({})",
            marker,
            n.id,
            n.message,
            n.created_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
    Ok(())
}

/// CLI entry point for `lf read`.
pub async fn run_read(config: &Config, id: &str, json: bool) -> Result<()> {
    let store = JsonStore::open(&config.store.path)?;
    let notification = mark_read(&store, &Notifier::new(), id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&notification)?);
    } else {
        println!("Marked {} as read.", notification.id);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{post_report, NewReport};
    use lostfound_core::matcher::MatchParams;
    use lostfound_core::models::Status;
    use lostfound_core::store::memory::InMemoryStore;

    fn new_report(owner: &str, status: Status, date: &str) -> NewReport {
        NewReport {
            owner_id: owner.to_string(),
            status,
            item_type: "phone".to_string(),
            item_name: Some("cracked iphone".to_string()),
            location: Some("central station".to_string()),
            description: Some("black case with a sticker".to_string()),
            date: date.to_string(),
        }
    }

    async fn seeded() -> (InMemoryStore, Notifier) {
        let store = InMemoryStore::new();
        let notifier = Notifier::new();
        let params = MatchParams::default();
        post_report(&store, &notifier, &params, new_report("dana", Status::Lost, "2024-06-01"))
            .await
            .unwrap();
        post_report(&store, &notifier, &params, new_report("eli", Status::Found, "2024-06-02"))
            .await
            .unwrap();
        (store, notifier)
    }

    #[tokio::test]
    async fn test_my_items_only_returns_own_reports() {
        let (store, _) = seeded().await;
        let items = my_items(&store, "dana").await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].report.status, Status::Lost);
        assert!(my_items(&store, " ").await.is_err());
    }

    #[tokio::test]
    async fn test_mark_read_updates_badge() {
        let (store, notifier) = seeded().await;
        let list = my_notifications(&store, "dana").await.unwrap();
        assert_eq!(list.unread, 1);

        let mut badge = notifier.subscribe("dana", list.unread);
        let marked = mark_read(&store, &notifier, &list.notifications[0].id).await.unwrap();
        assert!(marked.read);
        assert_eq!(badge.changed().await, Some(0));
        assert_eq!(my_notifications(&store, "dana").await.unwrap().unread, 0);
    }

    #[tokio::test]
    async fn test_mark_read_unknown_id() {
        let (store, notifier) = seeded().await;
        let err = mark_read(&store, &notifier, "nope").await.unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
