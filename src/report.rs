//! Report posting pipeline.
//!
//! ```text
//! NewReport ──▶ validate ──▶ normalize ──▶ query candidates ──▶ insert
//!                                                   │
//!                                                   ▼
//!                         notify both owners ◀── find_matches
//! ```
//!
//! Candidates are queried before the new report is inserted, so a report
//! can never match itself. Each match produces two notifications: one for
//! the owner of the new report and one for the owner of the candidate.

use anyhow::{bail, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use lostfound_core::matcher::{find_matches_with, parse_report_date, MatchParams};
use lostfound_core::models::{normalize, ItemReport, MatchResult, Notification, Status};
use lostfound_core::store::ReportStore;

use crate::config::Config;
use crate::json_store::JsonStore;
use crate::notify::Notifier;

/// A report as submitted by a user, before validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReport {
    pub owner_id: String,
    pub status: Status,
    pub item_type: String,
    #[serde(default)]
    pub item_name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub date: String,
}

impl NewReport {
    /// Validate and convert into the stored form.
    ///
    /// Blank optional text fields become `None`; `itemType` is normalized.
    pub fn into_report(self) -> Result<ItemReport> {
        if self.owner_id.trim().is_empty() {
            bail!("ownerId must not be empty");
        }
        let item_type = normalize(&self.item_type);
        if item_type.is_empty() {
            bail!("itemType must not be empty");
        }
        if self.date.trim().is_empty() {
            bail!("date must not be empty");
        }
        if parse_report_date(&self.date).is_none() {
            warn!(date = %self.date, "report date is not a recognised format");
        }

        Ok(ItemReport {
            status: self.status,
            item_type,
            item_name: non_blank(self.item_name),
            location: non_blank(self.location),
            description: non_blank(self.description),
            date: self.date.trim().to_string(),
            owner_id: self.owner_id.trim().to_string(),
            created_at: None,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Result of posting a report.
#[derive(Debug, Clone, Serialize)]
pub struct PostOutcome {
    pub id: String,
    pub matches: Vec<MatchResult>,
    /// Ids of the notifications created for the matches.
    pub notifications: Vec<String>,
}

/// Validate, store, and match a new report, notifying every affected owner.
///
/// The candidate query and the insert are separate store calls. Two
/// opposite reports posted concurrently may each miss the other, and such
/// a pair is never matched afterwards.
pub async fn post_report<S: ReportStore + ?Sized>(
    store: &S,
    notifier: &Notifier,
    params: &MatchParams,
    new_report: NewReport,
) -> Result<PostOutcome> {
    let report = new_report.into_report()?;

    let candidates = store
        .find_candidates(report.status.opposite(), &report.item_type)
        .await?;

    let id = store.insert_report(&report).await?;
    let matches = find_matches_with(&report, &candidates, params);

    info!(
        id = %id,
        status = %report.status,
        item_type = %report.item_type,
        candidates = candidates.len(),
        matches = matches.len(),
        "report posted"
    );

    let now = Utc::now();
    let mut notification_ids = Vec::with_capacity(matches.len() * 2);
    let mut notified: Vec<&str> = Vec::new();

    for m in &matches {
        let to_poster = Notification {
            id: String::new(),
            to_uid: report.owner_id.clone(),
            message: message_for(&report, &m.report, m),
            report_id: id.clone(),
            matched_item_id: m.id.clone(),
            read: false,
            created_at: now,
        };
        let to_candidate = Notification {
            id: String::new(),
            to_uid: m.report.owner_id.clone(),
            message: message_for(&m.report, &report, m),
            report_id: m.id.clone(),
            matched_item_id: id.clone(),
            read: false,
            created_at: now,
        };

        notification_ids.push(store.insert_notification(&to_poster).await?);
        notification_ids.push(store.insert_notification(&to_candidate).await?);

        for owner in [report.owner_id.as_str(), m.report.owner_id.as_str()] {
            if !notified.contains(&owner) {
                notified.push(owner);
            }
        }
    }

    for owner in notified {
        notifier.refresh(store, owner).await?;
    }

    Ok(PostOutcome {
        id,
        matches,
        notifications: notification_ids,
    })
}

/// Run the matcher for a report without storing anything.
pub async fn preview_matches<S: ReportStore + ?Sized>(
    store: &S,
    params: &MatchParams,
    new_report: NewReport,
) -> Result<Vec<MatchResult>> {
    let report = new_report.into_report()?;
    let candidates = store
        .find_candidates(report.status.opposite(), &report.item_type)
        .await?;
    Ok(find_matches_with(&report, &candidates, params))
}

/// Notification text for the owner of `own`, whose report matched `other`.
fn message_for(own: &ItemReport, other: &ItemReport, m: &MatchResult) -> String {
    let own_name = if own.item_name_text().is_empty() {
        own.item_type.as_str()
    } else {
        own.item_name_text()
    };
    let other_name = if other.item_name_text().is_empty() {
        other.item_type.as_str()
    } else {
        other.item_name_text()
    };
    format!(
        "Possible match for your {} {}: a {} \"{}\" was reported at {} on {} (name {}%, location {}%, description {}%)",
        own.status,
        own_name,
        other.status,
        other_name,
        if other.location_text().is_empty() { "an unknown place" } else { other.location_text() },
        other.date,
        m.name_match,
        m.location_match,
        m.description_match,
    )
}

/// CLI entry point for `lf post`.
pub async fn run_post(config: &Config, new_report: NewReport, json: bool) -> Result<()> {
    let store = JsonStore::open(&config.store.path)?;
    let notifier = Notifier::new();
    let outcome = post_report(&store, &notifier, &config.matching.params(), new_report).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    println!("Posted report {}", outcome.id);
    print_matches(&outcome.matches);
    Ok(())
}

/// CLI entry point for `lf preview`.
pub async fn run_preview(config: &Config, new_report: NewReport, json: bool) -> Result<()> {
    let store = JsonStore::open(&config.store.path)?;
    let matches = preview_matches(&store, &config.matching.params(), new_report).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&matches)?);
        return Ok(());
    }

    print_matches(&matches);
    Ok(())
}

fn print_matches(matches: &[MatchResult]) {
    if matches.is_empty() {
        println!("No matches.");
        return;
    }

    println!("{} possible match(es):", matches.len());
    for (i, m) in matches.iter().enumerate() {
        println!(
            "{}. [{}] {} {} at {}",
            i + 1,
            m.id,
            m.report.status,
            m.report.item_name_text(),
            m.report.location_text()
        );
        println!(
            "    date: {}  owner: {}  name: {}%  location: {}%  description: {}%",
            m.report.date, m.report.owner_id, m.name_match, m.location_match, m.description_match
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lostfound_core::store::memory::InMemoryStore;

    fn lost_wallet(owner: &str) -> NewReport {
        NewReport {
            owner_id: owner.to_string(),
            status: Status::Lost,
            item_type: "Wallet".to_string(),
            item_name: Some("black leather wallet".to_string()),
            location: Some("Main Street Park".to_string()),
            description: Some("lost my leather wallet".to_string()),
            date: "2024-05-08".to_string(),
        }
    }

    fn found_wallet(owner: &str) -> NewReport {
        NewReport {
            owner_id: owner.to_string(),
            status: Status::Found,
            item_type: " wallet ".to_string(),
            item_name: Some("black wallet".to_string()),
            location: Some("Main St Park".to_string()),
            description: Some("leather wallet".to_string()),
            date: "2024-05-10".to_string(),
        }
    }

    #[test]
    fn test_into_report_normalizes() {
        let mut input = found_wallet(" u1 ");
        input.description = Some("   ".to_string());
        let report = input.into_report().unwrap();
        assert_eq!(report.item_type, "wallet");
        assert_eq!(report.owner_id, "u1");
        assert!(report.description.is_none());
    }

    #[test]
    fn test_into_report_rejects_blank_required_fields() {
        let mut no_type = found_wallet("u1");
        no_type.item_type = "  ".to_string();
        assert!(no_type.into_report().unwrap_err().to_string().contains("itemType"));

        let mut no_owner = found_wallet("u1");
        no_owner.owner_id = String::new();
        assert!(no_owner.into_report().is_err());

        let mut no_date = found_wallet("u1");
        no_date.date = " ".to_string();
        assert!(no_date.into_report().is_err());
    }

    #[tokio::test]
    async fn test_post_notifies_both_owners() {
        let store = InMemoryStore::new();
        let notifier = Notifier::new();
        let params = MatchParams::default();

        let first = post_report(&store, &notifier, &params, lost_wallet("alice")).await.unwrap();
        assert!(first.matches.is_empty());

        let mut alice_badge = notifier.subscribe("alice", store.unread_count("alice").await.unwrap());
        assert_eq!(alice_badge.current(), 0);

        let second = post_report(&store, &notifier, &params, found_wallet("bob")).await.unwrap();
        assert_eq!(second.matches.len(), 1);
        assert_eq!(second.matches[0].id, first.id);
        assert_eq!(second.notifications.len(), 2);

        let alice = store.notifications_for("alice").await.unwrap();
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].report_id, first.id);
        assert_eq!(alice[0].matched_item_id, second.id);
        assert!(alice[0].message.contains("black leather wallet"));

        let bob = store.notifications_for("bob").await.unwrap();
        assert_eq!(bob.len(), 1);
        assert_eq!(bob[0].report_id, second.id);
        assert_eq!(bob[0].matched_item_id, first.id);

        assert_eq!(alice_badge.changed().await, Some(1));
    }

    #[tokio::test]
    async fn test_report_never_matches_itself() {
        let store = InMemoryStore::new();
        let notifier = Notifier::new();
        let outcome = post_report(&store, &notifier, &MatchParams::default(), found_wallet("bob"))
            .await
            .unwrap();
        assert!(outcome.matches.is_empty());
        assert!(store.notifications_for("bob").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_preview_does_not_write() {
        let store = InMemoryStore::new();
        let notifier = Notifier::new();
        post_report(&store, &notifier, &MatchParams::default(), lost_wallet("alice"))
            .await
            .unwrap();

        let matches = preview_matches(&store, &MatchParams::default(), found_wallet("bob"))
            .await
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert!(store.reports_by_owner("bob").await.unwrap().is_empty());
        assert!(store.notifications_for("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_later_lost_report_does_not_match_earlier_found() {
        let store = InMemoryStore::new();
        let notifier = Notifier::new();
        let params = MatchParams::default();
        let mut found = found_wallet("bob");
        found.date = "2024-05-01".to_string();
        post_report(&store, &notifier, &params, found).await.unwrap();

        let outcome = post_report(&store, &notifier, &params, lost_wallet("alice")).await.unwrap();
        assert!(outcome.matches.is_empty());
    }

    #[tokio::test]
    async fn test_same_owner_match_notifies_once_per_report() {
        let store = InMemoryStore::new();
        let notifier = Notifier::new();
        let params = MatchParams::default();
        post_report(&store, &notifier, &params, lost_wallet("carol")).await.unwrap();
        let outcome = post_report(&store, &notifier, &params, found_wallet("carol")).await.unwrap();
        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(store.notifications_for("carol").await.unwrap().len(), 2);
        assert_eq!(store.unread_count("carol").await.unwrap(), 2);
    }
}
