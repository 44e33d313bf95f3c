//! Core data models for lost and found reports.
//!
//! These types flow through the posting pipeline: an [`ItemReport`] is
//! written to a store, compared against candidates by the matcher, and any
//! [`MatchResult`]s are turned into [`Notification`]s by the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether a report describes a lost or a found item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Lost,
    Found,
}

impl Status {
    /// The status a matching candidate must have.
    pub fn opposite(self) -> Status {
        match self {
            Status::Lost => Status::Found,
            Status::Found => Status::Lost,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Lost => "lost",
            Status::Found => "found",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match normalize(s).as_str() {
            "lost" => Ok(Status::Lost),
            "found" => Ok(Status::Found),
            other => anyhow::bail!("Unknown status: '{}'. Use lost or found.", other),
        }
    }
}

/// Trim and lower-case a free-text label for equality comparison.
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// A user-submitted lost or found report.
///
/// Optional text fields default to the empty string wherever they are
/// compared; see [`ItemReport::location_text`] and friends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemReport {
    pub status: Status,
    pub item_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Date of the loss or finding, as submitted.
    pub date: String,
    pub owner_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ItemReport {
    pub fn item_name_text(&self) -> &str {
        self.item_name.as_deref().unwrap_or("")
    }

    pub fn location_text(&self) -> &str {
        self.location.as_deref().unwrap_or("")
    }

    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    /// Category label in its stored (trimmed, lower-case) form.
    pub fn normalized_type(&self) -> String {
        normalize(&self.item_type)
    }
}

/// A candidate report that passed every matching check.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    /// Store identifier of the candidate report.
    pub id: String,
    #[serde(flatten)]
    pub report: ItemReport,
    pub location_match: u8,
    pub description_match: u8,
    pub name_match: u8,
}

/// A message telling a user that one of their reports has a potential match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(default)]
    pub id: String,
    pub to_uid: String,
    pub message: String,
    /// The recipient's own report.
    pub report_id: String,
    /// The other side of the match.
    pub matched_item_id: String,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
}
