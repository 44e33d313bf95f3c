//! Lost/found matching engine.
//!
//! Given a newly posted report and the candidate reports an application
//! fetched from its store, returns the candidates that plausibly describe
//! the same item. The matcher performs no I/O and holds no state.
//!
//! # Pipeline
//!
//! Each candidate runs through the following checks, stopping at the
//! first failure:
//!
//! 1. Status must be the opposite of the new report's status, and the
//!    normalized item type must be equal. Callers normally pre-filter on
//!    both; the check keeps an unfiltered candidate list correct.
//! 2. Date ordering: the lost event must not come after the found event.
//! 3. Location similarity ≥ `min_location`.
//! 4. Description similarity ≥ `min_description`.
//! 5. Item-name similarity ≥ `min_name`.
//!
//! Survivors are returned in input order with rounded per-field scores.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::models::{ItemReport, MatchResult, Status};
use crate::similarity::{round_percent, similarity};

/// Default per-field similarity threshold, in percent.
pub const DEFAULT_MIN_SIMILARITY: f64 = 20.0;

/// What to do when either report's date cannot be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatePolicy {
    /// No ordering claim can be made, so the candidate is dropped.
    #[default]
    Reject,
    /// Skip the ordering check and let the text checks decide.
    Accept,
}

/// Matching thresholds, decoupled from application config.
#[derive(Debug, Clone)]
pub struct MatchParams {
    pub min_location: f64,
    pub min_description: f64,
    pub min_name: f64,
    pub invalid_dates: DatePolicy,
}

impl Default for MatchParams {
    fn default() -> Self {
        Self {
            min_location: DEFAULT_MIN_SIMILARITY,
            min_description: DEFAULT_MIN_SIMILARITY,
            min_name: DEFAULT_MIN_SIMILARITY,
            invalid_dates: DatePolicy::Reject,
        }
    }
}

/// Find matches for `new_item` with the default thresholds.
pub fn find_matches(new_item: &ItemReport, candidates: &[(String, ItemReport)]) -> Vec<MatchResult> {
    find_matches_with(new_item, candidates, &MatchParams::default())
}

/// Find matches for `new_item` among `candidates` using `params`.
pub fn find_matches_with(
    new_item: &ItemReport,
    candidates: &[(String, ItemReport)],
    params: &MatchParams,
) -> Vec<MatchResult> {
    let wanted_status = new_item.status.opposite();
    let wanted_type = new_item.normalized_type();
    let new_date = parse_report_date(&new_item.date);

    let mut matches = Vec::new();

    for (id, cand) in candidates {
        if cand.status != wanted_status || cand.normalized_type() != wanted_type {
            trace!(candidate = %id, "skipping candidate of wrong status or type");
            continue;
        }

        if !date_order_ok(new_item.status, new_date, parse_report_date(&cand.date), params.invalid_dates) {
            trace!(candidate = %id, date = %cand.date, "rejected by date ordering");
            continue;
        }

        let location = similarity(new_item.location_text(), cand.location_text());
        if location < params.min_location {
            trace!(candidate = %id, score = location, "rejected by location");
            continue;
        }

        let description = similarity(new_item.description_text(), cand.description_text());
        if description < params.min_description {
            trace!(candidate = %id, score = description, "rejected by description");
            continue;
        }

        let name = similarity(new_item.item_name_text(), cand.item_name_text());
        if name < params.min_name {
            trace!(candidate = %id, score = name, "rejected by item name");
            continue;
        }

        matches.push(MatchResult {
            id: id.clone(),
            report: cand.clone(),
            location_match: round_percent(location),
            description_match: round_percent(description),
            name_match: round_percent(name),
        });
    }

    debug!(
        candidates = candidates.len(),
        matches = matches.len(),
        status = %new_item.status,
        item_type = %wanted_type,
        "matching complete"
    );

    matches
}

/// Check the date-ordering rule for a candidate.
///
/// When the new report is `found`, the candidate (lost) must be dated on or
/// before it; when the new report is `lost`, the candidate (found) must be
/// dated on or after it.
pub fn date_order_ok(
    new_status: Status,
    new_date: Option<DateTime<Utc>>,
    cand_date: Option<DateTime<Utc>>,
    policy: DatePolicy,
) -> bool {
    match (new_date, cand_date) {
        (Some(new_date), Some(cand_date)) => match new_status {
            Status::Found => cand_date <= new_date,
            Status::Lost => cand_date >= new_date,
        },
        _ => policy == DatePolicy::Accept,
    }
}

/// Parse a report date.
///
/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM[:SS]`, `YYYY-MM-DD HH:MM[:SS]`, and a
/// bare `YYYY-MM-DD` (midnight). Naive values are taken as UTC. Returns
/// `None` for anything else, including blank input.
pub fn parse_report_date(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];
    for fmt in NAIVE_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ndt.and_utc());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc())
}
