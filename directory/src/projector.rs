//! Search and membership-code filtering over the in-memory list.
//!
//! Pure functions; the projection is recomputed from scratch on every call.

use std::collections::BTreeSet;

use crate::record::VolunteerRecord;

/// Search term plus optional membership-code filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub search: String,
    pub category: Option<String>,
}

impl Query {
    pub fn new(search: impl Into<String>, category: Option<String>) -> Self {
        Self {
            search: search.into(),
            category,
        }
    }

    /// Category filter with blank values treated as "all".
    pub fn effective_category(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.is_empty())
    }

    pub fn is_active(&self) -> bool {
        !self.search.is_empty() || self.effective_category().is_some()
    }

    pub fn clear(&mut self) {
        self.search.clear();
        self.category = None;
    }
}

/// True when `record` matches the search term.
///
/// Name, membership code and address compare case-insensitively; the mobile
/// number is a plain substring check against the lowercased term.
pub fn matches_search(record: &VolunteerRecord, search: &str) -> bool {
    if search.is_empty() {
        return true;
    }
    let term = search.to_lowercase();
    record.name.to_lowercase().contains(&term)
        || record.membership_code.to_lowercase().contains(&term)
        || record.mobile_number.contains(&term)
        || record.address.to_lowercase().contains(&term)
}

pub fn matches(record: &VolunteerRecord, query: &Query) -> bool {
    matches_search(record, &query.search)
        && query
            .effective_category()
            .is_none_or(|code| record.membership_code == code)
}

/// Records matching `query`, in list order.
pub fn project(records: &[VolunteerRecord], query: &Query) -> Vec<VolunteerRecord> {
    records
        .iter()
        .filter(|r| matches(r, query))
        .cloned()
        .collect()
}

/// Distinct membership codes, sorted, for the category picker.
pub fn categories(records: &[VolunteerRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.membership_code.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// `"Showing 2 of 8 volunteers for \"ra\" with AAK: AAK1003"`
pub fn result_summary(shown: usize, total: usize, query: &Query) -> String {
    let mut summary = format!("Showing {shown} of {total} volunteers");
    if !query.search.is_empty() {
        summary.push_str(&format!(" for \"{}\"", query.search));
    }
    if let Some(code) = query.effective_category() {
        summary.push_str(&format!(" with AAK: {code}"));
    }
    summary
}

pub fn match_count_label(count: usize) -> String {
    if count == 1 {
        "1 result found".to_string()
    } else {
        format!("{count} results found")
    }
}
