//! Deterministic placeholder records used when neither the remote directory
//! nor the local cache has anything to show.

use chrono::{DateTime, Duration, Utc};

use crate::record::VolunteerRecord;

/// Number of records in the seed set.
pub const SEED_COUNT: usize = 8;

/// First sequence number / membership-code ordinal.
const SEED_BASE_ORDINAL: i64 = 1000;

pub const SEED_NAMES: [&str; SEED_COUNT] = [
    "Rajesh Kumar",
    "Priya Sharma",
    "Amit Patel",
    "Sneha Singh",
    "Vikram Yadav",
    "Anjali Gupta",
    "Rahul Verma",
    "Pooja Mehta",
];

pub const SEED_ADDRESSES: [&str; 6] = [
    "Mumbai, Maharashtra",
    "Delhi, NCR",
    "Bangalore, Karnataka",
    "Chennai, Tamil Nadu",
    "Kolkata, West Bengal",
    "Hyderabad, Telangana",
];

/// Build the seed set. Record `i` (0-based) was "created" `i` days before
/// `now`, so the list is already newest-first.
pub fn seed_records(now: DateTime<Utc>) -> Vec<VolunteerRecord> {
    SEED_NAMES
        .iter()
        .enumerate()
        .filter_map(|(i, name)| {
            let ordinal = SEED_BASE_ORDINAL + i as i64 + 1;
            let created_at = now - Duration::days(i as i64);
            VolunteerRecord {
                id: format!("mock_{}", i + 1),
                sequence_number: ordinal,
                name: (*name).to_string(),
                membership_code: format!("AAK{ordinal:04}"),
                mobile_number: format!("9876543{i:03}"),
                address: SEED_ADDRESSES[i % SEED_ADDRESSES.len()].to_string(),
                image_url: String::new(),
                join_date: Some(created_at),
                created_at: Some(created_at),
            }
            .normalized()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::avatar_url;
    use pretty_assertions::assert_eq;

    #[test]
    fn seed_has_fixed_ids_and_codes() {
        let records = seed_records(Utc::now());
        assert_eq!(records.len(), SEED_COUNT);

        let ids: Vec<String> = records.iter().map(|r| r.id.clone()).collect();
        let expected_ids: Vec<String> = (1..=8).map(|n| format!("mock_{n}")).collect();
        assert_eq!(ids, expected_ids);

        let codes: Vec<String> = records.iter().map(|r| r.membership_code.clone()).collect();
        let expected_codes: Vec<String> = (1001..=1008).map(|n| format!("AAK{n}")).collect();
        assert_eq!(codes, expected_codes);

        let ordinals: Vec<i64> = records.iter().map(|r| r.sequence_number).collect();
        assert_eq!(ordinals, (1001..=1008).collect::<Vec<i64>>());
    }

    #[test]
    fn seed_fields_follow_fixed_lists() {
        let records = seed_records(Utc::now());
        assert_eq!(records[0].mobile_number, "9876543000");
        assert_eq!(records[7].mobile_number, "9876543007");
        assert_eq!(records[6].address, "Mumbai, Maharashtra");
        assert_eq!(records[7].address, "Delhi, NCR");
        assert_eq!(records[1].image_url, avatar_url("Priya Sharma"));
    }

    #[test]
    fn seed_is_deterministic_and_spaced_by_one_day() {
        let now = Utc::now();
        let first = seed_records(now);
        assert_eq!(first, seed_records(now));

        for pair in first.windows(2) {
            let newer = pair[0].created_at.unwrap();
            let older = pair[1].created_at.unwrap();
            assert_eq!(newer - older, Duration::days(1));
        }
    }
}
