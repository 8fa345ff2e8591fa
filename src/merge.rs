use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::testimonial::Testimonial;

#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub testimonials: Vec<Testimonial>,
    pub added: usize,
}

/// Union `incoming` into `existing` keyed by id.
///
/// Existing records are indexed first, so an incoming record never replaces
/// a stored one with the same id. Duplicate ids inside `existing` keep the
/// position of their first occurrence and the value of their last. The
/// result is sorted for display.
pub fn merge_testimonials(existing: Vec<Testimonial>, incoming: Vec<Testimonial>) -> MergeOutcome {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut testimonials: Vec<Testimonial> = Vec::with_capacity(existing.len() + incoming.len());

    for record in existing {
        match index.get(&record.id) {
            Some(&pos) => testimonials[pos] = record,
            None => {
                index.insert(record.id.clone(), testimonials.len());
                testimonials.push(record);
            }
        }
    }

    let mut added = 0;
    for record in incoming {
        if index.contains_key(&record.id) {
            continue;
        }
        index.insert(record.id.clone(), testimonials.len());
        testimonials.push(record);
        added += 1;
    }

    sort_testimonials(&mut testimonials);
    MergeOutcome {
        testimonials,
        added,
    }
}

/// Newest first by `createdAt`, then highest rating. Undated or unparseable
/// records sort as the unix epoch. Stable.
pub fn sort_testimonials(testimonials: &mut [Testimonial]) {
    testimonials.sort_by(|a, b| {
        created_at_millis(b.created_at())
            .cmp(&created_at_millis(a.created_at()))
            .then_with(|| b.rating_value().total_cmp(&a.rating_value()))
    });
}

/// Milliseconds since the epoch for a stored `createdAt`, or 0.
///
/// Accepts RFC 3339 (`Z` or offset), and offset-less date-times or bare
/// dates, which are read as UTC.
pub fn created_at_millis(created_at: Option<&str>) -> i64 {
    let Some(raw) = created_at.map(str::trim).filter(|s| !s.is_empty()) else {
        return 0;
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.timestamp_millis();
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return naive.and_utc().timestamp_millis();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        && let Some(naive) = date.and_hms_opt(0, 0, 0)
    {
        return naive.and_utc().timestamp_millis();
    }
    0
}
