use chrono::{DateTime, SecondsFormat};
use sha2::{Digest, Sha256};

use crate::config::Settings;
use crate::places::RawReview;
use crate::testimonial::{Status, Testimonial};

const ID_PREFIX: &str = "google-";
const DEFAULT_RATING: u8 = 5;

/// Map one upstream review onto the persisted testimonial shape.
pub fn normalize_review(review: &RawReview, settings: &Settings) -> Testimonial {
    let unix_time = review.unix_time();
    let rating = coerce_rating(review.rating);

    let quote = review
        .text
        .as_deref()
        .filter(|t| !t.is_empty())
        .or(review.review.as_deref())
        .unwrap_or_default()
        .trim()
        .to_string();

    let id = match unix_time {
        Some(t) if t != 0 => format!("{ID_PREFIX}{t}"),
        _ => fallback_id(&quote),
    };

    let color = settings
        .palette
        .get(color_index(rating, unix_time.unwrap_or(0), settings.palette.len()))
        .cloned();

    Testimonial {
        id,
        quote,
        author: review
            .author_name
            .clone()
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| settings.default_author.clone()),
        role: Some(settings.default_role.clone()),
        company: Some(
            review
                .relative_time_description
                .clone()
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| settings.default_company.clone()),
        ),
        rating: Some(rating.into()),
        color,
        // Fetched records always carry the key, `null` when the time is missing.
        created_at: Some(unix_time.and_then(iso_timestamp)),
        status: Some(Status::Approved),
        extra: serde_json::Map::new(),
    }
}

/// Missing or zero ratings count as 5; everything else is truncated and
/// clamped into 1..=5.
pub fn coerce_rating(rating: Option<f64>) -> u8 {
    match rating {
        Some(r) if r.is_finite() && r as i64 != 0 => (r as i64).clamp(1, 5) as u8,
        _ => DEFAULT_RATING,
    }
}

/// Palette slot for a review: `|rating + time| mod palette_len`.
pub fn color_index(rating: u8, unix_time: i64, palette_len: usize) -> usize {
    if palette_len == 0 {
        return 0;
    }
    let sum = i128::from(rating) + i128::from(unix_time);
    (sum.unsigned_abs() % palette_len as u128) as usize
}

/// `YYYY-MM-DDTHH:MM:SS+00:00` for a unix time, or `None` if out of range.
pub fn iso_timestamp(unix_time: i64) -> Option<String> {
    DateTime::from_timestamp(unix_time, 0).map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, false))
}

/// Content fingerprint id for reviews without a timestamp: first 8 bytes of
/// SHA-256 over the trimmed quote, hex-encoded.
pub fn fallback_id(quote: &str) -> String {
    let hash = Sha256::digest(quote.trim().as_bytes());
    format!("{ID_PREFIX}{}", hex::encode(&hash[..8]))
}
