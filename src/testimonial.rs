use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Approved,
    Pending,
}

/// One entry of the persisted testimonials file.
///
/// Keys are camelCase on disk. Fields the site treats as optional stay
/// optional here so hand-curated entries load unchanged, and any keys this
/// type does not know about are carried through in `extra`.
///
/// `rating` keeps the stored JSON number as written (`4` stays `4`, `4.5`
/// stays `4.5`). `created_at` distinguishes an absent key (`None`) from an
/// explicit `null` (`Some(None)`), so a load/save cycle writes back exactly
/// the keys it read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub quote: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<serde_json::Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Testimonial {
    pub fn is_pending(&self) -> bool {
        self.status == Some(Status::Pending)
    }

    /// The `createdAt` string, if the record has one.
    pub fn created_at(&self) -> Option<&str> {
        self.created_at.as_ref().and_then(|c| c.as_deref())
    }

    /// Numeric rating for ordering and display; 0 when absent.
    pub fn rating_value(&self) -> f64 {
        self.rating
            .as_ref()
            .and_then(serde_json::Number::as_f64)
            .unwrap_or(0.0)
    }

    /// First `max_chars` characters of the quote, for console previews.
    pub fn preview(&self, max_chars: usize) -> String {
        self.quote.chars().take(max_chars).collect()
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// Only called when the key is present, so `null` becomes `Some(None)`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}
