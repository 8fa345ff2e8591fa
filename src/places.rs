use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::config::{Credentials, Settings};
use crate::error::{Error, Result};

/// Max characters of a non-2xx response body carried into the error.
const ERROR_BODY_CHARS: usize = 200;

/// A review as returned by the Places Details API. Every field is optional
/// upstream; normalization supplies the defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawReview {
    pub author_name: Option<String>,
    pub rating: Option<f64>,
    pub text: Option<String>,
    pub review: Option<String>,
    pub relative_time_description: Option<String>,
    pub time: Option<serde_json::Value>,
}

impl RawReview {
    /// The review time in unix seconds, only when upstream sent an integer.
    pub fn unix_time(&self) -> Option<i64> {
        self.time.as_ref().and_then(serde_json::Value::as_i64)
    }
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    status: Option<String>,
    error_message: Option<String>,
    result: Option<DetailsResult>,
}

#[derive(Debug, Deserialize)]
struct DetailsResult {
    reviews: Option<Vec<RawReview>>,
}

// ---------------------------------------------------------------------------
// Client abstraction (for testability)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

pub trait PlacesClient {
    /// Issue a GET and return the status and body, whatever the status is.
    /// Only transport failures are errors here.
    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<HttpReply>;
}

struct UreqPlacesClient {
    agent: ureq::Agent,
    timeout_secs: u64,
}

impl UreqPlacesClient {
    fn new(timeout_secs: u64) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(timeout_secs))
            .build();
        Self {
            agent,
            timeout_secs,
        }
    }

    fn read_body(&self, response: ureq::Response) -> Result<String> {
        response.into_string().map_err(|e| {
            if is_timeout_io(&e) {
                Error::Timeout(self.timeout_secs)
            } else {
                Error::Fetch(format!("failed to read response body: {e}"))
            }
        })
    }
}

impl PlacesClient for UreqPlacesClient {
    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<HttpReply> {
        let mut request = self.agent.get(url);
        for (name, value) in query {
            request = request.query(name, value);
        }

        match request.call() {
            Ok(response) => {
                let status = response.status();
                Ok(HttpReply {
                    status,
                    body: self.read_body(response)?,
                })
            }
            Err(ureq::Error::Status(status, response)) => Ok(HttpReply {
                status,
                body: response.into_string().unwrap_or_default(),
            }),
            Err(ureq::Error::Transport(transport)) => {
                if is_timeout_transport(&transport) {
                    return Err(Error::Timeout(self.timeout_secs));
                }
                let key = query
                    .iter()
                    .find(|(name, _)| *name == "key")
                    .map(|(_, value)| *value);
                let message = describe_transport(&transport, key);
                Err(Error::Fetch(format!("request failed: {message}")))
            }
        }
    }
}

/// Transport failure text without the request URL. ureq's `Display` prints the
/// URL with the percent-encoded key in its query string.
fn describe_transport(transport: &ureq::Transport, key: Option<&str>) -> String {
    let mut message = transport.kind().to_string();
    if let Some(detail) = transport.message() {
        message.push_str(": ");
        message.push_str(detail);
    }
    if let Some(source) = std::error::Error::source(transport) {
        message.push_str(": ");
        message.push_str(&source.to_string());
    }
    match key {
        Some(key) if !key.is_empty() => message.replace(key, "***"),
        _ => message,
    }
}

fn is_timeout_io(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
    )
}

fn is_timeout_transport(transport: &ureq::Transport) -> bool {
    std::error::Error::source(transport)
        .and_then(|source| source.downcast_ref::<std::io::Error>())
        .is_some_and(is_timeout_io)
}

// ---------------------------------------------------------------------------
// Review source
// ---------------------------------------------------------------------------

pub trait ReviewSource {
    /// Fetch the raw reviews for the configured place. One request per call.
    fn fetch_reviews(&self) -> Result<Vec<RawReview>>;
}

pub struct PlacesSource {
    endpoint: String,
    place_id: String,
    api_key: String,
    language: String,
    client: Box<dyn PlacesClient>,
}

impl PlacesSource {
    pub fn new(settings: &Settings, credentials: &Credentials) -> Self {
        Self::with_client(
            settings,
            credentials,
            Box::new(UreqPlacesClient::new(settings.timeout_secs)),
        )
    }

    pub fn with_client(
        settings: &Settings,
        credentials: &Credentials,
        client: Box<dyn PlacesClient>,
    ) -> Self {
        Self {
            endpoint: settings.endpoint.clone(),
            place_id: credentials.place_id.clone(),
            api_key: credentials.api_key.expose().to_string(),
            language: settings.language.clone(),
            client,
        }
    }

    fn query(&self) -> [(&str, &str); 5] {
        [
            ("place_id", self.place_id.as_str()),
            ("fields", "reviews"),
            ("key", self.api_key.as_str()),
            ("language", self.language.as_str()),
            ("reviews_no_translations", "true"),
        ]
    }
}

impl ReviewSource for PlacesSource {
    fn fetch_reviews(&self) -> Result<Vec<RawReview>> {
        debug!(
            endpoint = %self.endpoint,
            place_id = %self.place_id,
            language = %self.language,
            "requesting place reviews"
        );

        let reply = self.client.get(&self.endpoint, &self.query())?;
        parse_details_reply(reply)
    }
}

/// Check the HTTP and API status of a Details reply and pull out its reviews.
pub fn parse_details_reply(reply: HttpReply) -> Result<Vec<RawReview>> {
    if !(200..300).contains(&reply.status) {
        return Err(Error::Http {
            status: reply.status,
            body: reply.body.chars().take(ERROR_BODY_CHARS).collect(),
        });
    }

    let details: DetailsResponse = serde_json::from_str(&reply.body)
        .map_err(|e| Error::Fetch(format!("failed to parse Places response: {e}")))?;

    let status = details.status.unwrap_or_default();
    if status != "OK" {
        return Err(Error::Api {
            status: if status.is_empty() {
                "missing".to_string()
            } else {
                status
            },
            message: details.error_message.unwrap_or_default(),
        });
    }

    let reviews = details
        .result
        .and_then(|result| result.reviews)
        .unwrap_or_default();
    debug!(count = reviews.len(), "parsed place reviews");
    Ok(reviews)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
