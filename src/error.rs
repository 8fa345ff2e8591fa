use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    ConfigValidation(String),

    #[error(
        "API key and Place ID required. Use --api-key / --place-id or env vars GOOGLE_API_KEY / GOOGLE_PLACE_ID"
    )]
    MissingCredentials,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse {path}: {reason}")]
    StoreParse { path: PathBuf, reason: String },

    #[error("store is locked by another run: {0}")]
    StoreLocked(PathBuf),

    #[error("store error: {0}")]
    Store(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Google API status not OK: {status} | {message}")]
    Api { status: String, message: String },

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("fetch error: {0}")]
    Fetch(String),
}

impl Error {
    /// Raised while talking to the reviews endpoint.
    pub fn is_fetch(&self) -> bool {
        matches!(
            self,
            Error::Http { .. } | Error::Api { .. } | Error::Timeout(_) | Error::Fetch(_)
        )
    }

    /// Process exit code: 2 for fetch failures, 1 for everything else.
    pub fn exit_code(&self) -> i32 {
        if self.is_fetch() { 2 } else { 1 }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
