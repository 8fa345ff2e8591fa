use std::fmt;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Deserialize;

use crate::cli::Cli;
use crate::error::{Error, Result};

pub const DEFAULT_CONFIG_FILE: &str = "testimonials.toml";
pub const DEFAULT_DATA_FILE: &str = "src/data/testimonials.json";
pub const DEFAULT_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/place/details/json";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_ROLE: &str = "Parent";
pub const DEFAULT_COMPANY: &str = "Google Review";
pub const DEFAULT_AUTHOR: &str = "Anonymous";
pub const DEFAULT_PALETTE: [&str; PALETTE_SIZE] =
    ["#97CEC8", "#FBD66E", "#EEA27B", "#647C9F", "#E77C96"];
pub const PALETTE_SIZE: usize = 5;

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub data_file: Option<String>,
    pub language: Option<String>,
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
    pub palette: Option<Vec<String>>,
    pub default_role: Option<String>,
    pub default_company: Option<String>,
    pub default_author: Option<String>,
}

/// Fixed values every pipeline stage reads. Built once per run and passed
/// down by reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub endpoint: String,
    pub language: String,
    pub timeout_secs: u64,
    pub palette: Vec<String>,
    pub default_role: String,
    pub default_company: String,
    pub default_author: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
            default_role: DEFAULT_ROLE.to_string(),
            default_company: DEFAULT_COMPANY.to_string(),
            default_author: DEFAULT_AUTHOR.to_string(),
        }
    }
}

/// API key wrapper that keeps the secret out of `Debug` output and logs.
#[derive(Clone, PartialEq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub api_key: ApiKey,
    pub place_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub settings: Settings,
    pub data_file: PathBuf,
    pub dry_run: bool,
    pub api_key: Option<ApiKey>,
    pub place_id: Option<String>,
}

impl Config {
    pub fn load(cli: &Cli) -> Result<Self> {
        let file_config = match &cli.config {
            Some(path) => {
                let path = Path::new(path);
                if !path.exists() {
                    return Err(Error::ConfigNotFound(path.to_path_buf()));
                }
                parse_config(&std::fs::read_to_string(path)?)?
            }
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    parse_config(&std::fs::read_to_string(path)?)?
                } else {
                    ConfigFile::default()
                }
            }
        };

        let config = merge(file_config, cli);
        if config.settings.timeout_secs == 0 {
            return Err(Error::ConfigValidation(
                "timeout_secs must be > 0".to_string(),
            ));
        }
        Ok(config)
    }

    /// Both credentials, or `MissingCredentials` if either is unset or blank.
    pub fn credentials(&self) -> Result<Credentials> {
        match (&self.api_key, &self.place_id) {
            (Some(key), Some(place_id)) => Ok(Credentials {
                api_key: key.clone(),
                place_id: place_id.clone(),
            }),
            _ => Err(Error::MissingCredentials),
        }
    }
}

pub fn parse_config(content: &str) -> Result<ConfigFile> {
    let config: ConfigFile = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &ConfigFile) -> Result<()> {
    if let Some(timeout) = config.timeout_secs
        && timeout == 0
    {
        return Err(Error::ConfigValidation(
            "timeout_secs must be > 0".to_string(),
        ));
    }
    if let Some(ref endpoint) = config.endpoint
        && !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
    {
        return Err(Error::ConfigValidation(format!(
            "endpoint must be an http(s) URL: {endpoint}"
        )));
    }
    if let Some(ref language) = config.language
        && language.trim().is_empty()
    {
        return Err(Error::ConfigValidation(
            "language must not be empty".to_string(),
        ));
    }
    if let Some(ref palette) = config.palette {
        if palette.len() != PALETTE_SIZE {
            return Err(Error::ConfigValidation(format!(
                "palette must have exactly {PALETTE_SIZE} colors, got {}",
                palette.len()
            )));
        }
        let hex_re = Regex::new(r"^#[0-9A-Fa-f]{6}$").unwrap();
        if let Some(bad) = palette.iter().find(|c| !hex_re.is_match(c)) {
            return Err(Error::ConfigValidation(format!(
                "invalid palette color: {bad} (expected #RRGGBB)"
            )));
        }
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub fn merge(file: ConfigFile, cli: &Cli) -> Config {
    let defaults = Settings::default();
    Config {
        settings: Settings {
            endpoint: file.endpoint.unwrap_or(defaults.endpoint),
            language: cli
                .language
                .clone()
                .or(file.language)
                .unwrap_or(defaults.language),
            timeout_secs: cli
                .timeout_secs
                .or(file.timeout_secs)
                .unwrap_or(defaults.timeout_secs),
            palette: file.palette.unwrap_or(defaults.palette),
            default_role: file.default_role.unwrap_or(defaults.default_role),
            default_company: file.default_company.unwrap_or(defaults.default_company),
            default_author: file.default_author.unwrap_or(defaults.default_author),
        },
        data_file: PathBuf::from(
            cli.data_file
                .clone()
                .or(file.data_file)
                .unwrap_or_else(|| DEFAULT_DATA_FILE.to_string()),
        ),
        dry_run: cli.dry_run,
        api_key: non_blank(cli.api_key.clone()).map(ApiKey::new),
        place_id: non_blank(cli.place_id.clone()),
    }
}
