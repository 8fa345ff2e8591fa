use clap::{Parser, Subcommand};

/// testimonial-sync — merge Google Place reviews into the site's testimonials
#[derive(Parser, Debug, Clone)]
#[command(name = "testimonial-sync", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<CliCommand>,

    /// Google Places API key
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Google Place ID
    #[arg(long, env = "GOOGLE_PLACE_ID")]
    pub place_id: Option<String>,

    /// Language code for the reviews (default: en)
    #[arg(long)]
    pub language: Option<String>,

    /// Fetch and merge, but do not write the data file
    #[arg(long)]
    pub dry_run: bool,

    /// Request timeout in seconds (default: 15)
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Testimonials JSON file (default: src/data/testimonials.json)
    #[arg(long, global = true)]
    pub data_file: Option<String>,

    /// Path to config file (default: testimonials.toml, if present)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CliCommand {
    /// Print stored testimonials in display order
    List {
        /// Include testimonials still awaiting approval
        #[arg(long)]
        include_pending: bool,
    },
}
