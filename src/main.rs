use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use testimonial_sync::cli::{Cli, CliCommand};
use testimonial_sync::config::Config;
use testimonial_sync::error::Result;
use testimonial_sync::pipeline::{Pipeline, list_testimonials};
use testimonial_sync::places::PlacesSource;
use testimonial_sync::store::TestimonialStore;

fn init_logging() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let config = Config::load(cli)?;
    info!(?config, "config loaded");

    let store = TestimonialStore::new(config.data_file.clone());

    if let Some(CliCommand::List { include_pending }) = cli.command {
        for t in list_testimonials(&store, include_pending)? {
            println!(
                "{} | {} ({}★) | {} | {}",
                t.id,
                t.author,
                t.rating_value(),
                t.created_at().unwrap_or("-"),
                t.preview(80)
            );
        }
        return Ok(());
    }

    let credentials = config.credentials()?;
    let source = PlacesSource::new(&config.settings, &credentials);
    let pipeline = Pipeline::new(source, store, config.settings, config.dry_run);
    let summary = pipeline.run()?;
    info!(?summary, "sync complete");
    println!("Done.");
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    if let Err(e) = run(&cli) {
        if e.is_fetch() {
            error!(error = %e, "failed to fetch reviews");
            eprintln!("Failed to fetch reviews: {e}");
        } else {
            eprintln!("error: {e}");
        }
        std::process::exit(e.exit_code());
    }
}
