use tracing::info;

use crate::config::Settings;
use crate::error::Result;
use crate::merge::{merge_testimonials, sort_testimonials};
use crate::normalize::normalize_review;
use crate::places::ReviewSource;
use crate::store::TestimonialStore;
use crate::testimonial::Testimonial;

/// Characters of each fetched quote shown in the run preview.
pub const PREVIEW_CHARS: usize = 60;

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewPreview {
    pub author: String,
    pub rating: f64,
    pub excerpt: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub existing: usize,
    pub fetched: usize,
    pub added: usize,
    pub total: usize,
    pub dry_run: bool,
    pub previews: Vec<ReviewPreview>,
}

/// Observer for the human-readable progress of a sync run.
pub trait SyncReporter {
    fn loading(&self, path: &str);
    fn existing(&self, count: usize);
    fn fetching(&self);
    fn fetched(&self, count: usize);
    fn merged(&self, added: usize, total: usize);
    fn persisted(&self, dry_run: bool);
    fn preview(&self, index: usize, preview: &ReviewPreview);
}

/// Default reporter that prints to stdout.
pub struct StdoutReporter;

impl SyncReporter for StdoutReporter {
    fn loading(&self, path: &str) {
        println!("Loading existing testimonials: {path}");
    }

    fn existing(&self, count: usize) {
        println!("Existing count: {count}");
    }

    fn fetching(&self) {
        println!("Fetching Google reviews...");
    }

    fn fetched(&self, count: usize) {
        println!("Fetched {count} raw review(s) from API.");
    }

    fn merged(&self, added: usize, total: usize) {
        println!("New reviews added: {added}");
        println!("Total after merge: {total}");
    }

    fn persisted(&self, dry_run: bool) {
        if dry_run {
            println!("--dry-run specified: not writing file.");
        } else {
            println!("Updated testimonials written.");
        }
    }

    fn preview(&self, index: usize, preview: &ReviewPreview) {
        println!(
            "[Fetched #{index}] {} ({}★): {}...",
            preview.author, preview.rating, preview.excerpt
        );
    }
}

/// Reporter that prints nothing. Used by tests and library callers.
pub struct SilentReporter;

impl SyncReporter for SilentReporter {
    fn loading(&self, _path: &str) {}
    fn existing(&self, _count: usize) {}
    fn fetching(&self) {}
    fn fetched(&self, _count: usize) {}
    fn merged(&self, _added: usize, _total: usize) {}
    fn persisted(&self, _dry_run: bool) {}
    fn preview(&self, _index: usize, _preview: &ReviewPreview) {}
}

pub struct Pipeline<S, P = StdoutReporter> {
    source: S,
    store: TestimonialStore,
    settings: Settings,
    dry_run: bool,
    reporter: P,
}

impl<S: ReviewSource> Pipeline<S> {
    pub fn new(source: S, store: TestimonialStore, settings: Settings, dry_run: bool) -> Self {
        Self::with_reporter(source, store, settings, dry_run, StdoutReporter)
    }
}

impl<S: ReviewSource, P: SyncReporter> Pipeline<S, P> {
    pub fn with_reporter(
        source: S,
        store: TestimonialStore,
        settings: Settings,
        dry_run: bool,
        reporter: P,
    ) -> Self {
        Self {
            source,
            store,
            settings,
            dry_run,
            reporter,
        }
    }

    /// Load, fetch, normalize, merge, and (unless dry-run) persist.
    ///
    /// A failed fetch returns before anything is written.
    pub fn run(&self) -> Result<RunSummary> {
        let _lock = if self.dry_run {
            None
        } else {
            Some(self.store.lock()?)
        };

        let path = self.store.path().display().to_string();
        self.reporter.loading(&path);
        let existing = self.store.load()?;
        let existing_count = existing.len();
        self.reporter.existing(existing_count);
        info!(path = %path, count = existing_count, "loaded existing testimonials");

        self.reporter.fetching();
        info!("fetching place reviews");
        let raw = self.source.fetch_reviews()?;
        self.reporter.fetched(raw.len());
        info!(count = raw.len(), "fetched raw reviews");

        let normalized: Vec<Testimonial> = raw
            .iter()
            .map(|review| normalize_review(review, &self.settings))
            .collect();
        let previews: Vec<ReviewPreview> = normalized
            .iter()
            .map(|t| ReviewPreview {
                author: t.author.clone(),
                rating: t.rating_value(),
                excerpt: t.preview(PREVIEW_CHARS),
            })
            .collect();
        let fetched = normalized.len();

        let outcome = merge_testimonials(existing, normalized);
        let total = outcome.testimonials.len();
        self.reporter.merged(outcome.added, total);
        info!(added = outcome.added, total, "merged testimonials");

        if self.dry_run {
            info!("dry run, not writing testimonials file");
        } else {
            self.store.save(&outcome.testimonials)?;
            info!(path = %path, "testimonials written");
        }
        self.reporter.persisted(self.dry_run);

        for (i, preview) in previews.iter().enumerate() {
            self.reporter.preview(i + 1, preview);
        }

        Ok(RunSummary {
            existing: existing_count,
            fetched,
            added: outcome.added,
            total,
            dry_run: self.dry_run,
            previews,
        })
    }
}

/// Stored testimonials in display order, hiding pending ones unless asked.
pub fn list_testimonials(
    store: &TestimonialStore,
    include_pending: bool,
) -> Result<Vec<Testimonial>> {
    let mut items: Vec<Testimonial> = store
        .load()?
        .into_iter()
        .filter(|t| include_pending || !t.is_pending())
        .collect();
    sort_testimonials(&mut items);
    Ok(items)
}
