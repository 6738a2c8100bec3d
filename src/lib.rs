#![warn(missing_docs)]
//! Core library entry points for the fastindex crawler and query engine.

pub mod controls;
pub mod fetcher;
pub mod frontier;
pub mod html;
pub mod index;
pub mod query;
pub mod ranking;
pub mod relevance;
pub mod runtime;

pub use controls::{Cli, CrawlControls};
pub use fetcher::{
    CachedFetcher, FetchError, HttpFetcher, Link, PageFetcher, Paragraph, ParsedContent,
    SiteFetcher,
};
pub use frontier::{Frontier, FrontierError, LinkPolicy, StepOutcome};
pub use index::{IndexStore, MemoryIndex, PageSummary, StoreError};
pub use query::{evaluate, Operator, Query};
pub use ranking::{rank, RankedEntry, RankedResult, DEFAULT_RESULT_LIMIT, DEFAULT_TOTAL_PAGES};
pub use relevance::{Location, RelevanceMap};
pub use runtime::{run as run_crawler, CrawlReport, StopReason};

/// Installs the `tracing` subscriber used by the binaries.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. Calling this more
/// than once is harmless.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
