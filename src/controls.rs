//! Crawl limits and link-policy settings shared by the crawl driver.

use crate::frontier::{LinkPolicy, DEFAULT_HOME_DOMAIN, DEFAULT_SITE_PREFIX, DEFAULT_SITE_ROOT};
use crate::relevance::Location;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Page the crawl starts from when none is given.
pub const DEFAULT_SOURCE: &str = "https://en.wikipedia.org/wiki/Java_(programming_language)";

/// Tunable knobs that bound crawl behavior.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CrawlControls {
    source: Location,
    max_pages: usize,
    run_duration: Option<Duration>,
    test_mode: bool,
    progress_every: usize,
    link_policy: LinkPolicy,
}

impl CrawlControls {
    /// Constructs crawl controls for `source` with default limits.
    pub fn new(source: impl Into<Location>, link_policy: LinkPolicy) -> Self {
        Self {
            source: source.into(),
            link_policy,
            ..Self::default()
        }
    }

    /// Stops the crawl after `max_pages` pages are indexed.
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Stops the crawl once `duration` has elapsed.
    pub fn with_run_duration(mut self, duration: Option<Duration>) -> Self {
        self.run_duration = duration;
        self
    }

    /// Reads cached pages and re-indexes visited locations.
    pub fn with_test_mode(mut self, test_mode: bool) -> Self {
        self.test_mode = test_mode;
        self
    }

    /// Logs progress every `pages` indexed pages (0 disables).
    pub fn with_progress_every(mut self, pages: usize) -> Self {
        self.progress_every = pages;
        self
    }

    /// Location that seeds the frontier.
    pub fn source(&self) -> &Location {
        &self.source
    }

    /// Number of indexed pages after which the crawl stops.
    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    /// Optional wall-clock budget.
    pub fn run_duration(&self) -> Option<Duration> {
        self.run_duration
    }

    /// Whether steps use cached pages and skip the indexed check.
    pub fn test_mode(&self) -> bool {
        self.test_mode
    }

    /// Progress logging cadence in indexed pages.
    pub fn progress_every(&self) -> usize {
        self.progress_every
    }

    /// Link extraction policy.
    pub fn link_policy(&self) -> &LinkPolicy {
        &self.link_policy
    }
}

impl Default for CrawlControls {
    fn default() -> Self {
        Self {
            source: Location::from(DEFAULT_SOURCE),
            max_pages: 1000,
            run_duration: None,
            test_mode: false,
            progress_every: 1000,
            link_policy: LinkPolicy::default(),
        }
    }
}

/// Command-line interface of the crawl binary.
#[derive(Parser, Debug, Clone)]
#[command(name = "fastindex-crawl", about = "Breadth-first crawl into a term index")]
pub struct Cli {
    /// Page the crawl starts from
    #[arg(long, env = "FASTINDEX_SOURCE", default_value = DEFAULT_SOURCE)]
    pub source: String,

    /// Stop after this many pages are indexed
    #[arg(long, env = "FASTINDEX_MAX_PAGES", default_value_t = 1000)]
    pub max_pages: usize,

    /// Seconds to run before stopping (0 = no limit)
    #[arg(long, env = "FASTINDEX_DURATION", default_value_t = 0)]
    pub duration_secs: u64,

    /// Read pages from the cache directory and re-index visited pages
    #[arg(long, env = "FASTINDEX_TEST_MODE", default_value_t = false)]
    pub test_mode: bool,

    /// Directory holding cached pages as <host>/<path>
    #[arg(long, env = "FASTINDEX_CACHE_DIR", default_value = "cache")]
    pub cache_dir: PathBuf,

    /// Index snapshot to resume from and write back to
    #[arg(long, env = "FASTINDEX_SNAPSHOT", default_value = "index.json")]
    pub snapshot: PathBuf,

    /// Ignore an existing snapshot and start from an empty index
    #[arg(long, default_value_t = false)]
    pub fresh: bool,

    /// Root that in-site paths are resolved against
    #[arg(long, env = "FASTINDEX_SITE_ROOT", default_value = DEFAULT_SITE_ROOT)]
    pub site_root: Url,

    /// Path prefix of in-site links
    #[arg(long, env = "FASTINDEX_SITE_PREFIX", default_value = DEFAULT_SITE_PREFIX)]
    pub site_prefix: String,

    /// Substring marking locations of the home domain
    #[arg(long, env = "FASTINDEX_HOME_DOMAIN", default_value = DEFAULT_HOME_DOMAIN)]
    pub home_domain: String,

    /// Seconds before a page request times out
    #[arg(long, env = "FASTINDEX_TIMEOUT_SECS", default_value_t = 10)]
    pub timeout_secs: u64,

    /// Log progress every N indexed pages (0 disables)
    #[arg(long, env = "FASTINDEX_PROGRESS_EVERY", default_value_t = 1000)]
    pub progress_every: usize,
}

impl Cli {
    /// Converts the parsed CLI into `CrawlControls`.
    pub fn build_controls(&self) -> CrawlControls {
        let policy = LinkPolicy::new(
            self.site_root.clone(),
            self.site_prefix.clone(),
            self.home_domain.clone(),
        );
        CrawlControls::new(self.source.as_str(), policy)
            .with_max_pages(self.max_pages)
            .with_run_duration(self.run_duration())
            .with_test_mode(self.test_mode)
            .with_progress_every(self.progress_every)
    }

    /// Returns the requested run duration, if any.
    pub fn run_duration(&self) -> Option<Duration> {
        (self.duration_secs > 0).then(|| Duration::from_secs(self.duration_secs))
    }

    /// Per-request timeout for live fetches.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Snapshot path.
    pub fn snapshot(&self) -> &Path {
        &self.snapshot
    }
}
