//! Breadth-first crawl frontier with index-backed deduplication.
//!
//! The queue accepts duplicates. A location is skipped when it is dequeued and
//! the index store already reports it as indexed; that check is the only
//! deduplication, and it is a point-in-time read rather than a reservation.

use crate::fetcher::{FetchError, Link, PageFetcher, ParsedContent};
use crate::index::{IndexStore, StoreError};
use crate::relevance::Location;
use std::collections::VecDeque;
use std::error::Error;
use std::fmt;
use tracing::debug;
use url::Url;

/// Default root that in-site paths are resolved against.
pub const DEFAULT_SITE_ROOT: &str = "https://en.wikipedia.org/";
/// Default path prefix that marks an in-site link.
pub const DEFAULT_SITE_PREFIX: &str = "/wiki/";
/// Default home-domain marker.
pub const DEFAULT_HOME_DOMAIN: &str = "https://en.wikipedia.org/";

/// Decides which processed pages get their links extracted and how each link
/// becomes a queued location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkPolicy {
    site_root: Url,
    site_prefix: String,
    home_domain: String,
}

impl LinkPolicy {
    /// Builds a policy from its three parts.
    pub fn new(
        site_root: Url,
        site_prefix: impl Into<String>,
        home_domain: impl Into<String>,
    ) -> Self {
        Self {
            site_root,
            site_prefix: site_prefix.into(),
            home_domain: home_domain.into(),
        }
    }

    /// Root joined onto in-site paths.
    pub fn site_root(&self) -> &Url {
        &self.site_root
    }

    /// Path prefix of in-site links.
    pub fn site_prefix(&self) -> &str {
        &self.site_prefix
    }

    /// Substring that marks a location as belonging to the home domain.
    pub fn home_domain(&self) -> &str {
        &self.home_domain
    }

    /// Whether links should be extracted from `location`.
    pub fn is_home(&self, location: &Location) -> bool {
        location.as_str().contains(&self.home_domain)
    }

    /// Location to enqueue for `link`, if any.
    ///
    /// In-site paths are joined onto the site root. Any other link is queued
    /// as resolved against its document, unless it points into the home domain.
    pub fn resolve(&self, link: &Link) -> Option<Location> {
        if link.href.starts_with(&self.site_prefix) {
            return self.site_root.join(&link.href).ok().map(Location::from);
        }

        link.target
            .as_ref()
            .filter(|target| !target.as_str().contains(&self.home_domain))
            .map(|target| Location::from(target.as_str()))
    }
}

impl Default for LinkPolicy {
    fn default() -> Self {
        Self::new(
            Url::parse(DEFAULT_SITE_ROOT).expect("default site root parses"),
            DEFAULT_SITE_PREFIX,
            DEFAULT_HOME_DOMAIN,
        )
    }
}

/// Result of one [`Frontier::step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The location was fetched and indexed.
    Indexed(Location),
    /// The index already had the location; nothing was fetched.
    AlreadyIndexed(Location),
    /// The fetch produced no content; the location stays unindexed.
    Empty(Location),
    /// The queue was empty.
    Exhausted,
}

impl StepOutcome {
    /// The processed location, or `None` for every kind of skip.
    pub fn indexed(self) -> Option<Location> {
        match self {
            StepOutcome::Indexed(location) => Some(location),
            _ => None,
        }
    }
}

/// Errors that end a crawl step.
#[derive(Debug)]
pub enum FrontierError {
    /// Fetching the location failed.
    Fetch {
        /// The location being processed.
        location: Location,
        /// Underlying fetch failure.
        source: FetchError,
    },
    /// The index store rejected the page.
    Store {
        /// The location being processed.
        location: Location,
        /// Underlying store failure.
        source: StoreError,
    },
}

impl FrontierError {
    /// The location whose step failed.
    pub fn location(&self) -> &Location {
        match self {
            Self::Fetch { location, .. } | Self::Store { location, .. } => location,
        }
    }
}

impl fmt::Display for FrontierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch { location, source } => write!(f, "failed to fetch {location}: {source}"),
            Self::Store { location, source } => write!(f, "failed to index {location}: {source}"),
        }
    }
}

impl Error for FrontierError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Fetch { source, .. } => Some(source),
            Self::Store { source, .. } => Some(source),
        }
    }
}

/// FIFO crawl queue that owns its page fetcher and index store.
pub struct Frontier<F, S> {
    queue: VecDeque<Location>,
    fetcher: F,
    store: S,
    policy: LinkPolicy,
}

impl<F, S> Frontier<F, S>
where
    F: PageFetcher,
    S: IndexStore,
{
    /// Creates a frontier seeded with `source`.
    pub fn new(source: impl Into<Location>, fetcher: F, store: S, policy: LinkPolicy) -> Self {
        let mut frontier = Self {
            queue: VecDeque::new(),
            fetcher,
            store,
            policy,
        };
        frontier.enqueue(source);
        frontier
    }

    /// Appends `location` to the tail. Empty locations are dropped and reported as `false`.
    pub fn enqueue(&mut self, location: impl Into<Location>) -> bool {
        let location = location.into();
        if location.as_str().is_empty() {
            return false;
        }
        self.queue.push_back(location);
        true
    }

    /// Number of pending locations, duplicates included.
    pub fn size(&self) -> usize {
        self.queue.len()
    }

    /// Pending locations, head first.
    pub fn pending(&self) -> impl Iterator<Item = &Location> + '_ {
        self.queue.iter()
    }

    /// Link policy in use.
    pub fn policy(&self) -> &LinkPolicy {
        &self.policy
    }

    /// Borrows the index store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consumes the frontier, returning the index store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Dequeues the head location and processes it.
    ///
    /// Outside test mode an already-indexed location is skipped without a
    /// fetch. Test mode reads the cached copy and re-indexes unconditionally.
    pub async fn step(&mut self, test_mode: bool) -> Result<StepOutcome, FrontierError> {
        let Some(location) = self.queue.pop_front() else {
            return Ok(StepOutcome::Exhausted);
        };

        if !test_mode && self.store.is_indexed(&location) {
            debug!(%location, "already indexed");
            return Ok(StepOutcome::AlreadyIndexed(location));
        }

        let fetched = if test_mode {
            self.fetcher.fetch_cached(&location).await
        } else {
            self.fetcher.fetch(&location).await
        };
        let content = match fetched {
            Ok(Some(content)) => content,
            Ok(None) => {
                debug!(%location, "fetch returned no content");
                return Ok(StepOutcome::Empty(location));
            }
            Err(source) => return Err(FrontierError::Fetch { location, source }),
        };

        if let Err(source) = self.store.index_page(&location, &content) {
            return Err(FrontierError::Store { location, source });
        }

        if self.policy.is_home(&location) {
            let queued = self.queue_links(&content);
            debug!(%location, queued, pending = self.size(), "queued links");
        }

        Ok(StepOutcome::Indexed(location))
    }

    /// Enqueues every link of `content` accepted by the link policy, returning how many were queued.
    pub fn queue_links(&mut self, content: &ParsedContent) -> usize {
        let before = self.queue.len();
        let policy = &self.policy;
        self.queue
            .extend(content.links().filter_map(|link| policy.resolve(link)));
        self.queue.len() - before
    }
}
