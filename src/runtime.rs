//! Crawl driver: steps the frontier until a stop condition holds.

use crate::controls::CrawlControls;
use crate::fetcher::PageFetcher;
use crate::frontier::{Frontier, StepOutcome};
use crate::index::IndexStore;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Why a crawl run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The page budget was reached.
    PageLimit,
    /// The frontier ran dry.
    Exhausted,
    /// The run duration elapsed.
    Deadline,
}

/// Counters collected over one crawl run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    /// Pages fetched and indexed.
    pub pages_indexed: usize,
    /// Dequeued locations the index already had.
    pub already_indexed: usize,
    /// Fetches that produced no content.
    pub empty_fetches: usize,
    /// Steps that failed to fetch or index.
    pub failures: usize,
    /// Locations still queued when the run stopped.
    pub pending: usize,
    /// Why the run stopped.
    pub stop_reason: StopReason,
    /// Wall-clock time spent.
    pub elapsed: Duration,
}

impl CrawlReport {
    /// Logs the report.
    pub fn log(&self) {
        let secs = self.elapsed.as_secs_f32().max(f32::EPSILON);
        info!(
            pages_indexed = self.pages_indexed,
            pages_per_sec = format_args!("{:.2}", self.pages_indexed as f32 / secs),
            already_indexed = self.already_indexed,
            empty_fetches = self.empty_fetches,
            failures = self.failures,
            pending = self.pending,
            stop_reason = ?self.stop_reason,
            "crawl finished in {secs:.2}s"
        );
    }
}

/// Runs the crawl described by `controls` over `frontier`.
///
/// A failed step is logged and the crawl moves on to the next location.
pub async fn run<F, S>(frontier: &mut Frontier<F, S>, controls: &CrawlControls) -> CrawlReport
where
    F: PageFetcher,
    S: IndexStore,
{
    let start = Instant::now();
    let deadline = controls.run_duration().map(|duration| start + duration);
    let mut pages_indexed = 0usize;
    let mut already_indexed = 0usize;
    let mut empty_fetches = 0usize;
    let mut failures = 0usize;

    let stop_reason = loop {
        if pages_indexed >= controls.max_pages() {
            break StopReason::PageLimit;
        }
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            break StopReason::Deadline;
        }

        match frontier.step(controls.test_mode()).await {
            Ok(StepOutcome::Indexed(location)) => {
                pages_indexed += 1;
                if controls.progress_every() > 0 && pages_indexed % controls.progress_every() == 0
                {
                    info!(
                        pages_indexed,
                        pending = frontier.size(),
                        %location,
                        "crawl progress"
                    );
                }
            }
            Ok(StepOutcome::AlreadyIndexed(_)) => already_indexed += 1,
            Ok(StepOutcome::Empty(_)) => empty_fetches += 1,
            Ok(StepOutcome::Exhausted) => break StopReason::Exhausted,
            Err(err) => {
                failures += 1;
                warn!(location = %err.location(), "{err}");
            }
        }
    };

    CrawlReport {
        pages_indexed,
        already_indexed,
        empty_fetches,
        failures,
        pending: frontier.size(),
        stop_reason,
        elapsed: start.elapsed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::{FetchError, Link, Paragraph, ParsedContent};
    use crate::frontier::LinkPolicy;
    use crate::index::MemoryIndex;
    use crate::relevance::Location;
    use std::collections::HashMap;
    use url::Url;

    /// Serves a small ring of in-site pages; `/wiki/Broken` always fails.
    struct RingFetcher {
        pages: HashMap<String, Vec<&'static str>>,
    }

    impl RingFetcher {
        fn new() -> Self {
            let mut pages = HashMap::new();
            pages.insert(url("A"), vec!["/wiki/B", "/wiki/C", "/wiki/Broken"]);
            pages.insert(url("B"), vec!["/wiki/A", "/wiki/C"]);
            pages.insert(url("C"), vec!["/wiki/A"]);
            Self { pages }
        }
    }

    fn url(title: &str) -> String {
        format!("https://en.wikipedia.org/wiki/{title}")
    }

    impl PageFetcher for RingFetcher {
        async fn fetch(&self, location: &Location) -> Result<Option<ParsedContent>, FetchError> {
            if location.as_str().ends_with("/Broken") {
                return Err(FetchError::Status(500));
            }
            Ok(self.pages.get(location.as_str()).map(|hrefs| ParsedContent {
                title: None,
                paragraphs: vec![Paragraph {
                    text: "ring page".to_string(),
                    links: hrefs
                        .iter()
                        .map(|href| Link {
                            href: href.to_string(),
                            target: Url::parse(&url("A")).ok().and_then(|b| b.join(href).ok()),
                        })
                        .collect(),
                }],
            }))
        }

        async fn fetch_cached(
            &self,
            location: &Location,
        ) -> Result<Option<ParsedContent>, FetchError> {
            self.fetch(location).await
        }
    }

    fn ring_frontier() -> Frontier<RingFetcher, MemoryIndex> {
        Frontier::new(
            url("A"),
            RingFetcher::new(),
            MemoryIndex::new(),
            LinkPolicy::default(),
        )
    }

    #[tokio::test(flavor = "current_thread")]
    async fn crawls_until_frontier_is_exhausted() {
        let mut frontier = ring_frontier();
        let controls = CrawlControls::new(url("A"), LinkPolicy::default());

        let report = run(&mut frontier, &controls).await;
        assert_eq!(report.stop_reason, StopReason::Exhausted);
        assert_eq!(report.pages_indexed, 3);
        assert_eq!(report.failures, 1);
        // A and C queued again by B, A queued again by C.
        assert_eq!(report.already_indexed, 3);
        assert_eq!(report.pending, 0);
        assert_eq!(frontier.store().page_count(), 3);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn stops_at_page_limit() {
        let mut frontier = ring_frontier();
        let controls = CrawlControls::new(url("A"), LinkPolicy::default()).with_max_pages(2);

        let report = run(&mut frontier, &controls).await;
        assert_eq!(report.stop_reason, StopReason::PageLimit);
        assert_eq!(report.pages_indexed, 2);
        assert!(report.pending > 0);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn zero_duration_stops_immediately() {
        let mut frontier = ring_frontier();
        let controls = CrawlControls::new(url("A"), LinkPolicy::default())
            .with_run_duration(Some(Duration::ZERO));

        let report = run(&mut frontier, &controls).await;
        assert_eq!(report.stop_reason, StopReason::Deadline);
        assert_eq!(report.pages_indexed, 0);
        assert_eq!(report.pending, 1);
    }
}
