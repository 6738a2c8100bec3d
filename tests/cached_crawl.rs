use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::time::Duration;

use fastindex::{
    evaluate, rank, run_crawler, CachedFetcher, CrawlControls, Frontier, HttpFetcher, IndexStore,
    LinkPolicy, Location, MemoryIndex, RelevanceMap, SiteFetcher, StopReason,
};

const JAVA: &str = "https://en.wikipedia.org/wiki/Java_(programming_language)";
const PYTHON: &str = "https://en.wikipedia.org/wiki/Python";
const RUST: &str = "https://en.wikipedia.org/wiki/Rust";

fn cache_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/cache")
}

fn map(entries: &[(&str, f64)]) -> RelevanceMap {
    entries.iter().map(|(loc, score)| (*loc, *score)).collect()
}

async fn crawl_fixtures() -> MemoryIndex {
    let live = HttpFetcher::new(Duration::from_secs(1)).expect("client");
    let fetcher = SiteFetcher::new(live, CachedFetcher::new(cache_dir()));
    let controls = CrawlControls::new(JAVA, LinkPolicy::default())
        .with_test_mode(true)
        .with_max_pages(3);
    let mut frontier = Frontier::new(
        controls.source().clone(),
        fetcher,
        MemoryIndex::new(),
        controls.link_policy().clone(),
    );

    let report = run_crawler(&mut frontier, &controls).await;
    assert_eq!(report.stop_reason, StopReason::PageLimit);
    assert_eq!(report.pages_indexed, 3);
    // The external Oracle link has no cached copy.
    assert_eq!(report.empty_fetches, 1);
    assert_eq!(report.failures, 0);

    let pending: Vec<&str> = frontier.pending().map(Location::as_str).collect();
    assert_eq!(pending, [JAVA]);
    frontier.into_store()
}

#[tokio::test(flavor = "current_thread")]
async fn cached_crawl_indexes_breadth_first() {
    let index = crawl_fixtures().await;

    for location in [JAVA, PYTHON, RUST] {
        assert!(index.is_indexed(&Location::from(location)), "{location}");
    }
    assert!(!index.is_indexed(&Location::from("https://www.oracle.com/java/")));
    // Navigation paragraphs outside the content root are not indexed.
    assert!(index.lookup("menu").is_empty());

    assert_eq!(index.lookup("java"), map(&[(JAVA, 2.0), (PYTHON, 1.0)]));
    assert_eq!(index.lookup("rust"), map(&[(JAVA, 1.0), (RUST, 2.0)]));

    let summary = index.summary(&Location::from(RUST)).expect("summary");
    assert_eq!(summary.title.as_deref(), Some("Rust - Wikipedia"));
    assert_eq!(
        summary.tagline,
        "Rust is a systems programming language focused on safety. Rust has no garbage collector."
    );
}

#[tokio::test(flavor = "current_thread")]
async fn boolean_queries_over_crawled_index() {
    let index = crawl_fixtures().await;
    let lookup = |term: &str| index.lookup(term);

    assert_eq!(
        evaluate("java and python", lookup),
        map(&[(JAVA, 3.0), (PYTHON, 3.0)])
    );
    assert_eq!(evaluate("rust minus java", lookup), map(&[(RUST, 2.0)]));
    assert_eq!(
        evaluate("python or rust", lookup),
        map(&[(JAVA, 2.0), (PYTHON, 2.0), (RUST, 2.0)])
    );
    assert_eq!(
        evaluate("java rust", lookup),
        map(&[(JAVA, 6.0), (PYTHON, 1.0), (RUST, 2.0)])
    );
    assert!(evaluate("", lookup).is_empty());
}

#[tokio::test(flavor = "current_thread")]
async fn ranked_results_read_best_first() {
    let index = crawl_fixtures().await;

    let ranked = rank(evaluate("java rust", |term| index.lookup(term)), 10_000);
    let best: Vec<&str> = ranked
        .best_first()
        .map(|entry| entry.location.as_str())
        .collect();
    assert_eq!(best, [JAVA, RUST, PYTHON]);

    let idf = (10_000f64 / 3.0).ln() + 1.0;
    assert!((ranked.idf() - idf).abs() < 1e-12);

    let tied = rank(evaluate("programming", |term| index.lookup(term)), 10_000);
    let ascending: Vec<&str> = tied
        .entries()
        .iter()
        .map(|entry| entry.location.as_str())
        .collect();
    assert_eq!(ascending, [JAVA, PYTHON, RUST]);

    assert!(rank(evaluate("cobol", |term| index.lookup(term)), 10_000).is_empty());
}
