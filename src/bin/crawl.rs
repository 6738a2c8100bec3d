use anyhow::{Context, Result};
use clap::Parser;
use fastindex::{
    init_logging, run_crawler, CachedFetcher, Cli, Frontier, HttpFetcher, MemoryIndex,
    SiteFetcher,
};
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let controls = cli.build_controls();

    let store = if !cli.fresh && cli.snapshot().exists() {
        let store = MemoryIndex::load(cli.snapshot()).with_context(|| {
            format!("failed to load snapshot {}", cli.snapshot().display())
        })?;
        info!(
            pages = store.page_count(),
            terms = store.term_count(),
            "resuming from snapshot"
        );
        store
    } else {
        MemoryIndex::new()
    };

    let live = HttpFetcher::new(cli.request_timeout()).context("failed to build http client")?;
    let fetcher = SiteFetcher::new(live, CachedFetcher::new(&cli.cache_dir));
    let mut frontier = Frontier::new(
        controls.source().clone(),
        fetcher,
        store,
        controls.link_policy().clone(),
    );

    info!(
        source = %controls.source(),
        max_pages = controls.max_pages(),
        test_mode = controls.test_mode(),
        "starting crawl"
    );
    let report = run_crawler(&mut frontier, &controls).await;
    report.log();

    let store = frontier.into_store();
    store
        .save(cli.snapshot())
        .with_context(|| format!("failed to write snapshot {}", cli.snapshot().display()))?;
    info!(
        pages = store.page_count(),
        terms = store.term_count(),
        snapshot = %cli.snapshot().display(),
        "index saved"
    );
    Ok(())
}
