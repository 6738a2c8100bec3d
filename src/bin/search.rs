use anyhow::{Context, Result};
use clap::Parser;
use fastindex::{
    evaluate, init_logging, rank, IndexStore, MemoryIndex, RankedResult, DEFAULT_RESULT_LIMIT,
    DEFAULT_TOTAL_PAGES,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "fastindex-search",
    about = "Boolean and ranked queries over a crawled index"
)]
struct SearchCli {
    /// Index snapshot written by fastindex-crawl
    #[arg(long, env = "FASTINDEX_SNAPSHOT", default_value = "index.json")]
    snapshot: PathBuf,

    /// Corpus size used for the IDF factor
    #[arg(
        long,
        env = "FASTINDEX_TOTAL_PAGES",
        default_value_t = DEFAULT_TOTAL_PAGES,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    total_pages: u64,

    /// Print every result instead of the top entries
    #[arg(long, default_value_t = false)]
    full: bool,

    /// Query to run; queries are read from stdin, one per line, when omitted
    query: Vec<String>,
}

fn main() -> Result<()> {
    init_logging();
    let cli = SearchCli::parse();
    let index = MemoryIndex::load(&cli.snapshot)
        .with_context(|| format!("failed to load snapshot {}", cli.snapshot.display()))?;
    debug!(
        pages = index.page_count(),
        terms = index.term_count(),
        "index loaded"
    );

    let limit = (!cli.full).then_some(DEFAULT_RESULT_LIMIT);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if !cli.query.is_empty() {
        let query = cli.query.join(" ");
        return answer(&index, &query, cli.total_pages, limit, &mut out);
    }

    writeln!(out, "Enter a search term: ")?;
    out.flush()?;
    for line in io::stdin().lock().lines() {
        let line = line.context("failed to read query from stdin")?;
        answer(&index, &line, cli.total_pages, limit, &mut out)?;
        writeln!(out, "\nEnter search term: ")?;
        out.flush()?;
    }
    Ok(())
}

fn answer(
    index: &MemoryIndex,
    raw: &str,
    total_pages: u64,
    limit: Option<usize>,
    out: &mut impl Write,
) -> Result<()> {
    let query = raw.to_lowercase();
    let matches = evaluate(&query, |term| index.lookup(term));
    let ranked = rank(matches, total_pages);
    render(index, &query, &ranked, limit, out)
}

fn render(
    index: &MemoryIndex,
    query: &str,
    ranked: &RankedResult,
    limit: Option<usize>,
    out: &mut impl Write,
) -> Result<()> {
    writeln!(out, "\nQuery: {query}")?;
    if ranked.is_empty() {
        writeln!(out, "No results.")?;
        return Ok(());
    }

    for entry in ranked.top(limit) {
        let summary = index.summary(&entry.location);
        if let Some(title) = summary.and_then(|summary| summary.title.as_deref()) {
            writeln!(out, "{title}")?;
        }
        writeln!(out, "{} ({:.2})", entry.location, entry.score)?;
        if let Some(summary) = summary {
            writeln!(out, "{}...\n", summary.tagline)?;
        }
    }
    Ok(())
}
