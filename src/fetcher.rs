//! Page fetching: live HTTP retrieval and an on-disk cache used in test mode.

use crate::html::DocumentParser;
use crate::relevance::Location;
use reqwest::Client;
use std::error::Error;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use url::Url;

const USER_AGENT: &str = concat!("fastindex/", env!("CARGO_PKG_VERSION"));
const MAX_REDIRECTS: usize = 5;
const CACHE_INDEX_FILE: &str = "index.html";

/// Outbound link found inside a paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Raw `href` attribute value.
    pub href: String,
    /// `href` resolved against the document address, if it resolves.
    pub target: Option<Url>,
}

/// Paragraph-like block of a fetched document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    /// Collapsed visible text.
    pub text: String,
    /// Links in document order.
    pub links: Vec<Link>,
}

/// Parsed document handed from the fetcher to the index and the frontier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedContent {
    /// Document `<title>`, when present.
    pub title: Option<String>,
    /// Paragraph blocks of the main content; never empty.
    pub paragraphs: Vec<Paragraph>,
}

impl ParsedContent {
    /// Iterates over every link of every paragraph.
    pub fn links(&self) -> impl Iterator<Item = &Link> + '_ {
        self.paragraphs
            .iter()
            .flat_map(|paragraph| paragraph.links.iter())
    }

    /// Iterates over paragraph texts.
    pub fn texts(&self) -> impl Iterator<Item = &str> + '_ {
        self.paragraphs
            .iter()
            .map(|paragraph| paragraph.text.as_str())
    }
}

/// Source of parsed documents.
///
/// `Ok(None)` means the location produced no content; the crawl skips it
/// without marking it indexed. `Err` is a failure of that crawl step.
#[allow(async_fn_in_trait)]
pub trait PageFetcher {
    /// Fetches the live document.
    async fn fetch(&self, location: &Location) -> Result<Option<ParsedContent>, FetchError>;

    /// Reads a previously saved copy of the document.
    async fn fetch_cached(&self, location: &Location)
        -> Result<Option<ParsedContent>, FetchError>;
}

/// Errors surfaced while fetching a document.
#[derive(Debug)]
pub enum FetchError {
    /// The request could not be built, sent, or read.
    Http(reqwest::Error),
    /// The server answered with a non-success status.
    Status(u16),
    /// Reading a cached copy failed.
    Io(io::Error),
    /// The location is not a valid absolute URL.
    Url(url::ParseError),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(err) => write!(f, "http error: {err}"),
            Self::Status(status) => write!(f, "unexpected http status {status}"),
            Self::Io(err) => write!(f, "cache read error: {err}"),
            Self::Url(err) => write!(f, "url parse error: {err}"),
        }
    }
}

impl Error for FetchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Http(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Url(err) => Some(err),
            Self::Status(_) => None,
        }
    }
}

/// Live fetcher backed by a shared `reqwest` client.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    parser: DocumentParser,
}

impl HttpFetcher {
    /// Builds a fetcher whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(timeout)
            .build()
            .map_err(FetchError::Http)?;
        Ok(Self {
            client,
            parser: DocumentParser::new(),
        })
    }

    /// Downloads and parses `location`.
    pub async fn fetch(&self, location: &Location) -> Result<Option<ParsedContent>, FetchError> {
        let url = Url::parse(location.as_str()).map_err(FetchError::Url)?;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(FetchError::Http)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(FetchError::Http)?;
        debug!(%url, bytes = body.len(), "fetched page");
        Ok(self.parser.parse(&body, &url))
    }
}

/// Reads saved pages from `<root>/<host>/<path>`.
#[derive(Clone)]
pub struct CachedFetcher {
    root: PathBuf,
    parser: DocumentParser,
}

impl CachedFetcher {
    /// Creates a cache reader rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            parser: DocumentParser::new(),
        }
    }

    /// Cache directory root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File that holds the saved copy of `url`, if the URL has a host.
    pub fn path_for(&self, url: &Url) -> Option<PathBuf> {
        let host = url.host_str()?;
        let relative = url.path().trim_start_matches('/');
        let mut path = self.root.join(host);
        if relative.is_empty() || relative.ends_with('/') {
            path.push(relative);
            path.push(CACHE_INDEX_FILE);
        } else {
            path.push(relative);
        }
        Some(path)
    }

    /// Reads and parses the saved copy of `location`; a missing copy is `Ok(None)`.
    pub async fn fetch(&self, location: &Location) -> Result<Option<ParsedContent>, FetchError> {
        let url = Url::parse(location.as_str()).map_err(FetchError::Url)?;
        let Some(path) = self.path_for(&url) else {
            return Ok(None);
        };

        let body = match tokio::fs::read_to_string(&path).await {
            Ok(body) => body,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no cached copy");
                return Ok(None);
            }
            Err(err) => return Err(FetchError::Io(err)),
        };
        Ok(self.parser.parse(&body, &url))
    }
}

/// Live fetcher paired with its offline cache.
#[derive(Clone)]
pub struct SiteFetcher {
    live: HttpFetcher,
    cache: CachedFetcher,
}

impl SiteFetcher {
    /// Pairs a live fetcher with a cache reader.
    pub fn new(live: HttpFetcher, cache: CachedFetcher) -> Self {
        Self { live, cache }
    }
}

impl PageFetcher for SiteFetcher {
    async fn fetch(&self, location: &Location) -> Result<Option<ParsedContent>, FetchError> {
        self.live.fetch(location).await
    }

    async fn fetch_cached(
        &self,
        location: &Location,
    ) -> Result<Option<ParsedContent>, FetchError> {
        self.cache.fetch(location).await
    }
}
