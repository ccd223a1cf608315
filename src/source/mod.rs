//! Remote content source
//!
//! The crawler only talks to the remote API through the [`ContentSource`]
//! trait, so tests can swap in a scripted source. [`RedditClient`] is the
//! production implementation over Reddit's public JSON endpoints.
//!
//! Every call may fail on its own; callers decide whether a failure is fatal
//! (it almost never is, see `crawler::item`).

mod payload;
mod reddit;

pub use payload::{
    CommentNode, CommentNodeData, Listing, ListingData, MoreChildren, RawComment, RawSubmission,
    Thing,
};
pub use reddit::{build_http_client, submission_id_from_url, RedditClient};

use crate::ScrapeError;
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors returned by a content source
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limited at {url}")]
    RateLimited { url: String },

    #[error("Unexpected HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("Invalid target: {0}")]
    InvalidTarget(String),
}

/// Result type for source operations
pub type SourceResult<T> = Result<T, SourceError>;

/// How a submission is addressed on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionRef {
    /// Bare id (`abc123`) or fullname (`t3_abc123`)
    Id(String),
    /// Any link that contains the id (`…/comments/abc123/…`, `redd.it/abc123`)
    Url(String),
}

impl SubmissionRef {
    /// Treats anything starting with `http` as a URL, everything else as an id
    pub fn parse(arg: &str) -> Self {
        let arg = arg.trim();
        if arg.starts_with("http") {
            Self::Url(arg.to_string())
        } else {
            Self::Id(arg.to_string())
        }
    }

    /// Resolves the bare submission id (no `t3_` prefix)
    pub fn id(&self) -> SourceResult<String> {
        let id = match self {
            Self::Id(id) => id.trim().to_string(),
            Self::Url(link) => submission_id_from_url(link)?,
        };
        let bare = id.strip_prefix("t3_").unwrap_or(&id).to_string();
        if bare.is_empty() {
            return Err(SourceError::InvalidTarget(self.to_string()));
        }
        Ok(bare)
    }

    /// Resolves the submission fullname (`t3_…`)
    pub fn fullname(&self) -> SourceResult<String> {
        Ok(crate::record::fullname("t3", &self.id()?))
    }
}

impl fmt::Display for SubmissionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{}", id),
            Self::Url(url) => write!(f, "{}", url),
        }
    }
}

/// Sort order of a community listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingSort {
    New,
    Hot,
    Top,
    Rising,
    Controversial,
}

impl ListingSort {
    const EXPECTED: &'static str = "new, hot, top, rising, controversial";

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Hot => "hot",
            Self::Top => "top",
            Self::Rising => "rising",
            Self::Controversial => "controversial",
        }
    }
}

impl FromStr for ListingSort {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "new" => Ok(Self::New),
            "hot" => Ok(Self::Hot),
            "top" => Ok(Self::Top),
            "rising" => Ok(Self::Rising),
            "controversial" => Ok(Self::Controversial),
            _ => Err(ScrapeError::UnknownSort {
                sort: s.to_string(),
                expected: Self::EXPECTED,
            }),
        }
    }
}

/// Sort order of an author's comment history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorSort {
    New,
    Top,
}

impl AuthorSort {
    const EXPECTED: &'static str = "new, top";

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Top => "top",
        }
    }
}

impl FromStr for AuthorSort {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "new" => Ok(Self::New),
            "top" => Ok(Self::Top),
            _ => Err(ScrapeError::UnknownSort {
                sort: s.to_string(),
                expected: Self::EXPECTED,
            }),
        }
    }
}

/// How much of a thread's collapsed "more comments" stubs to expand
///
/// Mirrors the usual replace-more semantics: `limit` caps the number of stubs
/// expanded (`None` expands all of them, `Some(0)` none), and stubs hiding
/// fewer than `threshold` comments are left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommentExpansion {
    pub limit: Option<usize>,
    pub threshold: u32,
}

/// A session against the remote content API
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetches a single submission
    async fn submission(&self, target: &SubmissionRef) -> SourceResult<RawSubmission>;

    /// Fetches a single comment by id or fullname
    async fn comment(&self, id: &str) -> SourceResult<RawComment>;

    /// Fetches the flattened comment tree of a submission
    async fn thread_comments(
        &self,
        target: &SubmissionRef,
        expansion: CommentExpansion,
    ) -> SourceResult<Vec<RawComment>>;

    /// Fetches up to `limit` of an author's comments
    async fn author_comments(
        &self,
        author: &str,
        sort: AuthorSort,
        limit: usize,
    ) -> SourceResult<Vec<RawComment>>;

    /// Fetches up to `limit` submissions from a community listing
    async fn listing(
        &self,
        community: &str,
        sort: ListingSort,
        limit: usize,
    ) -> SourceResult<Vec<RawSubmission>>;
}
