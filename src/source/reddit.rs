//! HTTP client for Reddit's public JSON API
//!
//! This module handles:
//! - Building the HTTP client with the configured user agent
//! - Resolving submission URLs to ids
//! - Listing pagination via the `after` cursor
//! - Flattening comment trees and expanding "more comments" stubs
//! - Mapping HTTP status codes to [`SourceError`] variants
//!
//! Requests are never retried; backpressure comes from the worker pool width.

use crate::config::ApiConfig;
use crate::record::fullname;
use crate::source::payload::{CommentNode, Listing, MoreChildren, MoreChildrenResponse, Thing};
use crate::source::{
    AuthorSort, CommentExpansion, ContentSource, ListingSort, RawComment, RawSubmission,
    SourceError, SourceResult, SubmissionRef,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::VecDeque;
use std::time::Duration;
use url::Url;

/// Largest page the listing endpoints will return
const PAGE_SIZE: usize = 100;

/// Largest batch of ids the morechildren endpoint accepts per call
const MORE_CHILDREN_BATCH: usize = 100;

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use scrapeddit::config::ApiConfig;
/// use scrapeddit::source::build_http_client;
///
/// let config = ApiConfig {
///     base_url: "https://www.reddit.com".to_string(),
///     user_agent: "scrapeddit/0.1 (by u/someone)".to_string(),
///     timeout_secs: 30,
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &ApiConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Extracts the bare submission id from a submission link
///
/// Handles full links (`/r/<sub>/comments/<id>/<slug>/`), bare comment links
/// (`/comments/<id>`) and short links (`redd.it/<id>`).
pub fn submission_id_from_url(link: &str) -> SourceResult<String> {
    let url = Url::parse(link)
        .map_err(|e| SourceError::InvalidTarget(format!("{}: {}", link, e)))?;

    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    let id = if url.host_str() == Some("redd.it") {
        segments.first().copied()
    } else {
        segments
            .iter()
            .position(|seg| *seg == "comments")
            .and_then(|idx| segments.get(idx + 1).copied())
    };

    id.map(str::to_string)
        .ok_or_else(|| SourceError::InvalidTarget(format!("no submission id in {}", link)))
}

/// One API session: an HTTP client bound to a base URL
#[derive(Debug, Clone)]
pub struct RedditClient {
    client: Client,
    base_url: String,
}

impl RedditClient {
    /// Creates a new session from the API configuration
    pub fn new(config: &ApiConfig) -> SourceResult<Self> {
        let client = build_http_client(config).map_err(|e| SourceError::Http {
            url: config.base_url.clone(),
            source: e,
        })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Sends a GET request and decodes the JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> SourceResult<T> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[("raw_json", "1")])
            .query(query)
            .send()
            .await
            .map_err(|e| SourceError::Http {
                url: url.clone(),
                source: e,
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound(url));
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(SourceError::RateLimited { url });
        }
        if !status.is_success() {
            return Err(SourceError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| SourceError::Http {
            url: url.clone(),
            source: e,
        })?;

        serde_json::from_str(&body).map_err(|e| SourceError::Decode {
            url,
            message: e.to_string(),
        })
    }

    /// Walks a listing until `limit` items were collected or the cursor runs out
    async fn paged<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        limit: usize,
    ) -> SourceResult<Vec<T>> {
        let mut items = Vec::new();
        let mut after: Option<String> = None;

        while items.len() < limit {
            let page_size = PAGE_SIZE.min(limit - items.len());
            let mut params = query.to_vec();
            params.push(("limit", page_size.to_string()));
            if let Some(cursor) = &after {
                params.push(("after", cursor.clone()));
            }

            let listing: Listing<Thing<T>> = self.get_json(path, &params).await?;
            let received = listing.data.children.len();
            items.extend(listing.data.children.into_iter().map(|thing| thing.data));

            match listing.data.after {
                Some(cursor) if received > 0 => after = Some(cursor),
                _ => break,
            }
        }

        items.truncate(limit);
        Ok(items)
    }

    /// Expands "more comments" stubs until the expansion budget is spent
    async fn expand_more(
        &self,
        link_id: &str,
        mut pending: VecDeque<MoreChildren>,
        expansion: CommentExpansion,
        comments: &mut Vec<RawComment>,
    ) -> SourceResult<()> {
        let mut expanded = 0usize;

        while let Some(more) = pending.pop_front() {
            if expansion.limit.is_some_and(|limit| expanded >= limit) {
                break;
            }
            // "continue this thread" stubs carry no ids and cannot be expanded here
            if more.count < expansion.threshold || more.children.is_empty() {
                continue;
            }

            for batch in more.children.chunks(MORE_CHILDREN_BATCH) {
                let params = [
                    ("api_type", "json".to_string()),
                    ("link_id", link_id.to_string()),
                    ("children", batch.join(",")),
                ];
                let response: MoreChildrenResponse =
                    self.get_json("/api/morechildren.json", &params).await?;
                let things = response.json.data.map(|d| d.things).unwrap_or_default();
                flatten_tree(things, comments, &mut pending);
            }
            expanded += 1;
        }

        Ok(())
    }
}

/// Depth-first flattening of a comment tree; collapsed stubs go to `pending`
fn flatten_tree(
    nodes: Vec<CommentNode>,
    comments: &mut Vec<RawComment>,
    pending: &mut VecDeque<MoreChildren>,
) {
    for node in nodes {
        match node {
            CommentNode::Comment(data) => {
                let data = *data;
                comments.push(data.comment);
                flatten_tree(data.replies, comments, pending);
            }
            CommentNode::More(more) => pending.push_back(more),
        }
    }
}

#[async_trait]
impl ContentSource for RedditClient {
    async fn submission(&self, target: &SubmissionRef) -> SourceResult<RawSubmission> {
        let id = target.id()?;
        let path = format!("/by_id/{}.json", fullname("t3", &id));
        let listing: Listing<Thing<RawSubmission>> = self.get_json(&path, &[]).await?;

        listing
            .data
            .children
            .into_iter()
            .next()
            .map(|thing| thing.data)
            .ok_or_else(|| SourceError::NotFound(format!("submission {}", id)))
    }

    async fn comment(&self, id: &str) -> SourceResult<RawComment> {
        let name = fullname("t1", id.trim());
        let listing: Listing<Thing<RawComment>> = self
            .get_json("/api/info.json", &[("id", name.clone())])
            .await?;

        listing
            .data
            .children
            .into_iter()
            .next()
            .map(|thing| thing.data)
            .ok_or_else(|| SourceError::NotFound(format!("comment {}", name)))
    }

    async fn thread_comments(
        &self,
        target: &SubmissionRef,
        expansion: CommentExpansion,
    ) -> SourceResult<Vec<RawComment>> {
        let id = target.id()?;
        let path = format!("/comments/{}.json", id);
        let (_post, tree): (Listing<Thing<RawSubmission>>, Listing<CommentNode>) = self
            .get_json(&path, &[("limit", "500".to_string())])
            .await?;

        let mut comments = Vec::new();
        let mut pending = VecDeque::new();
        flatten_tree(tree.data.children, &mut comments, &mut pending);

        let link_id = fullname("t3", &id);
        self.expand_more(&link_id, pending, expansion, &mut comments)
            .await?;

        tracing::debug!("Fetched {} comments for thread {}", comments.len(), link_id);
        Ok(comments)
    }

    async fn author_comments(
        &self,
        author: &str,
        sort: AuthorSort,
        limit: usize,
    ) -> SourceResult<Vec<RawComment>> {
        let path = format!("/user/{}/comments.json", author);
        let mut query = vec![("sort", sort.as_str().to_string())];
        if sort == AuthorSort::Top {
            query.push(("t", "all".to_string()));
        }
        self.paged(&path, &query, limit).await
    }

    async fn listing(
        &self,
        community: &str,
        sort: ListingSort,
        limit: usize,
    ) -> SourceResult<Vec<RawSubmission>> {
        let path = format!("/r/{}/{}.json", community, sort.as_str());
        let mut query = Vec::new();
        if matches!(sort, ListingSort::Top | ListingSort::Controversial) {
            query.push(("t", "all".to_string()));
        }
        self.paged(&path, &query, limit).await
    }
}
