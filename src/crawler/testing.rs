//! Scripted content source for unit tests

use crate::record::fullname;
use crate::source::{
    AuthorSort, CommentExpansion, ContentSource, ListingSort, RawComment, RawSubmission,
    SourceError, SourceResult, SubmissionRef,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Serves canned payloads; anything not registered is `NotFound`
#[derive(Default)]
pub struct FakeSource {
    submissions: HashMap<String, RawSubmission>,
    comments: HashMap<String, RawComment>,
    threads: HashMap<String, Vec<RawComment>>,
    authors: HashMap<String, Vec<RawComment>>,
    listings: HashMap<String, Vec<RawSubmission>>,
    pub author_requests: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_submission(mut self, raw: RawSubmission) -> Self {
        self.submissions.insert(raw.id.clone(), raw);
        self
    }

    pub fn with_comment(mut self, raw: RawComment) -> Self {
        self.comments.insert(raw.name.clone(), raw);
        self
    }

    pub fn with_thread(mut self, id: &str, comments: Vec<RawComment>) -> Self {
        self.threads.insert(id.to_string(), comments);
        self
    }

    pub fn with_author(mut self, author: &str, comments: Vec<RawComment>) -> Self {
        self.authors.insert(author.to_string(), comments);
        self
    }

    pub fn with_listing(mut self, community: &str, submissions: Vec<RawSubmission>) -> Self {
        self.listings.insert(community.to_string(), submissions);
        self
    }
}

#[async_trait]
impl ContentSource for FakeSource {
    async fn submission(&self, target: &SubmissionRef) -> SourceResult<RawSubmission> {
        let id = target.id()?;
        self.submissions
            .get(&id)
            .cloned()
            .ok_or(SourceError::NotFound(id))
    }

    async fn comment(&self, id: &str) -> SourceResult<RawComment> {
        let name = fullname("t1", id);
        self.comments
            .get(&name)
            .cloned()
            .ok_or(SourceError::NotFound(name))
    }

    async fn thread_comments(
        &self,
        target: &SubmissionRef,
        _expansion: CommentExpansion,
    ) -> SourceResult<Vec<RawComment>> {
        let id = target.id()?;
        self.threads
            .get(&id)
            .cloned()
            .ok_or(SourceError::NotFound(id))
    }

    async fn author_comments(
        &self,
        author: &str,
        _sort: AuthorSort,
        limit: usize,
    ) -> SourceResult<Vec<RawComment>> {
        if let Ok(mut requests) = self.author_requests.lock() {
            requests.push(author.to_string());
        }
        let comments = self
            .authors
            .get(author)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(author.to_string()))?;
        Ok(comments.into_iter().take(limit).collect())
    }

    async fn listing(
        &self,
        community: &str,
        _sort: ListingSort,
        limit: usize,
    ) -> SourceResult<Vec<RawSubmission>> {
        let submissions = self
            .listings
            .get(community)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(community.to_string()))?;
        Ok(submissions.into_iter().take(limit).collect())
    }
}
