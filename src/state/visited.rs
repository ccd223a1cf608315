use std::collections::HashSet;

/// Visited sets owned by one top-level frontier crawl
///
/// Has no `Default`: each crawl constructs one explicitly and threads it
/// through its recursion by `&mut`.
/// Names are compared case-insensitively, as the remote API does.
#[derive(Debug)]
pub struct CrawlState {
    visited_authors: HashSet<String>,
    visited_communities: HashSet<String>,
}

impl CrawlState {
    /// Creates an empty state for a new crawl
    pub fn new() -> Self {
        Self {
            visited_authors: HashSet::new(),
            visited_communities: HashSet::new(),
        }
    }

    pub fn is_author_visited(&self, author: &str) -> bool {
        self.visited_authors.contains(&author.to_lowercase())
    }

    /// Marks an author visited; returns `false` if it already was
    pub fn mark_author(&mut self, author: &str) -> bool {
        self.visited_authors.insert(author.to_lowercase())
    }

    pub fn is_community_visited(&self, community: &str) -> bool {
        self.visited_communities.contains(&community.to_lowercase())
    }

    /// Marks a community visited; returns `false` if it already was
    pub fn mark_community(&mut self, community: &str) -> bool {
        self.visited_communities.insert(community.to_lowercase())
    }

    pub fn authors_visited(&self) -> usize {
        self.visited_authors.len()
    }

    pub fn communities_visited(&self) -> usize {
        self.visited_communities.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marks_are_case_insensitive() {
        let mut state = CrawlState::new();

        assert!(state.mark_community("Rust"));
        assert!(!state.mark_community("rust"));
        assert!(state.is_community_visited("RUST"));

        assert!(state.mark_author("Ferris"));
        assert!(state.is_author_visited("ferris"));
        assert!(!state.is_author_visited("crab"));

        assert_eq!(state.communities_visited(), 1);
        assert_eq!(state.authors_visited(), 1);
    }
}
