//! Record formatter: raw API items to fixed-shape records

use crate::record::{CommentRecord, RecordError, SubmissionRecord};
use crate::source::{RawComment, RawSubmission};
use chrono::{DateTime, Utc};

/// Author placeholder the API returns for deleted accounts
const DELETED_AUTHOR: &str = "[deleted]";

/// Maps a fetched submission into a [`SubmissionRecord`]
pub fn format_submission(raw: &RawSubmission) -> Result<SubmissionRecord, RecordError> {
    Ok(SubmissionRecord {
        name: item_name("t3", &raw.name, &raw.id)?,
        author: author_handle(raw.author.as_deref()),
        title: raw.title.clone(),
        selftext: raw.selftext.clone(),
        url: raw.url.clone(),
        created_utc: timestamp(raw.created_utc),
        edited: raw.edited,
        ups: raw.ups,
        subreddit: normalize_community(&raw.subreddit),
        permalink: raw.permalink.clone(),
    })
}

/// Maps a fetched comment into a [`CommentRecord`]
///
/// The owning submission comes from the comment's `link_id`. When that is
/// missing, `fallback_submission` (the thread being scraped, if any) is used.
pub fn format_comment(
    raw: &RawComment,
    fallback_submission: Option<&str>,
) -> Result<CommentRecord, RecordError> {
    let name = item_name("t1", &raw.name, &raw.id)?;

    let submission_id = raw
        .link_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .or(fallback_submission)
        .map(|id| fullname("t3", id))
        .ok_or_else(|| RecordError::MissingSubmission(name.clone()))?;

    Ok(CommentRecord {
        name,
        author: author_handle(raw.author.as_deref()),
        body: raw.body.clone(),
        created_utc: timestamp(raw.created_utc),
        edited: raw.edited,
        ups: raw.ups,
        parent_id: raw.parent_id.clone().filter(|id| !id.is_empty()),
        submission_id,
        subreddit: normalize_community(&raw.subreddit),
    })
}

/// Prefixes a bare id with its kind (`t1`, `t3`), leaving fullnames untouched
pub fn fullname(kind: &str, id: &str) -> String {
    let prefix = format!("{}_", kind);
    if id.starts_with(&prefix) {
        id.to_string()
    } else {
        format!("{}{}", prefix, id)
    }
}

/// Strips `r/` and `/r/` prefixes and surrounding slashes from a community name
pub fn normalize_community(name: &str) -> String {
    let trimmed = name.trim().trim_matches('/');
    let bare = trimmed
        .strip_prefix("r/")
        .or_else(|| trimmed.strip_prefix("R/"))
        .unwrap_or(trimmed);
    bare.trim_matches('/').to_string()
}

fn item_name(kind: &str, name: &str, id: &str) -> Result<String, RecordError> {
    if !name.is_empty() {
        Ok(name.to_string())
    } else if !id.is_empty() {
        Ok(fullname(kind, id))
    } else {
        Err(RecordError::MissingName)
    }
}

fn author_handle(author: Option<&str>) -> Option<String> {
    author
        .filter(|a| !a.is_empty() && *a != DELETED_AUTHOR)
        .map(str::to_string)
}

fn timestamp(created_utc: f64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(created_utc.trunc() as i64, 0).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn raw_comment() -> RawComment {
        RawComment {
            id: "c1".to_string(),
            name: "t1_c1".to_string(),
            author: Some("alice".to_string()),
            body: "hello".to_string(),
            created_utc: 1_700_000_000.0,
            edited: false,
            ups: 50,
            parent_id: Some("t3_abc".to_string()),
            link_id: Some("t3_abc".to_string()),
            subreddit: "rust".to_string(),
        }
    }

    #[test]
    fn test_format_submission() {
        let raw = RawSubmission {
            id: "abc".to_string(),
            name: "t3_abc".to_string(),
            author: Some("bob".to_string()),
            title: "Title".to_string(),
            selftext: "Body".to_string(),
            url: "https://example.com".to_string(),
            created_utc: 1_700_000_000.5,
            edited: true,
            ups: 100,
            subreddit: "rust".to_string(),
            permalink: "/r/rust/comments/abc/title/".to_string(),
        };

        let record = format_submission(&raw).unwrap();
        assert_eq!(record.name, "t3_abc");
        assert_eq!(record.author.as_deref(), Some("bob"));
        assert_eq!(record.ups, 100);
        assert!(record.edited);
        assert_eq!(record.subreddit, "rust");
        assert_eq!(
            record.created_utc,
            Utc.timestamp_opt(1_700_000_000, 0).unwrap()
        );
    }

    #[test]
    fn test_format_submission_derives_name_from_id() {
        let raw = RawSubmission {
            id: "xyz".to_string(),
            ..RawSubmission::default()
        };
        assert_eq!(format_submission(&raw).unwrap().name, "t3_xyz");

        let nameless = RawSubmission::default();
        assert_eq!(format_submission(&nameless), Err(RecordError::MissingName));
    }

    #[test]
    fn test_format_comment() {
        let record = format_comment(&raw_comment(), None).unwrap();
        assert_eq!(record.name, "t1_c1");
        assert_eq!(record.submission_id, "t3_abc");
        assert_eq!(record.parent_id.as_deref(), Some("t3_abc"));
        assert_eq!(record.ups, 50);
    }

    #[test]
    fn test_format_comment_falls_back_to_thread() {
        let raw = RawComment {
            link_id: None,
            ..raw_comment()
        };
        let record = format_comment(&raw, Some("abc")).unwrap();
        assert_eq!(record.submission_id, "t3_abc");

        assert_eq!(
            format_comment(&raw, None),
            Err(RecordError::MissingSubmission("t1_c1".to_string()))
        );
    }

    #[test]
    fn test_deleted_author_and_tombstone_body() {
        let raw = RawComment {
            author: Some("[deleted]".to_string()),
            body: "[removed]".to_string(),
            ..raw_comment()
        };
        let record = format_comment(&raw, None).unwrap();
        assert_eq!(record.author, None);
        assert_eq!(record.body, "[removed]");
    }

    #[test]
    fn test_normalize_community() {
        assert_eq!(normalize_community("rust"), "rust");
        assert_eq!(normalize_community("r/rust"), "rust");
        assert_eq!(normalize_community("/r/rust/"), "rust");
        assert_eq!(normalize_community("  r/AskReddit "), "AskReddit");
    }

    #[test]
    fn test_fullname() {
        assert_eq!(fullname("t3", "abc"), "t3_abc");
        assert_eq!(fullname("t3", "t3_abc"), "t3_abc");
        assert_eq!(fullname("t1", "def"), "t1_def");
    }
}
