//! JSON payload shapes returned by the API
//!
//! Only the fields the record formatter needs are kept; everything else in
//! the payload is ignored.

use serde::{Deserialize, Deserializer};

/// A paginated listing envelope
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Listing<T> {
    pub data: ListingData<T>,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ListingData<T> {
    #[serde(default)]
    pub children: Vec<T>,
    #[serde(default)]
    pub after: Option<String>,
}

/// A `{kind, data}` wrapper; the kind is implied by where it is read
#[derive(Debug, Deserialize)]
pub struct Thing<T> {
    pub data: T,
}

/// A submission as returned by the API
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSubmission {
    #[serde(default, deserialize_with = "nullable")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub selftext: String,
    #[serde(default, deserialize_with = "nullable")]
    pub url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub created_utc: f64,
    #[serde(default, deserialize_with = "edited_flag")]
    pub edited: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub ups: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub subreddit: String,
    #[serde(default, deserialize_with = "nullable")]
    pub permalink: String,
}

/// A comment as returned by the API
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawComment {
    #[serde(default, deserialize_with = "nullable")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub body: String,
    #[serde(default, deserialize_with = "nullable")]
    pub created_utc: f64,
    #[serde(default, deserialize_with = "edited_flag")]
    pub edited: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub ups: i64,
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Fullname of the owning submission
    #[serde(default)]
    pub link_id: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub subreddit: String,
}

/// One node of a comment tree
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum CommentNode {
    #[serde(rename = "t1")]
    Comment(Box<CommentNodeData>),
    #[serde(rename = "more")]
    More(MoreChildren),
}

#[derive(Debug, Deserialize)]
pub struct CommentNodeData {
    #[serde(flatten)]
    pub comment: RawComment,
    #[serde(default, deserialize_with = "replies")]
    pub replies: Vec<CommentNode>,
}

/// A collapsed "load more comments" stub
#[derive(Debug, Clone, Deserialize)]
pub struct MoreChildren {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub children: Vec<String>,
}

/// Response of the morechildren endpoint
#[derive(Debug, Deserialize)]
pub(crate) struct MoreChildrenResponse {
    pub json: MoreChildrenJson,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MoreChildrenJson {
    #[serde(default)]
    pub data: Option<MoreChildrenData>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MoreChildrenData {
    #[serde(default)]
    pub things: Vec<CommentNode>,
}

/// Treats `null` as the type's default
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `edited` is `false` or the edit timestamp
fn edited_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Bool(edited) => edited,
        serde_json::Value::Number(_) => true,
        _ => false,
    })
}

/// `replies` is an empty string for leaf comments and a listing otherwise
fn replies<'de, D>(deserializer: D) -> Result<Vec<CommentNode>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Replies {
        Listing(Listing<CommentNode>),
        Empty(serde_json::Value),
    }

    Ok(match Option::<Replies>::deserialize(deserializer)? {
        Some(Replies::Listing(listing)) => listing.data.children,
        Some(Replies::Empty(_)) | None => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edited_flag_accepts_timestamp() {
        let comment: RawComment =
            serde_json::from_str(r#"{"id": "c1", "edited": 1700000123.0}"#).unwrap();
        assert!(comment.edited);

        let comment: RawComment =
            serde_json::from_str(r#"{"id": "c1", "edited": false}"#).unwrap();
        assert!(!comment.edited);
    }

    #[test]
    fn test_null_fields_fall_back_to_defaults() {
        let submission: RawSubmission = serde_json::from_str(
            r#"{"id": "abc", "name": "t3_abc", "author": null, "selftext": null, "ups": 7}"#,
        )
        .unwrap();
        assert_eq!(submission.author, None);
        assert_eq!(submission.selftext, "");
        assert_eq!(submission.ups, 7);
    }

    #[test]
    fn test_comment_tree_with_nested_replies_and_more() {
        let json = r#"{
            "kind": "Listing",
            "data": {
                "after": null,
                "children": [
                    {"kind": "t1", "data": {
                        "id": "c1", "name": "t1_c1", "body": "top", "ups": 3,
                        "link_id": "t3_abc", "parent_id": "t3_abc",
                        "replies": {"kind": "Listing", "data": {"children": [
                            {"kind": "t1", "data": {"id": "c2", "name": "t1_c2",
                             "body": "reply", "link_id": "t3_abc",
                             "parent_id": "t1_c1", "replies": ""}}
                        ]}}
                    }},
                    {"kind": "more", "data": {"count": 4, "children": ["c3", "c4"]}}
                ]
            }
        }"#;

        let listing: Listing<CommentNode> = serde_json::from_str(json).unwrap();
        assert_eq!(listing.data.children.len(), 2);

        match &listing.data.children[0] {
            CommentNode::Comment(data) => {
                assert_eq!(data.comment.name, "t1_c1");
                assert_eq!(data.replies.len(), 1);
            }
            other => panic!("expected comment, got {:?}", other),
        }
        match &listing.data.children[1] {
            CommentNode::More(more) => {
                assert_eq!(more.count, 4);
                assert_eq!(more.children, vec!["c3", "c4"]);
            }
            other => panic!("expected more stub, got {:?}", other),
        }
    }
}
