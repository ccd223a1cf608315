//! Reconciliation of freshly fetched comments against the store
//!
//! A thread's comments are re-fetched in full on every scrape. Rather than
//! rewriting every row, each fresh comment is classified against the stored
//! `(edited, ups)` pair:
//!
//! - not stored yet: **new**, inserted (conflicts are skipped)
//! - stored, overwrite requested: **changed**, re-applied
//! - stored, no overwrite: **changed** only when it became edited or its
//!   score moved by at least [`SCORE_DELTA_THRESHOLD`], otherwise **unchanged**
//!
//! Scores drift constantly and edits only ever go one way, so anything
//! smaller is treated as noise.

use crate::record::CommentRecord;
use crate::storage::{PersistedState, Storage};
use crate::Result;
use std::collections::HashMap;
use tracing::debug;

/// Minimum absolute score movement that counts as a material change
pub const SCORE_DELTA_THRESHOLD: i64 = 5;

/// How a single fresh comment relates to its stored copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    New,
    Changed,
    Unchanged,
}

/// The three disjoint partitions of one fresh batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    pub new: Vec<CommentRecord>,
    pub changed: Vec<CommentRecord>,
    pub unchanged: usize,
}

impl Reconciliation {
    /// Number of fresh records this reconciliation covered
    pub fn total(&self) -> usize {
        self.new.len() + self.changed.len() + self.unchanged
    }
}

/// Classifies one fresh comment against its stored state, if any
pub fn classify(
    fresh: &CommentRecord,
    persisted: Option<&PersistedState>,
    overwrite: bool,
) -> Classification {
    let Some(persisted) = persisted else {
        return Classification::New;
    };

    if overwrite {
        return Classification::Changed;
    }

    let became_edited = !persisted.edited && fresh.edited;
    let score_moved = (fresh.ups - persisted.ups).abs() >= SCORE_DELTA_THRESHOLD;

    if became_edited || score_moved {
        Classification::Changed
    } else {
        Classification::Unchanged
    }
}

/// Splits a fresh batch into new, changed and unchanged against a snapshot
pub fn partition(
    fresh: Vec<CommentRecord>,
    snapshot: &HashMap<String, PersistedState>,
    overwrite: bool,
) -> Reconciliation {
    let mut result = Reconciliation::default();

    for record in fresh {
        match classify(&record, snapshot.get(&record.name), overwrite) {
            Classification::New => result.new.push(record),
            Classification::Changed => result.changed.push(record),
            Classification::Unchanged => result.unchanged += 1,
        }
    }

    result
}

/// Reconciles the complete fresh comment set of one submission with the store
///
/// Reads the stored snapshot for `owning_id` once, then writes new comments
/// as one insert batch and changed comments as one update batch.
///
/// # Arguments
///
/// * `storage` - Store connection owned by the caller
/// * `owning_id` - Fullname of the submission the comments belong to
/// * `fresh` - Every comment just fetched for that submission
/// * `overwrite` - Re-apply every already stored comment
pub fn reconcile(
    storage: &mut dyn Storage,
    owning_id: &str,
    fresh: Vec<CommentRecord>,
    overwrite: bool,
) -> Result<Reconciliation> {
    let snapshot = storage.comment_snapshot(owning_id)?;
    let result = partition(fresh, &snapshot, overwrite);

    let inserted = storage.insert_comments(&result.new)?;
    let updated = storage.update_comments(&result.changed)?;

    debug!(
        "Reconciled {}: {} new ({} inserted), {} changed ({} updated), {} unchanged",
        owning_id,
        result.new.len(),
        inserted,
        result.changed.len(),
        updated,
        result.unchanged
    );

    Ok(result)
}
