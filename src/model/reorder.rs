//! Snapshot-based validation for sibling reorder batches.
//!
//! The validator is a pure function over the requested batch and the current
//! sibling set of the anchor parent. It performs no I/O, so every rejection
//! path is unit-testable without a database. The composite uniqueness
//! constraints on `(course_id, order_index)` / `(module_id, order_index)` are
//! deferred to transaction commit and re-check the same decision inside the
//! transaction that applies the batch.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ReorderItem {
    pub id: Uuid,
    pub order_index: i32,
}

#[derive(Debug, Error)]
pub enum ReorderRejection {
    #[error("EmptyBatch")]
    EmptyBatch,

    #[error("DuplicateOrder: position {order_index} requested more than once")]
    DuplicateOrder { order_index: i32 },

    #[error("InvalidOrder: negative position {order_index} for {id}")]
    InvalidOrder { id: Uuid, order_index: i32 },

    #[error("CrossScopeViolation: {id} is not a sibling under the anchor parent")]
    ForeignSibling { id: Uuid },

    #[error("CrossScopeViolation: batch names {named} of {expected} siblings")]
    IncompleteBatch { named: usize, expected: usize },
}

/// A batch that passed validation, sorted ascending by requested position.
#[derive(Debug)]
pub struct ValidatedReorder {
    items: Vec<ReorderItem>,
}

impl ValidatedReorder {
    pub fn items(&self) -> &[ReorderItem] {
        &self.items
    }
}

/// Decides whether `items` may be applied to the sibling set `siblings`
/// (the ids of ALL children of the anchor parent, in any order).
///
/// Rules, in rejection order:
/// - the batch must be non-empty;
/// - every position must be non-negative;
/// - every id must belong to the sibling set;
/// - positions must be pairwise distinct;
/// - the batch must name every sibling exactly once.
pub fn validate_reorder(
    items: &[ReorderItem],
    siblings: &[Uuid],
) -> Result<ValidatedReorder, ReorderRejection> {
    if items.is_empty() {
        return Err(ReorderRejection::EmptyBatch);
    }

    let sibling_set: HashSet<Uuid> = siblings.iter().copied().collect();
    let mut seen_ids = HashSet::with_capacity(items.len());
    let mut seen_orders = HashSet::with_capacity(items.len());

    for item in items {
        if item.order_index < 0 {
            return Err(ReorderRejection::InvalidOrder {
                id: item.id,
                order_index: item.order_index,
            });
        }
        if !sibling_set.contains(&item.id) {
            return Err(ReorderRejection::ForeignSibling { id: item.id });
        }
        if !seen_orders.insert(item.order_index) {
            return Err(ReorderRejection::DuplicateOrder {
                order_index: item.order_index,
            });
        }
        seen_ids.insert(item.id);
    }

    // A duplicated id collapses here, so a batch repeating one sibling and
    // omitting another is reported the same way as a partial batch.
    if seen_ids.len() != sibling_set.len() {
        return Err(ReorderRejection::IncompleteBatch {
            named: seen_ids.len(),
            expected: sibling_set.len(),
        });
    }

    let mut items = items.to_vec();
    items.sort_by_key(|item| item.order_index);
    Ok(ValidatedReorder { items })
}

#[cfg(test)]
mod test {
    use super::*;

    fn item(id: Uuid, order_index: i32) -> ReorderItem {
        ReorderItem { id, order_index }
    }

    #[test]
    fn rejects_empty_batch() {
        let result = validate_reorder(&[], &[Uuid::new_v4()]);
        assert!(matches!(result, Err(ReorderRejection::EmptyBatch)));
    }

    #[test]
    fn rejects_duplicate_positions() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let result = validate_reorder(&[item(a, 0), item(b, 0)], &[a, b]);
        assert!(matches!(
            result,
            Err(ReorderRejection::DuplicateOrder { order_index: 0 })
        ));
    }

    #[test]
    fn rejects_negative_positions() {
        let a = Uuid::new_v4();
        let result = validate_reorder(&[item(a, -1)], &[a]);
        assert!(matches!(
            result,
            Err(ReorderRejection::InvalidOrder { order_index: -1, .. })
        ));
    }

    #[test]
    fn rejects_id_from_another_parent() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let foreign = Uuid::new_v4();
        let result = validate_reorder(&[item(a, 0), item(foreign, 1)], &[a, b]);
        assert!(matches!(
            result,
            Err(ReorderRejection::ForeignSibling { id }) if id == foreign
        ));
    }

    #[test]
    fn rejects_partial_batch() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let result = validate_reorder(&[item(a, 0), item(b, 1)], &[a, b, c]);
        assert!(matches!(
            result,
            Err(ReorderRejection::IncompleteBatch {
                named: 2,
                expected: 3
            })
        ));
    }

    #[test]
    fn rejects_repeated_id() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let result = validate_reorder(&[item(a, 0), item(a, 1)], &[a, b]);
        assert!(matches!(result, Err(ReorderRejection::IncompleteBatch { .. })));
    }

    #[test]
    fn accepts_and_sorts_full_batch() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let batch = validate_reorder(&[item(c, 2), item(a, 0), item(b, 1)], &[a, b, c]).unwrap();
        let ids: Vec<Uuid> = batch.items().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![a, b, c]);
    }

    #[test]
    fn accepts_sparse_positions() {
        // Gaps are fine, duplicates are not.
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let batch = validate_reorder(&[item(b, 10), item(a, 3)], &[a, b]).unwrap();
        assert_eq!(batch.items()[0].id, a);
        assert_eq!(batch.items()[1].id, b);
    }
}
