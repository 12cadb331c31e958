//! Dense ordering arithmetic for a user's link list.
//!
//! A user's links carry positions that always form the sequence `0..n` with no
//! gaps or duplicates. The functions here compute new positions; they never
//! touch storage. Callers run them inside a transaction that holds the owner's
//! lock, between reading the current list and writing the result back.
//!
//! Current lists are passed in display order, i.e. sorted by
//! `(position, created_at, id)`.

use std::collections::HashSet;
use uuid::Uuid;

/// Reasons a reorder request is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReorderError {
    #[error("Reorder list is empty")]
    Empty,

    #[error("Link {0} does not exist or does not belong to the user")]
    ForeignLink(Uuid),

    #[error("Link {0} appears more than once")]
    DuplicateLink(Uuid),
}

/// Position assigned to a link appended after the current maximum.
///
/// `None` means the user has no links yet, so the new link starts the list.
pub fn next_position(current_max: Option<i32>) -> i32 {
    current_max.map_or(0, |max| max + 1)
}

/// A position change to persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub id: Uuid,
    pub position: i32,
}

/// Renumbers a list to `0..n` following slice order.
///
/// Only links whose position actually changes are returned.
pub fn compact(current: &[(Uuid, i32)]) -> Vec<Assignment> {
    current
        .iter()
        .enumerate()
        .filter_map(|(rank, &(id, position))| {
            let rank = rank as i32;
            (rank != position).then_some(Assignment { id, position: rank })
        })
        .collect()
}

/// Computes the display order requested by a reorder payload.
///
/// Rank comes from the position of each id in `requested`; any integers the
/// client sent alongside are not consulted. Links missing from `requested`
/// keep their relative order and follow the listed ones.
///
/// # Errors
///
/// - [`ReorderError::Empty`] if `requested` is empty
/// - [`ReorderError::DuplicateLink`] if an id is listed twice
/// - [`ReorderError::ForeignLink`] for the first id not present in `current`
pub fn plan_reorder(current: &[Uuid], requested: &[Uuid]) -> Result<Vec<Uuid>, ReorderError> {
    check_unique(requested)?;

    let owned: HashSet<Uuid> = current.iter().copied().collect();
    if let Some(foreign) = requested.iter().find(|id| !owned.contains(*id)) {
        return Err(ReorderError::ForeignLink(*foreign));
    }

    let listed: HashSet<Uuid> = requested.iter().copied().collect();
    let mut order = requested.to_vec();
    order.extend(current.iter().filter(|id| !listed.contains(*id)));

    Ok(order)
}

/// Rejects empty payloads and repeated ids.
///
/// Runs before any storage access, since it needs nothing but the payload.
pub fn check_unique(requested: &[Uuid]) -> Result<(), ReorderError> {
    if requested.is_empty() {
        return Err(ReorderError::Empty);
    }

    let mut seen = HashSet::with_capacity(requested.len());
    for id in requested {
        if !seen.insert(*id) {
            return Err(ReorderError::DuplicateLink(*id));
        }
    }

    Ok(())
}

/// Pairs a planned order with the current positions and keeps the changes.
pub fn assignments_for(current: &[(Uuid, i32)], planned: &[Uuid]) -> Vec<Assignment> {
    planned
        .iter()
        .enumerate()
        .filter_map(|(rank, id)| {
            let rank = rank as i32;
            let unchanged = current
                .iter()
                .any(|&(cid, position)| cid == *id && position == rank);
            (!unchanged).then_some(Assignment {
                id: *id,
                position: rank,
            })
        })
        .collect()
}

/// Returns true if positions are exactly `0..n` in some order.
pub fn is_dense(positions: &[i32]) -> bool {
    let mut sorted = positions.to_vec();
    sorted.sort_unstable();
    sorted.iter().enumerate().all(|(i, &p)| p == i as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    fn numbered(list: &[Uuid]) -> Vec<(Uuid, i32)> {
        list.iter().enumerate().map(|(i, id)| (*id, i as i32)).collect()
    }

    /// Applies assignments to a `(id, position)` list, returning the new positions.
    fn apply(current: &[(Uuid, i32)], changes: &[Assignment]) -> Vec<(Uuid, i32)> {
        current
            .iter()
            .map(|&(id, position)| {
                let updated = changes
                    .iter()
                    .find(|a| a.id == id)
                    .map_or(position, |a| a.position);
                (id, updated)
            })
            .collect()
    }

    #[test]
    fn test_next_position_empty_list() {
        assert_eq!(next_position(None), 0);
    }

    #[test]
    fn test_next_position_after_max() {
        assert_eq!(next_position(Some(0)), 1);
        assert_eq!(next_position(Some(6)), 7);
    }

    #[test]
    fn test_compact_after_removal_of_middle() {
        // L1(0), L2(1), L3(2); L2 removed leaves L1(0), L3(2).
        let l = ids(3);
        let remaining = vec![(l[0], 0), (l[2], 2)];

        let changes = compact(&remaining);

        assert_eq!(
            changes,
            vec![Assignment {
                id: l[2],
                position: 1
            }]
        );
    }

    #[test]
    fn test_compact_dense_list_is_noop() {
        let l = ids(4);
        assert!(compact(&numbered(&l)).is_empty());
    }

    #[test]
    fn test_compact_preserves_relative_order_with_gaps() {
        let l = ids(3);
        let current = vec![(l[0], 3), (l[1], 7), (l[2], 10)];

        let result = apply(&current, &compact(&current));

        assert_eq!(result, vec![(l[0], 0), (l[1], 1), (l[2], 2)]);
    }

    #[test]
    fn test_append_remove_sequences_stay_dense() {
        let mut list: Vec<(Uuid, i32)> = Vec::new();

        for step in 0..20 {
            if step % 3 == 2 && !list.is_empty() {
                let victim = (step * 7) % list.len();
                list.remove(victim);
                let changes = compact(&list);
                list = apply(&list, &changes);
            } else {
                let max = list.iter().map(|&(_, p)| p).max();
                list.push((Uuid::new_v4(), next_position(max)));
            }

            let positions: Vec<i32> = list.iter().map(|&(_, p)| p).collect();
            assert!(is_dense(&positions), "not dense after step {step}: {positions:?}");
        }
    }

    #[test]
    fn test_plan_reorder_full_permutation() {
        let l = ids(3);
        let requested = vec![l[2], l[0], l[1]];

        let planned = plan_reorder(&l, &requested).unwrap();

        assert_eq!(planned, requested);
    }

    #[test]
    fn test_plan_reorder_partial_list_appends_omitted() {
        let l = ids(3);

        let planned = plan_reorder(&l, &[l[2], l[0]]).unwrap();

        assert_eq!(planned, vec![l[2], l[0], l[1]]);
    }

    #[test]
    fn test_plan_reorder_foreign_id() {
        let l = ids(2);
        let stranger = Uuid::new_v4();

        let err = plan_reorder(&l, &[l[1], stranger]).unwrap_err();

        assert_eq!(err, ReorderError::ForeignLink(stranger));
    }

    #[test]
    fn test_plan_reorder_duplicate_id() {
        let l = ids(2);

        let err = plan_reorder(&l, &[l[0], l[0]]).unwrap_err();

        assert_eq!(err, ReorderError::DuplicateLink(l[0]));
    }

    #[test]
    fn test_plan_reorder_empty() {
        let l = ids(2);
        assert_eq!(plan_reorder(&l, &[]).unwrap_err(), ReorderError::Empty);
    }

    #[test]
    fn test_assignments_only_for_moved_links() {
        let l = ids(3);
        let current = numbered(&l);

        // Swap the last two.
        let changes = assignments_for(&current, &[l[0], l[2], l[1]]);

        assert_eq!(changes.len(), 2);
        let result = apply(&current, &changes);
        assert_eq!(result, vec![(l[0], 0), (l[1], 2), (l[2], 1)]);
    }

    #[test]
    fn test_assignments_repair_duplicate_positions() {
        let l = ids(2);
        let current = vec![(l[0], 0), (l[1], 0)];

        let changes = assignments_for(&current, &[l[0], l[1]]);

        assert_eq!(
            changes,
            vec![Assignment {
                id: l[1],
                position: 1
            }]
        );
    }

    #[test]
    fn test_is_dense() {
        assert!(is_dense(&[]));
        assert!(is_dense(&[2, 0, 1]));
        assert!(!is_dense(&[0, 2]));
        assert!(!is_dense(&[0, 0, 1]));
    }
}
