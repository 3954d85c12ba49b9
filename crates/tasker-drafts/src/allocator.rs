//! Smallest-free-index allocation for draft ids.

use std::collections::HashSet;

use tasker_models::TaskIndex;

/// Returns the smallest non-negative integer not denoted by any of `ids`.
///
/// Values that are not task indices (blank, negative, fractional,
/// non-numeric, absent) do not occupy anything. The result is in decimal
/// string form.
pub fn smallest_missing<I>(ids: I) -> String
where
    I: IntoIterator,
    I::Item: TaskIndex,
{
    let mut occupied: Vec<u64> = ids.into_iter().filter_map(|id| id.task_index()).collect();
    occupied.sort_unstable();
    occupied.dedup();

    let mut candidate = 0u64;
    for index in occupied {
        if index != candidate {
            break;
        }
        candidate += 1;
    }
    candidate.to_string()
}

/// Incremental form of [`smallest_missing`] for allocating many ids.
///
/// The occupied set only grows, so the smallest free index never moves
/// backwards and each allocation resumes from the previous one.
#[derive(Debug, Default)]
pub struct IdAllocator {
    occupied: HashSet<u64>,
    next: u64,
}

impl IdAllocator {
    /// Creates an allocator with `ids` already occupied.
    pub fn new<I>(ids: I) -> Self
    where
        I: IntoIterator,
        I::Item: TaskIndex,
    {
        Self {
            occupied: ids.into_iter().filter_map(|id| id.task_index()).collect(),
            next: 0,
        }
    }

    /// Marks an index as occupied.
    pub fn occupy(&mut self, index: u64) {
        self.occupied.insert(index);
    }

    /// Returns the smallest free index and occupies it.
    pub fn allocate(&mut self) -> String {
        while self.occupied.contains(&self.next) {
            self.next += 1;
        }
        self.occupied.insert(self.next);
        self.next.to_string()
    }
}
