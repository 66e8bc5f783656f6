//! Re-sort and manual move over the in-memory favorites list.
//!
//! Both operations only permute a slice and renumber it; persisting the new
//! arrangement is the caller's job.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::entity::favorite_repository::Model as FavoriteRecord;

/// Keys a favorites list can be re-sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOption {
    /// Most recently favorited first.
    #[default]
    DateDesc,
    DateAsc,
    /// Case-insensitive A to Z.
    NameAsc,
    NameDesc,
    StarsDesc,
    StarsAsc,
}

impl SortOption {
    pub const ALL: [SortOption; 6] = [
        Self::DateDesc,
        Self::DateAsc,
        Self::NameAsc,
        Self::NameDesc,
        Self::StarsDesc,
        Self::StarsAsc,
    ];

    /// Stable identifier, as accepted by [`FromStr`].
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DateDesc => "date-desc",
            Self::DateAsc => "date-asc",
            Self::NameAsc => "name-asc",
            Self::NameDesc => "name-desc",
            Self::StarsDesc => "stars-desc",
            Self::StarsAsc => "stars-asc",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::DateDesc => "Newest first",
            Self::DateAsc => "Oldest first",
            Self::NameAsc => "Name (A-Z)",
            Self::NameDesc => "Name (Z-A)",
            Self::StarsDesc => "Most stars",
            Self::StarsAsc => "Fewest stars",
        }
    }

    /// Compare two records under this key. Equal records compare `Equal`.
    pub fn compare(self, a: &FavoriteRecord, b: &FavoriteRecord) -> Ordering {
        match self {
            Self::DateDesc => b.created_at.cmp(&a.created_at),
            Self::DateAsc => a.created_at.cmp(&b.created_at),
            Self::NameAsc => fold(&a.name).cmp(&fold(&b.name)),
            Self::NameDesc => fold(&b.name).cmp(&fold(&a.name)),
            Self::StarsDesc => b.star_count.cmp(&a.star_count),
            Self::StarsAsc => a.star_count.cmp(&b.star_count),
        }
    }
}

fn fold(name: &str) -> String {
    name.to_lowercase()
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown sort key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sort option '{0}' (expected one of: date-desc, date-asc, name-asc, name-desc, stars-desc, stars-asc)")]
pub struct ParseSortOptionError(String);

impl FromStr for SortOption {
    type Err = ParseSortOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|option| option.as_str() == wanted)
            .ok_or_else(|| ParseSortOptionError(s.to_string()))
    }
}

/// Invalid move input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderingError {
    #[error("source index {index} is out of bounds for a list of {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("destination {destination} is out of bounds for a list of {len}")]
    DestinationOutOfBounds { destination: usize, len: usize },
}

/// Set each record's position to its index.
pub fn renumber(records: &mut [FavoriteRecord]) {
    for (position, record) in records.iter_mut().enumerate() {
        record.sort_order = position as i32;
    }
}

/// Stable-sort by `option`, then renumber. Ties keep their prior relative order.
pub fn sort_records(records: &mut [FavoriteRecord], option: SortOption) {
    records.sort_by(|a, b| option.compare(a, b));
    renumber(records);
}

/// Move the items at `sources` so they land before `destination`.
///
/// `destination` is an index into the list as it was before the move and may
/// equal `len` to mean "the end". Moved items keep their relative order.
/// Duplicate source indices are ignored.
///
/// Returns `Ok(false)` when the move would not change the list (including an
/// empty selection), leaving `items` untouched. Out-of-range input is
/// rejected without mutating anything.
pub fn move_items<T>(
    items: &mut Vec<T>,
    sources: &[usize],
    destination: usize,
) -> Result<bool, OrderingError> {
    let len = items.len();
    if let Some(&index) = sources.iter().find(|&&index| index >= len) {
        return Err(OrderingError::IndexOutOfBounds { index, len });
    }
    if destination > len {
        return Err(OrderingError::DestinationOutOfBounds { destination, len });
    }

    let mut sources = sources.to_vec();
    sources.sort_unstable();
    sources.dedup();
    let Some(&first) = sources.first() else {
        return Ok(false);
    };

    let insert_at = destination - sources.iter().filter(|&&index| index < destination).count();
    let contiguous = sources.windows(2).all(|pair| pair[1] == pair[0] + 1);
    if contiguous && insert_at == first {
        return Ok(false);
    }

    let mut moved: Vec<T> = sources.iter().rev().map(|&index| items.remove(index)).collect();
    moved.reverse();
    let tail = items.split_off(insert_at);
    items.extend(moved);
    items.extend(tail);
    Ok(true)
}
