//! Row ordering for the table view.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::schema::ID_KEY;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// The opposite direction.
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl std::str::FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            _ => Err(format!("Unknown sort direction: {}", s)),
        }
    }
}

/// Column sort: a field (`id` or a slot key) and a direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortConfig {
    pub field: String,
    pub direction: SortDirection,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            field: ID_KEY.to_string(),
            direction: SortDirection::Asc,
        }
    }
}

/// Sort by group-tag values instead of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GroupSortConfig {
    pub enabled: bool,
    pub direction: SortDirection,
}

/// Compare two cell values: numerically when both are numbers, else as text.
pub fn compare_values(a: &str, b: &str) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    match (parse_number(a), parse_number(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.cmp(b),
    }
}

/// Compare the sorted group values of two records, element by element.
///
/// A missing element counts as the empty string. Ascending order puts larger
/// values, and so tagged records, before untagged ones.
pub fn compare_groups(a: &[&str], b: &[&str], direction: SortDirection) -> Ordering {
    for index in 0..a.len().max(b.len()) {
        let left = a.get(index).copied().unwrap_or_default();
        let right = b.get(index).copied().unwrap_or_default();
        if left != right {
            return direction.apply(right.cmp(left));
        }
    }
    Ordering::Equal
}

/// Compare two cell values in a direction.
pub fn compare_directed(a: &str, b: &str, direction: SortDirection) -> Ordering {
    direction.apply(compare_values(a, b))
}

fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| !n.is_nan())
}
