//! Table view: what the user sees of the working records.

mod sort;
mod table;

pub use sort::{
    GroupSortConfig, SortConfig, SortDirection, compare_directed, compare_groups, compare_values,
};
pub use table::TableView;
