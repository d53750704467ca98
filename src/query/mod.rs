//! Outbound query shaping: filter trees and sort specs.

mod filter;
mod sort;

pub use filter::{
    FilterOperator, FilterPropertyType, NotionFilterContainer, NotionFilterEntry,
    NotionFilterGrouping, NotionFilterOption, NotionFilterRollup, RollupAggregate,
};
pub use sort::{NotionSortProperty, SortDirection};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("Filter group '{group}' references unknown group '{referenced}'")]
    UnknownGroup { group: String, referenced: String },

    #[error("Rollup filter on '{0}' has no rollup criterion")]
    MissingRollup(String),

    #[error("Rollup filter on '{0}' cannot target another rollup")]
    NestedRollup(String),

    #[error("Filter on '{0}' has no condition")]
    MissingCondition(String),
}
