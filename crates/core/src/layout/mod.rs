//! Layout structuring: region matching, row clustering, tables.

pub mod matcher;
pub mod rows;
pub mod table;
pub mod types;

pub use matcher::{ConflictResolver, MatchedRegion, NoResolution, match_regions, match_regions_with};
pub use rows::{cluster_rows, sort_reading_order};
pub use types::{DocumentLayout, LogicalTable, Region, RegionBlock, RegionLabel, Row, Token};
