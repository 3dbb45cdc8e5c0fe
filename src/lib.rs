//! Ordered, dually-indexed list of element identities for list views.
//!
//! [`PointerList`] keeps identities in a stable order, answers "where is this
//! element" in O(1), can maintain a comparator-defined order, tracks a current
//! element for sequential playback, and reports every structural change to
//! observers precisely enough for a view to update incrementally.

pub mod config;
pub mod core;
pub mod model;
pub mod sequence;
pub mod snapshot;
pub mod store;

pub use crate::core::{PointerList, Position};
pub use crate::model::{DropPosition, ListEvent, ObserverId, SortFn};
pub use crate::snapshot::ListSnapshot;
