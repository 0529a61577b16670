//! # Engine
//!
//! The pure core of a resource page:
//!
//! - [`query`]: search, filters, sort and pagination over a record slice
//! - [`selection`]: ids checked for bulk actions
//! - [`state`]: the single reducer tying the two together
//!
//! Nothing in here performs I/O, and nothing returns an error. Malformed input
//! degrades to "no match" or an ignored action.

pub mod query;
pub mod selection;
pub mod state;

pub use query::{
    compute_visible, paginate, total_pages, PageSlice, PaginationState, QueryState,
    SortDirection, SortSpec,
};
pub use selection::Selection;
pub use state::{Action, ViewState};
