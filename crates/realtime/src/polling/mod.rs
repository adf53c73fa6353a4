//! Chat thread polling
//!
//! Paginated, filterable fetching of chat threads over REST, with an
//! optional background refresh loop for elevated roles. The view state
//! follows a last-write-wins policy: concurrent fetches are not
//! sequenced, and whichever response lands last is the one displayed.

pub mod coordinator;
pub mod divisions;
pub mod filters;

pub use coordinator::{ChatPoller, PollerOptions, ThreadView};
pub use divisions::DivisionDirectory;
pub use filters::{FilterPatch, ThreadFilters};
