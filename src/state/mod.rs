//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `WalkState`: The pagination state machine (fetch, extract, check next, done)
//! - `AuthorCache`: The run-scoped set of author URLs already resolved

mod author_cache;
mod walk_state;

// Re-export main types
pub use author_cache::AuthorCache;
pub use walk_state::WalkState;
