//! Pagination walk states
//!
//! The walker moves through `Start -> FetchPage(1) -> ExtractPage(1) ->
//! CheckNext(1) -> FetchPage(2) -> ... -> Done`. The page index travels
//! with the state so a transition can be validated on its own.

use crate::CrawlError;
use std::fmt;

/// Represents the current position of the pagination walker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WalkState {
    /// Nothing fetched yet
    Start,

    /// Fetching listing page `n`
    FetchPage(u32),

    /// Extracting quotes and resolving authors of page `n`
    ExtractPage(u32),

    /// Looking for the next page affordance on page `n`
    CheckNext(u32),

    /// The last page has been processed
    Done,
}

impl WalkState {
    /// Returns true once the walk has finished
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns the page index this state refers to, if any
    pub fn page(&self) -> Option<u32> {
        match self {
            Self::FetchPage(n) | Self::ExtractPage(n) | Self::CheckNext(n) => Some(*n),
            Self::Start | Self::Done => None,
        }
    }

    /// Checks whether moving from `self` to `next` is a legal step
    pub fn can_transition_to(&self, next: &WalkState) -> bool {
        match (self, next) {
            (Self::Start, Self::FetchPage(1)) => true,
            (Self::FetchPage(a), Self::ExtractPage(b)) => a == b,
            (Self::ExtractPage(a), Self::CheckNext(b)) => a == b,
            (Self::CheckNext(a), Self::FetchPage(b)) => a.checked_add(1) == Some(*b),
            (Self::CheckNext(_), Self::Done) => true,
            _ => false,
        }
    }

    /// Performs a validated transition
    ///
    /// # Returns
    ///
    /// * `Ok(WalkState)` - The new state
    /// * `Err(CrawlError::InvalidTransition)` - The step is not part of the walk
    pub fn transition(self, next: WalkState) -> Result<WalkState, CrawlError> {
        if self.can_transition_to(&next) {
            Ok(next)
        } else {
            Err(CrawlError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }
}

impl fmt::Display for WalkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::FetchPage(n) => write!(f, "fetch_page({})", n),
            Self::ExtractPage(n) => write!(f, "extract_page({})", n),
            Self::CheckNext(n) => write!(f, "check_next({})", n),
            Self::Done => write!(f, "done"),
        }
    }
}
