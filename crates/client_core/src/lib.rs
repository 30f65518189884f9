//! Controllers behind the back-office console: paginated lists, single
//! entity detail/edit, and creation forms, generic over the managed
//! resource type.

use std::sync::atomic::{AtomicUsize, Ordering};

pub mod auth;
pub mod create;
pub mod detail;
pub mod error;
pub mod http;
pub mod list;
mod merge;
pub mod notice;
pub mod resource;

pub use auth::login;
pub use create::CreateFlow;
pub use detail::{DetailController, DetailState};
pub use error::{ClientError, FormError};
pub use http::ApiClient;
pub use list::{ListController, ListState, PaginationView, ResponseOrdering};
pub use notice::{Notice, NoticeLevel, Notifier};
pub use resource::{Courses, Events, News, Orders, RemoteResource, Resource, Users};

/// Result of one controller operation, for callers that need to know what
/// happened beyond the state change itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Preconditions not met (no bound id, already activated); nothing was sent.
    Skipped,
    Succeeded,
    Failed,
    /// The response arrived after a newer request and was dropped.
    Discarded,
}

/// Counts an operation as in flight until dropped, so the loading flag is
/// restored on every exit path, including cancellation.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
