use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::{
    merge::shallow_merge,
    notice::Notifier,
    resource::{RemoteResource, Resource},
    InFlight, Outcome,
};

#[derive(Debug, Clone, PartialEq)]
pub struct DetailState<I, D> {
    pub id: Option<I>,
    pub snapshot: Option<D>,
    pub loading: bool,
    pub error: Option<String>,
}

struct DetailInner<I, D> {
    id: Option<I>,
    snapshot: Option<D>,
    error: Option<String>,
}

/// Load/edit/delete lifecycle of a single record. Every operation is a
/// silent no-op while no id is bound.
pub struct DetailController<R: Resource> {
    remote: Arc<dyn RemoteResource<R>>,
    notifier: Notifier,
    inner: Mutex<DetailInner<R::Id, R::Detail>>,
    in_flight: AtomicUsize,
}

impl<R: Resource> DetailController<R> {
    pub fn new(remote: Arc<dyn RemoteResource<R>>, notifier: Notifier, id: Option<R::Id>) -> Self {
        Self {
            remote,
            notifier,
            inner: Mutex::new(DetailInner {
                id,
                snapshot: None,
                error: None,
            }),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Points the controller at another record. The previous snapshot and
    /// error belong to the old id and are dropped.
    pub async fn bind(&self, id: Option<R::Id>) {
        let mut inner = self.inner.lock().await;
        if inner.id == id {
            return;
        }
        inner.id = id;
        inner.snapshot = None;
        inner.error = None;
    }

    pub async fn unbind(&self) {
        self.bind(None).await;
    }

    pub async fn load(&self) -> Outcome {
        let Some(id) = self.begin().await else {
            return Outcome::Skipped;
        };
        let _in_flight = InFlight::enter(&self.in_flight);
        debug!(resource = R::LABEL, %id, "loading record");

        let result = self.remote.get(&id).await;

        let mut inner = self.inner.lock().await;
        if inner.id.as_ref() != Some(&id) {
            debug!(resource = R::LABEL, %id, "discarding load for unbound id");
            return Outcome::Discarded;
        }
        match result {
            Ok(detail) => {
                inner.snapshot = Some(detail);
                Outcome::Succeeded
            }
            Err(err) => {
                let message = err.user_message(&format!("Failed to fetch {} data.", R::LABEL));
                error!(resource = R::LABEL, %id, error = %err, "load failed");
                self.notifier.error(message.clone());
                inner.error = Some(message);
                Outcome::Failed
            }
        }
    }

    /// Sends a partial update. On success the payload, not the server's
    /// response, is merged into the local snapshot; derived fields the
    /// server recomputes stay stale until the next [`load`](Self::load).
    /// Without a loaded snapshot there is nothing to merge into, so the
    /// snapshot stays empty; a partial payload is not a full record.
    pub async fn update(&self, payload: R::Update) -> Outcome {
        let Some(id) = self.begin().await else {
            return Outcome::Skipped;
        };
        let _in_flight = InFlight::enter(&self.in_flight);
        debug!(resource = R::LABEL, %id, "updating record");

        let result = self.remote.update(&id, &payload).await;

        let mut inner = self.inner.lock().await;
        if inner.id.as_ref() != Some(&id) {
            debug!(resource = R::LABEL, %id, "discarding update for unbound id");
            return Outcome::Discarded;
        }
        match result {
            Ok(_) => {
                if let Some(current) = inner.snapshot.as_ref() {
                    match shallow_merge(current, &payload) {
                        Ok(merged) => inner.snapshot = Some(merged),
                        Err(err) => {
                            warn!(resource = R::LABEL, %id, error = %err, "could not merge update into snapshot")
                        }
                    }
                }
                info!(resource = R::LABEL, %id, "record updated");
                self.notifier.success("Update successful");
                Outcome::Succeeded
            }
            Err(err) => {
                let message = err.user_message("Update failed, please try again later.");
                error!(resource = R::LABEL, %id, error = %err, "update failed");
                self.notifier.error(message.clone());
                inner.error = Some(message);
                Outcome::Failed
            }
        }
    }

    /// Deletes the bound record. The snapshot is kept; the caller navigates
    /// away or refreshes the owning list.
    pub async fn remove(&self) -> Outcome {
        let Some(id) = self.begin().await else {
            return Outcome::Skipped;
        };
        let _in_flight = InFlight::enter(&self.in_flight);
        debug!(resource = R::LABEL, %id, "deleting record");

        let result = self.remote.delete(&id).await;

        let mut inner = self.inner.lock().await;
        match result {
            Ok(()) => {
                info!(resource = R::LABEL, %id, "record deleted");
                self.notifier.success("Delete successful");
                Outcome::Succeeded
            }
            Err(err) => {
                let message = err.user_message("Delete failed, please try again later.");
                error!(resource = R::LABEL, %id, error = %err, "delete failed");
                self.notifier.error(message.clone());
                if inner.id.as_ref() == Some(&id) {
                    inner.error = Some(message);
                }
                Outcome::Failed
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub async fn state(&self) -> DetailState<R::Id, R::Detail> {
        let inner = self.inner.lock().await;
        DetailState {
            id: inner.id.clone(),
            snapshot: inner.snapshot.clone(),
            loading: self.is_loading(),
            error: inner.error.clone(),
        }
    }

    /// Bound id with the previous error cleared, or `None` when there is
    /// nothing to operate on.
    async fn begin(&self) -> Option<R::Id> {
        let mut inner = self.inner.lock().await;
        let id = inner.id.clone()?;
        inner.error = None;
        Some(id)
    }
}

#[cfg(test)]
#[path = "tests/detail_tests.rs"]
mod tests;
