use std::sync::Arc;

use tracing::{debug, error, info};
use validator::Validate;

use crate::{
    error::FormError,
    list::ListController,
    notice::Notifier,
    resource::{RemoteResource, Resource},
};

/// Creation form submission for one resource type. A successful create
/// refreshes the owning list instead of inserting the new record locally,
/// so ordering and totals always come from the server.
pub struct CreateFlow<R: Resource> {
    remote: Arc<dyn RemoteResource<R>>,
    notifier: Notifier,
    list: Arc<ListController<R>>,
}

impl<R: Resource> CreateFlow<R> {
    pub fn new(
        remote: Arc<dyn RemoteResource<R>>,
        notifier: Notifier,
        list: Arc<ListController<R>>,
    ) -> Self {
        Self {
            remote,
            notifier,
            list,
        }
    }

    pub async fn submit(&self, payload: R::Create) -> Result<R::Detail, FormError> {
        if let Err(errors) = payload.validate() {
            debug!(resource = R::LABEL, %errors, "create form rejected locally");
            return Err(FormError::Validation(errors));
        }

        match self.remote.create(&payload).await {
            Ok(created) => {
                info!(resource = R::LABEL, "record created");
                self.notifier.success(format!("The {} was created", R::LABEL));
                self.list.refresh().await;
                Ok(created)
            }
            Err(err) => {
                let message = err.user_message(&format!("Failed to create {}", R::LABEL));
                error!(resource = R::LABEL, error = %err, "create failed");
                self.notifier.error(message.clone());
                Err(FormError::Remote {
                    message,
                    source: err,
                })
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/create_tests.rs"]
mod tests;
