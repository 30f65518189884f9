use shared::protocol::{LoginForm, LoginSession};
use tracing::{error, info};
use validator::Validate;

use crate::{error::FormError, http::ApiClient, notice::Notifier};

/// Validates the login form and exchanges it for a session. Keeping the
/// returned token is up to the caller.
pub async fn login(
    client: &ApiClient,
    notifier: &Notifier,
    form: &LoginForm,
) -> Result<LoginSession, FormError> {
    form.validate()?;

    match client.login(form).await {
        Ok(session) => {
            info!(user = %session.user.id, "logged in");
            notifier.success("Login successful");
            Ok(session)
        }
        Err(err) => {
            let message = err.user_message("Login failed, please check your credentials.");
            error!(error = %err, "login failed");
            notifier.error(message.clone());
            Err(FormError::Remote {
                message,
                source: err,
            })
        }
    }
}

#[cfg(test)]
#[path = "tests/auth_tests.rs"]
mod tests;
