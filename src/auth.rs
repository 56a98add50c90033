// Registration, login and logout flows

use crate::api::{ApiError, RentalApi};
use crate::models::User;
use crate::navigation::Route;
use crate::session::SessionStore;
use crate::validation::{LoginForm, RegisterForm, ValidationErrors};
use thiserror::Error;
use tracing::{info, warn};

pub const REGISTRATION_FAILED_MESSAGE: &str = "Registration failed. Please try again.";
pub const LOGIN_FAILED_MESSAGE: &str = "Login failed. Please check your credentials.";

#[derive(Error, Debug)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("{message}")]
    Api {
        message: String,
        #[source]
        source: ApiError,
    },
}

impl AuthError {
    fn from_api(source: ApiError, fallback: &str) -> Self {
        let message = source.user_message().unwrap_or(fallback).to_string();
        AuthError::Api { message, source }
    }
}

/// Create an account. The new user is sent to the login page rather than
/// being signed in.
pub async fn register<A: RentalApi + ?Sized>(
    api: &A,
    form: &RegisterForm,
) -> Result<Route, AuthError> {
    let request = form.to_request()?;

    match api.register(&request).await {
        Ok(response) => {
            info!(user_id = response.user.user_id, "account registered");
            Ok(Route::Login)
        }
        Err(e) => {
            warn!(error = %e, "registration failed");
            Err(AuthError::from_api(e, REGISTRATION_FAILED_MESSAGE))
        }
    }
}

pub async fn login<A: RentalApi + ?Sized>(
    api: &A,
    session: &SessionStore,
    form: &LoginForm,
) -> Result<User, AuthError> {
    let request = form.to_request()?;

    let response = api.login(&request).await.map_err(|e| {
        warn!(error = %e, "login failed");
        AuthError::from_api(e, LOGIN_FAILED_MESSAGE)
    })?;

    session.login(response.user.clone(), response.token);
    Ok(response.user)
}

pub fn logout(session: &SessionStore) -> Route {
    session.logout();
    Route::Landing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock_api::MockRentalApi;
    use crate::session::{KeyValueStorage, MemoryStorage, TOKEN_KEY};
    use std::sync::Arc;
    use tokio_test::{assert_err, assert_ok};

    fn registration(email: &str) -> RegisterForm {
        RegisterForm {
            email: email.to_string(),
            password: "secret1".to_string(),
            username: "newbie".to_string(),
            full_name: "New Customer".to_string(),
            phone: "5550001234".to_string(),
            license_number: "LIC-99999".to_string(),
            address: "42 Elm Street".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_sends_user_to_login() {
        let api = MockRentalApi::new();
        let route = assert_ok!(register(&api, &registration("new@example.com")).await);
        assert_eq!(route, Route::Login);
    }

    #[tokio::test]
    async fn test_register_surfaces_server_message() {
        let api = MockRentalApi::new();
        api.add_account("taken@example.com", "secret1");

        let err = assert_err!(register(&api, &registration("taken@example.com")).await);
        assert_eq!(err.to_string(), "Email already registered");
    }

    #[tokio::test]
    async fn test_register_network_failure_uses_generic_message() {
        let api = MockRentalApi::new();
        api.set_network_down(true);

        let err = assert_err!(register(&api, &registration("new@example.com")).await);
        assert_eq!(err.to_string(), REGISTRATION_FAILED_MESSAGE);
    }

    #[tokio::test]
    async fn test_invalid_form_never_reaches_network() {
        let api = MockRentalApi::new();
        api.set_network_down(true);

        let mut form = registration("new@example.com");
        form.username = "ab".to_string();
        let err = assert_err!(register(&api, &form).await);

        match err {
            AuthError::Validation(errors) => {
                assert_eq!(
                    errors.for_field("username"),
                    Some("Username must be at least 3 characters")
                )
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_login_persists_session() {
        let api = MockRentalApi::new();
        api.add_account("ann@example.com", "secret1");
        let storage = Arc::new(MemoryStorage::new());
        let session = SessionStore::hydrate(Box::new(storage.clone()));

        let user = assert_ok!(login(&api, &session, &LoginForm::new("ann@example.com", "secret1")).await);

        assert_eq!(user.email, "ann@example.com");
        assert!(session.is_authenticated());
        assert!(storage.get(TOKEN_KEY).unwrap().is_some());

        assert_eq!(logout(&session), Route::Landing);
        assert!(!session.is_authenticated());
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_bad_credentials_leave_session_empty() {
        let api = MockRentalApi::new();
        api.add_account("ann@example.com", "secret1");
        let session = SessionStore::in_memory();

        let err = assert_err!(login(&api, &session, &LoginForm::new("ann@example.com", "wrong")).await);

        assert_eq!(err.to_string(), "Invalid email or password");
        assert!(!session.is_authenticated());
    }
}
