//! Authentication and account operations.
//!
//! Login and signup store the returned token set in the session store;
//! logout clears it. Password verification is entirely backend-side.

use serde::Serialize;
use tracing::debug;

use orbitcart_core::Email;

use crate::error::ApiError;
use crate::http::ApiClient;
use crate::models::{AccountUpdate, AuthResponse, User};
use crate::session::TokenSet;

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct SignupRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

impl ApiClient {
    /// Log in with email and password.
    ///
    /// On success the returned token set and user id are written to the
    /// session store, so subsequent requests are authenticated.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` on bad credentials, or any transport
    /// error.
    pub async fn login(&self, email: &Email, password: &str) -> Result<User, ApiError> {
        let response: AuthResponse = self
            .post_json(
                "auth/login",
                &LoginRequest {
                    email: email.as_str(),
                    password,
                },
            )
            .await?;

        self.store_auth(&response);
        debug!(user_id = %response.user.id, "logged in");
        Ok(response.user)
    }

    /// Create an account and log in.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the signup or the request
    /// fails.
    pub async fn signup(
        &self,
        name: &str,
        email: &Email,
        password: &str,
    ) -> Result<User, ApiError> {
        let response: AuthResponse = self
            .post_json(
                "auth/signup",
                &SignupRequest {
                    name,
                    email: email.as_str(),
                    password,
                },
            )
            .await?;

        self.store_auth(&response);
        debug!(user_id = %response.user.id, "signed up");
        Ok(response.user)
    }

    /// Log out: clear the session store.
    ///
    /// Server-side revocation is attempted but best-effort; the local
    /// session is cleared regardless of the outcome.
    pub async fn logout(&self) {
        if let Err(err) = self
            .post_no_content("auth/logout", &serde_json::json!({}))
            .await
        {
            debug!(error = %err, "server-side logout failed (ignored)");
        }
        self.session().clear();
    }

    /// Fetch the authenticated user's account.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` when not logged in.
    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.get_json("account").await
    }

    /// Update the authenticated user's account.
    ///
    /// # Errors
    ///
    /// Returns an error if the update is rejected or the request fails.
    pub async fn update_account(&self, update: &AccountUpdate) -> Result<User, ApiError> {
        self.put_json("account", update).await
    }

    fn store_auth(&self, response: &AuthResponse) {
        self.session().store(TokenSet::new(
            response.access_token.clone(),
            response.refresh_token.clone(),
            response.session_id.clone(),
        ));
        self.session().set_user_id(Some(response.user.id));
    }
}
