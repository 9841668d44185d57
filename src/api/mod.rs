//! Collaborators the run depends on: token acquisition and the target API.
mod auth;
mod client;

use async_trait::async_trait;

use crate::context::{CallContext, CallOutcome};
use crate::error::AuthError;

pub use auth::{OAuthAuthenticator, OAuthGrant, StaticAuthenticator};
pub use client::{
    ApiEndpoints, CAUSE_500_HEADER, COMPANY_ID_PLACEHOLDER, CORRELATION_ID_HEADER, ReqwestApiClient,
    SESSION_ID_HEADER,
};

/// Hands out access tokens for the run.
#[async_trait]
pub trait Authenticator: Send {
    /// Prepares the authenticator. Called once before any token is requested.
    ///
    /// # Errors
    ///
    /// Returns an error when the authenticator is misconfigured.
    async fn initialise(&mut self) -> Result<(), AuthError>;

    /// Acquires one access token.
    ///
    /// # Errors
    ///
    /// Returns an error when the token source refuses or cannot be reached.
    async fn access_token(&mut self) -> Result<String, AuthError>;
}

/// The target API. Every method resolves to an outcome; none of them fail.
#[async_trait]
pub trait ApiClient: Send + Sync {
    async fn user_info(&self, token: &str, context: &CallContext) -> CallOutcome;

    async fn companies(&self, token: &str, context: &CallContext) -> CallOutcome;

    async fn company_transactions(
        &self,
        token: &str,
        context: &CallContext,
        company_id: &str,
    ) -> CallOutcome;
}
