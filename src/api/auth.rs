use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{AppError, AppResult, AuthError, HttpSetupError};

use super::Authenticator;

/// Longest token-endpoint body excerpt kept on a rejection.
const BODY_EXCERPT_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OAuthGrant {
    ClientCredentials,
    /// Rotated in place whenever the provider returns a new refresh token.
    RefreshToken(String),
}

impl OAuthGrant {
    const fn grant_type(&self) -> &'static str {
        match self {
            OAuthGrant::ClientCredentials => "client_credentials",
            OAuthGrant::RefreshToken(_) => "refresh_token",
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_in: Option<u64>,
}

/// Acquires tokens from an OAuth 2.0 token endpoint.
#[derive(Debug)]
pub struct OAuthAuthenticator {
    client: Client,
    token_url: String,
    resolved_url: Option<Url>,
    client_id: String,
    client_secret: Option<String>,
    scope: Option<String>,
    grant: OAuthGrant,
    issued: usize,
}

impl OAuthAuthenticator {
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn new(
        token_url: String,
        client_id: String,
        client_secret: Option<String>,
        scope: Option<String>,
        grant: OAuthGrant,
        timeout: Duration,
    ) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AppError::http(HttpSetupError::BuildClientFailed { source: err }))?;
        Ok(Self {
            client,
            token_url,
            resolved_url: None,
            client_id,
            client_secret,
            scope,
            grant,
            issued: 0,
        })
    }

    #[must_use]
    pub const fn grant(&self) -> &OAuthGrant {
        &self.grant
    }

    fn form(&self) -> Vec<(&'static str, String)> {
        let mut form = vec![
            ("grant_type", self.grant.grant_type().to_owned()),
            ("client_id", self.client_id.clone()),
        ];
        if let Some(secret) = self.client_secret.as_ref() {
            form.push(("client_secret", secret.clone()));
        }
        if let Some(scope) = self.scope.as_ref() {
            form.push(("scope", scope.clone()));
        }
        if let OAuthGrant::RefreshToken(refresh_token) = &self.grant {
            form.push(("refresh_token", refresh_token.clone()));
        }
        form
    }
}

#[async_trait]
impl Authenticator for OAuthAuthenticator {
    async fn initialise(&mut self) -> Result<(), AuthError> {
        let url = Url::parse(&self.token_url).map_err(|err| AuthError::InvalidTokenUrl {
            url: self.token_url.clone(),
            source: err,
        })?;
        debug!(token_url = %url, grant = self.grant.grant_type(), "OAuth authenticator ready");
        self.resolved_url = Some(url);
        Ok(())
    }

    async fn access_token(&mut self) -> Result<String, AuthError> {
        let url = self
            .resolved_url
            .clone()
            .ok_or(AuthError::NotInitialised)?;

        let response = self
            .client
            .post(url)
            .form(&self.form())
            .send()
            .await
            .map_err(|err| AuthError::TokenRequestFailed { source: err })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::TokenRejected {
                status: status.as_u16(),
                body: body.trim().chars().take(BODY_EXCERPT_CHARS).collect(),
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|err| AuthError::TokenResponseInvalid { source: err })?;

        if let (OAuthGrant::RefreshToken(current), Some(rotated)) =
            (&mut self.grant, token.refresh_token)
        {
            *current = rotated;
        }

        let access_token = token
            .access_token
            .filter(|value| !value.is_empty())
            .ok_or(AuthError::MissingAccessToken)?;
        self.issued = self.issued.saturating_add(1);
        info!(
            issued = self.issued,
            expires_in = token.expires_in,
            "Acquired access token"
        );
        Ok(access_token)
    }
}

/// Hands out a fixed list of tokens, in order.
#[derive(Debug, Clone, Default)]
pub struct StaticAuthenticator {
    tokens: Vec<String>,
    next: usize,
}

impl StaticAuthenticator {
    #[must_use]
    pub const fn new(tokens: Vec<String>) -> Self {
        Self { tokens, next: 0 }
    }
}

#[async_trait]
impl Authenticator for StaticAuthenticator {
    async fn initialise(&mut self) -> Result<(), AuthError> {
        self.next = 0;
        Ok(())
    }

    async fn access_token(&mut self) -> Result<String, AuthError> {
        let token = self
            .tokens
            .get(self.next)
            .cloned()
            .ok_or(AuthError::TokenPoolExhausted { issued: self.next })?;
        self.next = self.next.saturating_add(1);
        Ok(token)
    }
}
