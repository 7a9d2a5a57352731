//! OAuth2-style bearer token with lazy refresh

use chrono::Utc;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use url::Url;
use crate::api::{Body, RetryClient};
use crate::error::Result;
use super::Credentials;

#[derive(Deserialize, Debug)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    expires_in: i64,
}

#[derive(Default)]
struct TokenState {
    access_token: Option<String>,
    refresh_token: Option<String>,
    /// Absolute expiry, epoch seconds
    expiration_time: Option<i64>,
}

impl TokenState {
    fn is_expired(&self) -> bool {
        match self.expiration_time {
            Some(expiration) => Utc::now().timestamp() > expiration,
            None => true,
        }
    }
}

/// Bearer token handler
///
/// Clones share the same token state, so one refresh serves every
/// clone of the session. The state lock is held for the whole exchange,
/// which keeps concurrent callers from refreshing twice.
#[derive(Clone)]
pub struct OAuthToken {
    url: Url,
    credentials: Credentials,
    http: RetryClient,
    state: Arc<Mutex<TokenState>>,
}

impl fmt::Debug for OAuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthToken")
            .field("url", &self.url.as_str())
            .field("credentials", &self.credentials)
            .finish()
    }
}

impl OAuthToken {
    /// Creates an empty token bound to the token service at `url`
    ///
    /// No request is made until the first call to [`OAuthToken::access_token`].
    pub fn new(url: &str, credentials: Credentials, http: RetryClient) -> Result<Self> {
        Ok(Self {
            url: Url::parse(url)?,
            credentials,
            http,
            state: Arc::new(Mutex::new(TokenState::default())),
        })
    }

    /// True if no token was obtained yet or its lifetime has passed
    pub async fn is_expired(&self) -> bool {
        self.state.lock().await.is_expired()
    }

    /// Returns a valid access token, exchanging credentials if needed
    pub async fn access_token(&self) -> Result<String> {
        let mut state = self.state.lock().await;
        if state.is_expired() {
            log::debug!("Token expired or invalid. Requesting a new one.");
            self.set_token(&mut state).await?;
        }
        // set_token always stores an access token on success
        Ok(state.access_token.clone().unwrap_or_default())
    }

    /// Forces the next access to repeat the exchange
    pub async fn invalidate(&self) {
        self.state.lock().await.expiration_time = None;
    }

    async fn set_token(&self, state: &mut TokenState) -> Result<()> {
        let response = match state.refresh_token.clone() {
            Some(refresh_token) => {
                let response = self.refresh_token(refresh_token).await?;
                if matches!(
                    response.status(),
                    StatusCode::FORBIDDEN | StatusCode::BAD_REQUEST
                ) {
                    log::debug!("Refresh token rejected, falling back to credentials");
                    self.get_token().await?
                } else {
                    response
                }
            }
            None => self.get_token().await?,
        };

        let response = RetryClient::check_status(response).await?;
        let data: TokenResponse = response.json().await?;

        state.access_token = Some(data.access_token);
        state.refresh_token = data.refresh_token;
        state.expiration_time = Some(Utc::now().timestamp() + data.expires_in);
        Ok(())
    }

    async fn get_token(&self) -> Result<reqwest::Response> {
        let url = self.url.join("gettoken")?;
        let body = Body::Json(serde_json::json!({
            "username": self.credentials.username,
            "password": self.credentials.password,
        }));
        self.http.send_raw(Method::POST, url.as_str(), None, &body).await
    }

    async fn refresh_token(&self, refresh_token: String) -> Result<reqwest::Response> {
        let url = self.url.join("refreshtoken")?;
        let body = Body::Form(vec![("refresh_token".to_string(), refresh_token)]);
        self.http.send_raw(Method::POST, url.as_str(), None, &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_expired() {
        assert!(TokenState::default().is_expired());
    }

    #[test]
    fn test_state_expiry() {
        let mut state = TokenState::default();
        state.expiration_time = Some(Utc::now().timestamp() + 60);
        assert!(!state.is_expired());

        state.expiration_time = Some(Utc::now().timestamp() - 1);
        assert!(state.is_expired());
    }

    #[tokio::test]
    async fn test_invalidate() {
        let http = RetryClient::new(0, 0.0).unwrap();
        let credentials = Credentials::new("u", "p").unwrap();
        let token = OAuthToken::new("http://localhost/token/", credentials, http).unwrap();

        token.state.lock().await.expiration_time = Some(Utc::now().timestamp() + 60);
        assert!(!token.is_expired().await);

        token.invalidate().await;
        assert!(token.is_expired().await);
    }
}
