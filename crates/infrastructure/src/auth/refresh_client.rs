//! Client for the backend's token refresh endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use sgdis_application::ports::{HttpClientError, RefreshError, RefreshedToken, TokenRefresher};
use sgdis_domain::{REFRESH_TOKEN_COOKIE, SessionConfig};
use tracing::debug;
use url::Url;

use crate::adapters::{map_error, parse_base_url};

/// Refresh endpoint response. The backend answers with `accessToken`;
/// older deployments used `jwt`.
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    #[serde(default, rename = "accessToken")]
    access_token: Option<String>,
    #[serde(default)]
    jwt: Option<String>,
}

impl RefreshResponse {
    fn into_token(self) -> Option<String> {
        self.access_token
            .filter(|t| !t.is_empty())
            .or_else(|| self.jwt.filter(|t| !t.is_empty()))
    }
}

/// Exchanges the refresh token over HTTP.
///
/// Redirects are not followed so an expired session cannot be bounced to a
/// login page that answers 200.
#[derive(Debug, Clone)]
pub struct HttpTokenRefresher {
    http_client: Client,
    endpoint: Url,
    timeout: Duration,
}

impl HttpTokenRefresher {
    /// Creates a refresher posting to `refresh_path` on `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint URL is invalid or the client cannot
    /// be created.
    pub fn new(
        base_url: &str,
        refresh_path: &str,
        timeout: Duration,
    ) -> Result<Self, HttpClientError> {
        let endpoint = parse_base_url(base_url)?
            .join(refresh_path)
            .map_err(|e| HttpClientError::InvalidUrl(format!("{e}: {refresh_path}")))?;

        let http_client = Client::builder()
            .user_agent(concat!("sgdis/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| HttpClientError::Other(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint,
            timeout,
        })
    }

    /// Creates a refresher from session settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint URL is invalid.
    pub fn from_config(config: &SessionConfig) -> Result<Self, HttpClientError> {
        Self::new(
            &config.api_base_url,
            &config.refresh_path,
            config.request_timeout(),
        )
    }

    /// The refresh endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl TokenRefresher for HttpTokenRefresher {
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshedToken, RefreshError> {
        debug!(endpoint = %self.endpoint, "Requesting new access token");

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .timeout(self.timeout)
            .header(COOKIE, format!("{REFRESH_TOKEN_COOKIE}={refresh_token}"))
            .json(&json!({ "refreshToken": refresh_token }))
            .send()
            .await
            .map_err(|e| RefreshError::Network(map_error(&e, self.timeout).to_string()))?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(RefreshError::Rejected {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(RefreshError::Server {
                status: status.as_u16(),
            });
        }

        let set_cookies: Vec<String> = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok().map(str::to_string))
            .collect();

        let body: RefreshResponse = response
            .json()
            .await
            .map_err(|e| RefreshError::MalformedResponse(e.to_string()))?;

        let access_token = body.into_token().ok_or_else(|| {
            RefreshError::MalformedResponse("response carries no access token".to_string())
        })?;

        Ok(RefreshedToken {
            access_token,
            set_cookies,
        })
    }
}
