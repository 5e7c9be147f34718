//! HTTP middleware attaching and renewing the bearer token.

use async_trait::async_trait;
use serde_json::Value;
use sgdis_domain::auth::bearer;
use sgdis_domain::{ApiRequest, ApiResponse};
use tracing::{debug, info, warn};

use super::{LogoutReason, SessionManager};
use crate::error::{SessionError, SessionResult};
use crate::ports::{HttpClient, HttpClientError};

/// Wraps a transport so every call into the API namespace is authenticated.
///
/// Requests outside the namespace, and calls to the refresh endpoint itself,
/// are forwarded untouched.
#[derive(Debug)]
pub struct AuthenticatedClient<C> {
    inner: C,
    session: SessionManager,
}

impl<C: HttpClient> AuthenticatedClient<C> {
    /// Wraps `inner`.
    #[must_use]
    pub const fn new(inner: C, session: SessionManager) -> Self {
        Self { inner, session }
    }

    /// The session manager behind this client.
    #[must_use]
    pub const fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Sends `request` with a valid bearer token.
    ///
    /// A 401 or 403 answer triggers one forced refresh and one retry. If the
    /// retry is rejected as well, that response is returned as is.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotAuthenticated`] when no token can be
    /// obtained (the logout path is started in the background), or
    /// [`SessionError::Http`] when the transport fails.
    pub async fn authenticated_fetch(&self, request: &ApiRequest) -> SessionResult<ApiResponse> {
        let Some(token) = self.session.get_valid_token().await else {
            warn!(path = %request.path, "No valid access token; ending session");
            self.session
                .terminator()
                .spawn_terminate(LogoutReason::SessionExpired);
            return Err(SessionError::NotAuthenticated);
        };

        let response = self.send_with_token(request, &token).await?;
        if !response.status.is_auth_failure() {
            return Ok(response);
        }

        info!(
            path = %request.path,
            status = response.status.as_u16(),
            "Request rejected; refreshing token and retrying once"
        );
        if !self.session.refresh_token(true).await {
            return Ok(response);
        }
        let Some(token) = self.session.credentials().access_token() else {
            return Ok(response);
        };

        let retried = self.send_with_token(request, &token).await?;
        if retried.status.is_auth_failure() {
            warn!(
                path = %request.path,
                status = retried.status.as_u16(),
                "Request still rejected after refresh"
            );
        }
        Ok(retried)
    }

    /// Fetches the signed-in user's profile.
    ///
    /// # Errors
    ///
    /// Fails like [`authenticated_fetch`](Self::authenticated_fetch), or with
    /// [`SessionError::InvalidResponse`] on a non-success status or a body
    /// that is not JSON.
    pub async fn current_user(&self) -> SessionResult<Value> {
        let request = ApiRequest::get(self.session.config().current_user_path.clone());
        let response = self.authenticated_fetch(&request).await?;
        if !response.status.is_success() {
            return Err(SessionError::InvalidResponse(format!(
                "current user lookup returned {}",
                response.status
            )));
        }
        response
            .json()
            .map_err(|e| SessionError::InvalidResponse(e.to_string()))
    }

    async fn send_with_token(
        &self,
        request: &ApiRequest,
        token: &str,
    ) -> Result<ApiResponse, HttpClientError> {
        let mut request = request.clone();
        request.set_header("Authorization", bearer(token));
        self.inner.execute(&request).await
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for AuthenticatedClient<C> {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, HttpClientError> {
        if !self.session.config().is_authenticated_path(&request.path) {
            debug!(path = %request.path, "Forwarding request without credentials");
            return self.inner.execute(request).await;
        }

        match self.authenticated_fetch(request).await {
            Ok(response) => Ok(response),
            Err(SessionError::Http(e)) => Err(e),
            Err(e) => Err(HttpClientError::Other(e.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::ports::RefreshedToken;
    use crate::testing::{Harness, ScriptedHttp, ScriptedRefresher, token_expiring_in};
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn client(h: &Harness, statuses: &[u16]) -> AuthenticatedClient<ScriptedHttp> {
        AuthenticatedClient::new(ScriptedHttp::with_statuses(statuses), h.session.clone())
    }

    #[tokio::test]
    async fn test_attaches_bearer_token() {
        let h = Harness::new(ScriptedRefresher::new(Vec::new()));
        let token = token_expiring_in(h.now(), 600);
        let h = h.with_access_token(&token);
        let client = client(&h, &[200]);

        let response = client
            .authenticated_fetch(&ApiRequest::get("/api/v1/items"))
            .await
            .unwrap();

        assert_eq!(response.status.as_u16(), 200);
        let sent = client.inner.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].header("authorization"),
            Some(format!("Bearer {token}").as_str())
        );
    }

    #[tokio::test]
    async fn test_retries_once_after_unauthorized() {
        let stale = token_expiring_in(Utc::now(), 600);
        let fresh = token_expiring_in(Utc::now(), 900);
        let h = Harness::new(ScriptedRefresher::issuing(&fresh))
            .with_access_token(&stale)
            .with_refresh_cookie("r-1");
        let client = client(&h, &[401, 200]);

        let response = client
            .authenticated_fetch(&ApiRequest::get("/api/v1/items"))
            .await
            .unwrap();

        assert_eq!(response.status.as_u16(), 200);
        assert_eq!(h.refresher.calls(), 1);
        let sent = client.inner.requests();
        assert_eq!(sent.len(), 2);
        assert_eq!(
            sent[1].header("Authorization"),
            Some(format!("Bearer {fresh}").as_str())
        );
    }

    #[tokio::test]
    async fn test_persisting_forbidden_is_returned_without_looping() {
        let stale = token_expiring_in(Utc::now(), 600);
        let fresh = token_expiring_in(Utc::now(), 900);
        let refresher = ScriptedRefresher::new(vec![
            Ok(RefreshedToken {
                access_token: fresh,
                set_cookies: Vec::new(),
            }),
        ]);
        let h = Harness::new(refresher)
            .with_access_token(&stale)
            .with_refresh_cookie("r-1");
        let client = client(&h, &[403, 403, 403]);

        let response = client
            .authenticated_fetch(&ApiRequest::get("/api/v1/loans"))
            .await
            .unwrap();

        assert_eq!(response.status.as_u16(), 403);
        assert_eq!(h.refresher.calls(), 1);
        assert_eq!(client.inner.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_refresh_returns_original_response() {
        let token = token_expiring_in(Utc::now(), 600);
        let h = Harness::new(ScriptedRefresher::new(Vec::new())).with_access_token(&token);
        let client = client(&h, &[401]);

        let response = client
            .authenticated_fetch(&ApiRequest::get("/api/v1/items"))
            .await
            .unwrap();

        assert_eq!(response.status.as_u16(), 401);
        assert_eq!(client.inner.requests().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_obtainable_token_rejects_and_logs_out() {
        let h = Harness::new(ScriptedRefresher::new(Vec::new()));
        let client = client(&h, &[]);

        let result = client
            .authenticated_fetch(&ApiRequest::get("/api/v1/items"))
            .await;

        assert_eq!(result.unwrap_err(), SessionError::NotAuthenticated);
        assert!(client.inner.requests().is_empty());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(h.notifier.notices(), vec![LogoutReason::SessionExpired.notice()]);
        assert_eq!(h.navigator.visits(), vec!["/login".to_string()]);
    }

    #[tokio::test]
    async fn test_execute_routes_only_api_paths() {
        let h = Harness::new(ScriptedRefresher::new(Vec::new()));
        let token = token_expiring_in(h.now(), 600);
        let h = h.with_access_token(&token);
        let client = client(&h, &[200, 200, 200]);

        client.execute(&ApiRequest::get("/assets/logo.png")).await.unwrap();
        client
            .execute(&ApiRequest::post("/api/v1/auth/token/refresh"))
            .await
            .unwrap();
        client.execute(&ApiRequest::get("/api/v1/items")).await.unwrap();

        let sent = client.inner.requests();
        assert_eq!(sent[0].header("Authorization"), None);
        assert_eq!(sent[1].header("Authorization"), None);
        assert!(sent[2].header("Authorization").is_some());
    }

    #[tokio::test]
    async fn test_execute_resolves_absolute_urls() {
        let h = Harness::new(ScriptedRefresher::new(Vec::new()));
        let token = token_expiring_in(h.now(), 600);
        let h = h.with_access_token(&token);
        let client = client(&h, &[200, 200, 200]);

        client
            .execute(&ApiRequest::get("http://localhost:8080/api/v1/items"))
            .await
            .unwrap();
        client
            .execute(&ApiRequest::post("/api/v1/auth/token/refresh/"))
            .await
            .unwrap();
        client
            .execute(&ApiRequest::get("https://cdn.example.com/api/v1/items"))
            .await
            .unwrap();

        let sent = client.inner.requests();
        assert_eq!(
            sent[0].header("Authorization"),
            Some(format!("Bearer {token}").as_str())
        );
        assert_eq!(sent[1].header("Authorization"), None);
        assert_eq!(sent[2].header("Authorization"), None);
    }

    #[tokio::test]
    async fn test_current_user_parses_profile() {
        let h = Harness::new(ScriptedRefresher::new(Vec::new()));
        let token = token_expiring_in(h.now(), 600);
        let h = h.with_access_token(&token);
        let client = client(&h, &[200]);

        let user = client.current_user().await.unwrap();

        assert_eq!(user["username"], "ana");
        assert_eq!(client.inner.requests()[0].path, "/api/v1/users/me");
    }
}
