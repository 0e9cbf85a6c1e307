use super::client::ApiClient;
use super::types::{ApiError, AuthPayload, LoginRequest, SessionConfig, SignupRequest, UserProfile};

impl ApiClient {
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthPayload, ApiError> {
        let base_url = self.resolved_base_url().await;
        self.request_json(
            self.http_client()
                .post(format!("{}/auth/login", base_url))
                .json(request),
        )
        .await
    }

    pub async fn signup(&self, request: &SignupRequest) -> Result<AuthPayload, ApiError> {
        let base_url = self.resolved_base_url().await;
        self.request_json(
            self.http_client()
                .post(format!("{}/auth/signup", base_url))
                .json(request),
        )
        .await
    }

    /// Best-effort: callers fire-and-forget this and clear local state
    /// regardless of the outcome.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let token = self
            .access_token()
            .ok_or_else(|| ApiError::Storage("no access token".into()))?;
        self.logout_with_token(token).await
    }

    /// The logout funnel clears credentials synchronously right after
    /// creating this future, so the token travels with the call instead of
    /// being read from the shared cell at poll time.
    pub async fn logout_with_token(&self, token: String) -> Result<(), ApiError> {
        let base_url = self.resolved_base_url().await;
        let headers = super::client::bearer_headers(&token)?;
        self.request_ok(
            self.http_client()
                .post(format!("{}/auth/logout", base_url))
                .headers(headers),
        )
        .await
    }

    /// Doubles as the activity-liveness probe: the server refreshes its own
    /// last-activity record for this session on every call.
    pub async fn get_me(&self) -> Result<UserProfile, ApiError> {
        let base_url = self.resolved_base_url().await;
        let headers = self.auth_headers()?;
        self.request_json(
            self.http_client()
                .get(format!("{}/auth/me", base_url))
                .headers(headers),
        )
        .await
    }

    pub async fn get_session_config(&self) -> Result<SessionConfig, ApiError> {
        let base_url = self.resolved_base_url().await;
        let headers = self.auth_headers()?;
        self.request_json(
            self.http_client()
                .get(format!("{}/auth/config", base_url))
                .headers(headers),
        )
        .await
    }
}
