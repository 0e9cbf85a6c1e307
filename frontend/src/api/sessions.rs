use super::client::ApiClient;
use super::types::{ActiveSessionRecord, ApiError};

impl ApiClient {
    pub async fn list_sessions(&self) -> Result<Vec<ActiveSessionRecord>, ApiError> {
        let base_url = self.resolved_base_url().await;
        let headers = self.auth_headers()?;
        self.request_json(
            self.http_client()
                .get(format!("{}/auth/sessions", base_url))
                .headers(headers),
        )
        .await
    }

    pub async fn revoke_session(&self, session_id: &str) -> Result<(), ApiError> {
        let base_url = self.resolved_base_url().await;
        let headers = self.auth_headers()?;
        self.request_ok(
            self.http_client()
                .delete(format!("{}/auth/sessions/{}", base_url, session_id))
                .headers(headers),
        )
        .await
    }

    pub async fn revoke_other_sessions(&self) -> Result<(), ApiError> {
        let base_url = self.resolved_base_url().await;
        let headers = self.auth_headers()?;
        self.request_ok(
            self.http_client()
                .delete(format!("{}/auth/sessions/all", base_url))
                .headers(headers),
        )
        .await
    }
}

impl crate::session::directory::SessionsApi for ApiClient {
    async fn list(&self) -> Result<Vec<ActiveSessionRecord>, ApiError> {
        self.list_sessions().await
    }

    async fn revoke(&self, session_id: &str) -> Result<(), ApiError> {
        self.revoke_session(session_id).await
    }

    async fn revoke_others(&self) -> Result<(), ApiError> {
        self.revoke_other_sessions().await
    }
}
