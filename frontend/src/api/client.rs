use std::cell::RefCell;
use std::rc::Rc;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::api::types::{ApiError, Envelope, CODE_SESSION_EXPIRED};
use crate::config;
use crate::state::credentials;

/// In-page signal dispatched when the server tells us the session is gone.
/// The expiry reactor listens for it so a stale 401 funnels into the same
/// logout path as the local timer.
pub const SESSION_EXPIRED_EVENT: &str = "taskdeck:session-expired";

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Option<String>,
    token: Rc<RefCell<Option<String>>>,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: None,
            token: Rc::new(RefCell::new(None)),
        }
    }

    pub fn new_with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: Some(base_url.into()),
            token: Rc::new(RefCell::new(None)),
        }
    }

    pub fn new_with_token(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let client = Self::new_with_base_url(base_url);
        client.set_access_token(Some(token.into()));
        client
    }

    /// All clones of this client share the token cell, so the auth store can
    /// swap credentials in one place.
    pub fn set_access_token(&self, token: Option<String>) {
        *self.token.borrow_mut() = token;
    }

    pub fn access_token(&self) -> Option<String> {
        if let Some(token) = self.token.borrow().clone() {
            return Some(token);
        }
        credentials::read_persisted_token()
    }

    pub(crate) fn http_client(&self) -> &Client {
        &self.client
    }

    pub(crate) async fn resolved_base_url(&self) -> String {
        if let Some(base) = &self.base_url {
            base.clone()
        } else {
            config::await_api_base_url().await
        }
    }

    pub(crate) fn auth_headers(&self) -> Result<reqwest::header::HeaderMap, ApiError> {
        let token = self
            .access_token()
            .ok_or_else(|| ApiError::Storage("no access token".into()))?;
        bearer_headers(&token)
    }

    pub(crate) async fn execute(&self, builder: RequestBuilder) -> Result<ApiResponse, ApiError> {
        let request = builder
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        #[cfg(test)]
        if let Some(responder) = mock::responder_for(request.url().as_str()) {
            return responder.respond(&request).map(ApiResponse::Mock);
        }

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(ApiResponse::Http(response))
    }

    /// Sends the request and unwraps the `{success, data}` envelope.
    pub(crate) async fn request_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.execute(builder).await?;
        let status = response.status();
        match response.json::<Envelope<T>>().await {
            Ok(envelope) if envelope.success => envelope
                .data
                .ok_or_else(|| ApiError::Decode("response envelope missing data".into())),
            Ok(envelope) => Err(classify_failure(status, envelope.code, envelope.message)),
            Err(_) if status >= 400 => Err(classify_failure(status, None, None)),
            Err(e) => Err(e),
        }
    }

    /// Same as [`request_json`] for endpoints whose success body carries no
    /// data worth keeping.
    pub(crate) async fn request_ok(&self, builder: RequestBuilder) -> Result<(), ApiError> {
        let response = self.execute(builder).await?;
        let status = response.status();
        match response.json::<Envelope<serde_json::Value>>().await {
            Ok(envelope) if envelope.success => Ok(()),
            Ok(envelope) => Err(classify_failure(status, envelope.code, envelope.message)),
            Err(_) if status >= 400 => Err(classify_failure(status, None, None)),
            Err(e) => Err(e),
        }
    }
}

pub(crate) fn bearer_headers(token: &str) -> Result<reqwest::header::HeaderMap, ApiError> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::AUTHORIZATION,
        format!("Bearer {}", token)
            .parse()
            .map_err(|_| ApiError::Storage("invalid token format".into()))?,
    );
    Ok(headers)
}

fn classify_failure(status: u16, code: Option<String>, message: Option<String>) -> ApiError {
    if status == 401 && code.as_deref() == Some(CODE_SESSION_EXPIRED) {
        emit_session_expired();
        return ApiError::SessionExpired;
    }
    ApiError::Server {
        status,
        code,
        message: message.unwrap_or_else(|| "Request failed".into()),
    }
}

#[cfg(target_arch = "wasm32")]
fn emit_session_expired() {
    if let Some(window) = web_sys::window() {
        if let Ok(event) = web_sys::CustomEvent::new(SESSION_EXPIRED_EVENT) {
            let _ = window.dispatch_event(&event);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn emit_session_expired() {}

pub(crate) enum ApiResponse {
    Http(reqwest::Response),
    #[cfg(test)]
    Mock(mock::MockResponse),
}

impl ApiResponse {
    pub(crate) fn status(&self) -> u16 {
        match self {
            ApiResponse::Http(response) => response.status().as_u16(),
            #[cfg(test)]
            ApiResponse::Mock(response) => response.status,
        }
    }

    pub(crate) async fn json<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        match self {
            ApiResponse::Http(response) => response
                .json::<T>()
                .await
                .map_err(|e| ApiError::Decode(e.to_string())),
            #[cfg(test)]
            ApiResponse::Mock(response) => {
                serde_json::from_value(response.body).map_err(|e| ApiError::Decode(e.to_string()))
            }
        }
    }
}
