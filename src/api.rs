// src/api.rs
//! HTTP-транспорт к удалённому хранилищу документов.
//!
//! `DocsApi` — единственный шов между контроллером каталога и сетью:
//! контроллер тестируется на фейковой реализации без поднятого сервера.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::error::{ApiError, ApiResult};
use crate::models::{
    docs_from_value, ActivateAccountRequest, CreateDocRequest, DeleteDocRequest, Doc,
    FilteredRequest, LoginRequest, LogoutRequest, RegisterRequest, SearchRequest, TokenPair,
    UpdateDocRequest,
};

/// Remote document store contract (JSON over HTTP, bearer auth on `/docs/*`).
#[async_trait]
pub trait DocsApi: Send + Sync {
    async fn login(&self, req: &LoginRequest) -> ApiResult<TokenPair>;
    async fn register(&self, req: &RegisterRequest) -> ApiResult<()>;
    async fn activate_account(&self, req: &ActivateAccountRequest) -> ApiResult<()>;
    async fn logout(&self, req: &LogoutRequest) -> ApiResult<()>;

    async fn search(&self, token: Option<&str>, req: &SearchRequest) -> ApiResult<Vec<Doc>>;
    async fn filtered(&self, token: Option<&str>, req: &FilteredRequest) -> ApiResult<Vec<Doc>>;
    async fn create(&self, token: Option<&str>, req: &CreateDocRequest) -> ApiResult<()>;
    async fn update(&self, token: Option<&str>, req: &UpdateDocRequest) -> ApiResult<()>;
    async fn delete(&self, token: Option<&str>, req: &DeleteDocRequest) -> ApiResult<()>;
}

// ==================== REQWEST IMPLEMENTATION ====================

pub struct HttpDocsApi {
    client: Client,
    base_url: String,
}

impl HttpDocsApi {
    pub fn new(base_url: &str, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        token: Option<&str>,
        body: &B,
    ) -> ApiResult<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.post(&url).json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request
            .send()
            .await
            .map_err(|err| ApiError::ConnectionFailed(err.to_string()))
    }

    /// Non-2xx from a search endpoint is a search rejection; a 2xx body is
    /// read leniently — whatever its shape, the caller gets a list.
    async fn read_docs(&self, response: reqwest::Response) -> ApiResult<Vec<Doc>> {
        let status = response.status();
        if !status.is_success() {
            let message = Self::server_message(response).await;
            return Err(ApiError::SearchRejected(message));
        }
        match response.json::<serde_json::Value>().await {
            Ok(body) => Ok(docs_from_value(&body)),
            Err(err) => {
                log::warn!("Search response body was not JSON: {}", err);
                Ok(Vec::new())
            }
        }
    }

    /// Non-2xx from a mutation/auth endpoint, with the server's `message`
    /// when the body carries one.
    async fn read_ok(&self, response: reqwest::Response) -> ApiResult<()> {
        let status = response.status();
        if !status.is_success() {
            let message = Self::server_message(response).await;
            return Err(ApiError::MutationRejected(message));
        }
        Ok(())
    }

    async fn server_message(response: reqwest::Response) -> String {
        let status = response.status();
        let fallback = format!("HTTP {}", status);
        match response.json::<serde_json::Value>().await {
            Ok(body) => body
                .get("message")
                .and_then(|m| m.as_str())
                .map(|m| m.to_string())
                .unwrap_or(fallback),
            Err(_) => fallback,
        }
    }
}

#[async_trait]
impl DocsApi for HttpDocsApi {
    async fn login(&self, req: &LoginRequest) -> ApiResult<TokenPair> {
        let response = self.post("/auth/login", None, req).await?;
        let status = response.status();
        if !status.is_success() {
            let message = Self::server_message(response).await;
            return Err(ApiError::MutationRejected(message));
        }
        response
            .json::<TokenPair>()
            .await
            .map_err(|err| ApiError::ConnectionFailed(err.to_string()))
    }

    async fn register(&self, req: &RegisterRequest) -> ApiResult<()> {
        let response = self.post("/auth/register", None, req).await?;
        self.read_ok(response).await
    }

    async fn activate_account(&self, req: &ActivateAccountRequest) -> ApiResult<()> {
        let response = self.post("/auth/activate_account", None, req).await?;
        self.read_ok(response).await
    }

    async fn logout(&self, req: &LogoutRequest) -> ApiResult<()> {
        // Токен уходит в теле, не в заголовке
        let response = self.post("/auth/logout", None, req).await?;
        self.read_ok(response).await
    }

    async fn search(&self, token: Option<&str>, req: &SearchRequest) -> ApiResult<Vec<Doc>> {
        let response = self.post("/docs/search", token, req).await?;
        self.read_docs(response).await
    }

    async fn filtered(&self, token: Option<&str>, req: &FilteredRequest) -> ApiResult<Vec<Doc>> {
        let response = self.post("/docs/filtered", token, req).await?;
        self.read_docs(response).await
    }

    async fn create(&self, token: Option<&str>, req: &CreateDocRequest) -> ApiResult<()> {
        let response = self.post("/docs/create", token, req).await?;
        self.read_ok(response).await
    }

    async fn update(&self, token: Option<&str>, req: &UpdateDocRequest) -> ApiResult<()> {
        let response = self.post("/docs/update", token, req).await?;
        self.read_ok(response).await
    }

    async fn delete(&self, token: Option<&str>, req: &DeleteDocRequest) -> ApiResult<()> {
        let response = self.post("/docs/delete", token, req).await?;
        self.read_ok(response).await
    }
}

// ==================== TEST DOUBLE ====================
