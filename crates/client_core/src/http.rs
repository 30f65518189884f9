//! reqwest-backed implementation of [`RemoteResource`] for every resource.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{
    error::ApiErrorBody,
    protocol::{ItemEnvelope, ListEnvelope, LoginForm, LoginSession, PageRequest, PageResult},
};
use tracing::debug;
use url::Url;

use crate::{
    error::ClientError,
    resource::{RemoteResource, Resource},
};

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    access_token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_http(base_url, Client::new())
    }

    /// Builds a client whose requests give up after `timeout`.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(timeout).build()?;
        Self::with_http(base_url, http)
    }

    fn with_http(base_url: &str, http: Client) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|_| ClientError::InvalidBaseUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self {
            http,
            base_url,
            access_token: None,
        })
    }

    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Exchanges staff credentials for a token pair. The caller decides
    /// where to keep the token.
    pub async fn login(&self, form: &LoginForm) -> Result<LoginSession, ClientError> {
        let url = self.endpoint(&["auth", "login"])?;
        debug!(%url, "logging in");
        let envelope: ItemEnvelope<LoginSession> =
            self.send_json(self.http.post(url).json(form)).await?;
        Ok(envelope.data)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let response = self.authorize(request).send().await?;
        check_status(response).await
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        let bytes = self.send(request).await?.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

async fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .ok()
        .and_then(|body| body.message());
    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl<R: Resource> RemoteResource<R> for ApiClient {
    async fn list(&self, request: PageRequest) -> Result<PageResult<R::Item>, ClientError> {
        let url = self.endpoint(&[R::PATH])?;
        debug!(%url, page = request.page, take = request.take, "GET list");
        let envelope: ListEnvelope<R::Item> =
            self.send_json(self.http.get(url).query(&request)).await?;
        Ok(envelope.into())
    }

    async fn get(&self, id: &R::Id) -> Result<R::Detail, ClientError> {
        let url = self.endpoint(&[R::PATH, &id.to_string()])?;
        debug!(%url, "GET item");
        let envelope: ItemEnvelope<R::Detail> = self.send_json(self.http.get(url)).await?;
        Ok(envelope.data)
    }

    async fn create(&self, payload: &R::Create) -> Result<R::Detail, ClientError> {
        let url = self.endpoint(&[R::PATH])?;
        debug!(%url, "POST item");
        let envelope: ItemEnvelope<R::Detail> =
            self.send_json(self.http.post(url).json(payload)).await?;
        Ok(envelope.data)
    }

    async fn update(&self, id: &R::Id, payload: &R::Update) -> Result<R::Detail, ClientError> {
        let url = self.endpoint(&[R::PATH, &id.to_string()])?;
        debug!(%url, "PATCH item");
        let envelope: ItemEnvelope<R::Detail> =
            self.send_json(self.http.patch(url).json(payload)).await?;
        Ok(envelope.data)
    }

    async fn delete(&self, id: &R::Id) -> Result<(), ClientError> {
        let url = self.endpoint(&[R::PATH, &id.to_string()])?;
        debug!(%url, "DELETE item");
        self.send(self.http.delete(url)).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod tests;
