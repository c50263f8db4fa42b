// Copyright 2025 Cowboy AI, LLC.

//! HTTP gateway over the catalog REST API

use super::{CollectionGateway, IdempotencyKey};
use crate::config::GatewayConfig;
use crate::entity::{CatalogEntity, EntityId, Identified};
use crate::errors::{CatalogError, CatalogResult};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use tracing::debug;

/// Gateway issuing JSON requests against `<base_url>/<route>`
pub struct HttpGateway<E> {
    client: Client,
    base_url: Url,
    bearer_token: Option<String>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for HttpGateway<E> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            bearer_token: self.bearer_token.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: CatalogEntity> HttpGateway<E> {
    /// Build a gateway with its own HTTP client
    pub fn new(config: &GatewayConfig) -> CatalogResult<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| CatalogError::Configuration(e.to_string()))?;
        Ok(Self::with_client(client, config.url()?))
    }

    /// Build a gateway sharing an existing client
    pub fn with_client(client: Client, base_url: Url) -> Self {
        Self {
            client,
            base_url,
            bearer_token: None,
            _entity: PhantomData,
        }
    }

    /// Authenticate every request with a bearer token
    pub fn with_bearer_token(mut self, token: Option<String>) -> Self {
        self.bearer_token = token;
        self
    }

    /// `<base_url>/<route>`
    pub fn collection_url(&self) -> CatalogResult<Url> {
        self.url_for(None)
    }

    /// `<base_url>/<route>/<id>`
    pub fn record_url(&self, id: &EntityId) -> CatalogResult<Url> {
        self.url_for(Some(id))
    }

    fn url_for(&self, id: Option<&EntityId>) -> CatalogResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                CatalogError::Configuration(format!("base url {} cannot carry a path", self.base_url))
            })?;
            segments.pop_if_empty().push(E::KIND.route());
            if let Some(id) = id {
                segments.push(id.as_str());
            }
        }
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.bearer_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> CatalogResult<Response> {
        let response = self.authorize(request).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
        debug!(collection = %E::KIND, status = status.as_u16(), %message, "remote rejected request");
        Err(CatalogError::status(status.as_u16(), message))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> CatalogResult<T> {
        let response = self.send(request).await?;
        Ok(response.json::<T>().await?)
    }
}

/// The `message` field of an error body
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value.get("message")?.as_str().map(str::to_string)
}

/// The id echoed back by a delete, if the body carries one
fn deleted_id(body: &str) -> Option<EntityId> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["_id", "id"]
        .iter()
        .find_map(|field| value.get(field)?.as_str().map(EntityId::new))
}

#[async_trait]
impl<E: CatalogEntity> CollectionGateway<E> for HttpGateway<E> {
    async fn create(
        &self,
        record: &E,
        key: Option<IdempotencyKey>,
    ) -> CatalogResult<Identified<E>> {
        let url = self.collection_url()?;
        debug!(collection = %E::KIND, %url, "POST");
        let mut request = self.client.post(url).json(record);
        if let Some(key) = key {
            request = request.header(IdempotencyKey::HEADER, key.as_str());
        }
        self.send_json(request).await
    }

    async fn get_all(&self) -> CatalogResult<Vec<Identified<E>>> {
        let url = self.collection_url()?;
        debug!(collection = %E::KIND, %url, "GET");
        self.send_json(self.client.get(url)).await
    }

    async fn get_by_id(&self, id: &EntityId) -> CatalogResult<Identified<E>> {
        let url = self.record_url(id)?;
        debug!(collection = %E::KIND, %url, "GET");
        self.send_json(self.client.get(url)).await
    }

    async fn update(&self, id: &EntityId, patch: &E) -> CatalogResult<Identified<E>> {
        let url = self.record_url(id)?;
        debug!(collection = %E::KIND, %url, "PUT");
        self.send_json(self.client.put(url).json(patch)).await
    }

    async fn delete(&self, id: &EntityId) -> CatalogResult<EntityId> {
        let url = self.record_url(id)?;
        debug!(collection = %E::KIND, %url, "DELETE");
        let response = self.send(self.client.delete(url)).await?;
        let body = response.text().await.unwrap_or_default();
        Ok(deleted_id(&body).unwrap_or_else(|| id.clone()))
    }
}
