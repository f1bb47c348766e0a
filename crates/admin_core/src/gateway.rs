use std::marker::PhantomData;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::Resource,
    error::{ApiError, ErrorCode},
};
use thiserror::Error;
use tracing::debug;
use url::Url;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{method} {url} could not be sent: {source}")]
    Transport {
        method: Method,
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{method} {url} returned {status}: {body}")]
    Status {
        method: Method,
        url: String,
        status: u16,
        body: String,
    },
    #[error("{method} {url} returned an undecodable body: {source}")]
    Decode {
        method: Method,
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl GatewayError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Transport { .. } => ErrorCode::Unavailable,
            Self::Status { status, .. } => ErrorCode::from_status(*status),
            Self::Decode { .. } => ErrorCode::Internal,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn to_api_error(&self) -> ApiError {
        ApiError::new(self.code(), self.to_string())
    }
}

/// CRUD calls against one REST collection.
#[async_trait]
pub trait EntityGateway<R: Resource>: Send + Sync {
    async fn list(&self) -> Result<Vec<R>, GatewayError>;
    async fn get(&self, id: R::Id) -> Result<R, GatewayError>;
    async fn create(&self, dto: &R) -> Result<R, GatewayError>;
    async fn update(&self, id: R::Id, dto: &R) -> Result<R, GatewayError>;
    async fn delete(&self, id: R::Id) -> Result<(), GatewayError>;
}

pub struct RestGateway<R> {
    http: Client,
    base: Url,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> RestGateway<R> {
    pub fn new(http: Client, base: Url) -> Self {
        Self {
            http,
            base,
            _resource: PhantomData,
        }
    }

    fn collection_url(&self) -> String {
        self.base.as_str().trim_end_matches('/').to_string()
    }

    fn item_url(&self, id: R::Id) -> String {
        format!("{}/{id}", self.collection_url())
    }

    async fn execute(
        &self,
        method: Method,
        url: String,
        body: Option<&R>,
    ) -> Result<Response, GatewayError> {
        debug!(%method, %url, resource = R::NAME, "dispatching request");
        let mut request: RequestBuilder = self.http.request(method.clone(), &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|source| GatewayError::Transport {
                method: method.clone(),
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|err| format!("<body unreadable: {err}>"));
            return Err(GatewayError::Status {
                method,
                url,
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn execute_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: String,
        body: Option<&R>,
    ) -> Result<T, GatewayError> {
        let response = self.execute(method.clone(), url.clone(), body).await?;
        response
            .json()
            .await
            .map_err(|source| GatewayError::Decode {
                method,
                url,
                source,
            })
    }
}

#[async_trait]
impl<R: Resource> EntityGateway<R> for RestGateway<R> {
    async fn list(&self) -> Result<Vec<R>, GatewayError> {
        self.execute_json(Method::GET, self.collection_url(), None)
            .await
    }

    async fn get(&self, id: R::Id) -> Result<R, GatewayError> {
        self.execute_json(Method::GET, self.item_url(id), None).await
    }

    async fn create(&self, dto: &R) -> Result<R, GatewayError> {
        self.execute_json(Method::POST, self.collection_url(), Some(dto))
            .await
    }

    async fn update(&self, id: R::Id, dto: &R) -> Result<R, GatewayError> {
        self.execute_json(Method::PUT, self.item_url(id), Some(dto))
            .await
    }

    async fn delete(&self, id: R::Id) -> Result<(), GatewayError> {
        self.execute(Method::DELETE, self.item_url(id), None).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
