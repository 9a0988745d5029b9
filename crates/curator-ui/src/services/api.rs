//! HTTP client helpers (REST).

use async_trait::async_trait;
use curator_api_models::{BulkActionRequest, BulkActionResponse, RowActionResponse};
use gloo_net::http::{Request, Response};

use crate::core::error::TransportError;
use crate::features::bulk::BulkTransport;
use crate::features::row_actions::RowTransport;

const ACCEPT_JSON: &str = "application/json";

#[derive(Clone, Debug)]
pub(crate) struct ApiClient {
    pub bulk_endpoint: String,
}

impl ApiClient {
    pub(crate) fn new(bulk_endpoint: impl Into<String>) -> Self {
        Self {
            bulk_endpoint: bulk_endpoint.into(),
        }
    }

    async fn get(&self, url: &str) -> anyhow::Result<Response> {
        Ok(Request::get(url).header("Accept", ACCEPT_JSON).send().await?)
    }

    async fn post_bulk(&self, body: &BulkActionRequest) -> anyhow::Result<String> {
        let req = Request::post(&self.bulk_endpoint)
            .header("Accept", ACCEPT_JSON)
            .json(body)?;
        Ok(req.send().await?.text().await?)
    }
}

#[async_trait(?Send)]
impl BulkTransport for ApiClient {
    async fn submit(
        &self,
        request: &BulkActionRequest,
    ) -> Result<BulkActionResponse, TransportError> {
        // Error statuses still carry a JSON body with the backend message.
        let body = self
            .post_bulk(request)
            .await
            .map_err(TransportError::network)?;
        serde_json::from_str(&body).map_err(TransportError::malformed)
    }
}

#[async_trait(?Send)]
impl RowTransport for ApiClient {
    async fn perform(&self, url: &str) -> Result<RowActionResponse, TransportError> {
        let response = self.get(url).await.map_err(TransportError::network)?;
        if !response.ok() {
            return Err(TransportError::Status {
                status: response.status(),
            });
        }
        response
            .json::<RowActionResponse>()
            .await
            .map_err(TransportError::malformed)
    }

    async fn revert(&self, url: &str) -> Result<(), TransportError> {
        let response = self.get(url).await.map_err(TransportError::network)?;
        if response.ok() {
            Ok(())
        } else {
            Err(TransportError::Status {
                status: response.status(),
            })
        }
    }
}
