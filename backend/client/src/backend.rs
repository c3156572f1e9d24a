//! The BorkChain backend as seen from the client.
//!
//! [`Backend`] is the query/command interface the session store talks to.
//! [`HttpBackend`] implements it over the server's REST API.

use std::future::Future;
use std::time::Duration;

use bork_core::validation::ContributionInput;
use bork_core::wire::{
    BadgeSummary, CompleteTaskRequest, CompleteTaskResponse, ConnectRequest, ConnectResponse,
    ContributionRequest, LeaderboardEntry, UserProfile,
};
use bork_core::{Address, Contribution, Task};
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{ClientError, Result};

pub trait Backend {
    fn connect(
        &self,
        address: &Address,
        referral: Option<&str>,
    ) -> impl Future<Output = Result<ConnectResponse>> + Send;

    fn fetch_tasks(&self) -> impl Future<Output = Result<Vec<Task>>> + Send;

    fn fetch_user(&self, address: &Address) -> impl Future<Output = Result<UserProfile>> + Send;

    fn complete_task(
        &self,
        address: &Address,
        task_id: &str,
    ) -> impl Future<Output = Result<CompleteTaskResponse>> + Send;

    fn submit_contribution(
        &self,
        address: &Address,
        input: &ContributionInput,
    ) -> impl Future<Output = Result<Contribution>> + Send;

    fn badge_for(&self, address: &Address) -> impl Future<Output = Result<BadgeSummary>> + Send;

    fn leaderboard(&self, limit: u32) -> impl Future<Output = Result<Vec<LeaderboardEntry>>> + Send;
}

/// Error body returned by the server.
#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    code: String,
}

#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ClientError::Network(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::Network(format!("GET {path} failed: {e}")))?;
        decode(response).await
    }

    async fn send<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        debug!("{} {}", method, url);
        let response = self
            .client
            .request(method.clone(), &url)
            .json(body)
            .send()
            .await
            .map_err(|e| ClientError::Network(format!("{method} {path} failed: {e}")))?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        let (code, message) = match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => (body.code, body.error),
            Err(_) => ("HTTP_ERROR".to_string(), text),
        };
        return Err(ClientError::Backend {
            status: status.as_u16(),
            code,
            message,
        });
    }

    response
        .json()
        .await
        .map_err(|e| ClientError::Network(format!("Failed to decode response body: {e}")))
}

impl Backend for HttpBackend {
    async fn connect(&self, address: &Address, referral: Option<&str>) -> Result<ConnectResponse> {
        let request = ConnectRequest {
            address: address.clone(),
            referral: referral.map(str::to_string),
        };
        self.send(Method::POST, "/wallet/connect", &request).await
    }

    async fn fetch_tasks(&self) -> Result<Vec<Task>> {
        self.get("/tasks").await
    }

    async fn fetch_user(&self, address: &Address) -> Result<UserProfile> {
        self.get(&format!("/users/{address}")).await
    }

    async fn complete_task(&self, address: &Address, task_id: &str) -> Result<CompleteTaskResponse> {
        let request = CompleteTaskRequest {
            address: address.clone(),
        };
        self.send(Method::POST, &format!("/tasks/{task_id}/complete"), &request)
            .await
    }

    async fn submit_contribution(
        &self,
        address: &Address,
        input: &ContributionInput,
    ) -> Result<Contribution> {
        let request = ContributionRequest {
            address: address.clone(),
            input: input.clone(),
        };
        self.send(Method::POST, "/contributions", &request).await
    }

    async fn badge_for(&self, address: &Address) -> Result<BadgeSummary> {
        self.get(&format!("/users/{address}/badge")).await
    }

    async fn leaderboard(&self, limit: u32) -> Result<Vec<LeaderboardEntry>> {
        self.get(&format!("/leaderboard?limit={limit}")).await
    }
}
