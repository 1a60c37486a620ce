//! Tenderly client implementation.

use super::{StorageEncodingRequest, StorageEncodingResponse, TenderlyPayload, TenderlySimulation};
use crate::{
    config::TenderlyConfig,
    constants::{TENDERLY_API_URL, TENDERLY_DASHBOARD_URL},
    error::TenderlyError,
};
use reqwest::{
    Client, Method, RequestBuilder,
    header::{ACCEPT, HeaderMap, HeaderValue},
};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument};

/// Header carrying the access key.
const ACCESS_KEY_HEADER: &str = "X-Access-Key";

/// Tenderly client for one project.
#[derive(Debug, Clone)]
pub struct TenderlyClient {
    client: Client,
    base_url: String,
    user: String,
    project: String,
    access_key: String,
}

impl TenderlyClient {
    /// Creates a new client for the configured project.
    pub fn new(config: &TenderlyConfig) -> Result<Self, TenderlyError> {
        if config.user.is_empty() {
            return Err(TenderlyError::MissingCredential("user"));
        }
        if config.project.is_empty() {
            return Err(TenderlyError::MissingCredential("project"));
        }
        if config.access_key.is_empty() {
            return Err(TenderlyError::MissingCredential("access key"));
        }

        let mut headers = HeaderMap::default();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url: TENDERLY_API_URL.to_string(),
            user: config.user.clone(),
            project: config.project.clone(),
            access_key: config.access_key.clone(),
        })
    }

    /// Configures the API base url.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Base URL of the project's endpoints.
    pub fn project_url(&self) -> String {
        format!("{}/account/{}/project/{}", self.base_url, self.user, self.project)
    }

    /// Runs a simulation.
    #[instrument(skip_all, fields(network = %payload.network_id, to = %payload.to))]
    pub async fn simulate(
        &self,
        payload: &TenderlyPayload,
    ) -> Result<TenderlySimulation, TenderlyError> {
        let url = format!("{}/simulate", self.project_url());
        let simulation: TenderlySimulation =
            self.send(self.request(Method::POST, &url).json(payload)).await?;
        debug!(
            id = %simulation.simulation.id,
            status = simulation.simulation.status,
            gas_used = simulation.transaction.gas_used,
            "Simulation completed"
        );
        Ok(simulation)
    }

    /// Encodes human readable storage overrides into raw slots.
    #[instrument(skip_all, fields(network = %request.network_id))]
    pub async fn encode_states(
        &self,
        request: &StorageEncodingRequest,
    ) -> Result<StorageEncodingResponse, TenderlyError> {
        let url = format!("{}/contracts/encode-states", self.project_url());
        self.post(&url, request).await
    }

    /// Makes a saved simulation publicly viewable.
    #[instrument(skip(self))]
    pub async fn share(&self, simulation_id: &str) -> Result<(), TenderlyError> {
        let url = format!("{}/simulations/{simulation_id}/share", self.project_url());
        let response = self.request(Method::POST, &url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(TenderlyError::Api { status, body });
        }
        Ok(())
    }

    /// Dashboard link of a saved simulation.
    pub fn simulation_url(&self, simulation_id: &str) -> String {
        simulation_url(&self.user, &self.project, simulation_id)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client.request(method, url).header(ACCESS_KEY_HEADER, &self.access_key)
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, TenderlyError> {
        self.send(self.request(Method::POST, url).json(body)).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, TenderlyError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(TenderlyError::Api { status, body });
        }
        Ok(serde_json::from_str(&body)?)
    }
}

/// Dashboard link of a saved simulation.
pub fn simulation_url(user: &str, project: &str, simulation_id: &str) -> String {
    format!("{TENDERLY_DASHBOARD_URL}/{user}/{project}/simulator/{simulation_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TenderlyConfig {
        TenderlyConfig {
            user: "gov".to_string(),
            project: "sims".to_string(),
            access_key: "secret".to_string(),
        }
    }

    #[test]
    fn requires_credentials() {
        let mut config = config();
        config.access_key.clear();
        assert!(matches!(
            TenderlyClient::new(&config),
            Err(TenderlyError::MissingCredential("access key"))
        ));
    }

    #[test]
    fn builds_project_urls() {
        let client = TenderlyClient::new(&config()).unwrap();
        assert_eq!(client.project_url(), "https://api.tenderly.co/api/v1/account/gov/project/sims");

        let client = client.with_base_url("http://localhost:8080/");
        assert_eq!(client.project_url(), "http://localhost:8080/account/gov/project/sims");
        assert_eq!(
            client.simulation_url("abc"),
            "https://dashboard.tenderly.co/gov/sims/simulator/abc"
        );
    }

    #[tokio::test]
    #[ignore] // requires TENDERLY_ACCESS_TOKEN, TENDERLY_USER and TENDERLY_PROJECT_SLUG
    async fn simulates_transfer() {
        use alloy::primitives::{Bytes, address};

        let config = TenderlyConfig {
            user: std::env::var("TENDERLY_USER").unwrap(),
            project: std::env::var("TENDERLY_PROJECT_SLUG").unwrap(),
            access_key: std::env::var("TENDERLY_ACCESS_TOKEN").unwrap(),
        };
        let client = TenderlyClient::new(&config).unwrap();
        let payload = TenderlyPayload::new(
            1,
            address!("0xd73a92be73efbfcf3854433a5fcbabf9c1316073"),
            address!("0xd73a92be73efbfcf3854433a5fcbabf9c1316073"),
            Bytes::new(),
            21_000,
        );
        let simulation = client.simulate(&payload).await.unwrap();
        assert!(simulation.succeeded());
    }
}
