use reqwest::{
    Client, Response, StatusCode,
    header::{ACCEPT, HeaderValue},
};
use serde::{Deserialize, Serialize};

use crate::error::BackendError;
use crate::http_probe::result::{Site, StatusRecord};

const JSON: &str = "application/json";

const LOGIN_PATH: &str = "/api/login";
const WEBSITES_PATH: &str = "/api/v1/website/getall";
const STATUSES_PATH: &str = "/api/v1/status/setall";

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

/// Client for the WebAlert backend: login, website list and status submission.
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Exchanges the operator credentials for a bearer token.
    /// Anything other than `200 OK` is an error.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<String, BackendError> {
        const OPERATION: &str = "login";

        let response = self
            .client
            .post(self.url(LOGIN_PATH))
            .header(ACCEPT, HeaderValue::from_static(JSON))
            .json(&LoginRequest { email, password })
            .send()
            .await
            .map_err(|source| BackendError::Transport {
                operation: OPERATION,
                source,
            })?;

        let response = expect_status(response, StatusCode::OK, OPERATION).await?;
        let login: LoginResponse = response.json().await.map_err(|source| BackendError::Decode {
            operation: OPERATION,
            source,
        })?;

        log::info!("Authenticated against {}", self.base_url);
        Ok(login.token)
    }

    /// Fetches the list of monitored websites.
    pub async fn fetch_websites(&self, token: &str) -> Result<Vec<Site>, BackendError> {
        const OPERATION: &str = "get websites";

        let response = self
            .client
            .get(self.url(WEBSITES_PATH))
            .bearer_auth(token)
            .header(ACCEPT, HeaderValue::from_static(JSON))
            .send()
            .await
            .map_err(|source| BackendError::Transport {
                operation: OPERATION,
                source,
            })?;

        let response = expect_status(response, StatusCode::OK, OPERATION).await?;
        let sites: Vec<Site> = response.json().await.map_err(|source| BackendError::Decode {
            operation: OPERATION,
            source,
        })?;

        log::info!("Fetched {} websites", sites.len());
        Ok(sites)
    }

    /// Submits one batch of status records. The backend answers `201 Created`.
    pub async fn submit_statuses(&self, token: &str, statuses: &[StatusRecord]) -> Result<(), BackendError> {
        const OPERATION: &str = "send website statuses";

        let response = self
            .client
            .post(self.url(STATUSES_PATH))
            .bearer_auth(token)
            .json(statuses)
            .send()
            .await
            .map_err(|source| BackendError::Transport {
                operation: OPERATION,
                source,
            })?;

        expect_status(response, StatusCode::CREATED, OPERATION).await?;
        log::info!("Submitted {} website statuses", statuses.len());
        Ok(())
    }
}

async fn expect_status(
    response: Response,
    expected: StatusCode,
    operation: &'static str,
) -> Result<Response, BackendError> {
    if response.status() == expected {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    log::error!("Failed to {}: {} - {}", operation, status, body);
    Err(BackendError::UnexpectedStatus {
        operation,
        status: status.as_u16(),
        body,
    })
}
