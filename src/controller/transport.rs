//! Fragment requests to the grid endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

const USER_AGENT: &str = concat!("termgrid/", env!("CARGO_PKG_VERSION"));

/// Errors from fetching a fragment.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// One fragment request, as posted to the endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentRequest {
    pub url: String,
    pub action: String,
    /// Sent only for grids whose taxonomy is chosen per block.
    pub taxonomy: Option<String>,
    pub page: u32,
    pub per_page: u32,
}

impl FragmentRequest {
    /// Form fields in the order the endpoint reads them.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("action", self.action.clone())];
        if let Some(ref taxonomy) = self.taxonomy {
            fields.push(("taxonomy", taxonomy.clone()));
        }
        fields.push(("page", self.page.to_string()));
        fields.push(("per_page", self.per_page.to_string()));
        fields
    }
}

/// Something that can fetch fragment markup.
#[async_trait]
pub trait FragmentTransport: Send + Sync {
    async fn fetch(&self, request: &FragmentRequest) -> Result<String, FetchError>;
}

/// Fragment transport over HTTP.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    /// GET a full page, e.g. the initial render of a grid.
    pub async fn get_page(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;
        read_body(response).await
    }
}

async fn read_body(response: reqwest::Response) -> Result<String, FetchError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

#[async_trait]
impl FragmentTransport for HttpTransport {
    async fn fetch(&self, request: &FragmentRequest) -> Result<String, FetchError> {
        tracing::debug!("POST {} page={}", request.url, request.page);
        let response = self
            .client
            .post(&request.url)
            .form(&request.form_fields())
            .send()
            .await?;
        read_body(response).await
    }
}
