use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::Client as HttpClient;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::credentials::CredentialStore;
use crate::error::TransportError;

pub const DEFAULT_BASE_URL: &str = "https://www.moltbook.com/api/v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOption {
    #[default]
    Hot,
    New,
    Top,
    Rising,
}

impl SortOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOption::Hot => "hot",
            SortOption::New => "new",
            SortOption::Top => "top",
            SortOption::Rising => "rising",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "hot" => Some(SortOption::Hot),
            "new" => Some(SortOption::New),
            "top" => Some(SortOption::Top),
            "rising" => Some(SortOption::Rising),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Submolts,
    GlobalFeed { sort: SortOption, limit: u32 },
    SubmoltFeed { name: String },
    PostDetail { id: String },
    Search { query: String },
    AgentProfile { name: String },
}

impl Endpoint {
    pub fn segments(&self) -> Vec<&str> {
        match self {
            Endpoint::Submolts => vec!["submolts"],
            Endpoint::GlobalFeed { .. } => vec!["posts"],
            Endpoint::SubmoltFeed { name } => vec!["submolts", name.as_str(), "feed"],
            Endpoint::PostDetail { id } => vec!["posts", id.as_str()],
            Endpoint::Search { .. } => vec!["search"],
            Endpoint::AgentProfile { .. } => vec!["agents", "profile"],
        }
    }

    pub fn query(&self) -> Option<Vec<(&'static str, String)>> {
        match self {
            Endpoint::GlobalFeed { sort, limit } => Some(vec![
                ("sort", sort.as_str().to_string()),
                ("limit", limit.to_string()),
            ]),
            Endpoint::Search { query } => Some(vec![("q", query.clone())]),
            Endpoint::AgentProfile { name } => Some(vec![("name", name.clone())]),
            Endpoint::Submolts | Endpoint::SubmoltFeed { .. } | Endpoint::PostDetail { .. } => None,
        }
    }

    pub fn url(&self, base: &Url) -> Result<Url, TransportError> {
        let mut url = base.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                TransportError::InvalidRequest(format!("base url {base} cannot carry a path"))
            })?;
            segments.pop_if_empty();
            segments.extend(self.segments());
        }
        match self.query() {
            None => url.set_query(None),
            Some(params) => {
                url.set_query(Some(""));
                let mut pairs = url.query_pairs_mut();
                for (key, value) in params {
                    pairs.append_pair(key, &value);
                }
            }
        }
        Ok(url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPayload(pub Vec<u8>);

impl RawPayload {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for RawPayload {
    fn from(body: &str) -> Self {
        RawPayload(body.as_bytes().to_vec())
    }
}

pub trait Transport: Send + Sync {
    fn request(&self, endpoint: &Endpoint) -> Result<RawPayload, TransportError>;
}

#[derive(Debug, Clone, Default)]
pub struct TransportConfig {
    pub base_url: Option<String>,
    pub user_agent: String,
    pub timeout: Option<Duration>,
    pub http_client: Option<HttpClient>,
}

pub struct HttpTransport {
    http: HttpClient,
    base_url: Url,
    user_agent: String,
    credentials: Arc<dyn CredentialStore>,
}

impl HttpTransport {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        config: TransportConfig,
    ) -> Result<Self, TransportError> {
        let base = config
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = Url::parse(&base)
            .map_err(|err| TransportError::InvalidRequest(format!("base url {base}: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(TransportError::InvalidRequest(format!(
                "base url {base} cannot carry a path"
            )));
        }
        let http = match config.http_client {
            Some(client) => client,
            None => HttpClient::builder()
                .timeout(config.timeout.unwrap_or(Duration::from_secs(20)))
                .build()
                .map_err(|err| TransportError::Network(err.to_string()))?,
        };
        let user_agent = if config.user_agent.trim().is_empty() {
            format!("molt/{}", crate::VERSION)
        } else {
            config.user_agent
        };

        Ok(Self {
            http,
            base_url,
            user_agent,
            credentials,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

impl Transport for HttpTransport {
    fn request(&self, endpoint: &Endpoint) -> Result<RawPayload, TransportError> {
        let url = endpoint.url(&self.base_url)?;
        debug!(%url, "transport: GET");

        let mut req = self
            .http
            .get(url.clone())
            .header(USER_AGENT, self.user_agent.as_str())
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = self.credentials.token().filter(|t| !t.is_empty()) {
            req = req.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let resp = req
            .send()
            .map_err(|err| TransportError::Network(err.to_string()))?;
        let status = resp.status();
        debug!(%url, status = status.as_u16(), "transport: response");
        if status.is_success() {
            let body = resp
                .bytes()
                .map_err(|err| TransportError::Network(err.to_string()))?;
            return Ok(RawPayload(body.to_vec()));
        }
        match status.as_u16() {
            401 => Err(TransportError::Unauthorized),
            code => Err(TransportError::HttpStatus(code)),
        }
    }
}
