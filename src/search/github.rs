//! [`SearchGateway`] backed by the GitHub REST search endpoints.

use derive_builder::Builder;
use futures::FutureExt as _;
use futures::future::BoxFuture;
use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;

use super::error::{RemoteErrorKind, RemoteSearchError, looks_rate_limited};
use super::model::{ErrorBody, RawRepository, RawUser, SearchPage};
use super::{GatewayResult, MIN_QUERY_LENGTH, PAGE_SIZE, RepositoryResult, SearchGateway, UserResult, is_searchable};
use crate::SearchOptions;

const DEFAULT_API_URL: &str = "https://api.github.com";
const DEFAULT_USER_AGENT: &str = concat!("ghsearch/", env!("CARGO_PKG_VERSION"));

/// GitHub search client
///
/// ```no_run
/// use ghsearch::search::GitHubGatewayBuilder;
///
/// let gateway = GitHubGatewayBuilder::default()
///     .token(Some("ghp_xxx".to_string()))
///     .build()
///     .unwrap();
/// ```
#[derive(Builder, Clone, Debug)]
#[builder(build_fn(name = "final_build"))]
#[builder(default)]
pub struct GitHubGateway {
    /// Base URL of the REST API, without trailing slash
    #[builder(setter(into))]
    pub api_url: String,
    /// Personal access token, raises the rate limit when present
    pub token: Option<String>,
    /// Items requested per call
    pub page_size: usize,
    /// Shorter queries short-circuit to an empty list
    pub min_query_length: usize,
    /// Sent as `User-Agent`, which GitHub requires
    #[builder(setter(into))]
    pub user_agent: String,
    #[builder(setter(skip))]
    client: Client,
}

impl Default for GitHubGateway {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            page_size: PAGE_SIZE,
            min_query_length: MIN_QUERY_LENGTH,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            client: Client::new(),
        }
    }
}

impl GitHubGatewayBuilder {
    /// Builds the gateway and its HTTP client
    pub fn build(&self) -> Result<GitHubGateway, RemoteSearchError> {
        let mut gateway = self
            .final_build()
            .map_err(|e| RemoteSearchError::new(RemoteErrorKind::Transport, e.to_string()))?;
        gateway.api_url = gateway.api_url.trim_end_matches('/').to_string();
        gateway.client = build_client(gateway.token.as_deref(), &gateway.user_agent)?;
        Ok(gateway)
    }
}

impl GitHubGateway {
    /// Creates a gateway configured from the search options
    pub fn from_options(options: &SearchOptions) -> Result<Self, RemoteSearchError> {
        GitHubGatewayBuilder::default()
            .api_url(options.api_url.clone())
            .token(options.token.clone().filter(|t| !t.trim().is_empty()))
            .page_size(options.page_size)
            .min_query_length(options.min_query_length)
            .user_agent(options.user_agent.clone())
            .build()
    }

    async fn search<T: DeserializeOwned>(&self, path: &str, query: &str, sort: &str) -> GatewayResult<T> {
        if !is_searchable(query, self.min_query_length) {
            trace!("{path}: query {query:?} too short, not searching");
            return Ok(Vec::new());
        }
        let per_page = self.page_size.to_string();
        let url = format!("{}{path}", self.api_url);
        debug!("GET {url} q={query:?} sort={sort}");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", query),
                ("per_page", per_page.as_str()),
                ("sort", sort),
                ("order", "desc"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let remaining = response
                .headers()
                .get("x-ratelimit-remaining")
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .or_else(|| Some(body.trim().to_owned()).filter(|b| !b.is_empty()))
                .or_else(|| status.canonical_reason().map(str::to_owned));
            let kind = if looks_rate_limited(status.as_u16(), remaining.as_deref(), message.as_deref()) {
                RemoteErrorKind::RateLimited
            } else {
                RemoteErrorKind::Status(status.as_u16())
            };
            warn!("{path} failed ({status}): {message:?}");
            return Err(RemoteSearchError { kind, message });
        }

        let page: SearchPage<T> = response.json().await?;
        debug!("{path}: {} items for {query:?}", page.items.len());
        Ok(page.items)
    }
}

impl SearchGateway for GitHubGateway {
    fn search_accounts<'a>(&'a self, query: &'a str) -> BoxFuture<'a, GatewayResult<UserResult>> {
        async move {
            let raw: Vec<RawUser> = self.search("/search/users", query, "followers").await?;
            Ok(raw.into_iter().map(UserResult::from).collect())
        }
        .boxed()
    }

    fn search_repositories<'a>(&'a self, query: &'a str) -> BoxFuture<'a, GatewayResult<RepositoryResult>> {
        async move {
            let raw: Vec<RawRepository> = self.search("/search/repositories", query, "stars").await?;
            Ok(raw.into_iter().map(RepositoryResult::from).collect())
        }
        .boxed()
    }
}

/// Creates a preconfigured HTTP client with the headers GitHub expects
fn build_client(token: Option<&str>, user_agent: &str) -> Result<Client, RemoteSearchError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
    headers.insert("X-GitHub-Api-Version", HeaderValue::from_static("2022-11-28"));
    if let Some(token) = token {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| RemoteSearchError::new(RemoteErrorKind::Transport, format!("invalid token: {e}")))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    Ok(Client::builder()
        .default_headers(headers)
        .user_agent(user_agent)
        .build()?)
}
