use std::{env, time::Duration};

use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT_ENCODING, ACCEPT_LANGUAGE, REFERER, USER_AGENT},
    Client, StatusCode,
};
use rocket::{
    fairing::{self, Fairing, Info, Kind},
    Build, Rocket,
};
use shared::data::VehicleQuery;
use thiserror::Error;

pub const DEFAULT_SOURCE_URL: &str = "https://vahanx.in";
pub const SOURCE_URL_ENV: &str = "VEHICLE_SOURCE_URL";

const TIMEOUT: Duration = Duration::from_secs(10);

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 6.0; Nexus 5 Build/MRA58N) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/138.0.0.0 Mobile Safari/537.36";
const BROWSER_REFERER: &str = "https://vahanx.in/";
const BROWSER_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
const BROWSER_ACCEPT_ENCODING: &str = "gzip, deflate, br";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream responded with {0}")]
    Status(StatusCode),
}

/// Somewhere the registration search page for a vehicle can be loaded from.
#[rocket::async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, query: &VehicleQuery) -> Result<String, FetchError>;
}

pub struct HttpPageSource {
    base_url: String,
    timeout: Duration,
    client: Client,
}

impl HttpPageSource {
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        Self::with_timeout(base_url, TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .default_headers(browser_headers())
            .timeout(timeout)
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').into(),
            timeout,
            client,
        })
    }

    #[must_use]
    pub fn page_url(&self, query: &VehicleQuery) -> String {
        format!("{}/rc-search/{query}", self.base_url)
    }
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(REFERER, HeaderValue::from_static(BROWSER_REFERER));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(BROWSER_ACCEPT_LANGUAGE));
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static(BROWSER_ACCEPT_ENCODING));
    headers
}

#[rocket::async_trait]
impl PageSource for HttpPageSource {
    async fn fetch(&self, query: &VehicleQuery) -> Result<String, FetchError> {
        let url = self.page_url(query);
        info!("Fetching {url}");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        Ok(response.text().await?)
    }
}

/// Builds the outbound client once and hands it to Rocket as `Box<dyn PageSource>`.
pub struct SourceFairing {
    base_url: String,
}

impl SourceFairing {
    pub fn fairing(base_url: &str) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn from_env() -> Self {
        Self::fairing(&base_url_from(env::var(SOURCE_URL_ENV).ok()))
    }
}

fn base_url_from(value: Option<String>) -> String {
    value
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SOURCE_URL.into())
}

#[rocket::async_trait]
impl Fairing for SourceFairing {
    fn info(&self) -> Info {
        Info {
            name: "Page source",
            kind: Kind::Ignite | Kind::Singleton,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> fairing::Result {
        let source = match HttpPageSource::new(&self.base_url) {
            Ok(source) => source,
            Err(e) => {
                error!("Failed to build HTTP client for {}: {e}", self.base_url);
                return Err(rocket);
            }
        };

        info!(
            "Vehicle pages are loaded from {} with a {:?} timeout",
            self.base_url, source.timeout
        );
        Ok(rocket.manage(Box::new(source) as Box<dyn PageSource>))
    }
}
