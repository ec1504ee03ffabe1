//! Station directory HTTP client.

use std::fmt;

use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

use super::error::DirectoryError;

/// A station as listed by the directory.
///
/// Decoding is lenient: keys match ignoring ASCII case, unknown fields are
/// ignored, and missing or `null` fields take their zero value. When a key
/// appears twice the later value wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Station {
    pub id: i64,
    pub name: String,
    pub url: String,
}

impl Station {
    /// Create a station record.
    pub fn new(id: i64, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            url: url.into(),
        }
    }
}

impl<'de> Deserialize<'de> for Station {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(StationVisitor)
    }
}

struct StationVisitor;

impl<'de> Visitor<'de> for StationVisitor {
    type Value = Station;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a station object")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Station, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut station = Station::default();

        while let Some(key) = map.next_key::<String>()? {
            if key.eq_ignore_ascii_case("id") {
                if let Some(id) = map.next_value::<Option<i64>>()? {
                    station.id = id;
                }
            } else if key.eq_ignore_ascii_case("name") {
                if let Some(name) = map.next_value::<Option<String>>()? {
                    station.name = name;
                }
            } else if key.eq_ignore_ascii_case("url") {
                if let Some(url) = map.next_value::<Option<String>>()? {
                    station.url = url;
                }
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }

        Ok(station)
    }
}

/// Decode a directory payload.
///
/// Only the first JSON value in `body` is read; anything after it is
/// ignored. A `null` payload is an empty directory and a `null` entry is a
/// zero-valued station.
fn decode_directory(body: &[u8]) -> Result<Vec<Station>, DirectoryError> {
    let first = serde_json::Deserializer::from_slice(body)
        .into_iter::<Option<Vec<Option<Station>>>>()
        .next();

    let stations = match first {
        Some(Ok(stations)) => stations,
        Some(Err(e)) => {
            return Err(DirectoryError::Parse {
                message: e.to_string(),
            });
        }
        None => {
            return Err(DirectoryError::Parse {
                message: "empty response body".to_string(),
            });
        }
    };

    Ok(stations
        .unwrap_or_default()
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect())
}

/// Public projection of a station: only the name is exposed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationSummary {
    pub name: String,
}

impl From<&Station> for StationSummary {
    fn from(station: &Station) -> Self {
        Self {
            name: station.name.clone(),
        }
    }
}

/// Configuration for the directory client.
#[derive(Debug, Clone)]
pub struct DirectoryClientConfig {
    /// Full URL of the directory endpoint
    pub endpoint: String,
}

impl DirectoryClientConfig {
    /// Create a new config pointing at the given endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

/// Client for the upstream station directory.
///
/// Holds no state other than the HTTP connection pool. Every call to
/// [`DirectoryClient::fetch_stations`] issues a fresh request.
#[derive(Debug, Clone)]
pub struct DirectoryClient {
    http: reqwest::Client,
    endpoint: String,
}

impl DirectoryClient {
    /// Create a new directory client.
    pub fn new(config: DirectoryClientConfig) -> Result<Self, DirectoryError> {
        let http = reqwest::Client::builder().build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint,
        })
    }

    /// The endpoint this client fetches from.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch the current station list, in directory order.
    ///
    /// The HTTP status is not checked before decoding: an error page that
    /// happens to be a JSON array would be accepted as a directory.
    pub async fn fetch_stations(&self) -> Result<Vec<Station>, DirectoryError> {
        let response = self.http.get(&self.endpoint).send().await?;
        let status = response.status();

        if !status.is_success() {
            warn!(%status, endpoint = %self.endpoint, "directory returned non-success status");
        }

        let body = response.bytes().await?;

        let stations = decode_directory(&body)?;

        debug!(count = stations.len(), "fetched station directory");
        Ok(stations)
    }
}
