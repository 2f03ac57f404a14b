use std::{fmt, str::FromStr};
use url::Url;

/// The set of load balancer APIs to publish to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Destinations(Vec<Url>);

/// Identifies this cluster's data on the remote APIs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClusterKey(String);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("smart load balancer APIs must be specified")]
    NoDestinations,

    #[error("invalid smart load balancer API url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("smart load balancer API url '{0}' must use http or https")]
    UnsupportedScheme(String),

    #[error("cluster key must be specified")]
    EmptyClusterKey,
}

// === impl Destinations ===

impl Destinations {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the URL to which a cluster's snapshot is posted for each destination.
    ///
    /// The key is appended as a single, percent-encoded path segment after any base path.
    pub fn endpoints(&self, key: &ClusterKey) -> Vec<String> {
        self.0
            .iter()
            .filter_map(|base| {
                let mut url = base.clone();
                // http(s) URLs always have a path, so this never skips a destination.
                url.path_segments_mut()
                    .ok()?
                    .pop_if_empty()
                    .extend(["api", "cluster", key.0.as_str()]);
                Some(url.into())
            })
            .collect()
    }
}

/// Parses a comma-separated list of base URLs.
///
/// Blank entries are skipped and repeated URLs are only published to once.
impl FromStr for Destinations {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut urls = Vec::<Url>::new();
        for raw in s.split(',').map(str::trim).filter(|u| !u.is_empty()) {
            let url = Url::parse(raw).map_err(|source| ConfigError::InvalidUrl {
                url: raw.to_string(),
                source,
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(ConfigError::UnsupportedScheme(raw.to_string()));
            }
            if !urls.contains(&url) {
                urls.push(url);
            }
        }

        if urls.is_empty() {
            return Err(ConfigError::NoDestinations);
        }
        Ok(Self(urls))
    }
}

impl fmt::Display for Destinations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, url) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            fmt::Display::fmt(url, f)?;
        }
        Ok(())
    }
}

// === impl ClusterKey ===

impl FromStr for ClusterKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        if key.is_empty() {
            return Err(ConfigError::EmptyClusterKey);
        }
        Ok(Self(key.to_string()))
    }
}

impl fmt::Display for ClusterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
