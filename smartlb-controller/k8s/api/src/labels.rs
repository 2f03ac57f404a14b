use std::{collections::BTreeMap, fmt, str::FromStr, sync::Arc};

pub type Map = BTreeMap<String, String>;

#[derive(Clone, Debug, Eq, Default)]
pub struct Labels(Arc<Map>);

/// An equality-based label selector, e.g. `deploymentconfig=router,app=lb`.
///
/// An empty selector matches every set of labels.
#[derive(Clone, Debug, Eq, PartialEq, Default)]
pub struct Selector(Map);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseSelectorError {
    #[error("label requirement '{0}' must be of the form key=value")]
    Malformed(String),

    #[error("label key must not be empty")]
    EmptyKey,
}

// === Selector ===

impl Selector {
    pub fn from_map(map: Map) -> Self {
        Self(map)
    }

    pub fn matches(&self, labels: &Labels) -> bool {
        self.0.iter().all(|(k, v)| labels.0.get(k) == Some(v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for Selector {
    type Err = ParseSelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut map = Map::new();
        for requirement in s.split(',').map(str::trim).filter(|r| !r.is_empty()) {
            let (key, value) = requirement
                .split_once("==")
                .or_else(|| requirement.split_once('='))
                .ok_or_else(|| ParseSelectorError::Malformed(requirement.to_string()))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(ParseSelectorError::EmptyKey);
            }
            map.insert(key.to_string(), value.trim().to_string());
        }
        Ok(Self(map))
    }
}

/// Formats the selector as a Kubernetes API label selector.
impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (k, v) in self.0.iter() {
            if !first {
                f.write_str(",")?;
            }
            first = false;
            write!(f, "{k}={v}")?;
        }
        Ok(())
    }
}

impl std::iter::FromIterator<(&'static str, &'static str)> for Selector {
    fn from_iter<T: IntoIterator<Item = (&'static str, &'static str)>>(iter: T) -> Self {
        Self::from_map(
            iter.into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

// === Labels ===

impl From<Map> for Labels {
    #[inline]
    fn from(labels: Map) -> Self {
        Self(Arc::new(labels))
    }
}

impl From<Option<Map>> for Labels {
    #[inline]
    fn from(labels: Option<Map>) -> Self {
        labels.unwrap_or_default().into()
    }
}

impl AsRef<Map> for Labels {
    #[inline]
    fn as_ref(&self) -> &Map {
        self.0.as_ref()
    }
}

impl<T: AsRef<Map>> std::cmp::PartialEq<T> for Labels {
    #[inline]
    fn eq(&self, t: &T) -> bool {
        self.0.as_ref().eq(t.as_ref())
    }
}

impl std::iter::FromIterator<(String, String)> for Labels {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(Arc::new(iter.into_iter().collect()))
    }
}

impl std::iter::FromIterator<(&'static str, &'static str)> for Labels {
    fn from_iter<T: IntoIterator<Item = (&'static str, &'static str)>>(iter: T) -> Self {
        iter.into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}
