//! Layer version descriptors and region sets.

use crate::error::{LayerError, LayerResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Payload reference of a version.
///
/// Reads return a remote location, publishes require raw bytes; a descriptor
/// never carries both.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Content {
    /// No payload reference (listed or never-published versions).
    #[default]
    Empty,
    /// Pre-signed location the payload can be downloaded from.
    Location(String),
    /// Payload bytes about to be published.
    #[serde(skip)]
    Bytes(Vec<u8>),
}

impl Content {
    /// Returns the remote location, if any.
    pub fn location(&self) -> Option<&str> {
        match self {
            Content::Location(location) => Some(location),
            _ => None,
        }
    }

    /// Returns the payload bytes, if any.
    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            Content::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Content::Empty)
    }
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Content::Empty => f.write_str("Empty"),
            Content::Location(location) => f.debug_tuple("Location").field(location).finish(),
            Content::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
        }
    }
}

/// One version of a layer, as seen in a single region.
///
/// Version number 0 means the layer was never published in `region`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    /// Version number assigned by the gateway.
    pub number: i64,
    /// Region the descriptor was read from or will be published to.
    pub region: String,
    pub description: String,
    pub license: String,
    /// Compatible instruction set architectures (e.g. `x86_64`, `arm64`).
    pub architectures: Vec<String>,
    /// Compatible runtimes (e.g. `python3.12`).
    pub runtimes: Vec<String>,
    pub content: Content,
}

impl Version {
    /// Descriptor standing for "never published in this region".
    pub fn absent(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            ..Default::default()
        }
    }

    /// Returns true if this descriptor refers to a published version.
    pub fn is_published(&self) -> bool {
        self.number > 0
    }

    /// Builds the descriptor to publish into `region`: same metadata, payload
    /// replaced by the downloaded bytes.
    pub fn republish_to(self, region: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            region: region.into(),
            content: Content::Bytes(payload),
            ..self
        }
    }
}

/// Ordered set of regions a layer is balanced across.
///
/// Holds at least two regions; duplicates are kept as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct RegionSet(Vec<String>);

impl RegionSet {
    /// Minimum number of regions that can exhibit drift.
    pub const MIN_REGIONS: usize = 2;

    /// Creates a region set, trimming entries and dropping empty ones.
    pub fn new<I, S>(regions: I) -> LayerResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let regions: Vec<String> = regions
            .into_iter()
            .map(|r| r.as_ref().trim().to_string())
            .filter(|r| !r.is_empty())
            .collect();

        if regions.len() < Self::MIN_REGIONS {
            return Err(LayerError::Usage(
                r#"required flag "regions" must contain at least two regions"#.to_string(),
            ));
        }

        Ok(Self(regions))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl TryFrom<Vec<String>> for RegionSet {
    type Error = LayerError;

    fn try_from(regions: Vec<String>) -> LayerResult<Self> {
        Self::new(regions)
    }
}

impl From<RegionSet> for Vec<String> {
    fn from(set: RegionSet) -> Self {
        set.0
    }
}

impl<'a> IntoIterator for &'a RegionSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for RegionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}
