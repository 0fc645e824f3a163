//! Shared test helpers: an in-memory layer service.

#![allow(dead_code)]

use async_trait::async_trait;
use layerbalancer_core::{
    Content, Layer, LayerError, LayerGateway, LayerResult, PayloadTransfer, RegionSet, Version,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const LAYER: &str = "shared-deps";

/// A remote call observed by the fake service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Latest { region: String },
    Fetch { region: String, number: i64 },
    Download { location: String },
    Publish { region: String, number: i64 },
}

#[derive(Default)]
struct State {
    /// Published versions per region, oldest first.
    regions: HashMap<String, Vec<Version>>,
    /// Payload bytes by content location.
    payloads: HashMap<String, Vec<u8>>,
    calls: Vec<Call>,
    failing: HashMap<String, String>,
    failing_publish: HashSet<String>,
    blocking: HashSet<String>,
    delays: HashMap<String, Duration>,
    /// Offset added to numbers assigned on publish, per region.
    skew: HashMap<String, i64>,
}

/// In-memory layer service implementing both the gateway and the transfer.
#[derive(Clone, Default)]
pub struct MemoryService {
    state: Arc<Mutex<State>>,
}

fn location(region: &str, number: i64) -> String {
    format!("mem://{region}/{LAYER}/{number}")
}

impl MemoryService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds `region` with versions `1..=latest`, each with a distinct payload.
    pub fn with_region(self, region: &str, latest: i64) -> Self {
        {
            let mut guard = self.state.lock().unwrap();
            let state = &mut *guard;
            let history = state.regions.entry(region.to_string()).or_default();
            for number in 1..=latest {
                history.push(Version {
                    number,
                    region: region.to_string(),
                    description: format!("build {number}"),
                    license: "MIT".to_string(),
                    architectures: vec!["x86_64".to_string()],
                    runtimes: vec!["python3.12".to_string()],
                    content: Content::Empty,
                });
                state
                    .payloads
                    .insert(location(region, number), payload(number));
            }
        }
        self
    }

    /// Makes every call touching `region` fail with `message`.
    pub fn failing(self, region: &str, message: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing
            .insert(region.to_string(), message.to_string());
        self
    }

    /// Makes publishes into `region` fail.
    pub fn failing_publish(self, region: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing_publish
            .insert(region.to_string());
        self
    }

    /// Makes calls touching `region` never return.
    pub fn blocking(self, region: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .blocking
            .insert(region.to_string());
        self
    }

    /// Delays calls touching `region`.
    pub fn delayed(self, region: &str, delay: Duration) -> Self {
        self.state
            .lock()
            .unwrap()
            .delays
            .insert(region.to_string(), delay);
        self
    }

    /// Shifts numbers assigned by publishes into `region`.
    pub fn skewed(self, region: &str, offset: i64) -> Self {
        self.state
            .lock()
            .unwrap()
            .skew
            .insert(region.to_string(), offset);
        self
    }

    pub fn layer(&self) -> Layer {
        Layer::new(LAYER, Arc::new(self.clone()), Arc::new(self.clone())).unwrap()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Calls other than latest-version lookups.
    pub fn replication_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::Latest { .. }))
            .collect()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    /// Numbers published in `region`, oldest first.
    pub fn numbers(&self, region: &str) -> Vec<i64> {
        self.state
            .lock()
            .unwrap()
            .regions
            .get(region)
            .map(|h| h.iter().map(|v| v.number).collect())
            .unwrap_or_default()
    }

    /// Stored payload of version `number` in `region`.
    pub fn payload_of(&self, region: &str, number: i64) -> Option<Vec<u8>> {
        self.state
            .lock()
            .unwrap()
            .payloads
            .get(&location(region, number))
            .cloned()
    }

    /// Descriptor of version `number` in `region`.
    pub fn version_of(&self, region: &str, number: i64) -> Option<Version> {
        self.state
            .lock()
            .unwrap()
            .regions
            .get(region)
            .and_then(|h| h.iter().find(|v| v.number == number).cloned())
    }

    /// Records the call and applies failure injection for `region`.
    async fn enter(&self, region: &str, call: Call) -> LayerResult<()> {
        let (failure, blocked, delay) = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(call);
            (
                state.failing.get(region).cloned(),
                state.blocking.contains(region),
                state.delays.get(region).copied(),
            )
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if blocked {
            std::future::pending::<()>().await;
        }
        match failure {
            Some(message) => Err(LayerError::List(message)),
            None => Ok(()),
        }
    }
}

/// Deterministic payload of a version.
pub fn payload(number: i64) -> Vec<u8> {
    format!("layer-zip-{number}").into_bytes()
}

pub fn regions(names: &[&str]) -> RegionSet {
    RegionSet::new(names.iter().copied()).unwrap()
}

#[async_trait]
impl LayerGateway for MemoryService {
    fn provider_name(&self) -> &'static str {
        "memory"
    }

    async fn fetch_version(&self, _layer: &str, number: i64, region: &str) -> LayerResult<Version> {
        self.enter(
            region,
            Call::Fetch {
                region: region.to_string(),
                number,
            },
        )
        .await?;

        let found = self.version_of(region, number);
        match found {
            Some(v) => Ok(Version {
                content: Content::Location(location(region, number)),
                ..v
            }),
            None => Err(LayerError::NotFound {
                region: region.to_string(),
                number,
            }),
        }
    }

    async fn latest_version(&self, _layer: &str, region: &str) -> LayerResult<Option<Version>> {
        self.enter(
            region,
            Call::Latest {
                region: region.to_string(),
            },
        )
        .await?;

        let state = self.state.lock().unwrap();
        Ok(state.regions.get(region).and_then(|h| h.last().cloned()))
    }

    async fn publish_version(&self, _layer: &str, version: &Version) -> LayerResult<i64> {
        let region = version.region.as_str();
        self.enter(
            region,
            Call::Publish {
                region: region.to_string(),
                number: version.number,
            },
        )
        .await?;

        let bytes = version
            .content
            .bytes()
            .ok_or(LayerError::MissingPayload)?
            .to_vec();

        let mut state = self.state.lock().unwrap();
        if state.failing_publish.contains(region) {
            return Err(LayerError::Publish(format!("{region} rejected the layer")));
        }

        let skew = state.skew.get(region).copied().unwrap_or(0);
        let history = state.regions.entry(region.to_string()).or_default();
        let assigned = history.len() as i64 + 1 + skew;
        history.push(Version {
            number: assigned,
            content: Content::Empty,
            ..version.clone()
        });
        state.payloads.insert(location(region, assigned), bytes);
        Ok(assigned)
    }
}

#[async_trait]
impl PayloadTransfer for MemoryService {
    async fn download(&self, location: &str) -> LayerResult<Vec<u8>> {
        let region = location
            .trim_start_matches("mem://")
            .split('/')
            .next()
            .unwrap_or_default()
            .to_string();
        self.enter(
            &region,
            Call::Download {
                location: location.to_string(),
            },
        )
        .await?;

        self.state
            .lock()
            .unwrap()
            .payloads
            .get(location)
            .cloned()
            .ok_or_else(|| LayerError::Download(format!("no payload at {location}")))
    }
}
