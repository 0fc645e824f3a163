//! Shared test helpers: a minimal in-memory Lambda.

#![allow(dead_code)]

use async_trait::async_trait;
use layerbalancer_core::{
    Content, Layer, LayerError, LayerGateway, LayerResult, PayloadTransfer, RegionSet, Version,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

pub const LAYER: &str = "shared-deps";

#[derive(Default)]
struct State {
    /// Latest published number per region.
    latest: HashMap<String, i64>,
    failing: HashSet<String>,
    published: Vec<(String, i64)>,
}

#[derive(Clone, Default)]
pub struct FakeLambda {
    state: Arc<Mutex<State>>,
}

impl FakeLambda {
    pub fn with_region(self, region: &str, latest: i64) -> Self {
        self.state
            .lock()
            .unwrap()
            .latest
            .insert(region.to_string(), latest);
        self
    }

    pub fn failing(self, region: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing
            .insert(region.to_string());
        self
    }

    pub fn layer(&self) -> Layer {
        Layer::new(LAYER, Arc::new(self.clone()), Arc::new(self.clone())).unwrap()
    }

    pub fn latest(&self, region: &str) -> i64 {
        self.state
            .lock()
            .unwrap()
            .latest
            .get(region)
            .copied()
            .unwrap_or(0)
    }

    pub fn published(&self) -> Vec<(String, i64)> {
        self.state.lock().unwrap().published.clone()
    }

    fn check(&self, region: &str) -> LayerResult<()> {
        if self.state.lock().unwrap().failing.contains(region) {
            return Err(LayerError::List(format!("throttled in {region}")));
        }
        Ok(())
    }

    fn version(region: &str, number: i64) -> Version {
        Version {
            number,
            region: region.to_string(),
            content: Content::Location(format!("mem://{region}/{number}")),
            ..Version::absent(region)
        }
    }
}

#[async_trait]
impl LayerGateway for FakeLambda {
    fn provider_name(&self) -> &'static str {
        "fake"
    }

    async fn fetch_version(&self, _layer: &str, number: i64, region: &str) -> LayerResult<Version> {
        self.check(region)?;
        if number < 1 || number > self.latest(region) {
            return Err(LayerError::NotFound {
                region: region.to_string(),
                number,
            });
        }
        Ok(Self::version(region, number))
    }

    async fn latest_version(&self, _layer: &str, region: &str) -> LayerResult<Option<Version>> {
        self.check(region)?;
        Ok(match self.latest(region) {
            0 => None,
            n => Some(Self::version(region, n)),
        })
    }

    async fn publish_version(&self, _layer: &str, version: &Version) -> LayerResult<i64> {
        self.check(&version.region)?;
        let mut state = self.state.lock().unwrap();
        let assigned = state.latest.entry(version.region.clone()).or_insert(0);
        *assigned += 1;
        let assigned = *assigned;
        state.published.push((version.region.clone(), assigned));
        Ok(assigned)
    }
}

#[async_trait]
impl PayloadTransfer for FakeLambda {
    async fn download(&self, location: &str) -> LayerResult<Vec<u8>> {
        Ok(location.as_bytes().to_vec())
    }
}

pub fn regions(names: &[&str]) -> RegionSet {
    RegionSet::new(names).unwrap()
}
