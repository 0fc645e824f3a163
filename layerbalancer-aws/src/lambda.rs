//! AWS Lambda implementation of the layer gateway.
//!
//! Uses the Lambda layer APIs (`GetLayerVersion`, `ListLayerVersions`,
//! `PublishLayerVersion`). Lambda clients are bound to one region, so the
//! gateway keeps one client per region, built on first use from the shared
//! SDK configuration.

use crate::config::AwsSettings;
use async_trait::async_trait;
use aws_sdk_lambda::Client;
use aws_sdk_lambda::config::Region;
use aws_sdk_lambda::config::retry::RetryConfig;
use aws_sdk_lambda::config::timeout::TimeoutConfig;
use aws_sdk_lambda::error::DisplayErrorContext;
use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::types::{Architecture, LayerVersionContentInput, Runtime};
use aws_types::SdkConfig;
use layerbalancer_core::{Content, LayerError, LayerGateway, LayerResult, Version};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// Lambda layer gateway.
pub struct LambdaGateway {
    sdk_config: SdkConfig,
    retry_config: Option<RetryConfig>,
    timeout_config: Option<TimeoutConfig>,
    clients: RwLock<HashMap<String, Client>>,
}

impl fmt::Debug for LambdaGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LambdaGateway")
            .field("endpoint_url", &self.sdk_config.endpoint_url())
            .field("retry_config", &self.retry_config)
            .field("timeout_config", &self.timeout_config)
            .finish()
    }
}

impl LambdaGateway {
    /// Creates a gateway from the shared SDK configuration.
    pub fn new(sdk_config: &SdkConfig, settings: &AwsSettings) -> Self {
        // The SDK counts attempts, not retries.
        let retry_config = settings
            .max_retries
            .map(|retries| RetryConfig::standard().with_max_attempts(retries.saturating_add(1)));

        let timeout_config = settings.timeout_ms.map(|ms| {
            TimeoutConfig::builder()
                .operation_timeout(Duration::from_millis(ms))
                .build()
        });

        Self {
            sdk_config: sdk_config.clone(),
            retry_config,
            timeout_config,
            clients: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the client bound to `region`, building it if needed.
    async fn client(&self, region: &str) -> Client {
        if let Some(client) = self.clients.read().await.get(region) {
            return client.clone();
        }

        let mut clients = self.clients.write().await;
        clients
            .entry(region.to_string())
            .or_insert_with(|| self.build_client(region))
            .clone()
    }

    fn build_client(&self, region: &str) -> Client {
        debug!("Building Lambda client for {}", region);
        let mut builder =
            aws_sdk_lambda::config::Builder::from(&self.sdk_config).region(Region::new(region.to_string()));

        if let Some(retry_config) = &self.retry_config {
            builder = builder.retry_config(retry_config.clone());
        }
        if let Some(timeout_config) = &self.timeout_config {
            builder = builder.timeout_config(timeout_config.clone());
        }

        Client::from_conf(builder.build())
    }
}

fn architectures_to_strings(architectures: &[Architecture]) -> Vec<String> {
    architectures.iter().map(|a| a.as_str().to_string()).collect()
}

fn runtimes_to_strings(runtimes: &[Runtime]) -> Vec<String> {
    runtimes.iter().map(|r| r.as_str().to_string()).collect()
}

fn non_empty<T, F>(values: &[String], convert: F) -> Option<Vec<T>>
where
    F: Fn(&str) -> T,
{
    if values.is_empty() {
        None
    } else {
        Some(values.iter().map(|v| convert(v.as_str())).collect())
    }
}

fn non_blank(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[async_trait]
impl LayerGateway for LambdaGateway {
    fn provider_name(&self) -> &'static str {
        "AWS Lambda"
    }

    async fn fetch_version(&self, layer: &str, number: i64, region: &str) -> LayerResult<Version> {
        let client = self.client(region).await;
        let out = client
            .get_layer_version()
            .layer_name(layer)
            .version_number(number)
            .send()
            .await
            .map_err(|e| {
                let not_found = e
                    .as_service_error()
                    .is_some_and(|se| se.is_resource_not_found_exception());
                if not_found {
                    LayerError::NotFound {
                        region: region.to_string(),
                        number,
                    }
                } else {
                    LayerError::Fetch(DisplayErrorContext(&e).to_string())
                }
            })?;

        let content = out
            .content()
            .and_then(|c| c.location())
            .map(|location| Content::Location(location.to_string()))
            .unwrap_or_default();

        Ok(Version {
            number: out.version(),
            region: region.to_string(),
            description: out.description().unwrap_or_default().to_string(),
            license: out.license_info().unwrap_or_default().to_string(),
            architectures: architectures_to_strings(out.compatible_architectures()),
            runtimes: runtimes_to_strings(out.compatible_runtimes()),
            content,
        })
    }

    async fn latest_version(&self, layer: &str, region: &str) -> LayerResult<Option<Version>> {
        let client = self.client(region).await;
        // Lambda lists versions newest first.
        let out = client
            .list_layer_versions()
            .layer_name(layer)
            .max_items(1)
            .send()
            .await
            .map_err(|e| LayerError::List(DisplayErrorContext(&e).to_string()))?;

        let Some(latest) = out.layer_versions().first() else {
            return Ok(None);
        };

        Ok(Some(Version {
            number: latest.version(),
            region: region.to_string(),
            description: latest.description().unwrap_or_default().to_string(),
            license: latest.license_info().unwrap_or_default().to_string(),
            architectures: architectures_to_strings(latest.compatible_architectures()),
            runtimes: runtimes_to_strings(latest.compatible_runtimes()),
            content: Content::Empty,
        }))
    }

    async fn publish_version(&self, layer: &str, version: &Version) -> LayerResult<i64> {
        let bytes = version.content.bytes().ok_or(LayerError::MissingPayload)?;
        let client = self.client(&version.region).await;

        let content = LayerVersionContentInput::builder()
            .zip_file(Blob::new(bytes.to_vec()))
            .build();

        let out = client
            .publish_layer_version()
            .layer_name(layer)
            .content(content)
            .set_compatible_architectures(non_empty(&version.architectures, |a| Architecture::from(a)))
            .set_compatible_runtimes(non_empty(&version.runtimes, |r| Runtime::from(r)))
            .set_description(non_blank(&version.description))
            .set_license_info(non_blank(&version.license))
            .send()
            .await
            .map_err(|e| LayerError::Publish(DisplayErrorContext(&e).to_string()))?;

        Ok(out.version())
    }
}
