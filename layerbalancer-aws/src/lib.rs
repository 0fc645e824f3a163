//! AWS collaborators for layerbalancer.
//!
//! - [`LambdaGateway`]: layer versions through the Lambda API, one client per region
//! - [`HttpTransfer`]: payload download from the pre-signed content location
//! - [`load_sdk_config`]: credentials and shared settings from the default chain

mod config;
mod error;
mod lambda;
mod transfer;

pub use config::{AwsSettings, DEFAULT_MAX_PAYLOAD_BYTES, ensure_credentials, load_sdk_config};
pub use error::{AwsError, AwsResult};
pub use lambda::LambdaGateway;
pub use transfer::HttpTransfer;

use aws_types::SdkConfig;
use layerbalancer_core::Layer;
use std::sync::Arc;

/// Binds `layer_name` to the Lambda gateway and the HTTP transfer.
pub fn connect(layer_name: &str, sdk_config: &SdkConfig, settings: &AwsSettings) -> AwsResult<Layer> {
    settings.validate()?;
    let gateway = LambdaGateway::new(sdk_config, settings);
    let transfer = HttpTransfer::new(settings)?;
    Ok(Layer::new(layer_name, Arc::new(gateway), Arc::new(transfer))?)
}
