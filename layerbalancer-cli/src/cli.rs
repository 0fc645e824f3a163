//! Command-line definitions.

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use layerbalancer_aws::AwsSettings;
use layerbalancer_core::{LayerError, LayerResult, ReconcileConfig, RegionSet};

/// Version string: package version, build commit and target OS.
pub const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    ", build: ",
    env!("LB_BUILD_COMMIT"),
    ", os: ",
    env!("LB_BUILD_OS")
);

#[derive(Parser, Debug)]
#[command(name = "lb", version = VERSION)]
#[command(about = "balance your AWS lambda layers cross regions")]
#[command(
    long_about = "Layer Balancer or 'lb' is a tool for balancing the layer version of your Lambda\nacross AWS regions, so each region has the same Lambda layer version."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// AWS shared config profile to use
    #[arg(long, global = true)]
    pub profile: Option<String>,

    /// Override the Lambda endpoint (e.g. LocalStack)
    #[arg(long, global = true, value_name = "URL")]
    pub endpoint_url: Option<String>,

    /// Lambda operation timeout in milliseconds, retries included
    #[arg(long, global = true, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Lambda retries after the first attempt
    #[arg(long, global = true, value_name = "N")]
    pub max_retries: Option<u32>,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// bump layer to latest version across regions
    #[command(visible_alias = "reconcile")]
    Bump {
        #[command(flatten)]
        target: TargetArgs,

        /// Fail when a region assigns a different number than the source
        #[arg(long)]
        strict: bool,
    },

    /// verifies layer latest versions across regions
    Verify {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: Shell,
    },
}

impl Commands {
    /// Layer and regions of the commands that talk to AWS.
    pub fn target(&self) -> Option<&TargetArgs> {
        match self {
            Commands::Bump { target, .. } | Commands::Verify { target } => Some(target),
            Commands::Completions { .. } => None,
        }
    }
}

/// Layer and regions a command works on.
#[derive(Args, Debug)]
pub struct TargetArgs {
    /// Name of the Lambda layer
    #[arg(value_name = "layer-name")]
    pub layer_name: Option<String>,

    /// list of regions separated by comma.
    #[arg(short, long, value_delimiter = ',')]
    pub regions: Vec<String>,
}

impl TargetArgs {
    /// Returns the layer name, or the usage error when it is missing.
    pub fn layer_name(&self) -> LayerResult<&str> {
        match self.layer_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Ok(name),
            _ => Err(LayerError::Usage(
                r#"required argument "layer-name" not set"#.to_string(),
            )),
        }
    }

    /// Validates the regions.
    pub fn region_set(&self) -> LayerResult<RegionSet> {
        RegionSet::new(&self.regions)
    }
}

impl Cli {
    /// AWS settings derived from the global options.
    pub fn aws_settings(&self) -> AwsSettings {
        AwsSettings {
            profile: self.profile.clone(),
            endpoint_url: self.endpoint_url.clone(),
            timeout_ms: self.timeout_ms,
            max_retries: self.max_retries,
            ..Default::default()
        }
    }

    /// Driver configuration derived from the command.
    pub fn reconcile_config(&self) -> ReconcileConfig {
        match &self.command {
            Some(Commands::Bump { strict, .. }) => ReconcileConfig {
                strict_numbering: *strict,
            },
            _ => ReconcileConfig::default(),
        }
    }
}
