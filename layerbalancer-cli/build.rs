//! Embeds release information into the version string.

use std::env;

fn main() {
    let commit = env::var("LB_BUILD_COMMIT").unwrap_or_else(|_| "unknown".to_string());
    let os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=LB_BUILD_COMMIT={commit}");
    println!("cargo:rustc-env=LB_BUILD_OS={os}");
    println!("cargo:rerun-if-env-changed=LB_BUILD_COMMIT");
}
