//! Command-line entry point for generating Swagger documents from route manifests.
//!
//! # Usage
//!
//! ```bash
//! swagger-from-routes [OPTIONS] <MANIFEST_PATH>
//! ```
//!
//! # Examples
//!
//! Generate YAML from a directory of manifests:
//! ```bash
//! swagger-from-routes ./api -o swagger.yaml
//! ```
//!
//! Generate JSON plus a Swagger UI bundle, leaving out the `internal` namespace:
//! ```bash
//! swagger-from-routes ./api/urls.yaml -f json -o swagger.json --ui docs/ --exclude-namespace internal
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use swagger_from_routes::cli;

fn main() -> Result<()> {
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("swagger-from-routes starting...");

    let args = cli::parse_args_from_parsed(args)?;
    cli::run(args)?;

    Ok(())
}
