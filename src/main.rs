#[macro_use]
extern crate tracing;

use std::env;

use anyhow::bail;
use clap::Parser;
use elastic_pane::cli::{Cli, Sub};
use elastic_pane::simulate;
use elastic_pane::utils::config_path;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "elastic_pane=debug,info";

fn main() -> anyhow::Result<()> {
    let directives = env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_owned());
    let env_filter = EnvFilter::builder().parse_lossy(directives);
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter)
        .init();

    let cli = Cli::parse();

    let _client = tracy_client::Client::start();

    let path = config_path(cli.config)?;
    debug!("using config from {:?}", path.path());

    let config = match path.load() {
        Ok(config) => config,
        Err(err) => {
            warn!("{err:?}");
            bail!("error loading config from {:?}", path.path());
        }
    };

    match cli.subcommand {
        Sub::Validate => {
            info!("config is valid");
        }
        Sub::Simulate(args) => {
            let report = simulate::run(&args, &config)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{report}");
            }
        }
    }

    Ok(())
}
