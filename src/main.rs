//! syncsite - render headless-CMS content to a static HTML site.

mod build;
mod cli;
mod comments;
mod config;
mod content;
mod init;
mod logger;
mod render;
mod serve;
mod site;
mod state;
mod utils;

use anyhow::Result;
use build::build_site;
use clap::Parser;
use cli::{Cli, Commands};
use config::SiteConfig;
use content::DeliveryClient;
use init::new_site;
use serve::serve_site;
use state::StateStore;

fn main() -> Result<()> {
    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));
    let config = SiteConfig::load(cli, |key| std::env::var(key).ok())?;
    let config: &'static SiteConfig = Box::leak(Box::new(config));

    match &cli.command {
        Commands::Init => new_site(config),
        Commands::Build { build_args } => build(config, build_args.full),
        Commands::Serve { build_args, .. } => {
            build(config, build_args.full)?;
            serve_site(config)
        }
    }
}

fn build(config: &'static SiteConfig, full: bool) -> Result<()> {
    let source = DeliveryClient::new(&config.content)?;
    let store = StateStore::from_config(config);
    build_site(config, &source, &store, full)?;
    Ok(())
}
