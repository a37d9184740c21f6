pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod http;
pub mod rate_limiter;
pub mod results;
pub mod services;

use anyhow::Result;
use clap::Parser;
use cli::Cli;

use crate::api::ChessComClient;
use crate::cli::{Command, DetectArgs, SiteArgs};
use crate::config::{AppConfig, SitePaths};
use crate::services::{DetectionService, DetectionSummary, StatusService};

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

pub fn handle_detect(args: &DetectArgs) -> Result<DetectionSummary> {
    let config = AppConfig::from_args(args)?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let mut client = ChessComClient::new(&config.fetcher)?;
        let service = DetectionService::new(config);
        service.run(&mut client).await
    })
}

pub fn handle_status(args: &SiteArgs) -> Result<()> {
    let paths = SitePaths::new(&args.project_root, &args.site_key)?;
    StatusService::new(paths).run();
    Ok(())
}
