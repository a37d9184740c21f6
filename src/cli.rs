use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "chess league tracker: early resignation detection")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Scan started matches and record early resignations of the club's players
    Detect(DetectArgs),
    /// Summarise the resolution cache and recorded resignations of a site
    Status(SiteArgs),
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct SiteArgs {
    /// Site key, selects config/<site>/ and public/data/<site>/
    #[arg(long)]
    pub site_key: String,

    /// Directory containing config/ and public/
    #[arg(long, default_value = ".")]
    pub project_root: PathBuf,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct DetectArgs {
    #[command(flatten)]
    pub site: SiteArgs,

    /// Max half-moves (plies) still considered an early resignation
    #[arg(long, env = "EARLY_RESIGN_THRESHOLD", default_value_t = 2)]
    pub threshold: u32,

    /// HTTP timeout in seconds per request attempt
    #[arg(long, env = "HTTP_TIMEOUT", default_value_t = 15)]
    pub timeout: u64,

    /// HTTP retries per request
    #[arg(long, env = "HTTP_RETRIES", default_value_t = 2)]
    pub retries: u32,

    /// Minimum delay between consecutive requests in milliseconds
    #[arg(long, default_value_t = 200)]
    pub rate_limit_ms: u64,

    /// User agent sent to the API (overrides script_params.json)
    #[arg(long, env = "USER_AGENT")]
    pub user_agent: Option<String>,

    /// Run detection without writing the cache or results
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_defaults() {
        let cli = Cli::try_parse_from(["tracker", "detect", "--site-key", "1dpmc"]).unwrap();
        let Command::Detect(args) = cli.command else {
            panic!("expected detect command");
        };

        assert_eq!(args.site.site_key, "1dpmc");
        assert_eq!(args.site.project_root, PathBuf::from("."));
        assert!(!args.dry_run);
    }

    #[test]
    fn test_negative_numbers_are_rejected() {
        let parsed = Cli::try_parse_from([
            "tracker",
            "detect",
            "--site-key",
            "1dpmc",
            "--threshold",
            "-1",
        ]);
        assert!(parsed.is_err());

        let parsed = Cli::try_parse_from([
            "tracker", "detect", "--site-key", "1dpmc", "--retries", "two",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_status_command() {
        let cli = Cli::try_parse_from([
            "tracker",
            "status",
            "--site-key",
            "club",
            "--project-root",
            "/srv/tracker",
        ])
        .unwrap();

        assert_eq!(
            cli.command,
            Command::Status(SiteArgs {
                site_key: "club".to_string(),
                project_root: PathBuf::from("/srv/tracker"),
            })
        );
    }
}
