use anyhow::Result;
use clap::Parser;
use log::info;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use crate::auth::Credentials;
use crate::config::Config;
use crate::output;
use crate::providers::BitbucketProvider;

#[derive(Parser)]
#[command(name = "archive-tally")]
#[command(
    author,
    version,
    about = "Report how many archived Bitbucket repositories carry a GitLab migration label",
    long_about = None
)]
pub struct Cli {
    /// Bitbucket username
    #[arg(env = "BITBUCKET_USERNAME")]
    username: String,

    /// Bitbucket password or HTTP access token
    #[arg(env = "BITBUCKET_PASSWORD", hide_env_values = true)]
    password: String,

    /// Configuration file (defaults to ./archive-tally.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bitbucket server base URL
    #[arg(short, long)]
    url: Option<String>,

    /// Project key to scan; repeat to scan several (replaces the configured list)
    #[arg(short = 'P', long = "project")]
    projects: Vec<String>,

    /// Maximum concurrent repository probes per project
    #[arg(short = 'j', long)]
    concurrency: Option<usize>,

    /// Attempts per request while rate limited
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Base backoff in seconds between rate-limited attempts
    #[arg(long)]
    backoff_factor: Option<f64>,

    /// Write the JSON report to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print the JSON report
    #[arg(short, long, default_value_t = false)]
    pretty: bool,

    /// Print a per-project table to stderr when done
    #[arg(short, long, default_value_t = false)]
    summary: bool,
}

impl Cli {
    /// Command-line flags win over file values.
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(url) = &self.url {
            config.bitbucket.base_url.clone_from(url);
        }
        if !self.projects.is_empty() {
            config.bitbucket.projects.clone_from(&self.projects);
        }
        if let Some(concurrency) = self.concurrency {
            config.scan.concurrency = concurrency;
        }
        if let Some(max_attempts) = self.max_attempts {
            config.scan.max_attempts = max_attempts;
        }
        if let Some(backoff_factor) = self.backoff_factor {
            config.scan.backoff_factor_secs = backoff_factor;
        }
        config.output.pretty |= self.pretty;
        config.output.summary |= self.summary;
    }

    pub async fn execute(&self) -> Result<()> {
        let mut config = Config::load(self.config.as_deref())?;
        self.apply_overrides(&mut config);
        config.validate()?;

        info!(
            "Reporting on {} projects at {}",
            config.bitbucket.projects.len(),
            config.bitbucket.base_url
        );

        let credentials = Credentials::new(self.username.as_str(), self.password.as_str());
        let provider = BitbucketProvider::new(&config, credentials)?;

        let report = provider.collect_report().await?;

        if config.output.summary {
            output::print_summary(&report);
        }

        if let Some(output_path) = &self.output {
            let mut writer = BufWriter::new(File::create(output_path)?);
            output::export_report(&report, config.output.pretty, &mut writer)?;
            info!("Report written to: {}", output_path.display());
        } else {
            let stdout = std::io::stdout();
            output::export_report(&report, config.output.pretty, &mut stdout.lock())?;
        }

        Ok(())
    }
}
