use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::storage::{Repository, household_repository, load_fixture};

const DEFAULT_LOG_FILTER: &str = "rupee_ledger=info";
const VERBOSE_LOG_FILTER: &str = "rupee_ledger=debug";

/// Runtime configuration resolved from CLI flags and the environment.
#[derive(Debug, Clone, Default)]
pub struct LedgerConfig {
    /// JSON fixture to seed the ledger from; the built-in household when absent
    pub fixture: Option<PathBuf>,
    pub verbose: bool,
}

impl LedgerConfig {
    /// Log filter: `RUST_LOG` wins, otherwise info (debug when verbose).
    pub fn log_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(if self.verbose {
                VERBOSE_LOG_FILTER
            } else {
                DEFAULT_LOG_FILTER
            })
        })
    }

    /// Install the global tracing subscriber. Logs go to stderr so stdout only
    /// carries command output.
    pub fn init_logging(&self) {
        // A subscriber may already be installed (tests, embedding)
        let _ = tracing_subscriber::fmt()
            .with_env_filter(self.log_filter())
            .with_writer(std::io::stderr)
            .try_init();
    }

    /// Build the store the ledger starts from.
    pub async fn load_repository(&self) -> Result<Repository> {
        let repo = match &self.fixture {
            Some(path) => load_fixture(path).await?,
            None => {
                debug!("no fixture given, using built-in household");
                household_repository().context("Built-in household fixture is invalid")?
            }
        };

        info!(
            users = repo.users().len(),
            default_pay = repo.settings().default_pay,
            "ledger loaded"
        );
        Ok(repo)
    }
}
