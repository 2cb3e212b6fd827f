use clap::Parser;
use std::path::PathBuf;

use crate::error::{MttrError, Result};
use crate::models::ParseScope;
use crate::owners::DEFAULT_OWNERS_FILE;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Mean time to resolution for Jira tickets, per owning team
#[derive(Parser, Debug, Clone)]
#[command(
    name = "jira-mttr",
    about = "Mean time to resolution for Jira tickets, per owning team",
    version
)]
pub struct Settings {
    /// Jira search API url (eg. https://jira.example.com/rest/api/2/search?jql=project=OPS)
    #[arg(long)]
    pub url: String,

    /// Month to measure, yyyy-mm (eg. 2018-08)
    #[arg(long)]
    pub month: String,

    /// Label to owner mapping file
    #[arg(long, default_value = DEFAULT_OWNERS_FILE)]
    pub owners: PathBuf,

    /// Timezone the month is measured in (auto-detected if not specified)
    #[arg(long, default_value = "auto")]
    pub timezone: String,

    /// Tickets requested per page
    #[arg(long, default_value = "500", value_parser = clap::value_parser!(u32).range(1..=1000))]
    pub page_size: u32,

    /// HTTP request timeout in seconds
    #[arg(long, default_value = "30", value_parser = clap::value_parser!(u64).range(1..=600))]
    pub timeout: u64,

    /// Tickets whose timestamps must parse: every resolved ticket, or only those in the month
    #[arg(long, default_value = "all", value_parser = ["all", "in-window"])]
    pub parse_scope: String,

    /// Jira user for basic authentication
    #[arg(long, env = "JIRA_USER")]
    pub user: Option<String>,

    /// Jira API token or password for basic authentication
    #[arg(long, env = "JIRA_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Report format
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse process arguments and apply the `--debug` override.
    pub fn load() -> Self {
        Self::resolve(Self::parse())
    }

    /// Same as [`Settings::load`] but from an explicit argument list.
    pub fn load_from<I, T>(args: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::try_parse_from(args).map(Self::resolve)
    }

    fn resolve(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    /// Typed form of `--parse-scope`.
    pub fn parse_scope(&self) -> ParseScope {
        self.parse_scope.parse().unwrap_or_default()
    }

    /// Basic-auth credentials, when a user was given.
    ///
    /// A user without a token is a configuration error; a token alone is
    /// ignored.
    pub fn credentials(&self) -> Result<Option<(String, String)>> {
        match (&self.user, &self.token) {
            (Some(user), Some(token)) => Ok(Some((user.clone(), token.clone()))),
            (Some(user), None) => Err(MttrError::Config(format!(
                "user \"{}\" given without --token / JIRA_TOKEN",
                user
            ))),
            (None, _) => Ok(None),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
