//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling chat behavior. Running without any option gives
//! the default behavior: built-in catalog, OpenRouter endpoint, `.env`
//! fallback for the credential.

use std::path::PathBuf;
use std::time::Duration;

use arrrg_derive::CommandLine;

use crate::client::{DEFAULT_API_URL, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT, OpenRouter};
use crate::credentials::{API_KEY_VAR, Credential, DEFAULT_ENV_FILE};
use crate::error::{Error, Result};

/// Command-line arguments for the routechat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// API base URL.
    #[arrrg(optional, "API base URL (default: https://openrouter.ai/api/v1/)", "URL")]
    pub base_url: Option<String>,

    /// Request timeout in seconds.
    #[arrrg(optional, "Request timeout in seconds (default: 60)", "SECS")]
    pub timeout_secs: Option<u64>,

    /// Retries for failed requests.
    #[arrrg(optional, "Retries for transient failures (default: 2)", "N")]
    pub max_retries: Option<u32>,

    /// Fallback file for the API key.
    #[arrrg(optional, "KEY=VALUE file consulted for the API key (default: .env)", "PATH")]
    pub env_file: Option<String>,

    /// Fetch the free-model catalog instead of the built-in one.
    #[arrrg(flag, "Fetch free models from the API instead of the built-in list")]
    pub discover: bool,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,

    /// Diagnostic log file.
    #[arrrg(optional, "Write diagnostic logs to this file", "PATH")]
    pub log_file: Option<String>,
}

/// Configuration for a chat run.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// API base URL.
    pub base_url: String,

    /// Per-request timeout.
    pub timeout: Duration,

    /// Retries for transient failures.
    pub max_retries: u32,

    /// Environment variable holding the API key.
    pub api_key_var: String,

    /// File consulted when the variable is unset.
    pub env_file: PathBuf,

    /// Whether to build the catalog from the models endpoint.
    pub discover: bool,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,

    /// Whether to animate a spinner while waiting for a reply.
    pub show_spinner: bool,

    /// Where diagnostic logs go; `None` disables logging.
    pub log_file: Option<PathBuf>,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Endpoint: OpenRouter
    /// - Timeout: 60 seconds
    /// - Retries: 2
    /// - Credential: `OPENROUTER_API_KEY`, falling back to `.env`
    /// - Color and spinner: enabled
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            api_key_var: API_KEY_VAR.to_string(),
            env_file: PathBuf::from(DEFAULT_ENV_FILE),
            discover: false,
            use_color: true,
            show_spinner: true,
            log_file: None,
        }
    }

    /// Sets the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the retry budget.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the fallback credential file.
    pub fn with_env_file(mut self, env_file: impl Into<PathBuf>) -> Self {
        self.env_file = env_file.into();
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Disables the progress spinner.
    pub fn without_spinner(mut self) -> Self {
        self.show_spinner = false;
        self
    }

    /// Checks values that parse but cannot be used.
    pub fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            return Err(Error::config(
                "timeout must be at least one second",
                Some("timeout-secs".to_string()),
            ));
        }
        if self.api_key_var.is_empty() {
            return Err(Error::config("API key variable name is empty", None));
        }
        Ok(())
    }

    /// Builds the transport client for this configuration.
    pub fn build_client(&self, credential: Credential) -> Result<OpenRouter> {
        Ok(
            OpenRouter::with_options(credential, Some(&self.base_url), Some(self.timeout))?
                .with_max_retries(self.max_retries),
        )
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        let defaults = ChatConfig::new();
        ChatConfig {
            base_url: args.base_url.unwrap_or(defaults.base_url),
            timeout: args
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            max_retries: args.max_retries.unwrap_or(defaults.max_retries),
            env_file: args.env_file.map(PathBuf::from).unwrap_or(defaults.env_file),
            discover: args.discover,
            use_color: !args.no_color,
            log_file: args.log_file.map(PathBuf::from),
            ..defaults
        }
    }
}
