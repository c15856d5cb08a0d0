//! Bearer credential resolution.
//!
//! The credential comes from an environment variable. If that is unset or
//! empty, a `KEY=VALUE` file (conventionally `.env`) is consulted. The file is
//! read, never sourced: the process environment is left untouched.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use crate::error::{Error, Result};

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "OPENROUTER_API_KEY";

/// Default fallback file, relative to the working directory.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// A bearer token for the completion endpoint.
///
/// The value is never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps a raw token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Resolves the credential from `var`, falling back to `env_file`.
///
/// # Errors
///
/// Returns [`Error::CredentialMissing`] if neither source has a non-empty
/// value, and an I/O error if the fallback file exists but cannot be read.
pub fn resolve_credential(var: &str, env_file: &Path) -> Result<Credential> {
    resolve_with(std::env::var(var).ok(), var, env_file)
}

fn resolve_with(from_env: Option<String>, var: &str, env_file: &Path) -> Result<Credential> {
    if let Some(token) = from_env.filter(|token| !token.trim().is_empty()) {
        tracing::debug!(var, "credential read from environment");
        return Ok(Credential::new(token.trim()));
    }

    match lookup_env_file(env_file, var)? {
        Some(token) if !token.is_empty() => {
            tracing::debug!(var, path = %env_file.display(), "credential read from env file");
            Ok(Credential::new(token))
        }
        _ => Err(Error::credential_missing(format!(
            "{var} not found in environment or {}",
            env_file.display()
        ))),
    }
}

/// Looks up `key` in a `KEY=VALUE` file.
///
/// A missing file is not an error and yields `Ok(None)`.
pub fn lookup_env_file(path: &Path, key: &str) -> Result<Option<String>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(Error::io(
                format!("failed to read {}", path.display()),
                err,
            ));
        }
    };
    Ok(parse_env_file(&contents)
        .into_iter()
        .rev()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v))
}

/// Parses `KEY=VALUE` lines.
///
/// Blank lines and `#` comments are skipped, an `export ` prefix is accepted,
/// and a value wrapped in matching single or double quotes is unwrapped.
/// Unquoted values lose any trailing ` #` comment.
pub fn parse_env_file(contents: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        pairs.push((key.to_string(), unquote(value.trim())));
    }
    pairs
}

fn unquote(value: &str) -> String {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return value[1..value.len() - 1].to_string();
        }
    }
    match value.find(" #") {
        Some(idx) => value[..idx].trim_end().to_string(),
        None => value.to_string(),
    }
}
