//! Application configuration loading for CLI defaults.
//!
//! Precedence, lowest to highest: built-in [`Settings`] defaults, the config
//! file, environment variables, command-line flags.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use catalog_core::{Credentials, Settings};

use crate::cli::Args;

/// Env var holding the contents API user name.
pub const ENV_GIT_USERNAME: &str = "MPW_CATALOG_GIT_USERNAME";
/// Env var holding the contents API token.
pub const ENV_GIT_TOKEN: &str = "MPW_CATALOG_GIT_TOKEN";
/// Env var holding the index rendering token.
pub const ENV_RENDER_TOKEN: &str = "MPW_CATALOG_RENDER_TOKEN";

/// Key/value file configuration. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Default fetch concurrency (0 = unlimited).
    pub concurrency: Option<usize>,
    /// Connect timeout in seconds.
    pub connect_timeout_secs: Option<u64>,
    /// Request timeout in seconds.
    pub read_timeout_secs: Option<u64>,
    /// Document cache directory.
    pub cache_dir: Option<PathBuf>,
    /// Record store file.
    pub store_path: Option<PathBuf>,
    /// Selected-ids list.
    pub selected_path: Option<PathBuf>,
    /// Cached index page.
    pub index_cache_path: Option<PathBuf>,
    /// Public index URL.
    pub index_url: Option<String>,
    /// Rendering endpoint template with `{url}` and `{token}` placeholders.
    pub render_endpoint: Option<String>,
    /// Rendering endpoint token.
    pub render_token: Option<String>,
    /// Contents API base URL.
    pub api_base: Option<String>,
    /// Contents API user name.
    pub git_username: Option<String>,
    /// Contents API token.
    pub git_token: Option<String>,
}

impl FileConfig {
    /// Validates config values against runtime constraints.
    pub fn validate(&self) -> Result<()> {
        if let Some(concurrency) = self.concurrency
            && concurrency > 1000
        {
            bail!("Invalid config value for `concurrency`: {concurrency}. Expected range: 0..=1000");
        }
        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("read_timeout_secs", self.read_timeout_secs)?;
        if self.git_username.is_some() != self.git_token.is_some() {
            bail!("`git_username` and `git_token` must be set together");
        }
        Ok(())
    }
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/mpw-catalog/config.toml`
/// 2. `$HOME/.config/mpw-catalog/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("mpw-catalog")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("mpw-catalog")
            .join("config.toml"),
    )
}

fn env_var_non_empty(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Loads the config at `explicit`, or the default path when it exists.
///
/// An explicit path that does not exist is an error; a missing default is not.
pub fn load_file_config(explicit: Option<&Path>) -> Result<Option<FileConfig>> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match resolve_default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(None),
        },
    };

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    let config = parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))?;
    Ok(Some(config))
}

/// Builds runtime [`Settings`] from defaults, file config, env and CLI flags.
pub fn resolve_settings(args: &Args, file: Option<FileConfig>) -> Result<Settings> {
    let file = file.unwrap_or_default();
    let mut settings = Settings::default();

    if let Some(concurrency) = file.concurrency {
        settings.concurrency = concurrency;
    }
    if let Some(secs) = file.connect_timeout_secs {
        settings.connect_timeout_secs = secs;
    }
    if let Some(secs) = file.read_timeout_secs {
        settings.read_timeout_secs = secs;
    }
    if let Some(dir) = file.cache_dir {
        settings.cache_dir = dir;
    }
    if let Some(path) = file.store_path {
        settings.store_path = path;
    }
    if let Some(path) = file.selected_path {
        settings.selected_path = path;
    }
    if let Some(path) = file.index_cache_path {
        settings.index_cache_path = path;
    }
    if let Some(url) = file.index_url {
        settings.index_url = url;
    }
    if let Some(base) = file.api_base {
        settings.api_base = base;
    }
    settings.render_endpoint = file.render_endpoint;
    settings.render_token = env_var_non_empty(ENV_RENDER_TOKEN).or(file.render_token);

    let username = env_var_non_empty(ENV_GIT_USERNAME).or(file.git_username);
    let token = env_var_non_empty(ENV_GIT_TOKEN).or(file.git_token);
    settings.credentials = match (username, token) {
        (Some(username), Some(token)) => Some(Credentials::new(username, token)),
        (None, None) => None,
        _ => bail!("Set both {ENV_GIT_USERNAME} and {ENV_GIT_TOKEN}, or neither"),
    };

    if let Some(concurrency) = args.concurrency {
        settings.concurrency = usize::from(concurrency);
    }
    if let Some(dir) = &args.cache_dir {
        settings.cache_dir.clone_from(dir);
    }
    if let Some(path) = &args.store {
        settings.store_path.clone_from(path);
    }

    Ok(settings)
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!(
                "Invalid config syntax on line {}: expected key = value",
                line_index + 1
            );
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let line_no = line_index + 1;
        let string = || {
            unquote(value)
                .with_context(|| format!("Invalid `{key}` value on line {line_no}"))
        };
        let integer = || {
            parse_count(value)
                .with_context(|| format!("Invalid `{key}` value on line {line_no}"))
        };

        match key {
            "concurrency" => {
                let parsed = usize::try_from(integer()?)
                    .map_err(|_| anyhow::anyhow!("concurrency out of range for usize"))?;
                cfg.concurrency = Some(parsed);
            }
            "connect_timeout_secs" => cfg.connect_timeout_secs = Some(integer()?),
            "read_timeout_secs" => cfg.read_timeout_secs = Some(integer()?),
            "cache_dir" => cfg.cache_dir = Some(PathBuf::from(string()?)),
            "store_path" => cfg.store_path = Some(PathBuf::from(string()?)),
            "selected_path" => cfg.selected_path = Some(PathBuf::from(string()?)),
            "index_cache_path" => cfg.index_cache_path = Some(PathBuf::from(string()?)),
            "index_url" => cfg.index_url = Some(string()?),
            "render_endpoint" => cfg.render_endpoint = Some(string()?),
            "render_token" => cfg.render_token = Some(string()?),
            "api_base" => cfg.api_base = Some(string()?),
            "git_username" => cfg.git_username = Some(string()?),
            "git_token" => cfg.git_token = Some(string()?),
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_no}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

/// Cuts a `#` comment, ignoring `#` inside a quoted value.
fn strip_inline_comment(line: &str) -> &str {
    let mut quoted = false;
    let mut escaped = false;
    for (index, ch) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if quoted => escaped = true,
            '"' => quoted = !quoted,
            '#' if !quoted => return &line[..index],
            _ => {}
        }
    }
    line
}

/// Reads a double-quoted value, decoding `\"` and `\\`.
///
/// Paths and tokens are taken literally otherwise, so a backslash before
/// any other character is kept as written.
fn unquote(raw_value: &str) -> Result<String> {
    let Some(inner) = raw_value
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        bail!("Expected double-quoted string");
    };

    let mut value = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some(next @ ('"' | '\\')) => value.push(next),
                Some(other) => {
                    value.push('\\');
                    value.push(other);
                }
                None => bail!("Unterminated escape at end of string"),
            },
            '"' => bail!("Unescaped quote inside string"),
            other => value.push(other),
        }
    }
    Ok(value)
}

fn parse_count(raw_value: &str) -> Result<u64> {
    let digits = raw_value.trim();
    if digits.is_empty() {
        bail!("Expected integer value");
    }
    if digits.starts_with('-') {
        bail!("Expected non-negative integer");
    }
    digits
        .parse::<u64>()
        .with_context(|| format!("Expected non-negative integer, got `{digits}`"))
}
