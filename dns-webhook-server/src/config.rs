//! Server configuration
//!
//! An optional TOML file is read first, then command-line flags and their
//! environment variables override individual fields:
//!
//! | Flag | Variable | Field | Default |
//! |------|----------|-------|---------|
//! | `--config-file` | `WEBHOOK_CONFIG_FILE` | | none |
//! | `--api-url` | `EC_API_URL` | `edgecenter.api_url` | provider default |
//! | `--api-token` | `EC_API_TOKEN` | `edgecenter.api_token` | required |
//! | `--dry-run` | `EC_DRY_RUN` | `dry_run` | `false` |
//! | `--max-retries` | `EC_MAX_RETRIES` | `edgecenter.max_retries` | `2` |
//! | `--request-timeout-secs` | `EC_REQUEST_TIMEOUT_SECS` | `edgecenter.request_timeout_secs` | `30` |
//! | `--listen-addr` | `WEBHOOK_LISTEN_ADDR` | `listen_addr` | `127.0.0.1:8888` |
//! | `--apply-timeout-secs` | `WEBHOOK_APPLY_TIMEOUT_SECS` | `apply_timeout_secs` | `300` |
//! | `--domain-filter` | `DOMAIN_FILTER` | `domain_filter` | empty |
//! | `--exclude-domains` | `EXCLUDE_DOMAINS` | `exclude_domains` | empty |
//! | `--log-level` | `LOG_LEVEL` | `log.level` | `debug` |
//! | `--log-format` | `LOG_FORMAT` | `log.format` | `text` |

use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::builder::BoolishValueParser;
use clap::{Parser, ValueEnum};
use dns_webhook_core::DomainFilter;
use dns_webhook_provider::{ClientConfig, DEFAULT_MAX_RETRIES, DEFAULT_REQUEST_TIMEOUT_SECS};
use serde::Deserialize;

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8888";
const DEFAULT_APPLY_TIMEOUT_SECS: u64 = 300;
const DEFAULT_LOG_LEVEL: &str = "debug";

/// ExternalDNS webhook for EdgeCenter DNS.
#[derive(Parser, Debug, Clone)]
#[command(name = "dns-webhook-server", version, about, long_about = None)]
pub struct Args {
    /// TOML config file, read before flags and environment.
    #[arg(long, env = "WEBHOOK_CONFIG_FILE", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// EdgeCenter API base URL.
    #[arg(long, env = "EC_API_URL", value_name = "URL")]
    pub api_url: Option<String>,

    /// EdgeCenter API token.
    #[arg(long, env = "EC_API_TOKEN", hide_env_values = true, value_name = "TOKEN")]
    pub api_token: Option<String>,

    /// Log changes instead of sending them.
    #[arg(
        long,
        env = "EC_DRY_RUN",
        value_parser = BoolishValueParser::new(),
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub dry_run: Option<bool>,

    /// Retries after a failed provider call.
    #[arg(long, env = "EC_MAX_RETRIES")]
    pub max_retries: Option<u32>,

    /// Timeout of one provider HTTP request.
    #[arg(long, env = "EC_REQUEST_TIMEOUT_SECS", value_name = "SECS")]
    pub request_timeout_secs: Option<u64>,

    #[arg(long, env = "WEBHOOK_LISTEN_ADDR", value_name = "ADDR")]
    pub listen_addr: Option<String>,

    /// Upper bound for one `POST /records`; 0 disables it.
    #[arg(long, env = "WEBHOOK_APPLY_TIMEOUT_SECS", value_name = "SECS")]
    pub apply_timeout_secs: Option<u64>,

    /// Comma-separated domains to manage.
    #[arg(long, env = "DOMAIN_FILTER", value_delimiter = ',', value_name = "DOMAINS")]
    pub domain_filter: Option<Vec<String>>,

    /// Comma-separated domains to leave alone.
    #[arg(long, env = "EXCLUDE_DOMAINS", value_delimiter = ',', value_name = "DOMAINS")]
    pub exclude_domains: Option<Vec<String>>,

    #[arg(long, env = "LOG_LEVEL", value_name = "FILTER")]
    pub log_level: Option<String>,

    #[arg(long, env = "LOG_FORMAT", ignore_case = true)]
    pub log_format: Option<LogFormat>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub listen_addr: String,
    pub dry_run: bool,
    pub domain_filter: Vec<String>,
    pub exclude_domains: Vec<String>,
    /// Upper bound for one `POST /records` in seconds; 0 disables it.
    pub apply_timeout_secs: u64,
    pub log: LogConfig,
    pub edgecenter: EdgecenterConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            dry_run: false,
            domain_filter: Vec::new(),
            exclude_domains: Vec::new(),
            apply_timeout_secs: DEFAULT_APPLY_TIMEOUT_SECS,
            log: LogConfig::default(),
            edgecenter: EdgecenterConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EdgecenterConfig {
    pub api_url: Option<String>,
    pub api_token: String,
    pub max_retries: u32,
    pub request_timeout_secs: u64,
}

impl Default for EdgecenterConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            api_token: String::new(),
            max_retries: DEFAULT_MAX_RETRIES,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl fmt::Debug for EdgecenterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EdgecenterConfig")
            .field("api_url", &self.api_url)
            .field("api_token", &"<redacted>")
            .field("max_retries", &self.max_retries)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl Config {
    /// Optional config file, overlaid by flags and environment variables.
    pub fn load() -> Result<Self> {
        Self::from_args(&Args::parse())
    }

    pub fn from_args(args: &Args) -> Result<Self> {
        let file = args
            .config_file
            .as_deref()
            .filter(|path| !path.as_os_str().is_empty());
        let mut config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_args(args);
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Overlay the values present in `args`. Blank strings are ignored.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(v) = non_blank(args.api_url.as_deref()) {
            self.edgecenter.api_url = Some(v);
        }
        if let Some(v) = non_blank(args.api_token.as_deref()) {
            self.edgecenter.api_token = v;
        }
        if let Some(v) = args.dry_run {
            self.dry_run = v;
        }
        if let Some(v) = args.max_retries {
            self.edgecenter.max_retries = v;
        }
        if let Some(v) = args.request_timeout_secs {
            self.edgecenter.request_timeout_secs = v;
        }
        if let Some(v) = non_blank(args.listen_addr.as_deref()) {
            self.listen_addr = v;
        }
        if let Some(v) = args.apply_timeout_secs {
            self.apply_timeout_secs = v;
        }
        if let Some(list) = &args.domain_filter {
            self.domain_filter = domain_list(list);
        }
        if let Some(list) = &args.exclude_domains {
            self.exclude_domains = domain_list(list);
        }
        if let Some(v) = non_blank(args.log_level.as_deref()) {
            self.log.level = v;
        }
        if let Some(v) = args.log_format {
            self.log.format = v;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.edgecenter.api_token.trim().is_empty() {
            bail!("API token is required, set EC_API_TOKEN or --api-token");
        }
        self.listen_addr()?;
        if self.edgecenter.request_timeout_secs == 0 {
            bail!("request timeout must be greater than 0");
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen_addr
            .parse()
            .with_context(|| format!("invalid listen address '{}'", self.listen_addr))
    }

    pub fn domain_filter(&self) -> DomainFilter {
        DomainFilter::new(self.domain_filter.clone(), self.exclude_domains.clone())
    }

    /// `None` disables the apply deadline.
    pub fn apply_timeout(&self) -> Option<Duration> {
        (self.apply_timeout_secs > 0).then(|| Duration::from_secs(self.apply_timeout_secs))
    }

    pub fn client_config(&self) -> ClientConfig {
        let mut client = ClientConfig::new(self.edgecenter.api_token.clone())
            .with_max_retries(self.edgecenter.max_retries);
        client.api_url.clone_from(&self.edgecenter.api_url);
        client.request_timeout_secs = self.edgecenter.request_timeout_secs;
        client
    }
}

fn non_blank(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

fn domain_list(raw: &[String]) -> Vec<String> {
    raw.iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}
