//! # Configuration
//!
//! Settings are layered, later sources winning:
//!
//! 1. built-in defaults (`default-config.yaml`)
//! 2. `config.yaml` in the user config directory
//! 3. the file passed with `--config`
//! 4. `FREESWITCH_*` environment variables, e.g. `FREESWITCH_PASSWORD`
//! 5. command line arguments

#[macro_use]
extern crate tracing;

mod app_config;
mod args;
mod sink;

use app_config::AppConfig;
pub use app_config::get_config_dir;
pub use args::Args;
use eyre::{
    eyre,
    Context as _,
    Result,
};
use serde::{
    Deserialize,
    Serialize,
};
pub use sink::SinkKind;
use std::{
    net::Ipv6Addr,
    path::Path,
    time::Duration,
};
use url::Url;

/// Path of the XML-RPC handler served by `mod_xml_rpc`
pub const RPC_PATH: &str = "/RPC2";

/// Upper bound for `interval` and `timeout`
pub const MAX_DURATION: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(flatten, skip_serializing)]
    app_config: AppConfig,
    pub host: String,
    pub port: u16,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    /// humantime duration between collection cycles
    pub interval: String,
    /// humantime duration for one RPC request
    pub timeout: String,
    pub namespace: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub sink: SinkKind,
    pub statsd_address: String,
}

const DEFAULT_CONFIG: &str = include_str!("default-config.yaml");

impl Default for Config {
    fn default() -> Self {
        serde_yml::from_str(DEFAULT_CONFIG).expect("Failed to parse default config")
    }
}

impl Config {
    pub fn new(args: &Args) -> Result<Self, config::ConfigError> {
        Self::with_config_dir(args, &get_config_dir())
    }

    fn with_config_dir(args: &Args, config_dir: &Path) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("config_dir", config_dir.to_string_lossy().to_string())?
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Yaml))
            .add_source(
                config::File::from(config_dir.join("config.yaml"))
                    .format(config::FileFormat::Yaml)
                    .required(false),
            );

        if let Some(path) = &args.config {
            builder = builder.add_source(
                config::File::from(path.as_path())
                    .format(config::FileFormat::Yaml)
                    .required(true),
            );
        }

        builder = builder
            .add_source(
                config::Environment::with_prefix("FREESWITCH")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("tags"),
            )
            .add_source(args.clone());

        let cfg: Self = builder.build()?.try_deserialize()?;
        debug!(host = %cfg.host, port = cfg.port, sink = %cfg.sink, "Loaded configuration");

        Ok(cfg)
    }

    /// Check everything that can be checked before the first cycle
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(eyre!("host must not be empty"));
        }
        if self.port == 0 {
            return Err(eyre!("port must not be 0"));
        }
        let interval = self.interval()?;
        if interval.is_zero() {
            return Err(eyre!("interval must be greater than zero"));
        }
        if interval > MAX_DURATION {
            return Err(eyre!("interval must be at most {}", humantime::format_duration(MAX_DURATION)));
        }
        if self.timeout()? > MAX_DURATION {
            return Err(eyre!("timeout must be at most {}", humantime::format_duration(MAX_DURATION)));
        }
        self.rpc_endpoint()?;
        Ok(())
    }

    pub fn interval(&self) -> Result<Duration> {
        humantime::parse_duration(&self.interval).wrap_err_with(|| format!("Invalid interval {:?}", self.interval))
    }

    pub fn timeout(&self) -> Result<Duration> {
        humantime::parse_duration(&self.timeout).wrap_err_with(|| format!("Invalid timeout {:?}", self.timeout))
    }

    /// `http://host:port/RPC2`; credentials are sent separately as basic auth
    pub fn rpc_endpoint(&self) -> Result<Url> {
        let host = match self.host.parse::<Ipv6Addr>() {
            Ok(ip) => format!("[{ip}]"),
            Err(_) => self.host.clone(),
        };
        let url = format!("http://{host}:{}{RPC_PATH}", self.port);
        Url::parse(&url).wrap_err_with(|| format!("Invalid RPC endpoint {url:?}"))
    }

    pub fn config_dir(&self) -> &Path {
        &self.app_config.config_dir
    }
}
