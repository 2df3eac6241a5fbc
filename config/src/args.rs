use crate::SinkKind;
use clap::Parser;
use std::path::PathBuf;

/// Collects FreeSWITCH status over XML-RPC and ships it as metrics
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version = version(), about, long_about = None)]
pub struct Args {
    /// Host of the FreeSWITCH XML-RPC endpoint.
    #[clap(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Port of the FreeSWITCH XML-RPC endpoint.
    #[clap(long, value_name = "PORT")]
    pub port: Option<u16>,

    /// XML-RPC username.
    #[clap(long, value_name = "USER")]
    pub username: Option<String>,

    /// XML-RPC password. Prefer `FREESWITCH_PASSWORD` over passing it on the command line.
    #[clap(long, value_name = "PASSWORD")]
    pub password: Option<String>,

    /// Time between collection cycles, e.g. `15s` or `1m`.
    #[clap(long, value_name = "DURATION")]
    pub interval: Option<String>,

    /// Timeout for a single RPC request.
    #[clap(long, value_name = "DURATION")]
    pub timeout: Option<String>,

    /// Where to send metrics.
    #[clap(long, value_name = "SINK")]
    pub sink: Option<SinkKind>,

    /// DogStatsD address used by the `statsd` sink.
    #[clap(long = "statsd-address", value_name = "ADDR")]
    pub statsd_address: Option<String>,

    /// Tag added to every metric, may be repeated (`--tag env:prod --tag dc:fra`).
    #[clap(long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,

    /// Additional YAML config file, applied on top of the user config.
    #[clap(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Run a single collection cycle, print a report and exit.
    #[clap(long, action)]
    pub once: bool,

    /// Enables debug logging.
    #[clap(short, long, action)]
    pub verbose: bool,
}

mod config_ext {
    use super::*;
    use config::{
        Map,
        Source,
        Value,
    };
    use std::collections::HashMap;

    impl Source for Args {
        fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
            Box::new((*self).clone())
        }

        fn collect(&self) -> Result<Map<String, Value>, config::ConfigError> {
            let mut cache = HashMap::<String, Value>::new();
            if let Some(host) = &self.host {
                cache.insert("host".to_string(), host.clone().into());
            }
            if let Some(port) = self.port {
                cache.insert("port".to_string(), i64::from(port).into());
            }
            if let Some(username) = &self.username {
                cache.insert("username".to_string(), username.clone().into());
            }
            if let Some(password) = &self.password {
                cache.insert("password".to_string(), password.clone().into());
            }
            if let Some(interval) = &self.interval {
                cache.insert("interval".to_string(), interval.clone().into());
            }
            if let Some(timeout) = &self.timeout {
                cache.insert("timeout".to_string(), timeout.clone().into());
            }
            if let Some(sink) = self.sink {
                cache.insert("sink".to_string(), sink.to_string().into());
            }
            if let Some(statsd_address) = &self.statsd_address {
                cache.insert("statsd_address".to_string(), statsd_address.clone().into());
            }
            if !self.tags.is_empty() {
                cache.insert("tags".to_string(), self.tags.clone().into());
            }
            Ok(cache)
        }
    }
}

pub fn version() -> String {
    let author = clap::crate_authors!();
    let version = clap::crate_version!();
    let config_dir_path = crate::get_config_dir().display().to_string();

    format!(
        "\
{version}
Authors: {author}

Config directory: {config_dir_path}"
    )
}
