use crate::runner::Runner;
use eyre::{
    Context as _,
    Result,
};
use freeswitch_collector_check::{
    Collector,
    FreeswitchCheck,
    LogSink,
    MetricSink,
    StatsdSink,
    XmlRpcClient,
};
use freeswitch_collector_config::{
    Args,
    Config,
    SinkKind,
};

pub struct App {
    config: Config,
    once: bool,
}

impl App {
    pub fn new(args: Args) -> Result<Self> {
        let config = Config::new(&args).context("Failed to load configuration")?;
        config.validate().context("Invalid configuration")?;

        Ok(Self {
            config,
            once: args.once,
        })
    }

    pub fn run(self) -> Result<()> {
        let config = &self.config;
        let endpoint = config.rpc_endpoint()?;
        info!(
            %endpoint,
            sink = %config.sink,
            interval = %config.interval,
            config_dir = %config.config_dir().display(),
            "Starting FreeSWITCH collector"
        );

        let client = XmlRpcClient::new(
            endpoint,
            config.username.clone(),
            config.password.clone(),
            config.timeout()?,
        )?;
        let check = FreeswitchCheck::new(client, config.namespace.clone(), config.tags.clone());

        let sink: Box<dyn MetricSink> = match config.sink {
            SinkKind::Statsd => Box::new(StatsdSink::connect(&config.statsd_address)?),
            SinkKind::Log => Box::new(LogSink),
        };

        if self.once {
            let mut runner = Runner::with_shutdown(check, sink, config.interval()?, Default::default());
            let outcome = runner.run_once();
            println!("{}", runner.collector().format());
            return outcome;
        }

        Runner::new(check, sink, config.interval()?)?.run()
    }
}
