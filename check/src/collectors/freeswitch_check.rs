use crate::{
    collectors::Collector,
    health::{
        self,
        HealthStatus,
    },
    metrics::*,
    parsers::{
        parse_calls,
        parse_profiles,
        parse_registrations,
        parse_session_count,
        CallBuckets,
        ProfileEntry,
        RegistrationRecord,
    },
    rpc::{
        Command,
        RpcTransport,
    },
};
use chrono::Utc;
use comfy_table::{
    presets,
    Attribute,
    Cell,
    Color,
    ContentArrangement,
    Table,
};
use eyre::{
    Context as _,
    Result,
};

/// Collects FreeSWITCH status over the RPC API and emits it as metrics
pub struct FreeswitchCheck<T> {
    transport: T,
    namespace: String,
    tags: Vec<String>,
    data: Option<CycleData>,
}

impl<T: RpcTransport> FreeswitchCheck<T> {
    /// `namespace` prefixes every metric name; `tags` are added to every emission
    pub fn new(transport: T, namespace: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            transport,
            namespace: namespace.into(),
            tags,
            data: None,
        }
    }

    /// The last cycle, if one ran
    pub fn data(&self) -> Option<&CycleData> {
        self.data.as_ref()
    }

    fn metric(&self, name: &str) -> String {
        if self.namespace.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.namespace, name)
        }
    }

    fn tagged(&self, tags: impl IntoIterator<Item = String>) -> Vec<String> {
        tags.into_iter().chain(self.tags.iter().cloned()).collect()
    }

    fn fetch(&self, command: Command) -> Result<String> {
        self.transport
            .run(command)
            .wrap_err_with(|| format!("`{command}` failed"))
    }

    fn collect_registrations(&self, sink: &mut dyn MetricSink) -> Result<Vec<RegistrationRecord>> {
        let registrations = parse_registrations(&self.fetch(Command::REGISTRATIONS)?);

        sink.gauge(&self.metric(REGISTRATION_TOTAL), registrations.len() as f64, &self.tags);
        for registration in &registrations {
            let tags = self.tagged([format!("user:{}", registration.reg_user)]);
            sink.gauge(&self.metric(REGISTRATION), 1.0, &tags);
        }
        Ok(registrations)
    }

    fn collect_sessions(&self, sink: &mut dyn MetricSink) -> Result<u64> {
        let sessions = parse_session_count(&self.fetch(Command::STATUS)?)?;
        sink.gauge(&self.metric(SESSIONS), sessions as f64, &self.tags);
        Ok(sessions)
    }

    fn collect_calls(&self, sink: &mut dyn MetricSink) -> Result<CallBuckets> {
        let calls = parse_calls(&self.fetch(Command::CALLS)?);
        for (_, bucket) in calls.iter() {
            let tags = self.tagged(bucket.tags.iter().cloned());
            sink.gauge(&self.metric(CALLS), bucket.count as f64, &tags);
        }
        Ok(calls)
    }

    fn collect_profiles(&self, sink: &mut dyn MetricSink) -> Result<Vec<ProfileEntry>> {
        let profiles = parse_profiles(&self.fetch(Command::SOFIA_STATUS)?);
        for profile in &profiles {
            let tags = self.tagged([format!("profile:{}", profile.name), format!("status:{}", profile.state)]);
            sink.gauge(&self.metric(SOFIA_PROFILE), 1.0, &tags);
        }
        Ok(profiles)
    }

    /// Registrations, calls and profiles are optional: a failure is recorded and the cycle
    /// moves on. The session count is not, and ends the cycle.
    fn collect_steps(&self, sink: &mut dyn MetricSink, data: &mut CycleData) -> Result<()> {
        match self.collect_registrations(sink) {
            Ok(registrations) => data.registrations = Some(registrations),
            Err(err) => step_failed(data, Step::Registrations, err),
        }

        match self.collect_sessions(sink) {
            Ok(sessions) => data.sessions = Some(sessions),
            Err(err) => {
                data.record_failure(Step::Sessions, &err);
                data.aborted = true;
                return Err(err.wrap_err("Could not read the session count, collection cycle aborted"));
            }
        }

        match self.collect_calls(sink) {
            Ok(calls) => data.calls = Some(calls),
            Err(err) => step_failed(data, Step::Calls, err),
        }

        match self.collect_profiles(sink) {
            Ok(profiles) => data.profiles = Some(profiles),
            Err(err) => step_failed(data, Step::Profiles, err),
        }

        Ok(())
    }
}

fn step_failed(data: &mut CycleData, step: Step, err: eyre::Report) {
    warn!(%step, error = %format!("{err:#}"), "Collection step failed");
    data.record_failure(step, &err);
}

impl<T: RpcTransport> Collector for FreeswitchCheck<T> {
    #[instrument(level = "debug", skip_all, fields(collector = self.name()))]
    fn collect(&mut self, sink: &mut dyn MetricSink) -> Result<()> {
        let mut data = CycleData::new(Utc::now());

        // The health check is reported no matter what happens afterwards
        data.health = health::probe(&self.transport);
        sink.service_check(&self.metric(CAN_CONNECT), data.health, &self.tags);

        let outcome = self.collect_steps(sink, &mut data);
        data.finalize();

        info!(
            health = %data.health,
            registrations = data.registrations.as_ref().map(Vec::len),
            sessions = data.sessions,
            calls = data.calls.as_ref().map(CallBuckets::total),
            profiles = data.profiles.as_ref().map(Vec::len),
            failures = data.failures.len(),
            "Collection cycle finished"
        );

        self.data = Some(data);
        outcome
    }

    fn format(&self) -> String {
        let data = match &self.data {
            Some(d) => d,
            None => return "No metrics collected yet. Call collect() first.".to_string(),
        };

        let mut output = String::new();

        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("☎️  FREESWITCH").add_attribute(Attribute::Bold).fg(Color::Cyan),
                Cell::new(data.started_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
            ]);

        table.add_row(vec![
            Cell::new("RPC Health").add_attribute(Attribute::Bold),
            Cell::new(data.health.to_string()).fg(health_color(data.health)),
        ]);
        table.add_row(vec![
            Cell::new("Registrations").add_attribute(Attribute::Bold),
            Cell::new(or_missing(data.registrations.as_ref().map(Vec::len))),
        ]);
        table.add_row(vec![
            Cell::new("Sessions").add_attribute(Attribute::Bold),
            Cell::new(or_missing(data.sessions)),
        ]);
        table.add_row(vec![
            Cell::new("Calls").add_attribute(Attribute::Bold),
            Cell::new(or_missing(data.calls.as_ref().map(CallBuckets::total))),
        ]);
        output.push_str(&format!("{}\n", table));

        if let Some(calls) = &data.calls {
            let mut table = Table::new();
            table
                .load_preset(presets::UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec![
                    Cell::new("State").add_attribute(Attribute::Bold),
                    Cell::new("Direction").add_attribute(Attribute::Bold),
                    Cell::new("Calls").add_attribute(Attribute::Bold),
                ]);
            for (key, bucket) in calls.iter() {
                table.add_row(vec![
                    Cell::new(key.state.to_string()),
                    Cell::new(key.direction.to_string()),
                    Cell::new(bucket.count.to_string()),
                ]);
            }
            output.push_str(&format!("{}\n", table));
        }

        if let Some(profiles) = data.profiles.as_ref().filter(|profiles| !profiles.is_empty()) {
            let mut table = Table::new();
            table
                .load_preset(presets::UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec![
                    Cell::new("Sofia Profile").add_attribute(Attribute::Bold),
                    Cell::new("State").add_attribute(Attribute::Bold),
                ]);
            for profile in profiles {
                let color = if profile.state == "RUNNING" {
                    Color::Green
                } else {
                    Color::Yellow
                };
                table.add_row(vec![Cell::new(&profile.name), Cell::new(&profile.state).fg(color)]);
            }
            output.push_str(&format!("{}\n", table));
        }

        if !data.failures.is_empty() {
            let mut table = Table::new();
            table
                .load_preset(presets::UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec![
                    Cell::new("Failed Step").add_attribute(Attribute::Bold).fg(Color::Red),
                    Cell::new("Error").add_attribute(Attribute::Bold),
                ]);
            for failure in &data.failures {
                table.add_row(vec![
                    Cell::new(failure.step.to_string()).fg(Color::Red),
                    Cell::new(&failure.error),
                ]);
            }
            output.push_str(&format!("{}\n", table));
        }

        output
    }

    fn summary(&self) -> serde_json::Value {
        let data = match &self.data {
            Some(d) => d,
            None => return serde_json::json!({"error": "No metrics collected yet"}),
        };

        serde_json::json!({
            "namespace": self.namespace,
            "tags": self.tags,
            "complete": data.is_complete(),
            "cycle": data,
        })
    }

    fn name(&self) -> &'static str {
        "FreeswitchCheck"
    }
}

fn health_color(status: HealthStatus) -> Color {
    match status {
        HealthStatus::Ok => Color::Green,
        HealthStatus::Warning => Color::Yellow,
        HealthStatus::Critical => Color::Red,
        HealthStatus::Unknown => Color::Magenta,
    }
}

fn or_missing<V: ToString>(value: Option<V>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "n/a".to_string())
}
