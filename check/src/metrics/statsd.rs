use super::MetricSink;
use crate::health::HealthStatus;
use eyre::{
    eyre,
    Context as _,
    Result,
};
use std::net::{
    SocketAddr,
    ToSocketAddrs,
    UdpSocket,
};

/// Ships metrics as DogStatsD datagrams, one per emission.
///
/// UDP is fire and forget: a failed send is logged and the metric dropped.
pub struct StatsdSink {
    socket: UdpSocket,
    target: SocketAddr,
}

impl StatsdSink {
    pub fn connect(address: &str) -> Result<Self> {
        let target = address
            .to_socket_addrs()
            .wrap_err_with(|| format!("Invalid statsd address {address:?}"))?
            .next()
            .ok_or_else(|| eyre!("Statsd address {address:?} did not resolve"))?;
        let local: SocketAddr = if target.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };
        let socket = UdpSocket::bind(local).context("Failed to bind the statsd socket")?;
        debug!(%target, "Sending metrics to statsd");

        Ok(Self { socket, target })
    }

    fn send(&self, datagram: String) {
        trace!(%datagram, "statsd");
        if let Err(err) = self.socket.send_to(datagram.as_bytes(), self.target) {
            warn!(target = %self.target, error = %err, "Failed to send statsd datagram");
        }
    }
}

impl MetricSink for StatsdSink {
    fn gauge(&mut self, name: &str, value: f64, tags: &[String]) {
        self.send(gauge_datagram(name, value, tags));
    }

    fn service_check(&mut self, name: &str, status: HealthStatus, tags: &[String]) {
        self.send(service_check_datagram(name, status, tags));
    }
}

/// `name:value|g|#tag,tag`
pub(crate) fn gauge_datagram(name: &str, value: f64, tags: &[String]) -> String {
    let mut datagram = format!("{name}:{value}|g");
    push_tags(&mut datagram, tags);
    datagram
}

/// `_sc|name|status|#tag,tag`
pub(crate) fn service_check_datagram(name: &str, status: HealthStatus, tags: &[String]) -> String {
    let mut datagram = format!("_sc|{name}|{}", status.code());
    push_tags(&mut datagram, tags);
    datagram
}

fn push_tags(datagram: &mut String, tags: &[String]) {
    if !tags.is_empty() {
        datagram.push_str("|#");
        let tags = tags.iter().map(|tag| sanitize_tag(tag)).collect::<Vec<_>>();
        datagram.push_str(&tags.join(","));
    }
}

/// `|` and `,` delimit datagram fields and tags, newlines end the datagram
fn sanitize_tag(tag: &str) -> String {
    tag.replace(['|', ',', '\n', '\r'], "_")
}
