//! # RPC Transport
//!
//! FreeSWITCH exposes its API console over XML-RPC (`mod_xml_rpc`). Every command goes
//! through the single `freeswitch.api` method, taking the command and its arguments as two
//! string parameters and answering with the console output as one string.
//!
//! - **`RpcTransport`**: the seam the collector talks to; tests substitute a fake switch
//! - **`XmlRpcClient`**: blocking HTTP implementation using `reqwest`
//! - **`RpcError`**: transport failures, classified so the health probe can tell expected
//!   network trouble apart from everything else

use eyre::{
    Context as _,
    Result,
};
use lazy_static::lazy_static;
use regex::{
    Captures,
    Regex,
};
use std::{
    error::Error as _,
    io,
    time::Duration,
};
use url::Url;

pub const RPC_METHOD: &str = "freeswitch.api";

/// An API console command and its argument string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    pub name: &'static str,
    pub args: &'static str,
}

impl Command {
    pub const REGISTRATIONS: Command = Command::new("show", "registrations");
    pub const STATUS: Command = Command::new("show", "status");
    pub const CALLS: Command = Command::new("show", "calls");
    pub const SOFIA_STATUS: Command = Command::new("sofia", "status");

    pub const fn new(name: &'static str, args: &'static str) -> Self {
        Self { name, args }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.name, self.args)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum RpcError {
    #[error("Could not resolve the RPC host {host}: {source}")]
    Dns {
        host: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Connection to {endpoint} was refused")]
    ConnectionRefused {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("RPC endpoint answered with HTTP status {status}")]
    Protocol { status: u16 },
    #[error("RPC fault {code}: {message}")]
    Fault { code: i64, message: String },
    #[error("Malformed RPC response: {0}")]
    MalformedResponse(String),
    #[error("RPC transport failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Runs API console commands on the switch
pub trait RpcTransport {
    fn api(&self, command: &str, args: &str) -> Result<String, RpcError>;

    fn run(&self, command: Command) -> Result<String, RpcError> {
        self.api(command.name, command.args)
    }
}

impl<T: RpcTransport + ?Sized> RpcTransport for &T {
    fn api(&self, command: &str, args: &str) -> Result<String, RpcError> {
        (**self).api(command, args)
    }
}

/// Blocking XML-RPC client for the FreeSWITCH `/RPC2` endpoint
pub struct XmlRpcClient {
    endpoint: Url,
    username: String,
    password: String,
    http_client: reqwest::blocking::Client,
}

impl XmlRpcClient {
    pub fn new(endpoint: Url, username: String, password: String, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build the RPC http client")?;

        Ok(Self {
            endpoint,
            username,
            password,
            http_client,
        })
    }
}

impl RpcTransport for XmlRpcClient {
    #[instrument(level = "debug", skip(self), fields(endpoint = %self.endpoint))]
    fn api(&self, command: &str, args: &str) -> Result<String, RpcError> {
        let response = self
            .http_client
            .post(self.endpoint.clone())
            .basic_auth(&self.username, Some(&self.password))
            .header(reqwest::header::CONTENT_TYPE, "text/xml")
            .body(encode_call(command, args))
            .send()
            .map_err(|err| classify_transport_error(err, &self.endpoint))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(RpcError::Protocol {
                status: status.as_u16(),
            });
        }

        let body = response.text()?;
        let output = decode_response(&body)?;
        debug!(bytes = output.len(), "RPC call succeeded");
        Ok(output)
    }
}

/// Sort a failed request into the DNS / refused buckets by walking its source chain.
fn classify_transport_error(err: reqwest::Error, endpoint: &Url) -> RpcError {
    if !err.is_connect() {
        return RpcError::Transport(err);
    }

    let mut refused = false;
    let mut dns = false;
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            refused |= io_err.kind() == io::ErrorKind::ConnectionRefused;
        }
        dns |= cause.to_string().contains("dns error");
        source = cause.source();
    }

    if refused {
        RpcError::ConnectionRefused {
            endpoint: endpoint.to_string(),
            source: err,
        }
    } else if dns {
        RpcError::Dns {
            host: endpoint.host_str().unwrap_or_default().to_string(),
            source: err,
        }
    } else {
        RpcError::Transport(err)
    }
}

pub(crate) fn encode_call(command: &str, args: &str) -> String {
    format!(
        "<?xml version=\"1.0\"?>\
<methodCall><methodName>{RPC_METHOD}</methodName><params>\
<param><value><string>{}</string></value></param>\
<param><value><string>{}</string></value></param>\
</params></methodCall>",
        escape_xml(command),
        escape_xml(args)
    )
}

lazy_static! {
    static ref RESPONSE_VALUE: Regex =
        Regex::new(r"(?s)<params>\s*<param>\s*<value>(.*?)</value>\s*</param>").expect("valid response pattern");
    static ref STRING_VALUE: Regex =
        Regex::new(r"(?s)^\s*(?:<string>(.*)</string>|<string\s*/>)\s*$").expect("valid string pattern");
    static ref FAULT_CODE: Regex = Regex::new(r"<name>faultCode</name>\s*<value>\s*(?:<(?:int|i4)>)?\s*(-?\d+)")
        .expect("valid fault code pattern");
    static ref FAULT_STRING: Regex = Regex::new(r"(?s)<name>faultString</name>\s*<value>\s*(?:<string>)?([^<]*)")
        .expect("valid fault string pattern");
    static ref CHAR_REFERENCE: Regex = Regex::new(r"&#(x[0-9a-fA-F]+|[0-9]+);").expect("valid reference pattern");
}

pub(crate) fn decode_response(body: &str) -> Result<String, RpcError> {
    if body.contains("<fault>") {
        let code = FAULT_CODE
            .captures(body)
            .and_then(|captures| captures[1].parse().ok())
            .unwrap_or_default();
        let message = FAULT_STRING
            .captures(body)
            .map(|captures| unescape_xml(captures[1].trim()))
            .unwrap_or_default();
        return Err(RpcError::Fault { code, message });
    }

    let value = RESPONSE_VALUE
        .captures(body)
        .ok_or_else(|| RpcError::MalformedResponse("missing <params><param><value>".to_string()))?;
    let value = value.get(1).map(|m| m.as_str()).unwrap_or_default();

    match STRING_VALUE.captures(value) {
        Some(string) => Ok(unescape_xml(string.get(1).map(|m| m.as_str()).unwrap_or_default())),
        // An untyped <value> is a string as well
        None if !value.trim_start().starts_with('<') => Ok(unescape_xml(value)),
        None => Err(RpcError::MalformedResponse(format!(
            "expected a string value, got {}",
            value.chars().take(40).collect::<String>()
        ))),
    }
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn unescape_xml(text: &str) -> String {
    let text = CHAR_REFERENCE.replace_all(text, |captures: &Captures| {
        let reference = &captures[1];
        let code = match reference.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => reference.parse().ok(),
        };
        code.and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| captures[0].to_string())
    });

    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn encodes_freeswitch_api_call() {
        let body = encode_call("show", "registrations");
        assert!(body.contains("<methodName>freeswitch.api</methodName>"));
        assert!(body.contains(
            "<param><value><string>show</string></value></param><param><value><string>registrations</string></value></param>"
        ));
    }

    #[test]
    fn escapes_markup_in_arguments() {
        let body = encode_call("show", "a<b&c");
        assert!(body.contains("<string>a&lt;b&amp;c</string>"));
    }

    #[test]
    fn decodes_string_response() {
        let body = "<?xml version=\"1.0\"?>\n<methodResponse>\n<params>\n<param><value><string>reg_user,realm\n1 total.\n</string></value></param>\n</params>\n</methodResponse>\n";
        assert_eq!(decode_response(body).unwrap(), "reg_user,realm\n1 total.\n");
    }

    #[test]
    fn decodes_untyped_value_and_entities() {
        let body = "<methodResponse><params><param><value>a &lt;b&gt; &amp;&#10;c</value></param></params></methodResponse>";
        assert_eq!(decode_response(body).unwrap(), "a <b> &\nc");
    }

    #[test]
    fn decodes_empty_string() {
        let body = "<methodResponse><params><param><value><string/></value></param></params></methodResponse>";
        assert_eq!(decode_response(body).unwrap(), "");
    }

    #[test]
    fn fault_response_is_an_error() {
        let body = "<methodResponse><fault><value><struct>\
<member><name>faultCode</name><value><int>500</int></value></member>\
<member><name>faultString</name><value><string>Command not found</string></value></member>\
</struct></value></fault></methodResponse>";
        match decode_response(body) {
            Err(RpcError::Fault { code, message }) => {
                assert_eq!(code, 500);
                assert_eq!(message, "Command not found");
            }
            other => panic!("expected a fault, got {other:?}"),
        }
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            decode_response("<html>502 Bad Gateway</html>"),
            Err(RpcError::MalformedResponse(_))
        ));
        assert!(matches!(
            decode_response("<methodResponse><params><param><value><int>1</int></value></param></params></methodResponse>"),
            Err(RpcError::MalformedResponse(_))
        ));
    }

    #[test]
    fn refused_connection_is_classified() {
        // Grab a free port and release it so nothing is listening there
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let endpoint = Url::parse(&format!("http://127.0.0.1:{port}/RPC2")).unwrap();
        let client = XmlRpcClient::new(
            endpoint,
            "freeswitch".to_string(),
            "works".to_string(),
            Duration::from_secs(5),
        )
        .unwrap();

        let err = client.run(Command::STATUS).unwrap_err();
        assert!(matches!(err, RpcError::ConnectionRefused { .. }), "got {err:?}");
    }
}
