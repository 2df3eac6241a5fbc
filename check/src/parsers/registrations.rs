use super::data_rows;
use serde::{
    Deserialize,
    Serialize,
};

/// Columns of a `show registrations` row
pub const REGISTRATION_FIELDS: usize = 10;

/// One row of `show registrations`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRecord {
    pub reg_user: String,
    pub realm: String,
    pub token: String,
    pub url: String,
    pub expires: String,
    pub network_ip: String,
    pub network_port: String,
    pub network_proto: String,
    pub hostname: String,
    pub metadata: String,
}

impl RegistrationRecord {
    /// Build a record from a row with exactly [`REGISTRATION_FIELDS`] columns
    pub fn from_row(row: &[&str]) -> Option<Self> {
        let &[reg_user, realm, token, url, expires, network_ip, network_port, network_proto, hostname, metadata] = row
        else {
            return None;
        };

        Some(Self {
            reg_user: reg_user.to_string(),
            realm: realm.to_string(),
            token: token.to_string(),
            url: url.to_string(),
            expires: expires.to_string(),
            network_ip: network_ip.to_string(),
            network_port: network_port.to_string(),
            network_proto: network_proto.to_string(),
            hostname: hostname.to_string(),
            metadata: metadata.to_string(),
        })
    }

    /// The fields in console column order
    pub fn fields(&self) -> [&str; REGISTRATION_FIELDS] {
        [
            &self.reg_user,
            &self.realm,
            &self.token,
            &self.url,
            &self.expires,
            &self.network_ip,
            &self.network_port,
            &self.network_proto,
            &self.hostname,
            &self.metadata,
        ]
    }
}

/// Parse `show registrations`.
///
/// Rows with a different column count (blank lines, the `N total.` trailer, rows broken by
/// stray commas) are silently dropped. Input order is preserved.
pub fn parse_registrations(raw: &str) -> Vec<RegistrationRecord> {
    data_rows(raw)
        .filter_map(|row| RegistrationRecord::from_row(&row))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    const SHOW_REGISTRATIONS: &str = "\
reg_user,realm,token,url,expires,network_ip,network_port,network_proto,hostname,metadata
1000,172.31.44.116,TOKEN_REDACTED,sofia/internal/sip:1000@1.2.3.4:63103;rinstance=,1573418054,1.2.3.4,63103,udp,ip-172-31-44-116,

1 total.
";

    #[test]
    fn parses_single_registration() {
        let registrations = parse_registrations(SHOW_REGISTRATIONS);
        assert_eq!(registrations.len(), 1);

        let record = &registrations[0];
        assert_eq!(record.reg_user, "1000");
        assert_eq!(record.realm, "172.31.44.116");
        assert_eq!(record.url, "sofia/internal/sip:1000@1.2.3.4:63103;rinstance=");
        assert_eq!(record.network_port, "63103");
        assert_eq!(record.network_proto, "udp");
        assert_eq!(record.metadata, "");
        assert_eq!(record.fields().len(), REGISTRATION_FIELDS);
    }

    #[test]
    fn minimal_row_scenario() {
        let raw = "header\n1000,172.31.44.116,TOK,url,1573418054,1.2.3.4,63103,udp,host,\n\n1 total.\n";
        let registrations = parse_registrations(raw);
        assert_eq!(registrations.len(), 1);
        assert_eq!(registrations[0].fields()[0], "1000");
    }

    #[test]
    fn drops_rows_with_wrong_column_count() {
        let raw = "\
reg_user,realm,token,url,expires,network_ip,network_port,network_proto,hostname,metadata
1001,realm,tok,url,1,ip,port,udp,host
1002,realm,tok,url,1,ip,port,udp,host,meta,extra
1003,realm,tok,url,1,ip,port,tcp,host,meta

3 total.";
        let users: Vec<_> = parse_registrations(raw).into_iter().map(|r| r.reg_user).collect();
        assert_eq!(users, vec!["1003"]);
    }

    #[test]
    fn header_is_never_a_record() {
        // Even a ten column header is skipped
        let raw = "a,b,c,d,e,f,g,h,i,j\n";
        assert!(parse_registrations(raw).is_empty());
        assert!(parse_registrations("").is_empty());
    }

    #[test]
    fn keeps_input_order() {
        let raw = "header\n\
2000,r,t,u,1,ip,1,udp,h,\n\
1000,r,t,u,1,ip,1,udp,h,\n\
3000,r,t,u,1,ip,1,udp,h,\n";
        let users: Vec<_> = parse_registrations(raw).into_iter().map(|r| r.reg_user).collect();
        assert_eq!(users, vec!["2000", "1000", "3000"]);
    }
}
