use lazy_static::lazy_static;
use regex::Regex;
use serde::{
    Deserialize,
    Serialize,
};

lazy_static! {
    // name, the literal `profile` type column, data, state
    static ref PROFILE_ROW: Regex =
        Regex::new(r"(?m)^[ \t]*([^=\s]\S*)[ \t]+profile[ \t]+\S*[ \t]+(\S+)").expect("valid profile pattern");
    static ref RULE: Regex = Regex::new(r"(?m)^=+[ \t\r]*$").expect("valid rule pattern");
}

/// A SIP profile listed by `sofia status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileEntry {
    pub name: String,
    pub state: String,
}

impl ProfileEntry {
    pub fn new(name: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: state.into(),
        }
    }
}

/// Parse the `sofia status` table. Gateways and aliases are skipped.
pub fn parse_profiles(raw: &str) -> Vec<ProfileEntry> {
    PROFILE_ROW
        .captures_iter(table_body(raw))
        .map(|captures| ProfileEntry::new(&captures[1], &captures[2]))
        .collect()
}

/// The rows between the first and last `=` rule. The footer below the table reads
/// `1 profile 0 aliases` for a single profile and must not be taken for a row.
fn table_body(raw: &str) -> &str {
    let mut rules = RULE.find_iter(raw);
    match (rules.next(), rules.last()) {
        (Some(first), Some(last)) => &raw[first.end()..last.start()],
        _ => raw,
    }
}
