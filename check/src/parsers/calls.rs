use super::data_rows;
use serde::{
    Serialize,
    Serializer,
};
use std::{
    collections::BTreeMap,
    fmt,
};
use strum::{
    Display,
    EnumIter,
    EnumString,
    IntoEnumIterator as _,
};

/// Columns of a `show calls` row
pub const CALL_FIELDS: usize = 41;
const DIRECTION_FIELD: usize = 1;
const CALLSTATE_FIELD: usize = 13;

/// Call states that get their own bucket. Anything else the switch reports is not counted.
#[derive(Debug, Clone, Copy, Display, EnumIter, EnumString, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum CallState {
    Early,
    Active,
    Ringing,
}

#[derive(Debug, Clone, Copy, Display, EnumIter, EnumString, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CallDirection {
    Inbound,
    Outbound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BucketKey {
    pub state: CallState,
    pub direction: CallDirection,
}

impl BucketKey {
    pub fn new(state: CallState, direction: CallDirection) -> Self {
        Self { state, direction }
    }

    /// Every tracked `(state, direction)` pair
    pub fn all() -> impl Iterator<Item = BucketKey> {
        CallState::iter().flat_map(|state| CallDirection::iter().map(move |direction| BucketKey::new(state, direction)))
    }

    pub fn tags(&self) -> [String; 2] {
        [
            format!("direction:{}", self.direction),
            format!("state:{}", self.state),
        ]
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.state, self.direction)
    }
}

impl Serialize for BucketKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallBucket {
    pub count: u64,
    pub tags: [String; 2],
}

/// Call counts over the fixed bucket set.
///
/// All buckets exist from construction on and the set never grows, which keeps the number
/// of emitted `calls` series constant whatever states the switch reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CallBuckets {
    buckets: BTreeMap<BucketKey, CallBucket>,
}

impl Default for CallBuckets {
    fn default() -> Self {
        Self::new()
    }
}

impl CallBuckets {
    pub fn new() -> Self {
        let buckets = BucketKey::all()
            .map(|key| {
                let bucket = CallBucket {
                    count: 0,
                    tags: key.tags(),
                };
                (key, bucket)
            })
            .collect();
        Self { buckets }
    }

    /// Count one call. Returns `false` when the pair has no bucket.
    pub fn record(&mut self, state: &str, direction: &str) -> bool {
        let (Ok(state), Ok(direction)) = (state.parse::<CallState>(), direction.parse::<CallDirection>()) else {
            return false;
        };
        match self.buckets.get_mut(&BucketKey::new(state, direction)) {
            Some(bucket) => {
                bucket.count += 1;
                true
            }
            None => false,
        }
    }

    pub fn count(&self, key: BucketKey) -> u64 {
        self.buckets.get(&key).map(|bucket| bucket.count).unwrap_or_default()
    }

    pub fn total(&self) -> u64 {
        self.buckets.values().map(|bucket| bucket.count).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BucketKey, &CallBucket)> {
        self.buckets.iter()
    }
}

/// Parse `show calls` into per `(callstate, direction)` counts.
pub fn parse_calls(raw: &str) -> CallBuckets {
    let mut calls = CallBuckets::new();
    for row in data_rows(raw).filter(|row| row.len() == CALL_FIELDS) {
        let (state, direction) = (row[CALLSTATE_FIELD], row[DIRECTION_FIELD]);
        if !calls.record(state, direction) {
            trace!(%state, %direction, "Ignoring call outside the tracked buckets");
        }
    }
    calls
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    const HEADER: &str = "uuid,direction,created,created_epoch,name,state,cid_name,cid_num,ip_addr,dest,presence_id,presence_data,accountcode,callstate,callee_name,callee_num,callee_direction,call_uuid,hostname,sent_callee_name,sent_callee_num,b_uuid,b_direction,b_created,b_created_epoch,b_name,b_state,b_cid_name,b_cid_num,b_ip_addr,b_dest,b_presence_id,b_presence_data,b_accountcode,b_callstate,b_callee_name,b_callee_num,b_callee_direction,b_sent_callee_name,b_sent_callee_num,call_created_epoch";

    fn call_row(direction: &str, state: &str, fields: usize) -> String {
        let mut row = vec![""; fields];
        row[0] = "0e0ec720-01e9-4e59-abe5-b4c56fdb7e14";
        row[DIRECTION_FIELD] = direction;
        if fields > CALLSTATE_FIELD {
            row[CALLSTATE_FIELD] = state;
        }
        row.join(",")
    }

    fn show_calls(rows: &[String]) -> String {
        format!("{HEADER}\n{}\n\n{} total.\n", rows.join("\n"), rows.len())
    }

    #[test]
    fn starts_with_six_empty_buckets() {
        let calls = parse_calls("");
        assert_eq!(calls.iter().count(), 6);
        assert_eq!(calls.total(), 0);
        let keys: Vec<_> = calls.iter().map(|(key, _)| key.to_string()).collect();
        assert_eq!(
            keys,
            vec![
                "EARLY-inbound",
                "EARLY-outbound",
                "ACTIVE-inbound",
                "ACTIVE-outbound",
                "RINGING-inbound",
                "RINGING-outbound",
            ]
        );
    }

    #[test]
    fn counts_real_console_output() {
        let raw = format!(
            "{HEADER}\n\
0e0ec720-01e9-4e59-abe5-b4c56fdb7e14,inbound,2019-11-10 19:57:29,1573415849,sofia/internal/1000@freeswitch,CS_EXECUTE,+18009999999,1000,1.2.3.4,1000,1000@freeswitch,,1000,EARLY,,,,,ip-172-31-44-116,,,,,,,,,,,,,,,,,,,,,,\n\
ca017a69-c19c-4796-b644-76b87ce55ee5,outbound,2019-11-10 19:57:39,1573415859,sofia/internal/1000@1.2.3.4:63103,CS_CONSUME_MEDIA,Extension 1000,1000,1.2.3.4,1000,1000@172.31.44.116,,,RINGING,Outbound Call,1000,,0e0ec720-01e9-4e59-abe5-b4c56fdb7e14,ip-172-31-44-116,,,,,,,,,,,,,,,,,,,,,,\n\
\n\
2 total.\n"
        );
        let calls = parse_calls(&raw);
        assert_eq!(calls.count(BucketKey::new(CallState::Early, CallDirection::Inbound)), 1);
        assert_eq!(calls.count(BucketKey::new(CallState::Ringing, CallDirection::Outbound)), 1);
        assert_eq!(calls.total(), 2);
    }

    #[test]
    fn drops_rows_with_wrong_column_count() {
        let raw = show_calls(&[call_row("inbound", "ACTIVE", 41), call_row("inbound", "ACTIVE", 38)]);
        let calls = parse_calls(&raw);

        for (key, bucket) in calls.iter() {
            let expected = if *key == BucketKey::new(CallState::Active, CallDirection::Inbound) {
                1
            } else {
                0
            };
            assert_eq!(bucket.count, expected, "bucket {key}");
        }
    }

    #[test]
    fn ignores_untracked_states_without_growing() {
        let raw = show_calls(&[
            call_row("inbound", "HELD", 41),
            call_row("sideways", "ACTIVE", 41),
            call_row("inbound", "active", 41),
            call_row("outbound", "ACTIVE", 41),
        ]);
        let calls = parse_calls(&raw);
        assert_eq!(calls.iter().count(), 6);
        assert_eq!(calls.total(), 1);
        assert_eq!(calls.count(BucketKey::new(CallState::Active, CallDirection::Outbound)), 1);
    }

    #[test]
    fn total_never_exceeds_well_formed_rows() {
        let rows = vec![
            call_row("inbound", "EARLY", 41),
            call_row("outbound", "EARLY", 41),
            call_row("inbound", "DOWN", 41),
            call_row("outbound", "RINGING", 40),
            call_row("outbound", "RINGING", 42),
        ];
        let well_formed = rows
            .iter()
            .filter(|row| row.split(',').count() == CALL_FIELDS)
            .count() as u64;
        let calls = parse_calls(&show_calls(&rows));
        assert_eq!(well_formed, 3);
        assert_eq!(calls.total(), 2);
        assert!(calls.total() <= well_formed);
    }

    #[test]
    fn bucket_tags_are_fixed() {
        let key = BucketKey::new(CallState::Ringing, CallDirection::Inbound);
        assert_eq!(key.tags(), ["direction:inbound".to_string(), "state:RINGING".to_string()]);
        assert_eq!(serde_json::to_value(CallBuckets::new()).unwrap()["EARLY-outbound"]["count"], 0);
    }
}
