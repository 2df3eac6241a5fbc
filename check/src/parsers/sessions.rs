use super::ParseError;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref CURRENT_SESSIONS: Regex = Regex::new(r"(?P<sessions>\d+) \w.* - peak").expect("valid sessions pattern");
}

/// Extract the current session count from `show status`, e.g. `0 session(s) - peak 5, last 5min 2`.
pub fn parse_session_count(raw: &str) -> Result<u64, ParseError> {
    let captures = CURRENT_SESSIONS
        .captures(raw)
        .ok_or(ParseError::SessionCountNotFound)?;
    let sessions = &captures["sessions"];
    sessions
        .parse()
        .map_err(|_| ParseError::InvalidSessionCount(sessions.to_string()))
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    const SHOW_STATUS: &str = "\
UP 0 years, 1 day, 2 hours, 23 minutes, 48 seconds, 200 milliseconds, 975 microseconds
FreeSWITCH (Version 1.6.20 -37-987c9b9 64bit) is ready
43 session(s) since startup
7 session(s) - peak 12, last 5min 2
0 session(s) per Sec out of max 30, peak 2, last 5min 1
1000 session(s) max
min idle cpu 0.00/99.77
Current Stack Size/Max 240K/8192K
";

    #[test]
    fn parses_current_sessions_from_full_status() {
        assert_eq!(parse_session_count(SHOW_STATUS), Ok(7));
    }

    #[test]
    fn parses_zero_sessions() {
        assert_eq!(parse_session_count("0 session(s) - peak 5, last 5min 2"), Ok(0));
    }

    #[test]
    fn missing_peak_line_fails() {
        let raw = "UP 0 years\n43 session(s) since startup\n1000 session(s) max\n";
        assert_eq!(parse_session_count(raw), Err(ParseError::SessionCountNotFound));
        assert_eq!(parse_session_count(""), Err(ParseError::SessionCountNotFound));
    }

    #[test]
    fn overflowing_count_fails() {
        let raw = "99999999999999999999999 session(s) - peak 1";
        assert!(matches!(
            parse_session_count(raw),
            Err(ParseError::InvalidSessionCount(_))
        ));
    }

    #[test]
    fn is_deterministic() {
        assert_eq!(parse_session_count(SHOW_STATUS), parse_session_count(SHOW_STATUS));
        assert_eq!(parse_session_count("nothing"), parse_session_count("nothing"));
    }
}
