//! Parsing of the elapsed-time report a `time` wrapper leaves on stderr.
//!
//! GNU `time` prints `0.51user 0.01system 0:00.53elapsed 98%CPU ...`; the
//! third whitespace-delimited token carries `minutes:seconds.fraction`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

static ELAPSED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]+):([0-9]+)\.([0-9]+)").expect("static regex"));

/// Index of the whitespace token holding the elapsed time.
pub const ELAPSED_TOKEN_INDEX: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimingError {
    #[error("stderr has {found} whitespace-separated tokens, expected at least 3")]
    MissingToken { found: usize },

    #[error("token `{token}` does not contain minutes:seconds.millis")]
    NoMatch { token: String },

    #[error("token `{token}` has a component that overflows u64")]
    Overflow { token: String },
}

/// Self-reported elapsed time of one run.
///
/// The captured digit strings are kept so they can be written out exactly as
/// the child printed them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Timing {
    pub minutes: String,
    pub seconds: String,
    pub millis: String,
    #[serde(skip)]
    values: [u64; 3],
}

impl Timing {
    pub fn from_parts(minutes: u64, seconds: u64, millis: u64) -> Self {
        Self {
            minutes: minutes.to_string(),
            seconds: seconds.to_string(),
            millis: millis.to_string(),
            values: [minutes, seconds, millis],
        }
    }

    pub fn minutes_value(&self) -> u64 {
        self.values[0]
    }

    pub fn seconds_value(&self) -> u64 {
        self.values[1]
    }

    pub fn millis_value(&self) -> u64 {
        self.values[2]
    }

    /// `minutes*60000 + seconds*1000 + millis`, taken literally from the captured digits.
    pub fn total_millis(&self) -> u64 {
        let [m, s, ms] = self.values;
        m.saturating_mul(60_000)
            .saturating_add(s.saturating_mul(1_000))
            .saturating_add(ms)
    }
}

/// Extract the elapsed time from a child's full stderr.
pub fn parse_stderr(stderr: &str) -> Result<Timing, TimingError> {
    let mut tokens = stderr.split_whitespace();
    let token = match tokens.nth(ELAPSED_TOKEN_INDEX) {
        Some(t) => t,
        None => {
            return Err(TimingError::MissingToken {
                found: stderr.split_whitespace().count(),
            })
        }
    };
    parse_token(token)
}

/// Search a single token for `minutes:seconds.millis`.
pub fn parse_token(token: &str) -> Result<Timing, TimingError> {
    let caps = ELAPSED.captures(token).ok_or_else(|| TimingError::NoMatch {
        token: token.to_string(),
    })?;

    let digits = [1usize, 2, 3].map(|group| caps[group].to_string());
    let mut values = [0u64; 3];
    for (value, d) in values.iter_mut().zip(&digits) {
        *value = d.parse().map_err(|_| TimingError::Overflow {
            token: token.to_string(),
        })?;
    }
    let [minutes, seconds, millis] = digits;

    Ok(Timing {
        minutes,
        seconds,
        millis,
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gnu_time_default_format() {
        let stderr = "12.01user 0.20system 0:12.34elapsed 99%CPU (0avgtext+0avgdata 5120maxresident)k\n\
                      0inputs+0outputs (0major+300minor)pagefaults 0swaps\n";
        let t = parse_stderr(stderr).unwrap();
        assert_eq!((t.minutes.as_str(), t.seconds.as_str(), t.millis.as_str()), ("0", "12", "34"));
        assert_eq!(t.total_millis(), 12_034);
    }

    #[test]
    fn total_millis_formula() {
        let t = Timing::from_parts(1, 23, 450);
        assert_eq!(t.total_millis(), 83_450);

        let t = parse_token("1:23.450elapsed").unwrap();
        assert_eq!(t.total_millis(), 83_450);
    }

    #[test]
    fn leading_zeros_preserved_in_digits() {
        let t = parse_token("0:05.07elapsed").unwrap();
        assert_eq!(t.seconds, "05");
        assert_eq!(t.millis, "07");
        assert_eq!(t.seconds_value(), 5);
        assert_eq!(t.total_millis(), 5_007);
    }

    #[test]
    fn only_third_token_is_inspected() {
        // The first token matches, the third does not.
        let err = parse_stderr("1:00.00 x y z").unwrap_err();
        assert_eq!(
            err,
            TimingError::NoMatch {
                token: "y".to_string()
            }
        );
    }

    #[test]
    fn too_few_tokens() {
        assert_eq!(
            parse_stderr("Segmentation fault\n").unwrap_err(),
            TimingError::MissingToken { found: 2 }
        );
        assert_eq!(
            parse_stderr("").unwrap_err(),
            TimingError::MissingToken { found: 0 }
        );
    }

    #[test]
    fn dot_is_literal() {
        assert!(matches!(
            parse_token("0:12x34"),
            Err(TimingError::NoMatch { .. })
        ));
    }

    #[test]
    fn each_component_lands_in_its_own_field() {
        let t = parse_token("12:34.567").unwrap();
        assert_eq!(
            (t.minutes_value(), t.seconds_value(), t.millis_value()),
            (12, 34, 567)
        );
        assert_eq!((t.minutes.as_str(), t.seconds.as_str(), t.millis.as_str()), ("12", "34", "567"));
    }

    #[test]
    fn overflowing_component() {
        let token = "99999999999999999999999:00.00";
        assert_eq!(
            parse_token(token).unwrap_err(),
            TimingError::Overflow {
                token: token.to_string()
            }
        );
    }
}
