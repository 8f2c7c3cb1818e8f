//! Configuration passed explicitly to the launcher components.
//!
//! Nothing in the core reads the process environment; the CLI gathers
//! flags / environment variables and hands a `Config` in.

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::domain::ConfigError;

pub const DEFAULT_STORE_FILE: &str = "vigil-status.jsonl";

/// Which compute instance to control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceTarget {
    pub project: String,
    pub zone: String,
    pub instance: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub project: Option<String>,
    pub zone: Option<String>,
    pub instance: Option<String>,
    /// Status history file.
    pub store_path: PathBuf,
    /// Reference time zone for month boundaries.
    pub utc_offset: FixedOffset,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project: None,
            zone: None,
            instance: None,
            store_path: PathBuf::from(DEFAULT_STORE_FILE),
            utc_offset: Utc.fix(),
        }
    }
}

fn required(value: &Option<String>, name: &'static str) -> Result<String, ConfigError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ConfigError::Missing(name)),
    }
}

impl Config {
    /// The instance identifiers, all of which must be set and non-empty.
    pub fn instance_target(&self) -> Result<InstanceTarget, ConfigError> {
        Ok(InstanceTarget {
            project: required(&self.project, "project")?,
            zone: required(&self.zone, "zone")?,
            instance: required(&self.instance, "instance")?,
        })
    }
}

/// Parse `Z`, `+HH:MM`, `-HH:MM` (or `+HHMM`) into a fixed offset.
pub fn parse_utc_offset(s: &str) -> Result<FixedOffset, ConfigError> {
    let invalid = || ConfigError::InvalidOffset(s.to_string());
    let trimmed = s.trim();
    if trimmed.eq_ignore_ascii_case("z") || trimmed.eq_ignore_ascii_case("utc") {
        return Ok(Utc.fix());
    }

    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'+') => (1, &trimmed[1..]),
        Some(b'-') => (-1, &trimmed[1..]),
        _ => return Err(invalid()),
    };
    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None if rest.len() == 4 && rest.is_ascii() => rest.split_at(2),
        None => return Err(invalid()),
    };
    let two_digits = |part: &str| part.len() == 2 && part.bytes().all(|b| b.is_ascii_digit());
    if !two_digits(hours) || !two_digits(minutes) {
        return Err(invalid());
    }
    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn instance_target_requires_every_identifier() {
        let mut config = Config {
            project: Some("sponge".into()),
            zone: Some("asia-northeast1-b".into()),
            instance: Some("  ".into()),
            ..Config::default()
        };
        assert_eq!(
            config.instance_target(),
            Err(ConfigError::Missing("instance"))
        );

        config.instance = Some("mario".into());
        let target = config.instance_target().unwrap();
        assert_eq!(target.instance, "mario");
        assert_eq!(target.zone, "asia-northeast1-b");
    }

    #[test]
    fn missing_project_is_reported_first() {
        assert_eq!(
            Config::default().instance_target(),
            Err(ConfigError::Missing("project"))
        );
    }

    #[rstest]
    #[case("Z", 0)]
    #[case("+00:00", 0)]
    #[case("+09:00", 9 * 3600)]
    #[case("-05:30", -(5 * 3600 + 30 * 60))]
    #[case("+0900", 9 * 3600)]
    fn parses_offsets(#[case] input: &str, #[case] seconds: i32) {
        assert_eq!(parse_utc_offset(input).unwrap().local_minus_utc(), seconds);
    }

    #[rstest]
    #[case("09:00")]
    #[case("+9")]
    #[case("+24:00")]
    #[case("+09:60")]
    #[case("JST")]
    #[case("+0\u{e9}x")]
    #[case("+\u{e9}:00")]
    fn rejects_bad_offsets(#[case] input: &str) {
        assert!(matches!(
            parse_utc_offset(input),
            Err(ConfigError::InvalidOffset(_))
        ));
    }
}
