//! Timecode parsing and formatting utilities

use crate::domain::errors::DomainError;

/// `HH:MM:SS` timecode helpers
///
/// Hours take one or two digits on input and are never truncated on output,
/// so `format` of anything past 99 hours yields a string `parse` rejects.
pub struct TimeCode;

impl TimeCode {
    /// Parse `H:MM:SS` or `HH:MM:SS` into whole seconds
    pub fn parse(text: &str) -> Result<u64, DomainError> {
        let invalid = || {
            DomainError::Format(format!(
                "invalid time '{}', expected HH:MM:SS",
                text
            ))
        };

        let parts: Vec<&str> = text.split(':').collect();
        if parts.len() != 3 {
            return Err(invalid());
        }

        let (hours, minutes, seconds) = (parts[0], parts[1], parts[2]);
        if !(1..=2).contains(&hours.len()) || minutes.len() != 2 || seconds.len() != 2 {
            return Err(invalid());
        }
        if !parts
            .iter()
            .all(|part| part.bytes().all(|b| b.is_ascii_digit()))
        {
            return Err(invalid());
        }

        let hours: u64 = hours.parse().map_err(|_| invalid())?;
        let minutes: u64 = minutes.parse().map_err(|_| invalid())?;
        let seconds: u64 = seconds.parse().map_err(|_| invalid())?;

        if minutes > 59 || seconds > 59 {
            return Err(invalid());
        }

        Ok(hours * 3600 + minutes * 60 + seconds)
    }

    /// Check whether text is a well-formed timecode
    pub fn validate(text: &str) -> bool {
        Self::parse(text).is_ok()
    }

    /// Format seconds as zero-padded `HH:MM:SS`, truncating fractions
    pub fn format(seconds: f64) -> String {
        let total = Self::whole_seconds(seconds);
        format!(
            "{:02}:{:02}:{:02}",
            total / 3600,
            (total % 3600) / 60,
            total % 60
        )
    }

    /// Human-readable duration such as `1h 2m 3s`, `2m 3s` or `3s`
    pub fn format_duration(seconds: f64) -> String {
        let total = Self::whole_seconds(seconds);
        let hours = total / 3600;
        let minutes = (total % 3600) / 60;
        let secs = total % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, secs)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, secs)
        } else {
            format!("{}s", secs)
        }
    }

    // Negative and non-finite input collapse to zero.
    fn whole_seconds(seconds: f64) -> u64 {
        if seconds.is_finite() && seconds > 0.0 {
            seconds.trunc() as u64
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_one_or_two_digit_hours() {
        assert_eq!(TimeCode::parse("00:00:00").unwrap(), 0);
        assert_eq!(TimeCode::parse("1:02:03").unwrap(), 3723);
        assert_eq!(TimeCode::parse("99:59:59").unwrap(), 99 * 3600 + 59 * 60 + 59);
    }

    #[test]
    fn test_parse_rejects_malformed_text() {
        for text in [
            "", "1:2:3", "100:00:00", "00:60:00", "00:00:60", "00:00", "00:00:00:00",
            " 00:00:01", "00:00:01 ", "aa:bb:cc", "+1:00:00", "00:-1:00", "00:00:0.5",
        ] {
            assert!(
                matches!(TimeCode::parse(text), Err(DomainError::Format(_))),
                "expected format error for {:?}",
                text
            );
            assert!(!TimeCode::validate(text));
        }
    }

    #[test]
    fn test_format_pads_and_truncates() {
        assert_eq!(TimeCode::format(0.0), "00:00:00");
        assert_eq!(TimeCode::format(5.999), "00:00:05");
        assert_eq!(TimeCode::format(3723.4), "01:02:03");
        assert_eq!(TimeCode::format(360_000.0), "100:00:00");
        assert_eq!(TimeCode::format(-4.0), "00:00:00");
        assert_eq!(TimeCode::format(f64::NAN), "00:00:00");
    }

    #[test]
    fn test_parse_inverts_format_for_whole_seconds() {
        for t in (0..360_000u64).step_by(7) {
            assert_eq!(TimeCode::parse(&TimeCode::format(t as f64)).unwrap(), t);
        }
        assert_eq!(TimeCode::parse(&TimeCode::format(61.75)).unwrap(), 61);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(TimeCode::format_duration(7.9), "7s");
        assert_eq!(TimeCode::format_duration(65.0), "1m 5s");
        assert_eq!(TimeCode::format_duration(3723.0), "1h 2m 3s");
    }
}
