//! `H:MM:SS.cc` timestamp conversion

use crate::utils::CoreError;
use crate::Result;

/// Parse an ASS timestamp into seconds.
///
/// One fractional digit is read as tenths, two as centiseconds; the fraction
/// may be omitted. Minutes and seconds must be below 60, hours are unbounded.
///
/// # Errors
///
/// Returns [`CoreError::InvalidTime`] if the field is not a well-formed timestamp.
///
/// # Example
///
/// ```rust
/// use danmaku_core::parse_ass_time;
///
/// assert_eq!(parse_ass_time("0:01:02.50").unwrap(), 62.5);
/// assert!(parse_ass_time("1:2").is_err());
/// ```
pub fn parse_ass_time(time_str: &str) -> Result<f64> {
    let time_str = time_str.trim();
    let mut parts = time_str.split(':');
    let (Some(h), Some(m), Some(s), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(CoreError::InvalidTime(format!(
            "Invalid time format: {time_str}"
        )));
    };

    let hours = parse_component(h, "hours")?;
    let minutes = parse_component(m, "minutes")?;

    let (whole, fraction) = s.split_once('.').map_or((s, None), |(w, f)| (w, Some(f)));
    let seconds = parse_component(whole, "seconds")?;

    let centiseconds = match fraction {
        None => 0,
        Some(frac) => {
            let value = parse_component(frac, "centiseconds")?;
            match frac.len() {
                1 => value * 10,
                2 => value,
                _ => {
                    return Err(CoreError::InvalidTime(format!(
                        "Too many decimal places: {frac}"
                    )))
                }
            }
        }
    };

    if minutes >= 60 {
        return Err(CoreError::InvalidTime(format!(
            "Minutes must be < 60: {minutes}"
        )));
    }
    if seconds >= 60 {
        return Err(CoreError::InvalidTime(format!(
            "Seconds must be < 60: {seconds}"
        )));
    }

    Ok(f64::from(hours) * 3600.0
        + f64::from(minutes) * 60.0
        + f64::from(seconds)
        + f64::from(centiseconds) / 100.0)
}

fn parse_component(field: &str, name: &str) -> Result<u32> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CoreError::InvalidTime(format!("Invalid {name}: {field}")));
    }
    field
        .parse()
        .map_err(|_| CoreError::InvalidTime(format!("Invalid {name}: {field}")))
}

/// Format seconds back into `H:MM:SS.cc`, rounding to the nearest centisecond.
#[must_use]
pub fn format_ass_time(seconds: f64) -> String {
    let total_cs = (seconds.max(0.0) * 100.0).round() as u64;
    let hours = total_cs / 360_000;
    let minutes = (total_cs % 360_000) / 6_000;
    let secs = (total_cs % 6_000) / 100;
    let cs = total_cs % 100;
    format!("{hours}:{minutes:02}:{secs:02}.{cs:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_standard_timestamps() {
        assert_eq!(parse_ass_time("0:00:01.00").unwrap(), 1.0);
        assert_eq!(parse_ass_time("1:00:00.00").unwrap(), 3600.0);
        assert!((parse_ass_time("0:01:30.25").unwrap() - 90.25).abs() < 1e-9);
        assert!((parse_ass_time(" 0:00:03.5 ").unwrap() - 3.5).abs() < 1e-9);
        assert_eq!(parse_ass_time("12:00:00").unwrap(), 43_200.0);
    }

    #[test]
    fn single_fraction_digit_is_tenths() {
        // "1.5" is a decimal fraction, not five centiseconds
        assert!((parse_ass_time("0:00:01.5").unwrap() - 1.5).abs() < 1e-9);
        assert!((parse_ass_time("0:00:01.05").unwrap() - 1.05).abs() < 1e-9);
        assert!((parse_ass_time("0:00:01.50").unwrap() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn rejects_malformed_timestamps() {
        for bad in [
            "", "abc", "0:00", "0:0a:01.00", "0:60:00.00", "0:00:61.00", "0:00:01.123",
            "-1:00:00.00", "0:00:01.", "0:00:00:00",
        ] {
            assert!(parse_ass_time(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn formats_round_trip_for_display() {
        assert_eq!(format_ass_time(62.5), "0:01:02.50");
        assert_eq!(format_ass_time(3661.07), "1:01:01.07");
        assert_eq!(format_ass_time(-3.0), "0:00:00.00");
    }
}
