use std::time::Duration;

use crate::error::ValidationError;

const SECONDS_PER_MINUTE: u64 = 60;

/// Parses `750ms`, `30s` or `2m`; a bare number is seconds.
pub(crate) fn parse_duration_value(value: &str) -> Result<Duration, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::DurationEmpty);
    }

    let unit_start = value
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(value.len());
    let (digits, unit) = value.split_at(unit_start);
    if digits.is_empty() {
        return Err(ValidationError::InvalidDurationFormat {
            value: value.to_owned(),
        });
    }
    let number: u64 = digits
        .parse()
        .map_err(|err| ValidationError::InvalidDurationNumber {
            value: value.to_owned(),
            source: err,
        })?;

    let duration = match unit {
        "ms" => Duration::from_millis(number),
        "" | "s" => Duration::from_secs(number),
        "m" => number
            .checked_mul(SECONDS_PER_MINUTE)
            .map(Duration::from_secs)
            .ok_or(ValidationError::DurationOverflow)?,
        other => {
            return Err(ValidationError::InvalidDurationUnit {
                unit: other.to_owned(),
            });
        }
    };
    non_zero(duration)
}

/// Every configured duration must be positive.
pub(crate) const fn non_zero(duration: Duration) -> Result<Duration, ValidationError> {
    if duration.is_zero() {
        Err(ValidationError::DurationZero)
    } else {
        Ok(duration)
    }
}
