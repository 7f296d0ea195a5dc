use alloc::string::String;
use core::fmt::Write;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};

use super::Normalizer;
use crate::Error;
use crate::class::{ClassRegistry, names};
use crate::context::{DenormalizationContext, NormalizationContext};
use crate::object::{DateTimeObject, ObjectRef};
use crate::types::Type;
use crate::value::Value;

/// Normalizes date objects to formatted strings.
///
/// Formats use `strftime` specifiers. The `dateFormat` option overrides
/// the default format and `dateTimezone` converts the date before it is
/// formatted. On denormalization, `timezoneHint` is the offset of dates
/// written without one.
#[derive(Debug, Clone)]
pub struct DateTimeNormalizer {
    default_format: String,
}

impl Default for DateTimeNormalizer {
    #[inline]
    fn default() -> Self {
        Self::new(Self::ATOM)
    }
}

impl DateTimeNormalizer {
    /// `2005-08-15T15:52:01+00:00`
    pub const ATOM: &'static str = "%Y-%m-%dT%H:%M:%S%:z";

    const NAIVE_FORMATS: [&'static str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d"];

    #[inline]
    pub fn new(default_format: impl Into<String>) -> Self {
        Self {
            default_format: default_format.into(),
        }
    }

    #[inline]
    pub fn default_format(&self) -> &str {
        &self.default_format
    }

    fn parse(&self, input: &str, format: Option<&str>, hint: FixedOffset) -> Option<DateTime<FixedOffset>> {
        let format = format.unwrap_or(&self.default_format);
        if let Some(date) = parse_with(input, format, hint) {
            return Some(date);
        }
        if let Ok(date) = DateTime::parse_from_rfc3339(input) {
            return Some(date);
        }
        Self::NAIVE_FORMATS
            .iter()
            .find_map(|format| parse_with(input, format, hint))
    }
}

impl Normalizer for DateTimeNormalizer {
    fn normalize(&self, object: &ObjectRef, context: &NormalizationContext<'_>) -> Result<Value, Error> {
        let Some(mut date) = object.with(|date: &DateTimeObject| date.value()) else {
            return Err(Error::unexpected(alloc::format!(
                "the class \"{}\" has no date value",
                object.class_name()
            )));
        };

        if let Some(timezone) = context.option(NormalizationContext::TIMEZONE) {
            if !timezone.is_null() {
                date = date.with_timezone(&parse_timezone(&timezone.cast_string())?);
            }
        }

        let format = match context.option(NormalizationContext::DATE_FORMAT) {
            Some(Value::Null) | None => self.default_format.clone(),
            Some(format) => format.cast_string(),
        };

        let mut formatted = String::new();
        write!(formatted, "{}", date.format(&format))
            .map_err(|_| Error::unexpected(alloc::format!("invalid date format \"{format}\"")))?;
        Ok(Value::String(formatted))
    }

    fn denormalize(
        &self,
        data: Value,
        ty: &Type,
        _target: Option<ObjectRef>,
        context: &DenormalizationContext<'_>,
    ) -> Result<Value, Error> {
        let hint = match context.option_str(DenormalizationContext::TIMEZONE_HINT) {
            Some(timezone) => parse_timezone(&timezone)?,
            None => Utc.fix(),
        };

        let mut date = match &data {
            Value::Null => return Ok(Value::Null),
            Value::Int(timestamp) => DateTime::from_timestamp(*timestamp, 0)
                .map(|date| date.with_timezone(&hint))
                .ok_or_else(|| Error::unexpected(alloc::format!("timestamp {timestamp} is out of range")))?,
            Value::String(input) => {
                let format = context.option_str(DenormalizationContext::DATE_FORMAT);
                self.parse(input, format.as_deref(), hint)
                    .ok_or_else(|| Error::unexpected(alloc::format!("cannot parse the date \"{input}\"")))?
            }
            other => {
                return Err(Error::unexpected(alloc::format!(
                    "a date cannot be created from {}",
                    other.kind_name()
                )));
            }
        };

        if let Some(timezone) = context.option_str(DenormalizationContext::TIMEZONE) {
            date = date.with_timezone(&parse_timezone(&timezone)?);
        }

        let class = if ty.name() == names::DATE_TIME_INTERFACE {
            names::DATE_TIME
        } else {
            ty.name()
        };
        Ok(Value::Object(DateTimeObject::with_class(class, date).into_ref()))
    }

    #[inline]
    fn supports(&self, class: &str, registry: &ClassRegistry) -> bool {
        registry.is_a(class, names::DATE_TIME_INTERFACE)
    }
}

fn parse_with(input: &str, format: &str, hint: FixedOffset) -> Option<DateTime<FixedOffset>> {
    if let Ok(date) = DateTime::parse_from_str(input, format) {
        return Some(date);
    }
    let naive = NaiveDateTime::parse_from_str(input, format)
        .ok()
        .or_else(|| Some(NaiveDate::parse_from_str(input, format).ok()?.and_hms_opt(0, 0, 0)?))?;
    hint.from_local_datetime(&naive).single()
}

/// Parses a fixed offset: `UTC`, `Z`, `+HH:MM`, `+HHMM` or `+HH`.
pub(crate) fn parse_timezone(name: &str) -> Result<FixedOffset, Error> {
    let invalid = || Error::unexpected(alloc::format!("unknown timezone \"{name}\""));

    let name = name.trim();
    if name.eq_ignore_ascii_case("utc") || name.eq_ignore_ascii_case("gmt") || name == "Z" {
        return Ok(Utc.fix());
    }

    let (sign, rest) = match name.as_bytes().first() {
        Some(b'+') => (1, &name[1..]),
        Some(b'-') => (-1, &name[1..]),
        _ => return Err(invalid()),
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let (hours, minutes) = match digits.len() {
        1 | 2 => (&digits[..], "0"),
        4 => (&digits[..2], &digits[2..]),
        _ => return Err(invalid()),
    };
    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if minutes >= 60 {
        return Err(invalid());
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}
