//! Literal parsing for static variables.

use std::str::FromStr;

use peel_model::Period;
use rust_decimal::Decimal;
use time::format_description::well_known::Rfc3339;
use time::format_description::{self, BorrowedFormatItem};
use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime, PrimitiveDateTime, Time};

const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const ISO_TIME: &[BorrowedFormatItem<'static>] =
    format_description!("[hour]:[minute]:[second][optional [.[subsecond]]]");

pub(super) type LiteralResult<T> = Result<T, String>;

fn description(format: &str) -> LiteralResult<Vec<BorrowedFormatItem<'_>>> {
    format_description::parse(format).map_err(|e| format!("invalid format '{}': {}", format, e))
}

pub(super) fn date(raw: &str, format: Option<&str>) -> LiteralResult<Date> {
    match format {
        Some(f) => Date::parse(raw, &description(f)?[..]),
        None => Date::parse(raw, ISO_DATE),
    }
    .map_err(|e| e.to_string())
}

pub(super) fn time_of_day(raw: &str, format: Option<&str>) -> LiteralResult<Time> {
    match format {
        Some(f) => Time::parse(raw, &description(f)?[..]),
        None => Time::parse(raw, ISO_TIME),
    }
    .map_err(|e| e.to_string())
}

/// RFC 3339 by default. A custom format without an offset is read as UTC.
pub(super) fn date_time(raw: &str, format: Option<&str>) -> LiteralResult<OffsetDateTime> {
    let Some(f) = format else {
        return OffsetDateTime::parse(raw, &Rfc3339).map_err(|e| e.to_string());
    };
    let items = description(f)?;
    match OffsetDateTime::parse(raw, &items[..]) {
        Ok(dt) => Ok(dt),
        Err(offset_err) => PrimitiveDateTime::parse(raw, &items[..])
            .map(PrimitiveDateTime::assume_utc)
            .map_err(|_| offset_err.to_string()),
    }
}

pub(super) fn int(raw: &str) -> LiteralResult<i32> {
    raw.parse().map_err(|e| format!("not a 32-bit integer: {}", e))
}

pub(super) fn long(raw: &str) -> LiteralResult<i64> {
    raw.parse().map_err(|e| format!("not a 64-bit integer: {}", e))
}

pub(super) fn number(raw: &str) -> LiteralResult<f64> {
    let n: f64 = raw.parse().map_err(|e| format!("not a number: {}", e))?;
    if !n.is_finite() {
        return Err("number must be finite".to_string());
    }
    Ok(n)
}

pub(super) fn float(raw: &str) -> LiteralResult<f32> {
    let n: f32 = raw.parse().map_err(|e| format!("not a number: {}", e))?;
    if !n.is_finite() {
        return Err("number must be finite".to_string());
    }
    Ok(n)
}

pub(super) fn big_decimal(raw: &str) -> LiteralResult<Decimal> {
    if raw.contains(['e', 'E']) {
        return Decimal::from_scientific(raw).map_err(|e| e.to_string());
    }
    Decimal::from_str(raw).map_err(|e| e.to_string())
}

pub(super) fn boolean(raw: &str) -> LiteralResult<bool> {
    match raw {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err("expected 'true' or 'false'".to_string()),
    }
}

pub(super) fn object(raw: &str) -> LiteralResult<serde_json::Map<String, serde_json::Value>> {
    match serde_json::from_str(raw).map_err(|e| format!("invalid JSON: {}", e))? {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err("expected a JSON object".to_string()),
    }
}

pub(super) fn array(raw: &str) -> LiteralResult<Vec<serde_json::Value>> {
    match serde_json::from_str(raw).map_err(|e| format!("invalid JSON: {}", e))? {
        serde_json::Value::Array(items) => Ok(items),
        _ => Err("expected a JSON array".to_string()),
    }
}

// ──────────────────────────────────────────────
// ISO-8601 periods and durations
// ──────────────────────────────────────────────

/// Split `1Y-2M3.5S` into `[("1", 'Y'), ("-2", 'M'), ("3.5", 'S')]`.
fn components(body: &str) -> LiteralResult<Vec<(&str, char)>> {
    let mut out = Vec::new();
    let mut start = 0;
    for (i, c) in body.char_indices() {
        if c.is_ascii_digit() || c == '.' || ((c == '-' || c == '+') && i == start) {
            continue;
        }
        let number = &body[start..i];
        if number.is_empty() || number == "-" || number == "+" {
            return Err(format!("missing number before '{}'", c));
        }
        out.push((number, c.to_ascii_uppercase()));
        start = i + c.len_utf8();
    }
    if start != body.len() {
        return Err(format!("missing unit after '{}'", &body[start..]));
    }
    Ok(out)
}

fn split_sign(raw: &str) -> (bool, &str) {
    match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    }
}

fn strip_designator(raw: &str) -> LiteralResult<&str> {
    raw.strip_prefix(['P', 'p'])
        .ok_or_else(|| "must start with 'P'".to_string())
}

fn whole(number: &str, unit: char) -> LiteralResult<i64> {
    number
        .parse::<i64>()
        .map_err(|_| format!("invalid amount '{}' for unit '{}'", number, unit))
}

/// `PnYnMnWnD`; weeks fold into days.
pub(super) fn period(raw: &str) -> LiteralResult<Period> {
    let (negative, rest) = split_sign(raw);
    let body = strip_designator(rest)?;
    let parts = components(body)?;
    if parts.is_empty() {
        return Err("period has no components".to_string());
    }

    let order = ['Y', 'M', 'W', 'D'];
    let mut last = None;
    let (mut years, mut months, mut days) = (0i64, 0i64, 0i64);
    for (number, unit) in parts {
        let idx = order
            .iter()
            .position(|u| *u == unit)
            .ok_or_else(|| format!("unknown period unit '{}'", unit))?;
        if last.is_some_and(|l| idx <= l) {
            return Err(format!("period unit '{}' is out of order", unit));
        }
        last = Some(idx);
        let n = whole(number, unit)?;
        match unit {
            'Y' => years = n,
            'M' => months = n,
            'W' => {
                days = n
                    .checked_mul(7)
                    .and_then(|w| days.checked_add(w))
                    .ok_or("period overflow")?
            }
            _ => days = days.checked_add(n).ok_or("period overflow")?,
        }
    }

    let sign = if negative { -1 } else { 1 };
    let narrow = |n: i64| {
        n.checked_mul(sign)
            .and_then(|v| i32::try_from(v).ok())
            .ok_or_else(|| "period overflow".to_string())
    };
    Ok(Period {
        years: narrow(years)?,
        months: narrow(months)?,
        days: narrow(days)?,
    })
}

fn seconds(number: &str) -> LiteralResult<Duration> {
    let (negative, digits) = split_sign(number);
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(format!("invalid amount '{}' for unit 'S'", number));
    }
    if frac_part.len() > 9 || !frac_part.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("invalid fraction in '{}'", number));
    }
    let secs: i64 = if int_part.is_empty() {
        0
    } else {
        whole(int_part, 'S')?
    };
    let nanos: i32 = if frac_part.is_empty() {
        0
    } else {
        format!("{:0<9}", frac_part)
            .parse()
            .map_err(|_| format!("invalid fraction in '{}'", number))?
    };
    let d = Duration::new(secs, nanos);
    if negative {
        d.checked_neg().ok_or_else(|| "duration overflow".to_string())
    } else {
        Ok(d)
    }
}

/// A whole amount of `unit` scaled to seconds.
fn scaled(number: &str, unit: char, factor: i64) -> LiteralResult<Duration> {
    whole(number, unit)?
        .checked_mul(factor)
        .map(Duration::seconds)
        .ok_or_else(|| "duration overflow".to_string())
}

/// `PnDTnHnMnS`; seconds may carry up to nine fractional digits.
pub(super) fn duration(raw: &str) -> LiteralResult<Duration> {
    let (negative, rest) = split_sign(raw);
    let body = strip_designator(rest)?;
    let (date_part, time_part) = match body.find(['T', 't']) {
        Some(i) => {
            let time_part = &body[i + 1..];
            if time_part.is_empty() {
                return Err("'T' must be followed by a time component".to_string());
            }
            (&body[..i], Some(time_part))
        }
        None => (body, None),
    };

    let mut total = Duration::ZERO;
    let mut any = false;

    for (number, unit) in components(date_part)? {
        if unit != 'D' {
            return Err(format!("unit '{}' must follow 'T'", unit));
        }
        total = Duration::checked_add(total, scaled(number, unit, 86_400)?)
            .ok_or("duration overflow")?;
        any = true;
    }

    if let Some(time_part) = time_part {
        let order = ['H', 'M', 'S'];
        let mut last = None;
        for (number, unit) in components(time_part)? {
            let idx = order
                .iter()
                .position(|u| *u == unit)
                .ok_or_else(|| format!("unknown duration unit '{}'", unit))?;
            if last.is_some_and(|l| idx <= l) {
                return Err(format!("duration unit '{}' is out of order", unit));
            }
            last = Some(idx);
            let part = match unit {
                'H' => scaled(number, unit, 3_600)?,
                'M' => scaled(number, unit, 60)?,
                _ => seconds(number)?,
            };
            total = Duration::checked_add(total, part).ok_or("duration overflow")?;
            any = true;
        }
    }

    if !any {
        return Err("duration has no components".to_string());
    }
    if negative {
        total.checked_neg().ok_or_else(|| "duration overflow".to_string())
    } else {
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime, time};

    #[test]
    fn default_temporal_formats() {
        assert_eq!(date("2024-02-29", None).unwrap(), date!(2024 - 02 - 29));
        assert_eq!(time_of_day("13:05:09", None).unwrap(), time!(13:05:09));
        assert_eq!(
            time_of_day("13:05:09.25", None).unwrap(),
            time!(13:05:09.25)
        );
        assert_eq!(
            date_time("2024-01-02T03:04:05+02:00", None).unwrap(),
            datetime!(2024-01-02 03:04:05 +02:00)
        );
        assert!(date("2023-02-29", None).is_err());
    }

    #[test]
    fn custom_temporal_formats() {
        assert_eq!(
            date("29.02.2024", Some("[day].[month].[year]")).unwrap(),
            date!(2024 - 02 - 29)
        );
        assert_eq!(
            date_time("2024/01/02 03:04", Some("[year]/[month]/[day] [hour]:[minute]")).unwrap(),
            datetime!(2024-01-02 03:04 UTC)
        );
        let err = date("2024-01-02", Some("[bogus]")).unwrap_err();
        assert!(err.starts_with("invalid format"), "{}", err);
    }

    #[test]
    fn strict_numbers() {
        assert_eq!(int("-12").unwrap(), -12);
        assert!(int("1.0").is_err());
        assert!(int("2147483648").is_err());
        assert_eq!(long("2147483648").unwrap(), 2_147_483_648);
        assert_eq!(number("1.5").unwrap(), 1.5);
        assert!(number("NaN").is_err());
        assert!(float("inf").is_err());
        assert_eq!(big_decimal("10.50").unwrap().to_string(), "10.50");
        assert_eq!(big_decimal("1e3").unwrap(), Decimal::from(1000));
        assert!(boolean("TRUE").is_err());
    }

    #[test]
    fn integer_bounds() {
        assert_eq!(int("-2147483648").unwrap(), i32::MIN);
        assert!(int("-2147483649").is_err());
        assert_eq!(long("9223372036854775807").unwrap(), i64::MAX);
        assert!(long("9223372036854775808").is_err());
        assert!(long("-9223372036854775809").is_err());
    }

    #[test]
    fn json_literals_check_their_shape() {
        assert_eq!(object(r#"{"a":1}"#).unwrap().len(), 1);
        assert!(object("[1]").is_err());
        assert_eq!(array("[1,2]").unwrap().len(), 2);
        assert!(array("{}").is_err());
        assert!(array("[1,").is_err());
    }

    #[test]
    fn periods() {
        let p = period("P1Y2M3D").unwrap();
        assert_eq!((p.years, p.months, p.days), (1, 2, 3));
        let p = period("P2W1D").unwrap();
        assert_eq!((p.years, p.months, p.days), (0, 0, 15));
        let p = period("-P1Y-2D").unwrap();
        assert_eq!((p.years, p.months, p.days), (-1, 0, 2));
        assert!(period("P").is_err());
        assert!(period("1Y").is_err());
        assert!(period("P1D1Y").is_err());
        assert!(period("P1H").is_err());
    }

    #[test]
    fn period_overflow_is_an_error() {
        assert_eq!(period("P9999999999Y").unwrap_err(), "period overflow");
        assert_eq!(period("P2000000000000000000W").unwrap_err(), "period overflow");
        assert_eq!(period("P1W9223372036854775807D").unwrap_err(), "period overflow");
        assert_eq!(period("-P-9223372036854775808Y").unwrap_err(), "period overflow");
        assert_eq!(period("P306783378W").unwrap().days, 2_147_483_646);
    }

    #[test]
    fn durations() {
        assert_eq!(duration("PT15M").unwrap(), Duration::minutes(15));
        assert_eq!(
            duration("P1DT2H").unwrap(),
            Duration::days(1) + Duration::hours(2)
        );
        assert_eq!(duration("PT1.5S").unwrap(), Duration::milliseconds(1500));
        assert_eq!(duration("-PT10S").unwrap(), Duration::seconds(-10));
        assert_eq!(duration("PT-0.5S").unwrap(), Duration::milliseconds(-500));
        assert!(duration("PT").is_err());
        assert!(duration("P1H").is_err());
        assert!(duration("PT1S2M").is_err());
        assert!(duration("PT1.0000000001S").is_err());
    }

    #[test]
    fn duration_overflow_is_an_error() {
        for raw in [
            "P999999999999999D",
            "PT9223372036854775807H",
            "PT9223372036854775807M",
            "P1DT9223372036854775807S",
            "P106751991167300DT86400S",
        ] {
            assert_eq!(duration(raw).unwrap_err(), "duration overflow", "{}", raw);
        }
        assert_eq!(
            duration("-PT9223372036854775807S").unwrap(),
            Duration::seconds(-i64::MAX)
        );
    }
}
