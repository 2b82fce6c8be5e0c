use std::fmt::Write as _;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use serde_json::Value;

use crate::transform::{config_str, value_to_string};
use crate::types::JsonMap;

static NON_DIGIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\D").expect("valid"));

const DEFAULT_INPUT_DATE_FORMAT: &str = "%Y-%m-%d";
const DEFAULT_OUTPUT_DATE_FORMAT: &str = "%d/%m/%Y";

pub fn clean_phone(raw: &str) -> String {
    NON_DIGIT_RE.replace_all(raw, "").into_owned()
}

/// `format`: `clean` (default), `dashed` or `parentheses`. Lengths the chosen
/// layout does not cover fall back to digits only.
pub fn format_phone(value: &Value, config: &JsonMap) -> Value {
    if value.as_str().is_some_and(str::is_empty) {
        return value.clone();
    }
    let d = clean_phone(&value_to_string(value));
    let formatted = match (config_str(config, "format").unwrap_or("clean"), d.len()) {
        ("dashed", 10) => format!("{}-{}-{}", &d[..3], &d[3..6], &d[6..]),
        ("dashed", 11) => format!("{}-{}-{}-{}", &d[..1], &d[1..4], &d[4..7], &d[7..]),
        ("parentheses", 10) => format!("({}) {}-{}", &d[..3], &d[3..6], &d[6..]),
        _ => d,
    };
    Value::String(formatted)
}

/// Reparse a date string from `input_format` into `output_format` (strftime patterns).
pub fn format_date(value: &Value, config: &JsonMap) -> Value {
    let Some(raw) = value.as_str().filter(|s| !s.is_empty()) else {
        return value.clone();
    };
    let input_format = config_str(config, "input_format").unwrap_or(DEFAULT_INPUT_DATE_FORMAT);
    let output_format = config_str(config, "output_format").unwrap_or(DEFAULT_OUTPUT_DATE_FORMAT);

    let parsed = NaiveDateTime::parse_from_str(raw, input_format).or_else(|_| {
        NaiveDate::parse_from_str(raw, input_format).map(|d| d.and_time(NaiveTime::MIN))
    });
    let parsed = match parsed {
        Ok(dt) => dt,
        Err(e) => {
            tracing::warn!(value = raw, input_format, error = %e, "date formatting failed");
            return value.clone();
        }
    };

    let mut out = String::new();
    if write!(out, "{}", parsed.format(output_format)).is_err() {
        tracing::warn!(value = raw, output_format, "invalid output date format");
        return value.clone();
    }
    Value::String(out)
}

/// Fixed-decimal rendering with an optional currency symbol prefix.
pub fn format_currency(value: &Value, config: &JsonMap) -> Value {
    let Some(amount) = coerce_f64(value) else {
        tracing::warn!(value = %value, "currency formatting failed");
        return Value::String(value_to_string(value));
    };
    let decimal_places = match config.get("decimal_places") {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(2) as usize,
        Some(Value::String(s)) => s.trim().parse().unwrap_or(2),
        _ => 2,
    };
    let include_symbol = config
        .get("include_symbol")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let symbol = config_str(config, "symbol").unwrap_or("$");

    let formatted = format!("{amount:.decimal_places$}");
    if include_symbol {
        Value::String(format!("{symbol}{formatted}"))
    } else {
        Value::String(formatted)
    }
}

fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}
