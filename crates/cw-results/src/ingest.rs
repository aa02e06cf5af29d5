//! Wide-record ingestion.
//!
//! A wide record carries one timestamp and any number of `tag -> raw value`
//! pairs. Each configured unit picks its own tags out of every record.

use crate::types::{Sample, UnitSeries};
use crate::ResultsResult;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use cw_project::{PlantConfig, TagMap};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::BufRead;

/// Column names recognised as the timestamp, after normalisation.
const TIMESTAMP_KEYS: [&str; 4] = ["timestamp", "datetime", "fechahora", "ts"];

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DATETIME_FORMATS_DASH_DAYFIRST: [&str; 2] = ["%d-%m-%Y %H:%M:%S", "%d-%m-%Y %H:%M"];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];

#[derive(Debug, Clone, PartialEq)]
pub struct WideRecord {
    pub timestamp: NaiveDateTime,
    pub values: BTreeMap<String, Option<f64>>,
}

/// Outcome of reading a wide-record stream.
#[derive(Debug, Clone, Default)]
pub struct WideRead {
    pub records: Vec<WideRecord>,
    /// Lines skipped because they were not UTF-8, not a JSON object, or had no usable timestamp.
    pub skipped: usize,
}

/// Tolerant numeric parser for raw historian values.
///
/// Accepts a decimal comma. Empty, `-`, `nan`, `error` and `bad input`
/// (any case) are missing.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return None;
    }
    let lower = trimmed.to_ascii_lowercase();
    let squashed: String = lower.split_whitespace().collect();
    if squashed.contains("nan") || squashed.contains("error") || squashed.contains("badinput") {
        return None;
    }
    let value: f64 = trimmed.replace(',', ".").parse().ok()?;
    value.is_finite().then_some(value)
}

fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_numeric(s),
        _ => None,
    }
}

/// Parse a timestamp; day-first when the form is ambiguous.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    for fmt in DATETIME_FORMATS.iter().chain(DATETIME_FORMATS_DASH_DAYFIRST.iter()) {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

fn normalise_key(key: &str) -> String {
    key.trim()
        .trim_start_matches('\u{feff}')
        .to_ascii_lowercase()
        .replace([' ', '_'], "")
}

fn timestamp_of(object: &serde_json::Map<String, Value>) -> Option<(String, NaiveDateTime)> {
    let key = object
        .keys()
        .find(|k| TIMESTAMP_KEYS.contains(&normalise_key(k).as_str()))?;
    let ts = match object.get(key)? {
        Value::String(s) => parse_timestamp(s)?,
        _ => return None,
    };
    Some((key.clone(), ts))
}

/// Read JSON-lines wide records. Unusable lines, including ones that are not
/// valid UTF-8, are counted, not fatal.
pub fn read_wide_records<R: BufRead>(reader: R) -> ResultsResult<WideRead> {
    let mut out = WideRead::default();
    for bytes in reader.split(b'\n') {
        let bytes = bytes?;
        let Ok(line) = std::str::from_utf8(&bytes) else {
            out.skipped += 1;
            continue;
        };
        if line.trim().is_empty() {
            continue;
        }
        let object = match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(map)) => map,
            _ => {
                out.skipped += 1;
                continue;
            }
        };
        let Some((ts_key, timestamp)) = timestamp_of(&object) else {
            out.skipped += 1;
            continue;
        };
        let values = object
            .iter()
            .filter(|(k, _)| **k != ts_key)
            .map(|(k, v)| (k.trim().to_string(), value_to_f64(v)))
            .collect();
        out.records.push(WideRecord { timestamp, values });
    }
    if out.skipped > 0 {
        tracing::warn!(skipped = out.skipped, "wide records skipped");
    }
    Ok(out)
}

fn pick(record: &WideRecord, tag: &str) -> Option<f64> {
    record.values.get(tag).copied().flatten()
}

fn sample_for(record: &WideRecord, tags: &TagMap, blower_tag: Option<&str>) -> Sample {
    Sample {
        timestamp: record.timestamp,
        water_flow_m3h: pick(record, &tags.water_flow),
        water_in_c: pick(record, &tags.water_in),
        water_out_c: pick(record, &tags.water_out),
        acid_in_c: pick(record, &tags.acid_in),
        acid_out_c: pick(record, &tags.acid_out),
        acid_conc_pct: pick(record, &tags.acid_conc),
        bypass_pct: pick(record, &tags.bypass),
        pump_current_a: pick(record, &tags.pump_current),
        blower_speed_pct: blower_tag.and_then(|t| pick(record, t)),
        conductivity: tags.conductivity.as_deref().and_then(|t| pick(record, t)),
    }
}

/// Sort by timestamp; a repeated timestamp keeps its last occurrence.
fn sort_and_dedup(samples: &mut Vec<Sample>) {
    samples.sort_by_key(|s| s.timestamp);
    let mut out: Vec<Sample> = Vec::with_capacity(samples.len());
    for s in samples.drain(..) {
        match out.last_mut() {
            Some(prev) if prev.timestamp == s.timestamp => *prev = s,
            _ => out.push(s),
        }
    }
    *samples = out;
}

/// Split wide records into one ordered series per configured unit.
pub fn explode_wide_records(
    records: &[WideRecord],
    config: &PlantConfig,
) -> BTreeMap<String, UnitSeries> {
    let blower_tag = config.blower_tag.as_deref();
    let blower_feed = blower_tag
        .map(|t| records.iter().any(|r| r.values.contains_key(t)))
        .unwrap_or(false);
    if blower_tag.is_some() && !blower_feed {
        tracing::warn!("blower tag not found in feed; blower condition skipped");
    }

    config
        .units
        .iter()
        .map(|unit| {
            let mut samples: Vec<Sample> = records
                .iter()
                .map(|r| sample_for(r, &unit.tags, blower_tag))
                .collect();
            sort_and_dedup(&mut samples);
            tracing::debug!(unit = %unit.key, samples = samples.len(), "unit exploded");
            (
                unit.key.clone(),
                UnitSeries {
                    unit: unit.key.clone(),
                    blower_feed,
                    samples,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_parser_is_tolerant() {
        assert_eq!(parse_numeric("12,5"), Some(12.5));
        assert_eq!(parse_numeric(" 7.25 "), Some(7.25));
        assert_eq!(parse_numeric(""), None);
        assert_eq!(parse_numeric("-"), None);
        assert_eq!(parse_numeric("NaN"), None);
        assert_eq!(parse_numeric("Bad Input"), None);
        assert_eq!(parse_numeric("I/O Error"), None);
        assert_eq!(parse_numeric("abc"), None);
        assert_eq!(parse_numeric("-3"), Some(-3.0));
    }

    #[test]
    fn timestamps_accept_common_forms() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5)
            .and_then(|d| d.and_hms_opt(14, 30, 0))
            .unwrap();
        assert_eq!(parse_timestamp("2024-03-05 14:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-05T14:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-05 14:30"), Some(expected));
        assert_eq!(parse_timestamp("05/03/2024 14:30"), Some(expected));
        assert_eq!(parse_timestamp("05-03-2024 14:30:00"), Some(expected));
        assert_eq!(parse_timestamp("not a date"), None);
    }

    #[test]
    fn read_skips_bad_lines() {
        let input = "{\"Timestamp\":\"2024-01-01 00:00:00\",\"A\":\"1,5\",\"B\":2}\n\
                     garbage\n\
                     {\"Timestamp\":\"??\",\"A\":1}\n\
                     \n\
                     {\"Fecha Hora\":\"2024-01-01 01:00:00\",\"A\":null}\n";
        let read = read_wide_records(input.as_bytes()).unwrap();
        assert_eq!(read.records.len(), 2);
        assert_eq!(read.skipped, 2);
        assert_eq!(read.records[0].values.get("A"), Some(&Some(1.5)));
        assert_eq!(read.records[0].values.get("B"), Some(&Some(2.0)));
        assert_eq!(read.records[1].values.get("A"), Some(&None));
    }

    #[test]
    fn dedup_keeps_last_occurrence() {
        let t0 = parse_timestamp("2024-01-01 00:00").unwrap();
        let t1 = parse_timestamp("2024-01-01 01:00").unwrap();
        let mk = |ts, flow| Sample {
            timestamp: ts,
            water_flow_m3h: Some(flow),
            ..Sample::default()
        };
        let mut samples = vec![mk(t1, 1.0), mk(t0, 2.0), mk(t1, 3.0)];
        sort_and_dedup(&mut samples);
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].water_flow_m3h, Some(2.0));
        assert_eq!(samples[1].water_flow_m3h, Some(3.0));
    }
}
