//! InfluxDB line protocol encoding.

use std::fmt::Write;

use super::MetricPoint;

/// Encode points as line protocol with second-precision timestamps.
///
/// Empty tag values are omitted since InfluxDB rejects them.
#[must_use]
pub fn to_line_protocol(points: &[MetricPoint]) -> String {
    let mut out = String::new();
    for point in points {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&escape(point.measurement, &[',', ' ']));

        for (key, value) in &point.tags {
            if value.is_empty() {
                continue;
            }
            let _ = write!(
                out,
                ",{}={}",
                escape(key, &[',', '=', ' ']),
                escape(value, &[',', '=', ' '])
            );
        }

        let fields: Vec<String> = point
            .fields
            .iter()
            .map(|(key, value)| format!("{}={value}", escape(key, &[',', '=', ' '])))
            .collect();
        let _ = write!(out, " {} {}", fields.join(","), point.timestamp.timestamp());
    }
    out
}

fn escape(raw: &str, special: &[char]) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '\n' | '\r' | '\t' => escaped.push(' '),
            '\\' => escaped.push_str("\\\\"),
            c if special.contains(&c) => {
                escaped.push('\\');
                escaped.push(c);
            }
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn point(title: &str, img: &str) -> MetricPoint {
        MetricPoint {
            measurement: "articles",
            tags: vec![
                ("title", title.to_string()),
                ("img", img.to_string()),
                ("symbol", "BTC".to_string()),
            ],
            timestamp: Utc.with_ymd_and_hms(2024, 10, 14, 12, 30, 45).unwrap(),
            fields: vec![("positive", 0.5), ("negative", 0.0), ("neutral", 0.25)],
        }
    }

    #[test]
    fn encodes_tags_fields_and_epoch_seconds() {
        let line = to_line_protocol(&[point("Up", "https://img/x.png")]);
        assert_eq!(
            line,
            "articles,title=Up,img=https://img/x.png,symbol=BTC positive=0.5,negative=0,neutral=0.25 1728909045"
        );
    }

    #[test]
    fn escapes_special_characters_in_tag_values() {
        let line = to_line_protocol(&[point("Price up, a=b now", "")]);
        assert!(
            line.starts_with("articles,title=Price\\ up\\,\\ a\\=b\\ now,symbol=BTC "),
            "got: {line}"
        );
    }

    #[test]
    fn omits_empty_tags_and_joins_lines() {
        let out = to_line_protocol(&[point("A", ""), point("B", "")]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(!lines[0].contains("img="));
    }

    #[test]
    fn empty_batch_encodes_to_empty_string() {
        assert_eq!(to_line_protocol(&[]), "");
    }
}
