// ABOUTME: Exports survey records as a CSV document for spreadsheet download.
// ABOUTME: Renders ratings through a fixed label table and timestamps as DD/MM/YYYY HH:MM:SS.

use std::fmt::Write;

use chrono::{DateTime, NaiveDateTime};

use crate::record::{Record, most_recent_first};

pub const CSV_HEADER: [&str; 5] = ["ID", "Contexto", "Avaliação", "Comentário", "Data/Hora"];

const DISPLAY_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Human label for a rating value. Values outside 1..=5 render as the bare number.
pub fn rating_label(rating: i64) -> String {
    match rating {
        1 => "1 - Muito Insatisfeito".to_string(),
        2 => "2 - Insatisfeito".to_string(),
        3 => "3 - Neutro".to_string(),
        4 => "4 - Satisfeito".to_string(),
        5 => "5 - Muito Satisfeito".to_string(),
        other => other.to_string(),
    }
}

/// Render a stored timestamp as `DD/MM/YYYY HH:MM:SS`.
///
/// Accepts RFC 3339 (with `Z` or an offset, rendered in that offset) and
/// offset-less ISO-8601. Anything else is returned verbatim.
pub fn format_timestamp(stored: &str) -> String {
    if stored.is_empty() {
        return String::new();
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(stored) {
        return dt.naive_local().format(DISPLAY_FORMAT).to_string();
    }

    match stored.parse::<NaiveDateTime>() {
        Ok(dt) => dt.format(DISPLAY_FORMAT).to_string(),
        Err(_) => {
            tracing::debug!("unparseable timestamp exported verbatim: {}", stored);
            stored.to_string()
        }
    }
}

/// Render records as CSV, most recent first, with a header row.
///
/// Rows end in CRLF. Fields are quoted only when they contain a comma,
/// a double quote, or a line break; embedded quotes are doubled.
pub fn export_csv(records: &[Record]) -> String {
    let mut out = String::new();
    write_row(&mut out, CSV_HEADER.iter().copied());

    for record in most_recent_first(records) {
        let id = record.id.to_string();
        let rating = rating_label(record.rating);
        let timestamp = format_timestamp(&record.timestamp);
        write_row(
            &mut out,
            [
                id.as_str(),
                record.context.as_str(),
                rating.as_str(),
                record.comment.as_str(),
                timestamp.as_str(),
            ],
        );
    }

    out
}

fn write_row<'a>(out: &mut String, fields: impl IntoIterator<Item = &'a str>) {
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_field(out, field);
    }
    out.push_str("\r\n");
}

fn write_field(out: &mut String, field: &str) {
    if field.contains([',', '"', '\r', '\n']) {
        write!(out, "\"{}\"", field.replace('"', "\"\"")).unwrap();
    } else {
        out.push_str(field);
    }
}
