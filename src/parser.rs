// 🏗️ CSV Parser - header-keyed rows from raw register text
//
// A broken register degrades to "no rows", never to an error.
// Quoted fields are honoured per line; a stray quote stays literal text.

use csv::{ReaderBuilder, StringRecord};
use std::collections::HashMap;
use tracing::{debug, warn};

// ============================================================================
// CORE TYPES
// ============================================================================

/// RawRow - one data line keyed by header name
///
/// All values are kept as text; no coercion happens at this stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    fields: HashMap<String, String>,

    /// Line in the source text (1-indexed, header is line 1 of the data)
    pub line_number: usize,
}

impl RawRow {
    pub fn new(fields: HashMap<String, String>, line_number: usize) -> Self {
        RawRow {
            fields,
            line_number,
        }
    }

    /// Cell for a header, `None` when the column does not exist
    pub fn get(&self, header: &str) -> Option<&str> {
        self.fields.get(header).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// ============================================================================
// PARSING
// ============================================================================

/// How a single physical line uses double quotes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineQuoting {
    /// No field opens with a quote
    Plain,
    /// Every field that opens with a quote closes it right before a comma or
    /// the end of the line
    Wrapped,
    /// A quote is left open, or text follows a closing quote
    Malformed,
}

fn line_quoting(line: &str) -> LineQuoting {
    let mut chars = line.chars().peekable();
    let mut wrapped = false;

    loop {
        if chars.peek() == Some(&'"') {
            chars.next();
            wrapped = true;
            loop {
                match chars.next() {
                    None => return LineQuoting::Malformed,
                    Some('"') => match chars.peek() {
                        Some('"') => {
                            chars.next();
                        }
                        Some(',') | None => break,
                        Some(_) => return LineQuoting::Malformed,
                    },
                    Some(_) => {}
                }
            }
        } else {
            while chars.peek().is_some_and(|c| *c != ',') {
                chars.next();
            }
        }

        match chars.next() {
            Some(',') => continue,
            None if wrapped => return LineQuoting::Wrapped,
            None => return LineQuoting::Plain,
            Some(_) => return LineQuoting::Malformed,
        }
    }
}

/// Split one physical line into fields.
///
/// Only well-formed quoted fields are unquoted; anything else is kept as
/// literal text and split on every comma.
fn split_line(line: &str, line_number: usize) -> Option<StringRecord> {
    let quoting = line_quoting(line);
    if quoting == LineQuoting::Malformed {
        debug!(line = line_number, "unbalanced quotes, keeping line literally");
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(quoting == LineQuoting::Wrapped)
        .from_reader(line.as_bytes());

    match reader.records().next()? {
        Ok(record) => Some(record),
        Err(e) => {
            warn!(line = line_number, error = %e, "skipping unreadable CSV record");
            None
        }
    }
}

/// Parse register text into rows keyed by the first non-empty line.
///
/// * every physical line is one record; quotes never span lines
/// * empty or whitespace-only lines are skipped, lines of bare commas are not
/// * short rows are padded with `""`
/// * long rows are truncated to the header width
/// * empty text, or text without a single comma, gives no rows
pub fn parse_csv(text: &str) -> Vec<RawRow> {
    let text = text.trim_start_matches('\u{feff}');

    if text.trim().is_empty() || !text.contains(',') {
        debug!("input has no delimited content");
        return Vec::new();
    }

    // \r\n, \r and \n all end a physical line
    let text = text.replace("\r\n", "\n").replace('\r', "\n");

    let mut headers: Option<Vec<String>> = None;
    let mut rows = Vec::new();

    for (index, line) in text.split('\n').enumerate() {
        let line_number = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        let Some(record) = split_line(line, line_number) else {
            continue;
        };

        let Some(names) = headers.as_ref() else {
            headers = Some(record.iter().map(|h| h.trim().to_string()).collect());
            continue;
        };

        let fields = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), record.get(i).unwrap_or("").to_string()))
            .collect();

        rows.push(RawRow::new(fields, line_number));
    }

    debug!(rows = rows.len(), "parsed CSV rows");
    rows
}

// ============================================================================
// TESTS
// ============================================================================
