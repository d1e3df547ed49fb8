//! LAS 2.0 text parser
//!
//! A LAS file is a sequence of sections introduced by `~X` marker lines:
//!
//! - `~V` version information (`VERS`, `WRAP`, `DLM`)
//! - `~W` well information (`WELL`, `NULL`, `STRT`, `STOP`, ...)
//! - `~C` curve definitions, index curve first
//! - `~P` parameters
//! - `~O` free text (ignored)
//! - `~A` ASCII data, one value per declared curve per row
//!
//! Header lines follow `MNEM.UNIT  VALUE : DESCRIPTION`.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

use super::document::{CurveDefinition, HeaderItem, LasDocument, DEFAULT_NULL_VALUE};
use crate::error::{Classify, ErrorClass};

/// LAS parsing errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LasError {
    #[error("file content is empty")]
    Empty,

    #[error("no ~C (curve information) section with curve definitions")]
    MissingCurveSection,

    #[error("no ~A (ASCII log data) section")]
    MissingDataSection,

    #[error("line {line}: expected {expected} values, found {found}")]
    RowWidth {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("wrapped data holds {tokens} values, not a multiple of {curves} curves")]
    WrappedStream { tokens: usize, curves: usize },

    #[error("line {line}: '{token}' is not a number")]
    InvalidNumber { line: usize, token: String },

    #[error("index value is null at data row {row}")]
    NullIndex { row: usize },
}

impl Classify for LasError {
    fn class(&self) -> ErrorClass {
        ErrorClass::InvalidInput
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    Version,
    Well,
    Curve,
    Parameter,
    Other,
    Data,
}

impl Section {
    fn from_marker(marker: &str) -> Self {
        match marker.chars().next().map(|c| c.to_ascii_uppercase()) {
            Some('V') => Self::Version,
            Some('W') => Self::Well,
            Some('C') => Self::Curve,
            Some('P') => Self::Parameter,
            Some('A') => Self::Data,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delimiter {
    Whitespace,
    Comma,
    Tab,
}

impl Delimiter {
    fn from_header(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "COMMA" => Self::Comma,
            "TAB" => Self::Tab,
            _ => Self::Whitespace,
        }
    }

    fn split<'a>(self, line: &'a str) -> Vec<&'a str> {
        match self {
            Self::Whitespace => line.split_whitespace().collect(),
            Self::Comma => line.split(',').map(str::trim).collect(),
            Self::Tab => line.split('\t').map(str::trim).collect(),
        }
    }
}

fn header_pattern() -> &'static Regex {
    static HEADER_LINE: OnceLock<Regex> = OnceLock::new();
    HEADER_LINE.get_or_init(|| {
        #[allow(clippy::expect_used)]
        Regex::new(r"^\s*(?P<mnem>[^.]*?)\s*\.(?P<unit>[^\s:]*)(?P<rest>.*)$")
            .expect("header line pattern is valid")
    })
}

/// Parse one `MNEM.UNIT VALUE : DESCRIPTION` line.
///
/// The description starts after the last colon. Returns `None` for lines
/// without a mnemonic delimiter.
fn parse_header_line(line: &str) -> Option<HeaderItem> {
    let caps = header_pattern().captures(line)?;
    let mnemonic = caps.name("mnem")?.as_str().trim();
    if mnemonic.is_empty() {
        return None;
    }

    let unit = caps.name("unit").map(|m| m.as_str().trim()).unwrap_or_default();
    let rest = caps.name("rest").map(|m| m.as_str()).unwrap_or_default();
    let (value, description) = match rest.rfind(':') {
        Some(pos) => (&rest[..pos], Some(rest[pos + 1..].trim())),
        None => (rest, None),
    };

    Some(HeaderItem {
        mnemonic: mnemonic.to_string(),
        unit: non_empty(unit),
        value: value.trim().to_string(),
        description: description.and_then(non_empty),
    })
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// NaN is let through and treated as null; infinities are rejected.
fn parse_number(token: &str, line: usize) -> Result<f64, LasError> {
    match token.parse::<f64>() {
        Ok(value) if !value.is_infinite() => Ok(value),
        _ => Err(LasError::InvalidNumber {
            line,
            token: token.to_string(),
        }),
    }
}

fn is_null(value: f64, null_value: f64) -> bool {
    value.is_nan() || (value - null_value).abs() <= f64::EPSILON * null_value.abs().max(1.0)
}

/// Parse the full byte content of a LAS file.
///
/// Bytes are decoded leniently: invalid UTF-8 sequences are replaced rather
/// than rejected, since field logs come from many different writers.
pub fn parse_las(bytes: &[u8]) -> Result<LasDocument, LasError> {
    if bytes.is_empty() {
        return Err(LasError::Empty);
    }

    let decoded = String::from_utf8_lossy(bytes);
    let text = decoded.trim_start_matches('\u{feff}');

    let mut section = Section::Preamble;
    let mut saw_data = false;
    let mut version_items = Vec::new();
    let mut well_items = Vec::new();
    let mut curve_items = Vec::new();
    let mut parameters = Vec::new();
    let mut data_lines: Vec<(usize, &str)> = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(marker) = line.strip_prefix('~') {
            section = Section::from_marker(marker);
            saw_data |= section == Section::Data;
            continue;
        }

        let target = match section {
            Section::Data => {
                data_lines.push((line_no, line));
                continue;
            }
            Section::Version => &mut version_items,
            Section::Well => &mut well_items,
            Section::Curve => &mut curve_items,
            Section::Parameter => &mut parameters,
            Section::Preamble | Section::Other => continue,
        };

        match parse_header_line(line) {
            Some(item) => target.push(item),
            None => tracing::debug!(line = line_no, "Skipping malformed LAS header line"),
        }
    }

    let curves: Vec<CurveDefinition> = curve_items.into_iter().map(CurveDefinition::from).collect();
    if curves.is_empty() {
        return Err(LasError::MissingCurveSection);
    }
    if !saw_data {
        return Err(LasError::MissingDataSection);
    }

    let find_version = |mnemonic: &str| {
        version_items
            .iter()
            .find(|item: &&HeaderItem| item.mnemonic.eq_ignore_ascii_case(mnemonic))
            .map(|item| item.value.as_str())
    };
    let version = find_version("VERS").map(str::to_string);
    let wrapped = find_version("WRAP").is_some_and(|v| v.trim().eq_ignore_ascii_case("YES"));
    let delimiter = find_version("DLM").map_or(Delimiter::Whitespace, Delimiter::from_header);

    let null_value = well_items
        .iter()
        .find(|item| item.mnemonic.eq_ignore_ascii_case("NULL"))
        .and_then(|item| item.value.parse::<f64>().ok())
        .unwrap_or(DEFAULT_NULL_VALUE);

    let rows = collect_rows(&data_lines, curves.len(), delimiter, wrapped)?;

    let mut index = Vec::with_capacity(rows.len());
    let mut values: Vec<Vec<Option<f64>>> = (1..curves.len())
        .map(|_| Vec::with_capacity(rows.len()))
        .collect();

    for (row_no, row) in rows.iter().enumerate() {
        let Some(((line, token), samples)) = row.split_first() else {
            continue;
        };
        let depth = parse_number(token, *line)?;
        if is_null(depth, null_value) {
            return Err(LasError::NullIndex { row: row_no + 1 });
        }
        index.push(depth);

        for (column, (line, token)) in values.iter_mut().zip(samples) {
            let value = parse_number(token, *line)?;
            column.push(if is_null(value, null_value) { None } else { Some(value) });
        }
    }

    tracing::debug!(
        curves = curves.len(),
        samples = index.len(),
        wrapped,
        "Parsed LAS document"
    );

    Ok(LasDocument {
        version,
        wrapped,
        null_value,
        well_items,
        parameters,
        curves,
        index,
        values,
    })
}

/// Group data tokens into rows of exactly `width` tokens, each tagged with
/// the line it came from.
fn collect_rows<'a>(
    data_lines: &[(usize, &'a str)],
    width: usize,
    delimiter: Delimiter,
    wrapped: bool,
) -> Result<Vec<Vec<(usize, &'a str)>>, LasError> {
    if wrapped {
        let stream: Vec<(usize, &str)> = data_lines
            .iter()
            .flat_map(|&(line, text)| delimiter.split(text).into_iter().map(move |t| (line, t)))
            .collect();
        if stream.len() % width != 0 {
            return Err(LasError::WrappedStream {
                tokens: stream.len(),
                curves: width,
            });
        }
        return Ok(stream.chunks(width).map(<[_]>::to_vec).collect());
    }

    data_lines
        .iter()
        .map(|&(line, text)| {
            let tokens = delimiter.split(text);
            if tokens.len() == width {
                Ok(tokens.into_iter().map(|t| (line, t)).collect())
            } else {
                Err(LasError::RowWidth {
                    line,
                    expected: width,
                    found: tokens.len(),
                })
            }
        })
        .collect()
}
