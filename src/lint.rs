//! Layout lint for schema sections.
//!
//! ## Rules
//!
//! - **duplicate-field**: field names are unique within a schema.
//! - **empty-range**: every byte range has `start < end`.
//! - **out-of-bounds**: no field ends past the declared frame length.
//! - **overlap**: no two fields share a byte.
//! - **gap**: bytes claimed by no field (warning; reserved zones are legal).
//! - **width**: the decoder fits its byte range (marker length, digit counts, group widths).
//! - **header** / **trailer**: exactly one of each; the header starts the frame.
//! - **timestamp-format**: the strftime pattern is well formed.
//! - **name-delimiter**: `name(...)` takes a single character.
//!
//! [`Schema::resolve`](crate::schema::Schema::resolve) refuses a section with any
//! error-level finding. Run the `lint_schema` binary to see warnings as well.

use crate::ast::{DecoderSpec, FieldDef, SchemaSection};
use chrono::format::{Item, StrftimeItems};
use std::collections::HashSet;

/// Widest group a `u32` always holds.
pub const MAX_GROUP_WIDTH: usize = 9;

/// Severity of a lint finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// Identifies which rule produced the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintRule {
    DuplicateField,
    EmptyRange,
    OutOfBounds,
    Overlap,
    Gap,
    Width,
    Header,
    Trailer,
    TimestampFormat,
    NameDelimiter,
}

impl LintRule {
    pub fn id(self) -> &'static str {
        match self {
            LintRule::DuplicateField => "duplicate-field",
            LintRule::EmptyRange => "empty-range",
            LintRule::OutOfBounds => "out-of-bounds",
            LintRule::Overlap => "overlap",
            LintRule::Gap => "gap",
            LintRule::Width => "width",
            LintRule::Header => "header",
            LintRule::Trailer => "trailer",
            LintRule::TimestampFormat => "timestamp-format",
            LintRule::NameDelimiter => "name-delimiter",
        }
    }
}

/// A single lint message, attached to a field when one is at fault.
#[derive(Debug, Clone)]
pub struct LintMessage {
    pub field: Option<String>,
    pub rule: LintRule,
    pub severity: Severity,
    pub message: String,
}

impl LintMessage {
    fn error(field: &FieldDef, rule: LintRule, message: String) -> Self {
        LintMessage {
            field: Some(field.name.clone()),
            rule,
            severity: Severity::Error,
            message,
        }
    }
}

/// Run all rules on one schema section. Field-level findings come first, in field order.
pub fn lint(section: &SchemaSection) -> Vec<LintMessage> {
    let mut out = Vec::new();
    let span = section.span();
    let mut seen = HashSet::new();

    for f in &section.fields {
        if !seen.insert(f.name.as_str()) {
            out.push(LintMessage::error(f, LintRule::DuplicateField, format!("duplicate field {:?}", f.name)));
        }
        if f.start >= f.end {
            out.push(LintMessage::error(
                f,
                LintRule::EmptyRange,
                format!("empty byte range {}..{}", f.start, f.end),
            ));
            continue;
        }
        if f.end > span {
            out.push(LintMessage::error(
                f,
                LintRule::OutOfBounds,
                format!("range {}..{} exceeds frame length {}", f.start, f.end, span),
            ));
        }
        if let Some(msg) = width_problem(f) {
            out.push(LintMessage::error(f, LintRule::Width, msg));
        }
        match &f.decoder {
            DecoderSpec::Timestamp(fmt) => {
                if fmt.is_empty() || StrftimeItems::new(fmt).any(|item| matches!(item, Item::Error)) {
                    out.push(LintMessage::error(
                        f,
                        LintRule::TimestampFormat,
                        format!("invalid timestamp format {:?}", fmt),
                    ));
                }
            }
            DecoderSpec::Name(delim) if delim.chars().count() != 1 => {
                out.push(LintMessage::error(
                    f,
                    LintRule::NameDelimiter,
                    format!("name delimiter must be one character, got {:?}", delim),
                ));
            }
            _ => {}
        }
    }

    lint_layout(section, span, &mut out);
    lint_markers(section, &mut out);
    out
}

/// True if any finding is an error.
pub fn has_errors(messages: &[LintMessage]) -> bool {
    messages.iter().any(|m| m.severity == Severity::Error)
}

fn width_problem(f: &FieldDef) -> Option<String> {
    let width = f.width();
    match &f.decoder {
        DecoderSpec::Header(lit) | DecoderSpec::Trailer(lit) => {
            let len = lit.chars().count();
            (len != width).then(|| format!("marker {:?} is {} byte(s), range is {}", lit, len, width))
        }
        DecoderSpec::Decimal {
            int_digits,
            frac_digits,
            status,
        } => match int_digits
            .checked_add(*frac_digits)
            .and_then(|n| Some((n, n.checked_add(usize::from(*status))?)))
        {
            None => Some(format!("decimal({}, {}) digit count overflows", int_digits, frac_digits)),
            Some((0, _)) => Some("decimal needs at least one digit".to_string()),
            Some((_, need)) if need > width => Some(format!("decimal needs {} digit(s), range is {}", need, width)),
            Some(_) => None,
        },
        DecoderSpec::Percent { int_digits, frac_digits } => match int_digits.checked_add(*frac_digits) {
            None => Some(format!("percent({}, {}) digit count overflows", int_digits, frac_digits)),
            Some(0) => Some("percent needs at least one digit".to_string()),
            Some(need) if need > width => Some(format!("percent needs {} digit(s), range is {}", need, width)),
            Some(_) => None,
        },
        DecoderSpec::Groups { width: w, count } => {
            if *w == 0 || *w > MAX_GROUP_WIDTH {
                Some(format!("group width must be 1..={}, got {}", MAX_GROUP_WIDTH, w))
            } else if let Some(n) = count {
                match w.checked_mul(*n) {
                    Some(need) if need == width => None,
                    Some(need) => Some(format!("{} group(s) of {} need {} bytes, range is {}", n, w, need, width)),
                    None => Some(format!("{} group(s) of {} overflow the byte count", n, w)),
                }
            } else {
                (width % w != 0).then(|| format!("range of {} is not a multiple of group width {}", width, w))
            }
        }
        DecoderSpec::Timestamp(_) | DecoderSpec::Name(_) | DecoderSpec::Verbatim => None,
    }
}

/// Overlaps and gaps, walking fields in offset order.
fn lint_layout(section: &SchemaSection, span: usize, out: &mut Vec<LintMessage>) {
    let mut by_start: Vec<&FieldDef> = section.fields.iter().filter(|f| f.start < f.end).collect();
    by_start.sort_by_key(|f| (f.start, f.end));

    let mut covered = 0usize;
    let mut last: Option<&FieldDef> = None;
    for f in by_start {
        if f.start < covered {
            let other = last.map(|l| l.name.as_str()).unwrap_or("?");
            out.push(LintMessage::error(
                f,
                LintRule::Overlap,
                format!("range {}..{} overlaps field {:?}", f.start, f.end, other),
            ));
        } else if f.start > covered {
            out.push(LintMessage {
                field: None,
                rule: LintRule::Gap,
                severity: Severity::Warning,
                message: format!("bytes {}..{} are not assigned to any field", covered, f.start),
            });
        }
        if f.end > covered {
            covered = f.end;
            last = Some(f);
        }
    }
    if covered < span {
        out.push(LintMessage {
            field: None,
            rule: LintRule::Gap,
            severity: Severity::Warning,
            message: format!("bytes {}..{} are not assigned to any field", covered, span),
        });
    }
}

fn lint_markers(section: &SchemaSection, out: &mut Vec<LintMessage>) {
    let headers: Vec<&FieldDef> = section
        .fields
        .iter()
        .filter(|f| matches!(f.decoder, DecoderSpec::Header(_)))
        .collect();
    let trailers = section
        .fields
        .iter()
        .filter(|f| matches!(f.decoder, DecoderSpec::Trailer(_)))
        .count();

    if headers.len() != 1 {
        out.push(LintMessage {
            field: None,
            rule: LintRule::Header,
            severity: Severity::Error,
            message: format!("expected exactly one header field, found {}", headers.len()),
        });
    } else if headers[0].start != 0 {
        out.push(LintMessage::error(
            headers[0],
            LintRule::Header,
            format!("header must start at offset 0, starts at {}", headers[0].start),
        ));
    }
    if trailers != 1 {
        out.push(LintMessage {
            field: None,
            rule: LintRule::Trailer,
            severity: Severity::Error,
            message: format!("expected exactly one trailer field, found {}", trailers),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn lint_src(src: &str) -> Vec<LintMessage> {
        let file = parse(src).expect("parse");
        lint(&file.schemas[0])
    }

    fn rules(msgs: &[LintMessage]) -> Vec<LintRule> {
        msgs.iter().map(|m| m.rule).collect()
    }

    #[test]
    fn lint_clean_schema_passes() {
        let msgs = lint_src(
            r###"schema s {
	length 8;
	field "head" 0..2 = header("@a");
	field "v" 2..6 = decimal(2, 1, status);
	field "pad" 6..7 = verbatim;
	field "end" 7..8 = trailer("#");
}"###,
        );
        assert!(msgs.is_empty(), "unexpected findings: {:?}", msgs);
    }

    #[test]
    fn lint_overlap_and_gap() {
        let msgs = lint_src(
            r###"schema s {
	length 12;
	field "head" 0..2 = header("@a");
	field "a" 2..6 = verbatim;
	field "b" 5..8 = verbatim;
	field "end" 10..11 = trailer("#");
}"###,
        );
        let r = rules(&msgs);
        assert!(r.contains(&LintRule::Overlap));
        assert_eq!(r.iter().filter(|x| **x == LintRule::Gap).count(), 2);
        assert!(has_errors(&msgs));
    }

    #[test]
    fn lint_width_rules() {
        let msgs = lint_src(
            r###"schema s {
	field "head" 0..3 = header("@a");
	field "pos" 3..14 = groups(3, 4);
	field "bulk" 14..24 = groups(3);
	field "pct" 24..26 = percent(2, 1);
	field "end" 26..27 = trailer("#");
}"###,
        );
        let widths = msgs.iter().filter(|m| m.rule == LintRule::Width).count();
        assert_eq!(widths, 4, "{:?}", msgs);
    }

    #[test]
    fn lint_reports_overflowing_digit_counts() {
        let msgs = lint_src(
            r###"schema s {
	field "head" 0..2 = header("@a");
	field "d" 2..6 = decimal(18446744073709551615, 1);
	field "p" 6..9 = percent(18446744073709551615, 1);
	field "g" 9..15 = groups(3, 6148914691236517206);
	field "end" 15..16 = trailer("#");
}"###,
        );
        let widths: Vec<&str> = msgs
            .iter()
            .filter(|m| m.rule == LintRule::Width)
            .filter_map(|m| m.field.as_deref())
            .collect();
        assert_eq!(widths, vec!["d", "p", "g"], "{:?}", msgs);
    }

    #[test]
    fn lint_missing_markers_and_bad_header_offset() {
        let msgs = lint_src(r###"schema s { field "x" 0..1 = verbatim; field "h" 1..3 = header("@a"); }"###);
        let r = rules(&msgs);
        assert!(r.contains(&LintRule::Header));
        assert!(r.contains(&LintRule::Trailer));
    }

    #[test]
    fn lint_duplicate_and_out_of_bounds() {
        let msgs = lint_src(
            r###"schema s {
	length 4;
	field "head" 0..2 = header("@a");
	field "head" 2..3 = verbatim;
	field "end" 3..5 = trailer("##");
}"###,
        );
        let r = rules(&msgs);
        assert!(r.contains(&LintRule::DuplicateField));
        assert!(r.contains(&LintRule::OutOfBounds));
    }

    #[test]
    fn lint_timestamp_and_name_delimiter() {
        let msgs = lint_src(
            r###"schema s {
	field "head" 0..2 = header("@a");
	field "t" 2..16 = timestamp("%Y%m%d%H%M%");
	field "n" 16..20 = name("##");
	field "end" 20..21 = trailer("#");
}"###,
        );
        let r = rules(&msgs);
        assert!(r.contains(&LintRule::TimestampFormat));
        assert!(r.contains(&LintRule::NameDelimiter));
    }
}
