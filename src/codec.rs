//! Field decoders: turn the raw characters of one field into a [`DecodedValue`].
//!
//! Every decoder is a pure function of the field text. Numeric strategies only accept
//! ASCII digits in the positions they consume; trailing characters beyond those
//! positions are ignored (several analytes carry an unused last digit).

use crate::ast::DecoderSpec;
use crate::value::DecodedValue;
use chrono::NaiveDateTime;

/// Canonical output layout for decoded timestamps.
pub const TIMESTAMP_OUTPUT: &str = "%Y-%m-%d %H:%M:%S";

/// A field's raw text does not have the shape its decoder expects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct FormatMismatch(pub String);

/// Why a frame could not be decoded. Any of these aborts the whole frame.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("frame length {actual} does not match schema span {expected}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("header mismatch: expected {expected:?}, got {found:?}")]
    HeaderMismatch { expected: String, found: String },
    #[error("trailer mismatch at offset {offset}: expected {expected:?}, got {found:?}")]
    TrailerMismatch {
        offset: usize,
        expected: String,
        found: String,
    },
    #[error("field {field}: {source}")]
    FieldFormat {
        field: String,
        #[source]
        source: FormatMismatch,
    },
}

impl DecodeError {
    /// Header or trailer marker absent: the frame is truncated or misaligned.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            DecodeError::HeaderMismatch { .. } | DecodeError::TrailerMismatch { .. }
        )
    }
}

/// Decode strategy for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldDecoder {
    /// Exact literal (frame header / trailer).
    Marker { literal: String },
    /// `int_digits` then an implied '.', `frac_digits`, then an optional status digit
    /// rendered as a separate token.
    ImpliedDecimal {
        int_digits: usize,
        frac_digits: usize,
        status: bool,
    },
    Percent { int_digits: usize, frac_digits: usize },
    /// Consecutive `width`-digit integers. `count` fixes the cardinality for
    /// composite fields; `None` splits the whole field.
    Groups { width: usize, count: Option<usize> },
    Timestamp { format: String },
    /// Identifier truncated at the first `delimiter`.
    Name { delimiter: char },
    Verbatim,
}

impl FieldDecoder {
    /// Build from a parsed spec. Widths and formats are checked by the schema lint.
    pub fn from_spec(spec: &DecoderSpec) -> Result<Self, String> {
        Ok(match spec {
            DecoderSpec::Header(lit) | DecoderSpec::Trailer(lit) => FieldDecoder::Marker {
                literal: lit.clone(),
            },
            DecoderSpec::Decimal {
                int_digits,
                frac_digits,
                status,
            } => FieldDecoder::ImpliedDecimal {
                int_digits: *int_digits,
                frac_digits: *frac_digits,
                status: *status,
            },
            DecoderSpec::Percent { int_digits, frac_digits } => FieldDecoder::Percent {
                int_digits: *int_digits,
                frac_digits: *frac_digits,
            },
            DecoderSpec::Groups { width, count } => FieldDecoder::Groups {
                width: *width,
                count: *count,
            },
            DecoderSpec::Timestamp(format) => FieldDecoder::Timestamp {
                format: format.clone(),
            },
            DecoderSpec::Name(delim) => {
                let mut chars = delim.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => FieldDecoder::Name { delimiter: c },
                    _ => return Err(format!("name delimiter must be one character, got {:?}", delim)),
                }
            }
            DecoderSpec::Verbatim => FieldDecoder::Verbatim,
        })
    }

    pub fn decode(&self, raw: &str) -> Result<DecodedValue, FormatMismatch> {
        match self {
            FieldDecoder::Marker { literal } => {
                if raw == literal {
                    Ok(DecodedValue::Text(raw.to_string()))
                } else {
                    Err(FormatMismatch(format!("expected marker {:?}, got {:?}", literal, raw)))
                }
            }
            FieldDecoder::ImpliedDecimal {
                int_digits,
                frac_digits,
                status,
            } => {
                let need = int_digits
                    .saturating_add(*frac_digits)
                    .saturating_add(usize::from(*status));
                let digits = leading_digits(raw, need)?;
                let mut out = implied_decimal(digits, *int_digits, *frac_digits);
                if *status {
                    out.push(' ');
                    out.push_str(&digits[int_digits + frac_digits..]);
                }
                Ok(DecodedValue::Text(out))
            }
            FieldDecoder::Percent { int_digits, frac_digits } => {
                let digits = leading_digits(raw, int_digits.saturating_add(*frac_digits))?;
                let mut out = implied_decimal(digits, *int_digits, *frac_digits);
                out.push('%');
                Ok(DecodedValue::Text(out))
            }
            FieldDecoder::Groups { width, count } => {
                let cells: Vec<char> = raw.chars().collect();
                if *width == 0 || cells.len() % width != 0 {
                    return Err(FormatMismatch(format!(
                        "length {} is not a multiple of group width {}",
                        cells.len(),
                        width
                    )));
                }
                if let Some(n) = count {
                    if width.checked_mul(*n) != Some(cells.len()) {
                        return Err(FormatMismatch(format!(
                            "expected {} groups of {}, got {} characters",
                            n,
                            width,
                            cells.len()
                        )));
                    }
                }
                let groups = cells
                    .chunks(*width)
                    .map(parse_group)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(DecodedValue::Integers(groups))
            }
            FieldDecoder::Timestamp { format } => {
                let ts = NaiveDateTime::parse_from_str(raw, format)
                    .map_err(|e| FormatMismatch(format!("timestamp {:?} ({}): {}", raw, format, e)))?;
                Ok(DecodedValue::Text(ts.format(TIMESTAMP_OUTPUT).to_string()))
            }
            FieldDecoder::Name { delimiter } => {
                let name = raw.split(*delimiter).next().unwrap_or_default();
                Ok(DecodedValue::Text(name.to_string()))
            }
            FieldDecoder::Verbatim => Ok(DecodedValue::Text(raw.to_string())),
        }
    }
}

/// The first `n` characters of `raw`, required to be ASCII digits.
fn leading_digits(raw: &str, n: usize) -> Result<&str, FormatMismatch> {
    let end = raw
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(raw.len()))
        .nth(n)
        .ok_or_else(|| FormatMismatch(format!("need {} digits, got {:?}", n, raw)))?;
    let head = &raw[..end];
    if !head.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FormatMismatch(format!("expected {} digits, got {:?}", n, head)));
    }
    Ok(head)
}

fn implied_decimal(digits: &str, int_digits: usize, frac_digits: usize) -> String {
    let mut out = String::with_capacity(int_digits + frac_digits + 1);
    out.push_str(&digits[..int_digits]);
    if frac_digits > 0 {
        out.push('.');
        out.push_str(&digits[int_digits..int_digits + frac_digits]);
    }
    out
}

/// One group of decimal digits. Fails on any non-digit or on `u32` overflow.
fn parse_group(group: &[char]) -> Result<u32, FormatMismatch> {
    group
        .iter()
        .try_fold(0u32, |acc, c| {
            c.to_digit(10)
                .and_then(|d| acc.checked_mul(10)?.checked_add(d))
        })
        .ok_or_else(|| {
            FormatMismatch(format!(
                "non-digit group {:?}",
                group.iter().collect::<String>()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decimal(i: usize, f: usize, status: bool) -> FieldDecoder {
        FieldDecoder::ImpliedDecimal {
            int_digits: i,
            frac_digits: f,
            status,
        }
    }

    #[test]
    fn implied_decimal_with_status_token() {
        let v = decimal(2, 1, true).decode("1234").unwrap();
        assert_eq!(v, DecodedValue::Text("12.3 4".into()));
    }

    #[test]
    fn implied_decimal_without_fraction_has_no_point() {
        assert_eq!(decimal(3, 0, true).decode("1234").unwrap().as_text(), Some("123 4"));
        assert_eq!(decimal(4, 0, true).decode("12345").unwrap().as_text(), Some("1234 5"));
    }

    #[test]
    fn implied_decimal_ignores_unused_trailing_digit() {
        assert_eq!(decimal(2, 1, false).decode("0459").unwrap().as_text(), Some("04.5"));
        assert_eq!(decimal(1, 2, false).decode("2154").unwrap().as_text(), Some("2.15"));
    }

    #[test]
    fn implied_decimal_rejects_non_digits() {
        assert!(decimal(2, 1, true).decode("12a4").is_err());
        assert!(decimal(2, 1, true).decode("123").is_err());
    }

    #[test]
    fn percent_suffix() {
        let d = FieldDecoder::Percent {
            int_digits: 2,
            frac_digits: 1,
        };
        assert_eq!(d.decode("123").unwrap().as_text(), Some("12.3%"));
        assert_eq!(d.decode("4561").unwrap().as_text(), Some("45.6%"));
    }

    #[test]
    fn marker_requires_exact_literal() {
        let d = FieldDecoder::Marker { literal: "@a".into() };
        assert_eq!(d.decode("@a").unwrap().as_text(), Some("@a"));
        assert!(d.decode("@b").is_err());
    }

    #[test]
    fn composite_groups() {
        let four = FieldDecoder::Groups { width: 3, count: Some(4) };
        assert_eq!(
            four.decode("010020030255").unwrap().as_integers(),
            Some(&[10, 20, 30, 255][..])
        );
        let two = FieldDecoder::Groups { width: 3, count: Some(2) };
        assert_eq!(two.decode("007100").unwrap().as_integers(), Some(&[7, 100][..]));
        assert!(two.decode("007100001").is_err());
    }

    #[test]
    fn bulk_groups_split_whole_field() {
        let raw: String = (0..256).map(|i| format!("{:03}", i % 1000)).collect();
        let v = FieldDecoder::Groups { width: 3, count: None }.decode(&raw).unwrap();
        let ints = v.as_integers().unwrap();
        assert_eq!(ints.len(), 256);
        assert_eq!(ints[0], 0);
        assert_eq!(ints[255], 255);
    }

    #[test]
    fn groups_reject_non_digits() {
        let d = FieldDecoder::Groups { width: 3, count: None };
        assert!(d.decode("001 02").is_err());
    }

    #[test]
    fn groups_count_characters_not_utf8_bytes() {
        let d = FieldDecoder::Groups { width: 3, count: None };
        let mut raw: String = "001".repeat(256);
        raw.replace_range(3..4, "\u{e9}");
        assert_eq!(raw.chars().count(), 768);
        let err = d.decode(&raw).unwrap_err();
        assert!(err.0.contains("non-digit group"), "{}", err);
        assert!(!err.0.contains("769"), "{}", err);
    }

    #[test]
    fn oversized_digit_counts_fail_without_panicking() {
        assert!(decimal(usize::MAX, 1, true).decode("1234").is_err());
        let huge = FieldDecoder::Groups {
            width: 3,
            count: Some(usize::MAX / 2),
        };
        assert!(huge.decode("001002").is_err());
        let wide = FieldDecoder::Groups { width: 10, count: None };
        assert!(wide.decode("9999999999").is_err());
    }

    #[test]
    fn timestamp_canonical_form() {
        let d = FieldDecoder::Timestamp {
            format: "%Y%m%d%H%M%S".into(),
        };
        assert_eq!(d.decode("20230615143000").unwrap().as_text(), Some("2023-06-15 14:30:00"));
        assert!(d.decode("99999999999999").is_err());
    }

    #[test]
    fn name_cut_at_delimiter() {
        let d = FieldDecoder::Name { delimiter: '#' };
        assert_eq!(d.decode("SMITH J#######").unwrap().as_text(), Some("SMITH J"));
        assert_eq!(d.decode("NOPAD").unwrap().as_text(), Some("NOPAD"));
        assert_eq!(d.decode("####").unwrap().as_text(), Some(""));
    }

    #[test]
    fn verbatim_passes_through() {
        assert_eq!(FieldDecoder::Verbatim.decode("00 12").unwrap().as_text(), Some("00 12"));
    }

    #[test]
    fn name_delimiter_must_be_single_char() {
        assert!(FieldDecoder::from_spec(&DecoderSpec::Name("##".into())).is_err());
        assert_eq!(
            FieldDecoder::from_spec(&DecoderSpec::Name("#".into())).unwrap(),
            FieldDecoder::Name { delimiter: '#' }
        );
    }
}
