//! Parse schema DSL source into AST using PEST.

use crate::ast::*;
use pest::Parser;
use pest_derive::Parser as PestParser;

#[derive(PestParser)]
#[grammar = "grammar.pest"]
struct SchemaParser;

/// Parse schema source into AST.
pub fn parse(source: &str) -> Result<SchemaFile, String> {
    let pairs = SchemaParser::parse(Rule::schema_file, source)
        .map_err(|e| format!("Parse error: {}", e))?;
    let pair = pairs.into_iter().next().ok_or("Empty parse")?;
    let mut schemas = Vec::new();
    for inner in pair.into_inner() {
        if inner.as_rule() == Rule::schema_section {
            schemas.push(build_section(inner)?);
        }
    }
    Ok(SchemaFile { schemas })
}

fn build_section(pair: pest::iterators::Pair<Rule>) -> Result<SchemaSection, String> {
    let mut name = String::new();
    let mut length = None;
    let mut fields = Vec::new();
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::ident => name = inner.as_str().to_string(),
            Rule::length_decl => {
                if length.is_some() {
                    return Err(format!("schema {}: length declared twice", name));
                }
                let n = inner.into_inner().next().ok_or("length: missing value")?;
                length = Some(parse_usize(n.as_str())?);
            }
            Rule::field_decl => fields.push(build_field(inner)?),
            _ => {}
        }
    }
    if name.is_empty() {
        return Err("schema section: missing name".to_string());
    }
    Ok(SchemaSection { name, length, fields })
}

fn build_field(pair: pest::iterators::Pair<Rule>) -> Result<FieldDef, String> {
    let mut it = pair.into_inner();
    let name = string_value(it.next().ok_or("field: missing name")?)?;
    let range = it.next().ok_or_else(|| format!("field {}: missing byte range", name))?;
    let mut bounds = range.into_inner();
    let start = parse_usize(bounds.next().ok_or("byte range: start")?.as_str())?;
    let end = parse_usize(bounds.next().ok_or("byte range: end")?.as_str())?;
    let decoder_pair = it.next().ok_or_else(|| format!("field {}: missing decoder", name))?;
    let decoder = build_decoder(decoder_pair).map_err(|e| format!("field {}: {}", name, e))?;
    let mut reference_range = None;
    for rest in it {
        if rest.as_rule() == Rule::range_clause {
            let s = rest.into_inner().next().ok_or("range: missing text")?;
            reference_range = Some(string_value(s)?);
        }
    }
    Ok(FieldDef {
        name,
        start,
        end,
        decoder,
        reference_range,
    })
}

fn build_decoder(pair: pest::iterators::Pair<Rule>) -> Result<DecoderSpec, String> {
    let inner = pair.into_inner().next().ok_or("Empty decoder")?;
    let rule = inner.as_rule();
    let mut args = inner.into_inner();
    match rule {
        Rule::header_dec => Ok(DecoderSpec::Header(string_value(args.next().ok_or("header: literal")?)?)),
        Rule::trailer_dec => Ok(DecoderSpec::Trailer(string_value(args.next().ok_or("trailer: literal")?)?)),
        Rule::decimal_dec => {
            let int_digits = parse_usize(args.next().ok_or("decimal: integer digits")?.as_str())?;
            let frac_digits = parse_usize(args.next().ok_or("decimal: fraction digits")?.as_str())?;
            let status = args.next().map(|p| p.as_rule() == Rule::status_flag).unwrap_or(false);
            Ok(DecoderSpec::Decimal {
                int_digits,
                frac_digits,
                status,
            })
        }
        Rule::percent_dec => {
            let int_digits = parse_usize(args.next().ok_or("percent: integer digits")?.as_str())?;
            let frac_digits = parse_usize(args.next().ok_or("percent: fraction digits")?.as_str())?;
            Ok(DecoderSpec::Percent { int_digits, frac_digits })
        }
        Rule::groups_dec => {
            let width = parse_usize(args.next().ok_or("groups: width")?.as_str())?;
            let count = match args.next() {
                Some(p) => Some(parse_usize(p.as_str())?),
                None => None,
            };
            Ok(DecoderSpec::Groups { width, count })
        }
        Rule::timestamp_dec => Ok(DecoderSpec::Timestamp(string_value(args.next().ok_or("timestamp: format")?)?)),
        Rule::name_dec => Ok(DecoderSpec::Name(string_value(args.next().ok_or("name: delimiter")?)?)),
        Rule::verbatim_dec => Ok(DecoderSpec::Verbatim),
        other => Err(format!("unexpected decoder: {:?}", other)),
    }
}

fn string_value(pair: pest::iterators::Pair<Rule>) -> Result<String, String> {
    let inner = pair.into_inner().next().ok_or("string: missing contents")?;
    Ok(inner.as_str().to_string())
}

fn parse_usize(s: &str) -> Result<usize, String> {
    s.parse::<usize>().map_err(|e| format!("invalid integer {:?}: {}", s, e))
}
