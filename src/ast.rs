//! Abstract Syntax Tree for the frame schema DSL.

/// Root of a schema source file: one or more named schema sections.
#[derive(Debug, Clone)]
pub struct SchemaFile {
    pub schemas: Vec<SchemaSection>,
}

impl SchemaFile {
    pub fn get(&self, name: &str) -> Option<&SchemaSection> {
        self.schemas.iter().find(|s| s.name == name)
    }
}

/// One device variant: declared frame length plus ordered field definitions.
#[derive(Debug, Clone)]
pub struct SchemaSection {
    pub name: String,
    /// `length N;` if present. Otherwise the span is the largest field end.
    pub length: Option<usize>,
    pub fields: Vec<FieldDef>,
}

impl SchemaSection {
    /// Declared frame span (explicit `length`, or the furthest field end).
    pub fn span(&self) -> usize {
        self.length
            .unwrap_or_else(|| self.fields.iter().map(|f| f.end).max().unwrap_or(0))
    }
}

#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: String,
    pub start: usize,
    pub end: usize,
    pub decoder: DecoderSpec,
    pub reference_range: Option<String>,
}

impl FieldDef {
    pub fn width(&self) -> usize {
        self.end.saturating_sub(self.start)
    }
}

/// Decode strategy as written in the source.
#[derive(Debug, Clone, PartialEq)]
pub enum DecoderSpec {
    /// `header("@a")`: start marker, checked by the validator.
    Header(String),
    /// `trailer("#")`: end marker, checked by the validator.
    Trailer(String),
    /// `decimal(i, f[, status])`: implied decimal point after `i` digits.
    Decimal {
        int_digits: usize,
        frac_digits: usize,
        status: bool,
    },
    /// `percent(i, f)`
    Percent { int_digits: usize, frac_digits: usize },
    /// `groups(w, n)` when `count` is set, `groups(w)` for a bulk array.
    Groups { width: usize, count: Option<usize> },
    Timestamp(String),
    /// `name("#")`: identifier cut at the first delimiter.
    Name(String),
    Verbatim,
}

impl DecoderSpec {
    /// Keyword used in the DSL; used in lint messages.
    pub fn keyword(&self) -> &'static str {
        match self {
            DecoderSpec::Header(_) => "header",
            DecoderSpec::Trailer(_) => "trailer",
            DecoderSpec::Decimal { .. } => "decimal",
            DecoderSpec::Percent { .. } => "percent",
            DecoderSpec::Groups { .. } => "groups",
            DecoderSpec::Timestamp(_) => "timestamp",
            DecoderSpec::Name(_) => "name",
            DecoderSpec::Verbatim => "verbatim",
        }
    }
}
