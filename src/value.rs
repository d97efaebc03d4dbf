//! Decoded field values.

/// What one field decodes to: a formatted string, or a sequence of integers
/// (histogram positions and channel data).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedValue {
    Text(String),
    Integers(Vec<u32>),
}

impl DecodedValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            DecodedValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integers(&self) -> Option<&[u32]> {
        match self {
            DecodedValue::Integers(v) => Some(v),
            _ => None,
        }
    }

    /// Number of table cells this value occupies (1 for text).
    pub fn len(&self) -> usize {
        match self {
            DecodedValue::Text(_) => 1,
            DecodedValue::Integers(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// One cell per element, in order.
    pub fn cells(&self) -> Vec<String> {
        match self {
            DecodedValue::Text(s) => vec![s.clone()],
            DecodedValue::Integers(v) => v.iter().map(|x| x.to_string()).collect(),
        }
    }
}

impl std::fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodedValue::Text(s) => f.write_str(s),
            DecodedValue::Integers(v) => {
                let parts: Vec<String> = v.iter().map(|x| x.to_string()).collect();
                f.write_str(&parts.join(" "))
            }
        }
    }
}
