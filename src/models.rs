//! Built-in device models and their embedded schema files.

use crate::schema::Schema;
use std::fmt;
use std::str::FromStr;

/// A KT series frame layout shipped with the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Model {
    /// 2096-byte frame, `GRAN` subtype.
    KtClassic,
    /// 2120-byte frame, `NEUT` subtype, trailing sample id and patient name.
    KtExtended,
}

impl Model {
    pub const ALL: [Model; 2] = [Model::KtClassic, Model::KtExtended];

    /// Schema section name, also the identifier accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            Model::KtClassic => "kt-classic",
            Model::KtExtended => "kt-extended",
        }
    }

    /// Schema DSL source for this model.
    pub fn source(self) -> &'static str {
        match self {
            Model::KtClassic => include_str!("../schemas/kt_classic.schema"),
            Model::KtExtended => include_str!("../schemas/kt_extended.schema"),
        }
    }

    pub fn schema(self) -> Result<Schema, String> {
        Schema::from_source(self.source(), Some(self.name()))
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Model {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Model::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let known: Vec<&str> = Model::ALL.iter().map(|m| m.name()).collect();
                format!("unknown model {:?} (known: {})", s, known.join(", "))
            })
    }
}
