//! # ktframe: KT series hematology analyzer frame decoder
//!
//! The analyzer sends one fixed-length ASCII frame per sample over a serial link.
//! This crate turns such a frame into named clinical measurements and renders them
//! as CSV.
//!
//! ## Pipeline
//!
//! 1. **Schema**: a byte-range field table written in a small DSL (see [`parser`]),
//!    linted ([`lint`]) and resolved into a [`Schema`]. Device variants are data:
//!    [`Model`] embeds the shipped ones.
//! 2. **Validation**: exact length, header marker, trailer marker ([`validate_frame`]).
//! 3. **Decoding**: each field's slice goes through its [`FieldDecoder`]
//!    (implied decimals, percent, markers, digit groups, timestamps, names).
//!    The first failure aborts the frame ([`decode_frame`]).
//! 4. **Output**: [`transpose`] turns ragged per-field columns into rows; [`dump`]
//!    writes CSV.
//!
//! [`Records`] runs the whole pipeline over a byte stream, realigning on the header
//! marker when a frame arrives with bytes missing or extra.
//!
//! ## Example DSL
//!
//! ```text
//! schema kt-classic {
//! 	length 2096;
//! 	field "frame-head" 0..2 = header("@a");
//! 	field "WBC" 25..29 = decimal(2, 1, status) range "4.0-10.0";
//! 	field "WBC-y-data" 175..943 = groups(3);
//! 	field "frame-end" 2095..2096 = trailer("#");
//! }
//! ```
//!
//! ## Usage
//!
//! ```no_run
//! use ktframe::{decode_frame, Model};
//!
//! let schema = Model::KtClassic.schema().expect("built-in schema");
//! let bytes = std::fs::read("sample.bin").expect("frame");
//! let record = decode_frame(&schema, &bytes).expect("valid frame");
//! println!("WBC = {}", record.get("WBC").expect("field"));
//! ```

pub mod ast;
pub mod codec;
pub mod dump;
pub mod frame;
pub mod lint;
pub mod models;
pub mod parser;
pub mod schema;
pub mod stream;
pub mod table;
pub mod value;

pub use codec::{DecodeError, FieldDecoder, FormatMismatch};
pub use frame::{decode_frame, diagnose_frame, validate_frame, DecodedRecord};
pub use models::Model;
pub use parser::parse;
pub use schema::{FieldDescriptor, Schema};
pub use stream::{FrameReader, Records, RejectPolicy, StreamError, StreamStats};
pub use table::{transpose, Transpose};
pub use value::DecodedValue;
