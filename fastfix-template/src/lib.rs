/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # fastfix Template
//!
//! FAST template definitions for the fastfix decoder.
//!
//! This crate provides:
//! - **Schema definitions**: The template tree (`templates`, `template`,
//!   scalar, decimal and sequence field nodes, operator children)
//! - **Initial values**: Conversion of `value` attributes into typed payloads
//! - **Load errors**: The static (S2-S5) and range (R1, R4) template errors

pub mod convert;
pub mod error;
pub mod schema;

pub use convert::{narrow_integer, parse_decimal, parse_hex, parse_initial_value};
pub use error::TemplateError;
pub use schema::{
    DecimalOperators, FieldDef, FieldKind, LengthDef, OperatorDef, OperatorKind, Presence,
    ScalarType, TemplateDef, TemplateSet,
};
