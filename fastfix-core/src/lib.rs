/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # fastfix Core
//!
//! Value model, decoded message output, and error codes shared by the
//! fastfix FAST decoder crates.
//!
//! This crate provides:
//! - **Error codes**: The stable FAST identifiers (`S2`..`R6`) as [`ErrorCode`]
//! - **Field values**: [`Payload`], [`FixValue`] and the exact [`ScaledDecimal`]
//! - **Messages**: [`FixMessage`], an insertion-ordered `tag -> value` map

pub mod error;
pub mod field;
pub mod message;

pub use error::{ErrorCode, MessageError};
pub use field::{FixValue, MAX_DECIMAL_EXPONENT, MIN_DECIMAL_EXPONENT, Payload, ScaledDecimal};
pub use message::FixMessage;
