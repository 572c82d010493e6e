/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # fastfix
//!
//! A template-driven FAST (FIX Adapted for STreaming) decoder for Rust.
//!
//! FAST streams carry FIX messages as stop-bit encoded binary, compressed
//! by field operators that reuse values from earlier fields and messages.
//! fastfix turns such a stream back into FIX tag=value messages, driven by
//! a set of templates.
//!
//! ## Features
//!
//! - **Bounded reads**: Every primitive has a byte budget; overruns are errors
//! - **All field operators**: Constant, Default, Copy, Increment, Tail, Delta
//! - **Composite fields**: Decimals with split operators and sequences
//! - **Stable error codes**: S2-S5, D5-D9, R1, R4, R6
//!
//! ## Quick Start
//!
//! ```rust
//! use fastfix::prelude::*;
//!
//! # fn main() -> fastfix::Result<()> {
//! let set = TemplateSet::new().template(
//!     TemplateDef::new(144)
//!         .with_name("Heartbeat")
//!         .field(FieldDef::uint32(1128, "ApplVerID").with_operator(OperatorDef::constant("9")))
//!         .field(FieldDef::string(35, "MsgType").with_operator(OperatorDef::constant("0")))
//!         .field(FieldDef::uint32(34, "MsgSeqNum"))
//!         .field(FieldDef::uint32(52, "SendingTime")),
//! );
//! let mut engine = Engine::new(TemplateStore::from_set(&set)?);
//! let message = engine.decode_bytes(&[0xC0, 0x01, 0x90, 0x8A, 0x8B])?;
//! assert_eq!(message.get_u32(34)?, Some(10));
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`]: FIX values, messages, and error codes
//! - [`template`]: Template definitions and initial value conversion
//! - [`decoder`]: Stop-bit readers, operators, and the decoding engine

use thiserror::Error;

pub mod core {
    //! FIX values, messages, and error codes.
    pub use fastfix_core::*;
}

pub mod template {
    //! Template definitions and initial value conversion.
    pub use fastfix_template::*;
}

pub mod decoder {
    //! Stop-bit readers, operators, and the decoding engine.
    pub use fastfix_decoder::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    // Values and messages
    pub use fastfix_core::{ErrorCode, FixMessage, FixValue, MessageError, Payload, ScaledDecimal};

    // Templates
    pub use fastfix_template::{
        FieldDef, LengthDef, OperatorDef, OperatorKind, Presence, ScalarType, TemplateDef,
        TemplateError, TemplateSet,
    };

    // Decoding
    pub use fastfix_decoder::{
        ByteCursor, Engine, EngineConfig, FastEncoder, FastError, PresenceMap, ResetPolicy,
        TemplateStore,
    };

    pub use crate::{Error, Result};
}

/// Any failure of the fastfix crates.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Template loading failed.
    #[error(transparent)]
    Template(#[from] fastfix_template::TemplateError),

    /// Message decoding failed.
    #[error(transparent)]
    Decode(#[from] fastfix_decoder::FastError),

    /// A decoded message was queried for a missing or mistyped tag.
    #[error(transparent)]
    Message(#[from] fastfix_core::MessageError),
}

impl Error {
    /// Returns the stable error code, if the failure has one.
    #[must_use]
    pub fn code(&self) -> Option<fastfix_core::ErrorCode> {
        match self {
            Self::Template(e) => e.code(),
            Self::Decode(e) => e.code(),
            Self::Message(_) => None,
        }
    }
}

/// Result type alias using the umbrella [`enum@Error`].
pub type Result<T> = std::result::Result<T, Error>;
