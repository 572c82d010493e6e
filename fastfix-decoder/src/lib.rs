/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # fastfix Decoder
//!
//! FAST (FIX Adapted for STreaming) message decoding.
//!
//! FAST is a binary encoding used for high-volume market data feeds. It
//! combines stop-bit encoded primitives, presence maps, and stateful field
//! operators that reuse values from previous messages.
//!
//! ## Features
//!
//! - **Stop-bit primitives**: Bounded integer, ASCII, and byte vector readers
//! - **Presence maps**: Capped, over-read safe bit maps
//! - **Field operators**: Constant, Default, Copy, Increment, Tail, Delta
//! - **Templates**: Scalar, decimal, and sequence fields driven by a
//!   [`TemplateStore`]
//! - **Engine**: Per-stream dictionary and message dispatch by template id
//!
//! ## Example
//!
//! ```
//! use fastfix_decoder::{Engine, TemplateStore};
//! use fastfix_template::{FieldDef, OperatorDef, TemplateDef, TemplateSet};
//!
//! let set = TemplateSet::new().template(
//!     TemplateDef::new(144)
//!         .field(FieldDef::uint32(1128, "ApplVerID").with_operator(OperatorDef::constant("9")))
//!         .field(FieldDef::string(35, "MsgType").with_operator(OperatorDef::constant("0")))
//!         .field(FieldDef::uint32(34, "MsgSeqNum"))
//!         .field(FieldDef::uint32(52, "SendingTime")),
//! );
//! let mut engine = Engine::new(TemplateStore::from_set(&set).unwrap());
//! let message = engine.decode_bytes(&[0xC0, 0x01, 0x90, 0x8A, 0x8B]).unwrap();
//! assert_eq!(message.to_string(), "1128=9|35=0|34=10|52=11|");
//! ```

pub mod cursor;
pub mod decimal;
pub mod decoder;
pub mod dictionary;
pub mod encoder;
pub mod engine;
pub mod error;
pub mod field;
pub mod operators;
pub mod pmap;
pub mod sequence;
pub mod template;
pub mod value;

pub use cursor::ByteCursor;
pub use decimal::DecimalField;
pub use decoder::PrimitiveReader;
pub use dictionary::{Dictionary, Entry};
pub use encoder::FastEncoder;
pub use engine::{Engine, EngineConfig, ResetPolicy, TEMPLATE_ID_FIELD};
pub use error::FastError;
pub use field::ScalarField;
pub use operators::Operator;
pub use pmap::{DEFAULT_MAX_PMAP_BYTES, PresenceMap};
pub use sequence::SequenceField;
pub use template::{DecodeContext, Field, Template, TemplateStore};
pub use value::Value;
