//! Wire protocol for toll-lane field controllers.
//!
//! Field controllers speak a delimiter-framed, ASCII-hex telemetry protocol
//! over raw TCP. This crate owns everything about that protocol and nothing
//! about transport or state:
//!
//! - [`FrameAssembler`]: turns an unbounded byte stream into complete
//!   [`RawFrame`]s bounded by the `0x02`/`0x03` control bytes.
//! - [`decode`]: a pure function from a frame to a typed [`Decoded`] value,
//!   driven by the per-(category, type) [`schema`] table.
//! - [`codec`]: the fixed-width field codecs (ASCII-hex integers, 14-digit
//!   timestamps, GBK-encoded name fields).
//!
//! The protocol is fixed and unversioned; there is no length prefix and no
//! escaping for marker bytes inside a payload. Schema misalignment therefore
//! corrupts every subsequent field of the same frame, and a payload that
//! happens to contain the end marker desynchronises framing. Both are
//! documented protocol limitations, not bugs to correct here.

pub mod codec;
mod decode;
mod error;
mod frame;
mod message;
pub mod schema;

pub use codec::TIME_LAYOUT;
pub use decode::{decode, Decoded};
pub use error::{ProtoError, Result};
pub use frame::{FrameAssembler, RawFrame, ETX, STX};
pub use message::{alert, data, Category, Event, CATALOG_EXTERNAL, HEARTBEAT_TYPE};
pub use schema::{FieldDef, FieldKind, MessageSchema, SideEffect};
