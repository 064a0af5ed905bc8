//! Gateway protocol definitions
//!
//! Defines the op codes, envelope format, control payloads and close codes.

mod close_codes;
mod envelope;
mod opcodes;
mod payloads;

pub use close_codes::CloseCode;
pub use envelope::Envelope;
pub use opcodes::OpCode;
pub use payloads::HelloPayload;
