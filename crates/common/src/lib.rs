//! Envelope wire format and error taxonomy shared across `sealbox` crates.

pub mod envelope;
pub mod error;

pub use envelope::{Envelope, Format};
pub use error::{EnvelopeDefect, SealError};
