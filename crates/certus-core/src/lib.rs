//! Certus Core — Fundamental types, level taxonomy, stable error codes, and
//! the clock abstraction for the Certus KYC verification registry.

pub mod clock;
pub mod error;
pub mod types;

pub use clock::{ClockSource, ManualClock};
pub use error::{codes, CoreError};
pub use types::{AccountId, DocumentHash, Height, KycLevel, RequestId};
