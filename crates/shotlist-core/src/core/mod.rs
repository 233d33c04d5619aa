//! Shotlist Core Engine
//!
//! Timecode arithmetic, EDL emission, shot storage, exports and settings.

pub mod edl;
pub mod export;
pub mod fs;
pub mod settings;
pub mod storage;
pub mod timecode;

// Re-export common types
mod types;
pub use types::*;

mod error;
pub use error::*;
