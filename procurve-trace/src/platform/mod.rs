//! Platform definitions.
//!
//! This module describes the device CLI: prompt patterns, failure markers,
//! interactive prompts and the command vocabulary.

mod definition;
pub mod procurve;

pub use definition::PlatformDefinition;
