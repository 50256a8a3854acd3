//! Command implementations

pub mod install;
pub mod sample;
pub mod variants;
