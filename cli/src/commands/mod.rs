//! Command implementations

pub mod handoff;
