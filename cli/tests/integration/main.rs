//! Integration tests for the ltm-handoff binary
//!
//! These tests spawn the actual binary and test end-to-end behavior.

mod handoff_command;
