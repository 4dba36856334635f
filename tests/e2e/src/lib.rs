//! End-to-end test support for Kioku
//!
//! - `harness`: isolated on-disk stores driven by a manual clock
//! - `mocks`: vocabulary fixtures and retention-state builders

pub mod mocks;
