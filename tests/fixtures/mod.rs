//! Test fixtures for rescue-planner.
//!
//! Provides realistic test data:
//! - Indore donor, NGO and depot locations
//! - Builders for stops and directory candidates

#![allow(dead_code)]

pub mod indore_locations;

pub use indore_locations::*;
