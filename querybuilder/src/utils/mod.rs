//! Utility functions shared across the crate

pub mod json;
