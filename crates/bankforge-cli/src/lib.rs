//! bankforge CLI library.
//!
//! Command implementations for the `bankforge` binary: converting an
//! instrument table into native and SF2 banks, and inspecting envelope
//! register conversions.

pub mod commands;
