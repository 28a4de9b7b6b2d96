//! Export core modules shared across the CLI and library callers.

#[cfg(feature = "excel")]
pub mod excel_core;
