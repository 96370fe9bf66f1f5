//! ui
//!
//! User-facing output.
//!
//! # Modules
//!
//! - [`output`] - Result rendering, diagnostics and debug tracing
//!
//! # Design
//!
//! All output goes through this module so results stay on stdout and
//! diagnostics stay on stderr, whatever the verbosity.

pub mod output;
