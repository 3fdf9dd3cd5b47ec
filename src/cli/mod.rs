//! Command Line Interface (CLI) layer for dwiconn.
//!
//! This module defines argument parsing (`args`), error types (`errors`),
//! and the orchestration logic (`runner`) for batch subject processing. It
//! wires user-provided options to the underlying library functionality
//! exposed via `dwiconn::api`.
//!
//! If you are embedding dwiconn into another application, prefer using the
//! high-level `dwiconn::api` module instead of calling the CLI code.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
