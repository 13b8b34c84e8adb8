//! cpw command-line front end
//!
//! Argument parsing, configuration discovery, logging setup and the
//! mirror command itself. `main.rs` only maps results to exit codes.

pub mod args;
pub mod cmd;
pub mod logging;
pub mod settings;
pub mod util;
