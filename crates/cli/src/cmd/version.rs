//! Version reporting
//!
//! Commit and build date are baked in at compile time from `CPW_COMMIT_SHA`
//! and `CPW_BUILD_DATE` when the release build sets them.

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Commit the binary was built from
pub const COMMIT_SHA: &str = match option_env!("CPW_COMMIT_SHA") {
    Some(sha) => sha,
    None => "unknown",
};

/// Build date of the binary
pub const BUILD_DATE: &str = match option_env!("CPW_BUILD_DATE") {
    Some(date) => date,
    None => "unknown",
};

/// Version with build metadata: `0.1.0 (commit: abc123, built: 2024-01-01)`
pub fn version_info() -> String {
    format!("{} (commit: {}, built: {})", VERSION, COMMIT_SHA, BUILD_DATE)
}

/// Print the version line
pub fn run() {
    println!("cpw version {}", version_info());
}
