//! Command handlers for the ragkit CLI.

pub mod profile;
pub mod split;

// Re-export command types for convenience
pub use profile::ProfileCommand;
pub use split::SplitCommand;
