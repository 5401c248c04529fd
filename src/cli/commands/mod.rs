//! Command implementations, one module per subcommand.

pub mod add;
pub mod browse;
pub mod completions;
pub mod count;
pub mod edit;
pub mod export;
pub mod import;
pub mod init;
pub mod list;
pub mod show;
