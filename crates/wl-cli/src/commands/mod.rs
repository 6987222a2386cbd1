//! CLI subcommand implementations.

pub mod commit;
pub mod doctor;
pub mod log;
pub mod status;
pub mod task;
pub mod util;
