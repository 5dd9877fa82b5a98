//! Command-line access to a single dotconf file.
//!
//! The binary is a thin wrapper: it opens a [`ConfigStore`](dotconf_store::ConfigStore)
//! for the file given with `--file` (or `DOTCONF_FILE`), loads it and runs one
//! of the [`Commands`]. Mutating commands wait for the write to finish.

pub mod commands;

pub use commands::{run, CommandResult, Commands, DumpFormat};
