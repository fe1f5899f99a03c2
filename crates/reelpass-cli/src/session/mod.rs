//! Session setup shared by the subcommands.

pub mod storage;
