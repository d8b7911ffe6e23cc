/*
[INPUT]:  Parsed command-line arguments
[OUTPUT]: Command handlers for the specwise-sync binary
[POS]:    CLI layer - binary-only modules
[UPDATE]: When adding subcommands
*/

pub mod commands;
pub mod init;
