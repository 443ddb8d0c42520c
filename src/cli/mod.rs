//! CLI module - command-line interface for Warbler
//!
//! This module provides a structured CLI using clap for argument parsing.

use clap::{Parser, Subcommand};

/// Warbler - a micro-blogging web application
#[derive(Parser)]
#[command(name = "warbler")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the web server
    #[command(alias = "s")]
    Serve,

    /// Populate the database with sample data for local development
    Seed,

    /// Create a default config file
    #[command(alias = "--init")]
    Init,
}
