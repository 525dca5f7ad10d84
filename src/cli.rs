//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// syncsite: render headless-cms content to static html
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root; config, output and state paths are relative to it
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Output directory path (relative to project root)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Config file name (default: syncsite.toml)
    #[arg(short = 'C', long, default_value = "syncsite.toml")]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Shared build arguments for Build and Serve commands
#[derive(clap::Args, Debug, Clone)]
pub struct BuildArgs {
    /// Ignore the stored sync token: fetch everything and rebuild the output from scratch
    #[arg(long)]
    pub full: bool,

    /// Read drafts through the preview API instead of the delivery API
    #[arg(long)]
    pub preview: bool,

    /// Minify the html content
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub minify: Option<bool>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Write a default syncsite.toml into the project root
    Init,

    /// Sync content and render the site (incremental when a sync token exists)
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Build, then serve the site and accept comment submissions
    Serve {
        #[command(flatten)]
        build_args: BuildArgs,

        /// Interface to bind on
        #[arg(short, long)]
        interface: Option<String>,

        /// The port you should provide
        #[arg(short, long)]
        port: Option<u16>,
    },
}

impl Cli {
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Commands::Init)
    }

    /// Build arguments of `build`/`serve`, `None` for `init`.
    pub fn build_args(&self) -> Option<&BuildArgs> {
        match &self.command {
            Commands::Build { build_args } | Commands::Serve { build_args, .. } => Some(build_args),
            Commands::Init => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build_defaults() {
        let cli = Cli::parse_from(["syncsite", "build"]);

        assert_eq!(cli.config, PathBuf::from("syncsite.toml"));
        let args = cli.build_args().unwrap();
        assert!(!args.full);
        assert!(!args.preview);
        assert_eq!(args.minify, None);
    }

    #[test]
    fn test_parse_build_flags() {
        let cli = Cli::parse_from(["syncsite", "-o", "dist", "build", "--full", "--minify", "false"]);

        assert_eq!(cli.output, Some(PathBuf::from("dist")));
        let args = cli.build_args().unwrap();
        assert!(args.full);
        assert_eq!(args.minify, Some(false));
    }

    #[test]
    fn test_parse_serve() {
        let cli = Cli::parse_from(["syncsite", "serve", "-i", "0.0.0.0", "-p", "8080"]);

        match cli.command {
            Commands::Serve {
                interface, port, ..
            } => {
                assert_eq!(interface.as_deref(), Some("0.0.0.0"));
                assert_eq!(port, Some(8080));
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_init_has_no_build_args() {
        let cli = Cli::parse_from(["syncsite", "init"]);
        assert!(cli.is_init());
        assert!(cli.build_args().is_none());
    }
}
