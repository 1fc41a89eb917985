// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! spacey-resolve - inspect how module specifiers resolve
//!
//! ## Features
//!
//! - One-shot static and dynamic resolution of a specifier
//! - Search path candidate listing
//! - Interactive REPL with history and completion

mod repl;
mod session;

use anyhow::Context;
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use session::{Resolution, Session};
use spacey_modules::{LoaderConfig, VERSION};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "spacey-resolve",
    about = "Resolve JavaScript module specifiers the way Spacey does",
    version = VERSION,
    author = "Pegasus Heavy Industries"
)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory backing resource:/// URIs
    #[arg(long, global = true)]
    resource_root: Option<PathBuf>,

    /// Extra search base, probed after the configured ones
    #[arg(long = "search-base", global = true)]
    search_bases: Vec<String>,

    /// Start from an empty search path
    #[arg(long, global = true)]
    no_default_search_path: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a specifier and register the module
    Resolve {
        /// Relative path, absolute URI or bare name
        specifier: String,

        /// URI of the importing module
        #[arg(long)]
        from: Option<String>,

        /// Resolve as a dynamic import
        #[arg(long)]
        dynamic: bool,

        /// Print the loaded source text
        #[arg(long)]
        print_source: bool,
    },

    /// List the URIs probed for a bare specifier
    Candidates {
        /// Bare module name
        specifier: String,
    },

    /// List registered URI schemes
    Schemes,

    /// Start the interactive REPL
    Repl,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(cli.verbose, config.log_filter.as_deref());

    match run(cli.command, &config) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

/// Merge the configuration file with command line overrides
fn load_config(cli: &Cli) -> anyhow::Result<LoaderConfig> {
    let mut config = match &cli.config {
        Some(path) => LoaderConfig::load(path)?,
        None => LoaderConfig::default(),
    };

    if cli.no_default_search_path {
        config.default_search_path = false;
    }
    if let Some(root) = &cli.resource_root {
        config.resource_root = Some(root.clone());
    }
    config.extend_search_path(cli.search_bases.iter().cloned());

    Ok(config)
}

/// RUST_LOG wins, then `--verbose`, then the configured filter
fn init_logging(verbose: bool, configured: Option<&str>) {
    let fallback = if verbose {
        "spacey_modules=debug"
    } else {
        configured.unwrap_or("spacey_modules=warn")
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Option<Command>, config: &LoaderConfig) -> anyhow::Result<ExitCode> {
    let mut session = Session::new(config).context("failed to start the async runtime")?;

    match command.unwrap_or(Command::Repl) {
        Command::Resolve {
            specifier,
            from,
            dynamic,
            print_source,
        } => {
            session.set_referrer(from.as_deref());

            let result = if dynamic {
                session.import(&specifier)
            } else {
                session.resolve(&specifier)
            };

            match result {
                Ok(resolution) => {
                    print_resolution(&specifier, &resolution);
                    if print_source {
                        if let Resolution::Module(module) = &resolution {
                            println!("{}", module.source());
                        }
                    }
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    print_import_error(&e);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Candidates { specifier } => {
            print_candidates(&session, &specifier);
            Ok(ExitCode::SUCCESS)
        }
        Command::Schemes => {
            print_schemes(&session);
            Ok(ExitCode::SUCCESS)
        }
        Command::Repl => {
            let mut repl = repl::Repl::new(session).context("failed to initialize REPL")?;
            repl.run()?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Print where a specifier ended up
pub(crate) fn print_resolution(specifier: &str, resolution: &Resolution) {
    match resolution {
        Resolution::Module(module) => {
            let kind = if module.is_internal() {
                "internal"
            } else {
                "module"
            };
            println!(
                "{} {} {} {}",
                specifier.cyan(),
                "->".dimmed(),
                module.key().green(),
                format!("({kind})").dimmed()
            );
            if module.human_id() != module.key() {
                println!("  {} {}", "from".dimmed(), module.human_id());
            }
        }
        Resolution::Empty => {
            println!(
                "{} {} {}",
                specifier.cyan(),
                "->".dimmed(),
                "no source".yellow()
            );
        }
    }
}

/// Print an import error with its cause chain
pub(crate) fn print_import_error(error: &spacey_modules::ImportError) {
    eprintln!(
        "{} {}",
        format!("{:?}:", error.root_kind()).red().bold(),
        error
    );

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        eprintln!("  {} {}", "caused by:".dimmed(), cause);
        source = cause.source();
    }
}

pub(crate) fn print_candidates(session: &Session, specifier: &str) {
    let ctx = session.context();
    let candidates = ctx.search_path().candidate_uris(specifier);

    if candidates.is_empty() {
        println!("{}", "search path is empty".dimmed());
        return;
    }

    for uri in candidates {
        let marker = if ctx.resource_exists(&uri) {
            "found".green().to_string()
        } else {
            "missing".dimmed().to_string()
        };
        println!("  {:8} {}", marker, uri);
    }
}

pub(crate) fn print_schemes(session: &Session) {
    let schemes = session.context().schemes();

    for scheme in schemes.schemes() {
        let mut handlers = Vec::new();
        if schemes.relative_resolver_for(scheme).is_some() {
            handlers.push("relative");
        }
        if schemes.loader_for(scheme).is_some() {
            handlers.push("sync");
        }
        if schemes.async_loader_for(scheme).is_some() {
            handlers.push("async");
        }
        println!("  {:12} {}", scheme.cyan(), handlers.join(", ").dimmed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_resolve() {
        let cli = Cli::parse_from([
            "spacey-resolve",
            "--search-base",
            "resource:///extra/",
            "resolve",
            "./util",
            "--from",
            "file:///app/main.js",
            "--dynamic",
        ]);

        assert_eq!(cli.search_bases, vec!["resource:///extra/"]);
        match cli.command {
            Some(Command::Resolve {
                specifier,
                from,
                dynamic,
                print_source,
            }) => {
                assert_eq!(specifier, "./util");
                assert_eq!(from.as_deref(), Some("file:///app/main.js"));
                assert!(dynamic);
                assert!(!print_source);
            }
            _ => panic!("expected resolve"),
        }
    }

    #[test]
    fn test_load_config_applies_overrides() {
        let cli = Cli::parse_from([
            "spacey-resolve",
            "--no-default-search-path",
            "--search-base",
            "resource:///a/",
            "--resource-root",
            "/opt/res",
            "schemes",
        ]);

        let config = load_config(&cli).unwrap();
        assert!(!config.default_search_path);
        assert_eq!(config.search_path, vec!["resource:///a/"]);
        assert_eq!(config.resource_root, Some(PathBuf::from("/opt/res")));
    }
}
