// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Interactive REPL for exploring module resolution.

use crate::session::Session;
use crate::{print_candidates, print_import_error, print_resolution, print_schemes};
use owo_colors::OwoColorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Config, Editor, Helper};
use std::borrow::Cow;
use std::path::PathBuf;

/// REPL configuration constants
const HISTORY_FILE: &str = ".spacey_resolve_history";
const MAX_HISTORY_SIZE: usize = 1000;

/// REPL commands that can be executed with a dot prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    Exit,
    Clear,
    Version,
    From,
    Dynamic,
    Candidates,
    Modules,
    Schemes,
    Reset,
}

impl ReplCommand {
    /// Parse a REPL command from input string
    pub fn parse(input: &str) -> Option<(Self, Option<&str>)> {
        let input = input.trim();
        let rest = input.strip_prefix('.')?;

        let parts: Vec<&str> = rest.splitn(2, char::is_whitespace).collect();
        let cmd = parts.first()?.to_lowercase();
        let arg = parts
            .get(1)
            .map(|arg| arg.trim())
            .filter(|arg| !arg.is_empty());

        match cmd.as_str() {
            "help" | "h" | "?" => Some((ReplCommand::Help, arg)),
            "exit" | "quit" | "q" => Some((ReplCommand::Exit, arg)),
            "clear" | "cls" => Some((ReplCommand::Clear, arg)),
            "version" | "v" => Some((ReplCommand::Version, arg)),
            "from" | "f" => Some((ReplCommand::From, arg)),
            "dynamic" | "import" | "d" => Some((ReplCommand::Dynamic, arg)),
            "candidates" | "c" => Some((ReplCommand::Candidates, arg)),
            "modules" | "m" => Some((ReplCommand::Modules, arg)),
            "schemes" | "s" => Some((ReplCommand::Schemes, arg)),
            "reset" => Some((ReplCommand::Reset, arg)),
            _ => None,
        }
    }

    /// Get all available commands for help/completion
    pub fn all_commands() -> &'static [(&'static str, &'static str)] {
        &[
            (".help", "Show this help message"),
            (".exit", "Exit the REPL"),
            (".clear", "Clear the screen"),
            (".version", "Show version information"),
            (".from [uri]", "Set or clear the importing module URI"),
            (".dynamic <spec>", "Resolve a specifier as a dynamic import"),
            (".candidates <name>", "List search path candidates"),
            (".modules", "List registered modules"),
            (".schemes", "List registered URI schemes"),
            (".reset", "Forget all registered modules"),
        ]
    }
}

/// Helper struct for rustyline that provides completion and hints
#[derive(Default)]
struct ResolveHelper {
    /// REPL commands and common specifier prefixes
    words: Vec<String>,
}

impl ResolveHelper {
    fn new() -> Self {
        let words = vec![
            ".help",
            ".exit",
            ".clear",
            ".version",
            ".from",
            ".dynamic",
            ".candidates",
            ".modules",
            ".schemes",
            ".reset",
            "file:///",
            "resource:///",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        Self { words }
    }
}

impl Completer for ResolveHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let start = line[..pos].rfind(char::is_whitespace).map_or(0, |i| i + 1);

        let word = &line[start..pos];
        if word.is_empty() {
            return Ok((pos, vec![]));
        }

        let matches: Vec<Pair> = self
            .words
            .iter()
            .filter(|w| w.starts_with(word))
            .map(|w| Pair {
                display: w.clone(),
                replacement: w[word.len()..].to_string(),
            })
            .collect();

        Ok((pos, matches))
    }
}

impl Hinter for ResolveHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<Self::Hint> {
        if pos < line.len() {
            return None;
        }

        let start = line.rfind(char::is_whitespace).map_or(0, |i| i + 1);

        let word = &line[start..];
        if word.len() < 2 {
            return None;
        }

        self.words
            .iter()
            .find(|w| w.starts_with(word) && w.len() > word.len())
            .map(|w| w[word.len()..].to_string().dimmed().to_string())
    }
}

impl Highlighter for ResolveHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('.') {
            return Cow::Owned(highlight_command(line));
        }

        Cow::Owned(highlight_specifier(line))
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

fn highlight_command(line: &str) -> String {
    match line.split_once(char::is_whitespace) {
        Some((cmd, rest)) => format!("{} {}", cmd.magenta(), highlight_specifier(rest)),
        None => line.magenta().to_string(),
    }
}

/// Color a specifier by the way it will be classified
fn highlight_specifier(word: &str) -> String {
    match spacey_modules::classify(word.trim()) {
        spacey_modules::Specifier::Relative(_) => word.yellow().to_string(),
        spacey_modules::Specifier::Uri(_) => word.green().to_string(),
        spacey_modules::Specifier::Bare(_) => word.cyan().to_string(),
    }
}

impl Validator for ResolveHelper {}

impl Helper for ResolveHelper {}

/// Result of executing a REPL command
enum CommandResult {
    Continue,
    Exit,
}

/// The interactive resolver REPL
pub struct Repl {
    session: Session,
    editor: Editor<ResolveHelper, DefaultHistory>,
    history_path: PathBuf,
}

impl Repl {
    /// Create a new REPL instance around a session
    pub fn new(session: Session) -> rustyline::Result<Self> {
        let config = Config::builder()
            .history_ignore_dups(true)?
            .history_ignore_space(true)
            .max_history_size(MAX_HISTORY_SIZE)?
            .auto_add_history(true)
            .build();

        let mut editor = Editor::with_config(config)?;
        editor.set_helper(Some(ResolveHelper::new()));

        let history_path = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("spacey")
            .join(HISTORY_FILE);

        if let Some(parent) = history_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        let _ = editor.load_history(&history_path);

        Ok(Self {
            session,
            editor,
            history_path,
        })
    }

    /// Run the REPL main loop
    pub fn run(&mut self) -> rustyline::Result<()> {
        self.print_banner();

        loop {
            let prompt = self.format_prompt();

            match self.editor.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();

                    if trimmed.is_empty() {
                        continue;
                    }

                    if trimmed.starts_with('.') {
                        match ReplCommand::parse(trimmed) {
                            Some((cmd, arg)) => match self.execute_command(cmd, arg) {
                                CommandResult::Continue => continue,
                                CommandResult::Exit => break,
                            },
                            // Could still be a relative specifier such as ./foo
                            None if !spacey_modules::specifier::is_relative_path(trimmed) => {
                                eprintln!(
                                    "{}: unknown command '{}'",
                                    "Error".red().bold(),
                                    trimmed.cyan()
                                );
                                continue;
                            }
                            None => {}
                        }
                    }

                    self.resolve(trimmed);
                }
                Err(ReadlineError::Interrupted) => {
                    println!("{}", "^C".dimmed());
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("{}", "^D".dimmed());
                    break;
                }
                Err(err) => {
                    eprintln!("{}: {:?}", "Error".red().bold(), err);
                    break;
                }
            }
        }

        let _ = self.editor.save_history(&self.history_path);

        println!();
        Ok(())
    }

    fn print_banner(&self) {
        println!();
        println!(
            "  {} {} {}",
            "Spacey module resolver".white().bold(),
            "v".dimmed(),
            spacey_modules::VERSION.bright_yellow()
        );
        println!(
            "  {}",
            "Type a specifier to resolve it as a static import".dimmed()
        );
        println!();
        println!(
            "  {} {} {}",
            "Type".dimmed(),
            ".help".cyan(),
            "for available commands".dimmed()
        );
        println!();
    }

    fn format_prompt(&self) -> String {
        match self.session.referrer().uri() {
            Some(uri) => format!("{} {} ", uri.dimmed(), "resolve>".bright_green().bold()),
            None => format!("{} ", "resolve>".bright_green().bold()),
        }
    }

    fn execute_command(&mut self, cmd: ReplCommand, arg: Option<&str>) -> CommandResult {
        match cmd {
            ReplCommand::Help => self.print_help(),
            ReplCommand::Exit => return CommandResult::Exit,
            ReplCommand::Clear => print!("\x1B[2J\x1B[H"),
            ReplCommand::Version => {
                println!();
                println!(
                    "{}: {}",
                    "spacey-resolve".bright_cyan().bold(),
                    spacey_modules::VERSION.yellow()
                );
                println!();
            }
            ReplCommand::From => {
                self.session.set_referrer(arg);
                match arg {
                    Some(uri) => println!("{} {}", "importing from".dimmed(), uri.green()),
                    None => println!("{}", "importing module is unknown".dimmed()),
                }
            }
            ReplCommand::Dynamic => match arg {
                Some(specifier) => match self.session.import(specifier) {
                    Ok(resolution) => print_resolution(specifier, &resolution),
                    Err(e) => print_import_error(&e),
                },
                None => print_missing_argument(".dynamic", "a specifier"),
            },
            ReplCommand::Candidates => match arg {
                Some(specifier) => print_candidates(&self.session, specifier),
                None => print_missing_argument(".candidates", "a module name"),
            },
            ReplCommand::Modules => self.print_modules(),
            ReplCommand::Schemes => print_schemes(&self.session),
            ReplCommand::Reset => {
                self.session.reset();
                println!("{}", "registry cleared".dimmed());
            }
        }

        CommandResult::Continue
    }

    fn print_help(&self) {
        println!();
        println!("{}", "REPL Commands:".white().bold());
        println!();

        for (cmd, desc) in ReplCommand::all_commands() {
            println!("  {:20} {}", cmd.cyan(), desc.dimmed());
        }

        println!();
        println!("{}", "Keyboard Shortcuts:".white().bold());
        println!();
        println!(
            "  {:20} {}",
            "Ctrl+C".yellow(),
            "Cancel current input".dimmed()
        );
        println!("  {:20} {}", "Ctrl+D".yellow(), "Exit REPL".dimmed());
        println!("  {:20} {}", "Tab".yellow(), "Autocomplete".dimmed());
        println!();
    }

    fn print_modules(&self) {
        let registry = self.session.registry();

        let mut keys = registry.module_keys();
        keys.sort();
        let mut internal = registry.internal_names();
        internal.sort();

        if keys.is_empty() && internal.is_empty() {
            println!("{}", "no modules registered".dimmed());
            return;
        }

        for key in keys {
            println!("  {:10} {}", "module".green(), key);
        }
        for name in internal {
            println!("  {:10} {}", "internal".cyan(), name);
        }
    }

    fn resolve(&mut self, specifier: &str) {
        match self.session.resolve(specifier) {
            Ok(resolution) => print_resolution(specifier, &resolution),
            Err(e) => print_import_error(&e),
        }
    }
}

fn print_missing_argument(command: &str, what: &str) {
    eprintln!(
        "{}: {} {}",
        "Error".red().bold(),
        command.cyan(),
        format!("requires {what}").dimmed()
    );
}
