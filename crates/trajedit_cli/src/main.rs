//! Line-oriented trajectory editor shell.
//!
//! # Responsibility
//! - Drive an `EditorSession` over one working directory from stdin.
//! - Print activity messages the way the on-screen log would show them.

mod cli;

use clap::Parser;
use cli::{Cli, ShellCommand, ShellLine};
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use trajedit_core::{
    core_version, init_logging, ActivitySink, EditorSession, FsDocumentStorage, LoadOutcome,
    Position, SessionError, UndoOutcome,
};

/// Prints each activity message as one log line.
struct ConsoleActivity;

impl ActivitySink for ConsoleActivity {
    fn record(&mut self, message: String) {
        println!("> {message}");
    }
}

type Session = EditorSession<FsDocumentStorage, ConsoleActivity>;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = cli.config();
    if let Err(err) = config.validate() {
        eprintln!("invalid configuration: {err}");
        return ExitCode::FAILURE;
    }
    if let Some(log_dir) = &cli.log_dir {
        if let Err(err) = init_logging(&config.log_level, log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    let storage = FsDocumentStorage::with_extension(&cli.dir, config.extension.clone());
    let mut session = EditorSession::new(storage.clone(), config, ConsoleActivity);
    if let Err(err) = session.open_directory(storage) {
        eprintln!("cannot open `{}`: {err}", cli.dir.display());
        return ExitCode::FAILURE;
    }
    println!(
        "trajedit {} ({}); type `help`",
        core_version(),
        cli.dir.display()
    );

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("trajedit> ");
        if io::stdout().flush().is_err() {
            break;
        }
        let Some(Ok(line)) = lines.next() else {
            break;
        };
        let words = line.split_whitespace().collect::<Vec<_>>();
        if words.is_empty() {
            continue;
        }
        let command = match ShellLine::try_parse_from(words) {
            Ok(parsed) => parsed.command,
            Err(err) => {
                // Help output and usage errors both render through clap.
                let _ = err.print();
                continue;
            }
        };
        match run_command(&mut session, command) {
            Ok(true) => {}
            Ok(false) => break,
            Err(message) => println!("error: {message}"),
        }
    }
    ExitCode::SUCCESS
}

/// Executes one shell command. Returns `Ok(false)` to quit.
fn run_command(session: &mut Session, command: ShellCommand) -> Result<bool, String> {
    match command {
        ShellCommand::Quit => return Ok(false),
        ShellCommand::Ls => {
            for name in session.list_files().map_err(describe)? {
                let marker = if session.store().contains(&name) { "*" } else { " " };
                println!("{marker} {name}");
            }
        }
        ShellCommand::Cd { dir } => {
            let storage =
                FsDocumentStorage::with_extension(dir, session.storage().extension().to_string());
            session.open_directory(storage).map_err(describe)?;
        }
        ShellCommand::Open { file } => {
            if let LoadOutcome::AlreadyLoaded(_) = session.open_file(&file).map_err(describe)? {
                println!("{file} is already loaded");
            }
        }
        ShellCommand::Close { file } => {
            if !session.close_file(&file) {
                return Err(format!("{file} is not loaded"));
            }
        }
        ShellCommand::Points => {
            for point in session.render_points() {
                println!(
                    "{:>6} {:<7} {}",
                    point.id.to_string(),
                    point.color.as_str(),
                    point.position
                );
            }
        }
        ShellCommand::Move { point, x, y } => {
            session
                .move_point(point, Position::new(x, y))
                .map_err(describe)?;
        }
        ShellCommand::Delete { point } => {
            session.delete_point(point).map_err(describe)?;
        }
        ShellCommand::Undo => {
            if session.undo().map_err(describe)? == UndoOutcome::Empty {
                println!("nothing to undo");
            }
        }
        ShellCommand::Save => {
            let report = session.save_all();
            if !report.is_success() {
                return Err(format!("{} file(s) failed to save", report.failed.len()));
            }
        }
    }
    Ok(true)
}

fn describe(err: SessionError) -> String {
    err.to_string()
}
