#[cfg(not(feature = "cli"))]
compile_error!("The `mysql-locks` binary requires the `cli` feature. Build with `--features cli`.");

use clap::Parser;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::process;

use tokio_util::sync::CancellationToken;

use mlh::cli::app::{Cli, ColorMode};
use mlh::cli::inspect::{InspectOptions, Mode};
use mlh::cli::prompt::{resolve_config, ConnectArgs, TerminalPrompter};
use mlh::util::logging;
use mlh::util::mysql::{find_defaults_file, parse_defaults_file, ClientDefaults};
use mlh::LocksError;

/// Exit status after Ctrl+C, following the shell convention of 128 + SIGINT.
const EXIT_INTERRUPTED: i32 = 130;

fn main() {
    let cli = Cli::parse();

    match cli.color {
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Never => colored::control::set_override(false),
        ColorMode::Auto => {} // colored auto-detects tty
    }

    logging::init_stderr_logging(cli.verbose);

    if let Err(e) = run(cli) {
        match e {
            LocksError::Interrupted => {
                eprintln!("{}", e);
                process::exit(EXIT_INTERRUPTED);
            }
            e => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
    }
}

fn run(cli: Cli) -> Result<(), LocksError> {
    let defaults = load_defaults(cli.defaults_file.as_deref())?;
    let config = resolve_config(
        &ConnectArgs {
            host: cli.host,
            port: cli.port,
            user: cli.user,
            password: cli.password,
        },
        defaults,
        &mut TerminalPrompter,
    )?;

    // Installed after prompting so Ctrl+C at a prompt still kills the process.
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    ctrlc::set_handler(move || token.cancel())
        .map_err(|e| LocksError::Io(format!("Cannot set Ctrl+C handler: {}", e)))?;

    let mut writer: Box<dyn Write> = match &cli.output {
        Some(path) => File::create(path)
            .map(|f| Box::new(f) as Box<dyn Write>)
            .map_err(|e| LocksError::Io(format!("Cannot create {}: {}", path, e)))?,
        None => Box::new(std::io::stdout()),
    };

    let opts = InspectOptions {
        config,
        mode: if cli.dump { Mode::Dump } else { Mode::Report },
        json: cli.json,
        cancel,
    };
    mlh::cli::inspect::execute(&opts, &mut writer)?;
    writer.flush().map_err(|e| LocksError::Io(e.to_string()))
}

/// An explicit `--defaults-file` must be readable; the implicit
/// `~/.my.cnf` / `/etc/my.cnf` lookup is best-effort.
fn load_defaults(explicit: Option<&str>) -> Result<ClientDefaults, LocksError> {
    match explicit {
        Some(path) => parse_defaults_file(Path::new(path))
            .ok_or_else(|| LocksError::Argument(format!("Cannot read defaults file {}", path))),
        None => Ok(find_defaults_file()
            .and_then(|p| parse_defaults_file(&p))
            .unwrap_or_default()),
    }
}
