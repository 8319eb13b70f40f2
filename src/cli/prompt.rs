//! Credential resolution.
//!
//! Precedence, highest first: command-line flags, the `[client]` section of
//! the defaults file, interactive prompts. Host and user are prompted in
//! clear text; the password is read with echo disabled and no confirmation.

use std::io::{BufRead, Write};

use crate::util::mysql::{ClientDefaults, MysqlConfig, DEFAULT_PORT};
use crate::LocksError;

/// Connection flags as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConnectArgs {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
}

/// Source of interactive answers.
pub trait Prompter {
    /// Ask for a visible value.
    fn line(&mut self, prompt: &str) -> Result<String, LocksError>;
    /// Ask for a hidden value.
    fn secret(&mut self, prompt: &str) -> Result<String, LocksError>;
}

/// Prompts on the controlling terminal.
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn line(&mut self, prompt: &str) -> Result<String, LocksError> {
        let mut stderr = std::io::stderr();
        write!(stderr, "{}: ", prompt)
            .and_then(|_| stderr.flush())
            .map_err(|e| LocksError::Io(e.to_string()))?;
        let mut answer = String::new();
        let read = std::io::stdin()
            .lock()
            .read_line(&mut answer)
            .map_err(|e| LocksError::Argument(format!("Cannot read {}: {}", prompt, e)))?;
        if read == 0 {
            return Err(LocksError::Argument(format!("No value given for {}", prompt)));
        }
        Ok(answer.trim_end_matches(['\r', '\n']).to_string())
    }

    fn secret(&mut self, prompt: &str) -> Result<String, LocksError> {
        rpassword::prompt_password(format!("{}: ", prompt))
            .map_err(|e| LocksError::Argument(format!("Cannot read {}: {}", prompt, e)))
    }
}

/// Merge flags and defaults, prompting for whatever is still missing.
pub fn resolve_config(
    args: &ConnectArgs,
    defaults: ClientDefaults,
    prompter: &mut dyn Prompter,
) -> Result<MysqlConfig, LocksError> {
    let host = match args.host.clone().or(defaults.host) {
        Some(h) => h,
        None => prompter.line("Enter database host")?,
    };
    let user = match args.user.clone().or(defaults.user) {
        Some(u) => u,
        None => prompter.line("Enter database username")?,
    };
    let password = match args.password.clone().or(defaults.password) {
        Some(p) => p,
        None => prompter.secret("Password")?,
    };

    if host.trim().is_empty() {
        return Err(LocksError::Argument("Database host must not be empty".to_string()));
    }

    Ok(MysqlConfig {
        host,
        port: args.port.or(defaults.port).unwrap_or(DEFAULT_PORT),
        user,
        password: Some(password),
        socket: defaults.socket,
    })
}
