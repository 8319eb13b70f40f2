use clap::{ArgAction, Parser, ValueEnum};

/// Inspect InnoDB lock contention and buffer pool health on a live MySQL server.
///
/// Without `--dump`, prints current lock waits, InnoDB data size against the
/// buffer pool, and a few global health ratios. With `--dump`, prints
/// `SHOW ENGINE INNODB STATUS` followed by the raw process, transaction,
/// lock, thread, table handle and global status tables.
#[derive(Parser)]
#[command(name = "mysql-locks")]
#[command(about = "InnoDB lock contention and buffer pool health inspector")]
#[command(version)]
#[command(disable_help_flag = true)]
pub struct Cli {
    /// Database host (prompted if omitted)
    #[arg(short = 'h', long)]
    pub host: Option<String>,

    /// Database port [default: 3306]
    #[arg(short = 'P', long)]
    pub port: Option<u16>,

    /// Database user (prompted if omitted)
    #[arg(short = 'u', long)]
    pub user: Option<String>,

    /// Database password (prompted with hidden input if omitted)
    #[arg(short = 'p', long)]
    pub password: Option<String>,

    /// Dump InnoDB engine status and all lock/transaction tables
    #[arg(short = 'd', long)]
    pub dump: bool,

    /// Path to MySQL defaults file (.my.cnf) for [client] credentials
    #[arg(long = "defaults-file")]
    pub defaults_file: Option<String>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Increase log verbosity on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Control colored output
    #[arg(long, default_value = "auto")]
    pub color: ColorMode,

    /// Write output to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,

    /// Print help
    #[arg(short = '?', long = "help", action = ArgAction::Help)]
    pub help: Option<bool>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}
