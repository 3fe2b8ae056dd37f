use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::tty::IsTty;
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
};
use tapmark::{
    config::{OutputMode, Settings},
    record::RecordWriter,
    runtime::{SystemClock, TerminalKeySource},
    session::Session,
};

/// press space to stamp the running clock into a csv file
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    disable_help_flag = true,
    disable_version_flag = true,
    long_about = "Watch a running clock, optionally starting from an offset, and log the elapsed time to a csv file every time SPACE is pressed. Handy for marking chapter points while watching a video."
)]
pub struct Cli {
    /// csv file to write to, created or truncated at startup
    #[clap(allow_hyphen_values = true)]
    output: Option<PathBuf>,

    /// -s to save as seconds, -b to save as 'MM:SS,seconds'
    #[clap(
        value_name = "MODE",
        allow_hyphen_values = true,
        trailing_var_arg = true,
        num_args = 0..
    )]
    mode: Vec<String>,
}

impl Cli {
    /// `None` when no output path was given. A leading flag such as `-s` or
    /// `--help` is not a path and also means usage.
    fn to_settings(&self) -> Option<Settings> {
        let path = self
            .output
            .clone()
            .filter(|p| !p.to_string_lossy().starts_with('-'))?;
        Some(Settings::new(path, OutputMode::from_trailing_args(&self.mode)))
    }
}

fn print_usage() {
    println!("Please enter a file to write to as a command line arg.");
    println!("-s to save as seconds, -b to save as 'MM:SS,seconds' (csv)");
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("off")).init();

    let cli = Cli::parse();

    let Some(settings) = cli.to_settings() else {
        print_usage();
        return Ok(());
    };

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let writer = RecordWriter::create(&settings.output_path).inspect_err(|e| {
        log::error!("cannot open {}: {e}", settings.output_path.display());
    })?;

    let mut session = Session::new(writer, settings.mode, SystemClock);
    let mut input = stdin().lock();
    let mut out = io::stdout();
    let mut keys = TerminalKeySource;

    let summary = session.run(&mut input, &mut out, &mut keys)?;
    log::info!(
        "logged {} rows to {} starting at {}s",
        summary.rows,
        settings.output_path.display(),
        summary.offset
    );

    Ok(())
}
