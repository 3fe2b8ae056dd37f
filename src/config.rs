use std::path::PathBuf;

/// Which representations go into each logged row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum_macros::Display)]
pub enum OutputMode {
    /// `MM:SS` only
    #[default]
    Mmss,
    /// integer seconds only
    Seconds,
    /// `MM:SS` followed by integer seconds
    Both,
}

impl OutputMode {
    /// Resolve the mode from whatever followed the output path.
    ///
    /// Only a single trailing `-s` or `-b` changes the mode; anything else
    /// leaves the default in place.
    pub fn from_trailing_args<S: AsRef<str>>(args: &[S]) -> Self {
        match args {
            [flag] => match flag.as_ref() {
                "-s" => OutputMode::Seconds,
                "-b" => OutputMode::Both,
                _ => OutputMode::default(),
            },
            _ => OutputMode::default(),
        }
    }

    pub fn includes_mmss(&self) -> bool {
        matches!(self, OutputMode::Mmss | OutputMode::Both)
    }

    pub fn includes_seconds(&self) -> bool {
        matches!(self, OutputMode::Seconds | OutputMode::Both)
    }
}

/// Fully resolved run settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub output_path: PathBuf,
    pub mode: OutputMode,
}

impl Settings {
    pub fn new<P: Into<PathBuf>>(output_path: P, mode: OutputMode) -> Self {
        Self {
            output_path: output_path.into(),
            mode,
        }
    }
}
