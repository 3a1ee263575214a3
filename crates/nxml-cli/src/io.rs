//! Input and output endpoints
//!
//! `-` stands for stdin as an input and for stdout as an output.

use crate::error::{CliError, Result};
use std::fmt;
use std::fs::OpenOptions;
use std::io::{BufWriter, Read, Write};
use std::path::PathBuf;

/// Sentinel for the standard streams
pub const STDIO_SENTINEL: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    pub fn parse(value: &str) -> Self {
        if value == STDIO_SENTINEL {
            Self::Stdin
        } else {
            Self::File(PathBuf::from(value))
        }
    }

    /// Read the whole input
    pub fn read_to_string(&self) -> Result<String> {
        let mut content = String::new();
        match self {
            Self::Stdin => {
                std::io::stdin()
                    .read_to_string(&mut content)
                    .map_err(|e| CliError::input(self.to_string(), e))?;
            },
            Self::File(path) => {
                content = std::fs::read_to_string(path)
                    .map_err(|e| CliError::input(self.to_string(), e))?;
            },
        }
        Ok(content)
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => write!(f, "<stdin>"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    pub fn parse(value: &str) -> Self {
        if value == STDIO_SENTINEL {
            Self::Stdout
        } else {
            Self::File(PathBuf::from(value))
        }
    }

    /// Open for writing, truncating an existing file
    pub fn create(&self) -> Result<Box<dyn Write>> {
        self.open(false)
    }

    /// Open for appending, creating the file when absent
    pub fn append(&self) -> Result<Box<dyn Write>> {
        self.open(true)
    }

    pub fn is_stdout(&self) -> bool {
        matches!(self, Self::Stdout)
    }

    fn open(&self, append: bool) -> Result<Box<dyn Write>> {
        match self {
            Self::Stdout => Ok(Box::new(BufWriter::new(std::io::stdout().lock()))),
            Self::File(path) => {
                let file = OpenOptions::new()
                    .write(true)
                    .create(true)
                    .append(append)
                    .truncate(!append)
                    .open(path)
                    .map_err(|e| CliError::output(self.to_string(), e))?;
                Ok(Box::new(BufWriter::new(file)))
            },
        }
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => write!(f, "<stdout>"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}
