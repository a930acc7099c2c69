use std::io;
use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("Could not write config file {path:?}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("Invalid config format: {0}")]
    Format(#[from] serde_json::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum AlertError {
    #[error("Failed to start sound player `{program}`: {source}")]
    Spawn { program: String, source: io::Error },

    #[error("No sound player available")]
    NoPlayer,

    #[error("Terminal error: {0}")]
    IO(#[from] io::Error),
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command `{0}` (type `help`)")]
    Unknown(String),

    #[error("Invalid amount `{0}`")]
    InvalidAmount(String),
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    IO(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
