use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong when reading a grammar or writing an automaton. The
/// automaton stages themselves are total and never produce an error.
#[derive(Error, Debug)]
pub enum Error {
    /// The input file does not exist.
    #[error("file '{}' not found", path.display())]
    InputNotFound {
        /// The path that was looked up.
        path: PathBuf,
    },
    /// Reading or writing a file failed for some other reason.
    #[error("could not access '{}': {source}", path.display())]
    Io {
        /// The file that was accessed.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },
    /// Writing CSV records failed.
    #[error("could not write CSV: {0}")]
    Csv(#[from] csv::Error),
    /// The grammar text contains no line with `::=`, so there is no start symbol.
    #[error("grammar contains no production rules")]
    EmptyGrammar,
}

impl Error {
    /// Wraps an I/O error that happened while reading `path`, singling out the case
    /// where the file does not exist.
    pub fn reading(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Error::InputNotFound { path },
            _ => Error::Io { path, source },
        }
    }

    /// Wraps an I/O error that happened while writing `path`.
    pub fn writing(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
