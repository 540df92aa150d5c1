//! JSON file helpers.

use std::fs::File;
use std::io;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{from_reader, to_writer_pretty};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("cannot access {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}
impl FileError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn json(path: &Path, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Reads a JSON-encoded type from a given file `path`.
pub fn read_json<D: DeserializeOwned>(path: impl AsRef<Path>) -> Result<D, FileError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|err| FileError::io(path, err))?;
    from_reader(BufReader::new(file)).map_err(|err| FileError::json(path, err))
}

/// JSON-encodes the `value` in pretty-printed form and writes it to a given `path`.
pub fn write_json(path: impl AsRef<Path>, value: &impl Serialize) -> Result<(), FileError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|err| FileError::io(path, err))?;
    to_writer_pretty(BufWriter::new(file), value).map_err(|err| FileError::json(path, err))
}

pub trait ReadJsonFile<D> {
    fn read_json_file(path: impl AsRef<Path>) -> Result<D, FileError>;
}

impl<D: DeserializeOwned> ReadJsonFile<D> for D {
    fn read_json_file(path: impl AsRef<Path>) -> Result<D, FileError> {
        read_json(path)
    }
}

pub trait WriteJsonFile<S: Serialize> {
    fn write_json_file(&self, path: impl AsRef<Path>) -> Result<(), FileError>;
}

impl<S: Serialize> WriteJsonFile<S> for S {
    fn write_json_file(&self, path: impl AsRef<Path>) -> Result<(), FileError> {
        write_json(path, self)
    }
}
