//! Settings files.
//!
//! A settings file is a JSON5 document that overrides what SNESMAP would
//! otherwise work out from the image itself:
//! ```text
//! {
//!   mode: "HiROM",
//!   speed: "FastROM",
//!   vectors: [
//!     { name: "Native_COP" },
//!     { name: "Native_BRK", used: false },
//!   ],
//! }
//! ```
//! Every field is optional.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::error;
use crate::header::vector;
use crate::header::VectorSlot;
use crate::rom::MappingMode;
use crate::rom::RomSpeed;

/// The most vectors a settings file may name.
pub const MAX_VECTORS: usize = (vector::TABLE_COUNT * vector::ENTRY_COUNT) as usize;

/// User overrides for an image.
#[derive(Clone, Default, PartialEq, Eq, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
  /// The mapping mode to use instead of the detected one.
  pub mode: Option<MappingMode>,
  /// The ROM speed to use instead of the header's.
  pub speed: Option<RomSpeed>,
  /// The vector table, in slot order. Empty means the default table.
  pub vectors: Vec<VectorSlot>,
}

/// An error produced while reading a settings file.
#[derive(Debug)]
pub enum Error {
  /// The file could not be read.
  Io {
    /// The file that was being read.
    path: PathBuf,
    /// The underlying error.
    error: io::Error,
  },
  /// The file is not valid JSON5, or has the wrong shape.
  Parse {
    /// The file that was being read, if any.
    path: Option<PathBuf>,
    /// The underlying error.
    error: json5::Error,
  },
  /// The file names more vectors than there are slots.
  TooManyVectors {
    /// The file that was being read, if any.
    path: Option<PathBuf>,
    /// The number of vectors named.
    count: usize,
  },
}

impl Error {
  fn path(&self) -> Option<&Path> {
    match self {
      Self::Io { path, .. } => Some(path.as_path()),
      Self::Parse { path, .. } | Self::TooManyVectors { path, .. } => {
        path.as_deref()
      }
    }
  }

  fn with_path(mut self, new_path: &Path) -> Self {
    match &mut self {
      Self::Io { .. } => {}
      Self::Parse { path, .. } | Self::TooManyVectors { path, .. } => {
        *path = Some(new_path.to_path_buf())
      }
    }
    self
  }
}

impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      Self::Io { error, .. } => write!(f, "{}", error),
      Self::Parse { error, .. } => write!(f, "malformed settings: {}", error),
      Self::TooManyVectors { count, .. } => write!(
        f,
        "{} vectors given, but there are only {} slots",
        count, MAX_VECTORS
      ),
    }
  }
}

impl std::error::Error for Error {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::Io { error, .. } => Some(error),
      Self::Parse { error, .. } => Some(error),
      Self::TooManyVectors { .. } => None,
    }
  }
}

impl error::Error for Error {
  fn cause(&self) -> error::Cause<'_> {
    match self.path() {
      Some(path) => error::Cause::File(path),
      None => error::Cause::Unknown,
    }
  }

  fn action(&self) -> Option<error::Action> {
    Some(error::Action::Configuring)
  }
}

impl Settings {
  /// Parses settings from JSON5 text.
  pub fn from_str(text: &str) -> Result<Self, Error> {
    let settings: Settings = json5::from_str(text)
      .map_err(|error| Error::Parse { path: None, error })?;
    if settings.vectors.len() > MAX_VECTORS {
      return Err(Error::TooManyVectors {
        path: None,
        count: settings.vectors.len(),
      });
    }
    Ok(settings)
  }

  /// Reads and parses the settings file at `path`.
  pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|error| Error::Io {
      path: path.to_path_buf(),
      error,
    })?;
    Self::from_str(&text).map_err(|e| e.with_path(path))
  }

  /// Returns the vector table to label with: the configured one, or the
  /// default one if none was given.
  pub fn vector_table(&self) -> Vec<VectorSlot> {
    if self.vectors.is_empty() {
      VectorSlot::defaults()
    } else {
      self.vectors.clone()
    }
  }
}
