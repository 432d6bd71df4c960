//! Types and functions for reading SNES ROM images.
//!
//! A [`Rom`] is an immutable, header-stripped cartridge image. Everything that
//! interprets it, address translation, mode detection, and header decoding,
//! is a pure function over its bytes, so a `Rom` can be shared freely between
//! threads.
//!
//! [`Rom`]: struct.Rom.html

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use log::info;

use crate::error;
use crate::int::u24;

pub mod detect;
pub mod map;
mod mode;

pub use detect::Detection;
pub use mode::*;

/// The size of the header some copier devices prepend to an image.
pub const COPIER_HEADER_LEN: usize = 0x200;
/// The smallest image that can be opened: a single LoROM bank.
pub const MIN_ROM_LEN: usize = 0x8000;
/// The length of the internal title, which ends at the settings offset.
pub const TITLE_LEN: u32 = 0x15;

/// An error produced while loading an image.
#[derive(Debug)]
pub enum LoadError {
  /// The image could not be read from disk.
  Io {
    /// The file that was being read.
    path: PathBuf,
    /// The underlying error.
    error: io::Error,
  },
  /// The image length is neither a multiple of 1 KiB nor 512 bytes past one.
  UnusualSize {
    /// The file that was being read, if any.
    path: Option<PathBuf>,
    /// The length of the image, including any copier header.
    len: usize,
  },
  /// The image is smaller than a single LoROM bank.
  TooSmall {
    /// The file that was being read, if any.
    path: Option<PathBuf>,
    /// The length of the image, without any copier header.
    len: usize,
  },
}

impl fmt::Display for LoadError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      Self::Io { error, .. } => write!(f, "could not read ROM: {}", error),
      Self::UnusualSize { len, .. } => write!(
        f,
        "this ROM has an unusual size (0x{:x} bytes); it can't be opened",
        len
      ),
      Self::TooSmall { len, .. } => write!(
        f,
        "this ROM is too small (0x{:x} bytes); it can't be opened",
        len
      ),
    }
  }
}

impl std::error::Error for LoadError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::Io { error, .. } => Some(error),
      _ => None,
    }
  }
}

impl error::Error for LoadError {
  fn cause(&self) -> error::Cause<'_> {
    let path = match self {
      Self::Io { path, .. } => Some(path),
      Self::UnusualSize { path, .. } | Self::TooSmall { path, .. } => {
        path.as_ref()
      }
    };
    match path {
      Some(path) => error::Cause::File(path),
      None => error::Cause::Unknown,
    }
  }

  fn action(&self) -> Option<error::Action> {
    Some(error::Action::Loading)
  }
}

/// An error produced when a ROM is not the one a project expects.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum VerifyError {
  /// The image does not reach past the checksum.
  TooSmall {
    /// The settings offset the header was expected at.
    offset: u32,
  },
  /// The internal title differs.
  TitleMismatch {
    /// Where the title starts.
    offset: u32,
    /// The title found in the image.
    found: String,
    /// The title that was expected.
    expected: String,
  },
  /// The checksum and its complement differ.
  ChecksumMismatch {
    /// Where the checksum word starts.
    offset: u32,
    /// The checksum word found in the image.
    found: u32,
    /// The checksum word that was expected.
    expected: u32,
  },
}

impl VerifyError {
  /// Returns the PC offset of the header field that failed to match.
  pub fn offset(&self) -> u32 {
    match self {
      Self::TooSmall { offset }
      | Self::TitleMismatch { offset, .. }
      | Self::ChecksumMismatch { offset, .. } => *offset,
    }
  }
}

impl fmt::Display for VerifyError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      Self::TooSmall { .. } => {
        write!(f, "this ROM is too small to hold a header")
      }
      Self::TitleMismatch {
        found, expected, ..
      } => write!(
        f,
        "this ROM's internal name {:?} doesn't match the expected {:?}",
        found, expected
      ),
      Self::ChecksumMismatch {
        found, expected, ..
      } => write!(
        f,
        "this ROM's checksums {:08X} don't match the expected {:08X}",
        found, expected
      ),
    }
  }
}

impl std::error::Error for VerifyError {}

impl error::Error for VerifyError {
  fn cause(&self) -> error::Cause<'_> {
    error::Cause::Offset(self.offset())
  }

  fn action(&self) -> Option<error::Action> {
    Some(error::Action::Verifying)
  }
}

/// A header-stripped SNES ROM image.
#[derive(Clone, PartialEq, Eq)]
pub struct Rom {
  bytes: Box<[u8]>,
}

impl Rom {
  /// Reads an image from disk; see [`from_bytes`].
  ///
  /// [`from_bytes`]: #method.from_bytes
  pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|error| LoadError::Io {
      path: path.to_path_buf(),
      error,
    })?;
    Self::strip(bytes).map_err(|e| match e {
      LoadError::UnusualSize { len, .. } => LoadError::UnusualSize {
        path: Some(path.to_path_buf()),
        len,
      },
      LoadError::TooSmall { len, .. } => LoadError::TooSmall {
        path: Some(path.to_path_buf()),
        len,
      },
      e => e,
    })
  }

  /// Creates a `Rom` from the raw contents of an image file.
  ///
  /// Images that are 512 bytes past a multiple of 1 KiB are assumed to carry
  /// a copier header, which is discarded. Any other length that is not a
  /// multiple of 1 KiB is rejected, as is anything smaller than 32 KiB once
  /// the header is gone.
  pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, LoadError> {
    Self::strip(bytes)
  }

  fn strip(mut bytes: Vec<u8>) -> Result<Self, LoadError> {
    let len = bytes.len();
    match len & 0x3ff {
      0 => {}
      0x200 => {
        info!("skipping 0x{:x} byte copier header", COPIER_HEADER_LEN);
        bytes = bytes.split_off(COPIER_HEADER_LEN);
      }
      _ => return Err(LoadError::UnusualSize { path: None, len }),
    }

    if bytes.len() < MIN_ROM_LEN {
      return Err(LoadError::TooSmall {
        path: None,
        len: bytes.len(),
      });
    }

    Ok(Self {
      bytes: bytes.into_boxed_slice(),
    })
  }

  /// Returns the length of this image, in bytes.
  pub fn len(&self) -> u32 {
    self.bytes.len() as u32
  }

  /// Returns the raw bytes of this image.
  pub fn bytes(&self) -> &[u8] {
    &self.bytes
  }

  /// Returns the byte at `offset`, if it is in range.
  pub fn byte(&self, offset: u32) -> Option<u8> {
    self.bytes.get(offset as usize).copied()
  }

  /// Returns the little-endian word at `offset`, if it is in range.
  pub fn word(&self, offset: u32) -> Option<u16> {
    read_word(&self.bytes, offset)
  }

  /// Detects this image's mapping mode.
  pub fn detect(&self) -> Detection {
    detect::detect(&self.bytes)
  }

  /// Reads this image's speed from the header for `mode`.
  pub fn speed(&self, mode: MappingMode) -> RomSpeed {
    RomSpeed::from_header(&self.bytes, mode.settings_offset())
  }

  /// Reads this image's internal title from the header for `mode`.
  pub fn title(&self, mode: MappingMode) -> Option<String> {
    title(&self.bytes, mode.settings_offset())
  }

  /// Reads this image's checksum word from the header for `mode`.
  pub fn checksum(&self, mode: MappingMode) -> Option<u32> {
    checksum(&self.bytes, mode.settings_offset())
  }

  /// Converts a PC offset in this image into a SNES address.
  pub fn to_snes(&self, offset: u32, mode: MappingMode, speed: RomSpeed) -> u24 {
    map::pc_to_snes(offset, mode, speed)
  }

  /// Converts a SNES address into a PC offset in this image.
  pub fn to_pc(&self, addr: u24, mode: MappingMode) -> Option<u32> {
    map::snes_to_pc(addr, mode, self.len())
  }

  /// Reads the byte shown at `addr` under `mode`, if it shows ROM.
  pub fn at(&self, addr: u24, mode: MappingMode) -> Option<u8> {
    self.to_pc(addr, mode).and_then(|pc| self.byte(pc))
  }

  /// Checks that this image is the one a project was created from, by
  /// comparing its internal title and checksum word.
  ///
  /// Both fields are checked, so a wrong title and a wrong checksum are
  /// reported together.
  pub fn verify(
    &self,
    mode: MappingMode,
    expected_title: &str,
    expected_checksum: u32,
  ) -> Result<(), error::Errors<VerifyError>> {
    let settings = mode.settings_offset();
    let too_small = || VerifyError::TooSmall { offset: settings };
    if self.len() <= settings + 10 {
      return Err(too_small().into());
    }

    let mut errors = error::Errors::new();
    let found = title(&self.bytes, settings).ok_or_else(too_small)?;
    if found != expected_title {
      errors.push(VerifyError::TitleMismatch {
        offset: settings - TITLE_LEN,
        found,
        expected: expected_title.to_string(),
      });
    }

    let found = checksum(&self.bytes, settings).ok_or_else(too_small)?;
    if found != expected_checksum {
      errors.push(VerifyError::ChecksumMismatch {
        offset: settings + 7,
        found,
        expected: expected_checksum,
      });
    }

    if errors.is_ok() {
      Ok(())
    } else {
      Err(errors)
    }
  }

  /// Consumes this `Rom`, returning the raw ROM bytes.
  pub fn into_bytes(self) -> Box<[u8]> {
    self.bytes
  }
}

impl fmt::Debug for Rom {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.debug_struct("Rom").field("len", &self.bytes.len()).finish()
  }
}

/// Reads a little-endian word at `offset`.
pub fn read_word(bytes: &[u8], offset: u32) -> Option<u16> {
  let offset = offset as usize;
  match bytes.get(offset..offset.checked_add(2)?) {
    Some(&[lo, hi]) => Some(u16::from_le_bytes([lo, hi])),
    _ => None,
  }
}

/// Reads the internal title that ends at `settings_offset`.
///
/// Each byte is taken as one character; the title is not NUL-terminated, and
/// trailing padding is kept.
pub fn title(bytes: &[u8], settings_offset: u32) -> Option<String> {
  let start = settings_offset.checked_sub(TITLE_LEN)? as usize;
  let raw = bytes.get(start..settings_offset as usize)?;
  Some(raw.iter().map(|&b| b as char).collect())
}

/// Reads the checksum word that follows `settings_offset`: the checksum
/// complement in the low half, and the checksum in the high half.
pub fn checksum(bytes: &[u8], settings_offset: u32) -> Option<u32> {
  let start = settings_offset as usize + 7;
  match bytes.get(start..start + 4)? {
    &[a, b, c, d] => Some(u32::from_le_bytes([a, b, c, d])),
    _ => None,
  }
}
