//! Error printing facilities.
//!
//! These functions are used to simplify the display of various SNESMAP errors
//! to the user. The [`Error`] trait describes how a Rust error type can be
//! converted into a simple diagnostic.
//!
//! Note that only whole images and settings files can fail: malformed
//! addresses are never errors, and are reported as unmapped instead.
//!
//! [`Error`]: trait.Error.html

use std::fmt;
use std::io;
use std::path::Path;

/// An error which can be described as a diagnostic.
///
/// Types that implement `Error` must also implement [`std::fmt::Display`]. For
/// the user-displayed error to look right, this implementation should only be
/// one line long.
///
/// [`std::fmt::Display`]: https://doc.rust-lang.org/std/fmt/trait.Display.html
pub trait Error: fmt::Debug + fmt::Display {
  /// Returns a `Cause` describing the input that resulted in the error.
  fn cause(&self) -> Cause<'_>;
  /// Returns an action this error is associated with, if any at all.
  fn action(&self) -> Option<Action>;
}

/// A collection of errors that may built up over the course of an action.
///
/// The type parameter `E` should be a type implementing [`Error`].
///
/// [`Error`]: trait.Error.html
#[derive(Debug)]
pub struct Errors<E>(Vec<E>);

impl<E> Errors<E> {
  /// Creates an empty `Errors`.
  pub fn new() -> Self {
    Errors(Vec::new())
  }

  /// Returns true if this `Errors` hasn't had any errors added yet.
  pub fn is_ok(&self) -> bool {
    self.0.is_empty()
  }

  /// Returns the number of errors collected so far.
  pub fn len(&self) -> usize {
    self.0.len()
  }

  /// Adds a new error to this `Errors`.
  pub fn push(&mut self, error: E) {
    self.0.push(error);
  }

}

impl<E> Default for Errors<E> {
  fn default() -> Self {
    Self::new()
  }
}

impl<E> From<E> for Errors<E> {
  fn from(error: E) -> Self {
    Errors(vec![error])
  }
}

impl<E: Error> Errors<E> {
  /// Dumps this collection of errors as user-displayable text into `sink`.
  ///
  /// Returns `Ok(true)` if anything was written.
  pub fn dump_to(&self, mut sink: impl io::Write) -> io::Result<bool> {
    if self.0.is_empty() {
      return Ok(false);
    }

    for (i, error) in self.0.iter().enumerate() {
      writeln!(sink, "error: {}", error)?;
      let cause = error.cause();
      match error.action() {
        Some(action) => writeln!(sink, "  while {} {}", action.describe(), cause)?,
        None => writeln!(sink, "  at {}", cause)?,
      }

      if i != self.0.len() - 1 {
        writeln!(sink)?;
      }
    }

    Ok(true)
  }

  /// Calls `dump_to()` on `stderr`, exiting the process with the given
  /// `exit_code` if any errors are present.
  pub fn dump_and_die(self, code: i32) {
    // Writing to stderr is fairly unlikely to fail, so panicking is a fine
    // response here.
    if self.dump_to(io::stderr()).unwrap() {
      eprintln!();
      eprintln!("error: there were {} errors", self.len());
      std::process::exit(code)
    }
  }
}

/// The place where an error occured, to varrying degrees of specificity.
#[derive(Copy, Clone, Debug)]
pub enum Cause<'a> {
  /// A file, for when we don't know much about where the error came from
  /// within.
  File(&'a Path),
  /// A PC offset within a ROM image.
  Offset(u32),
  /// Input that did not come from anywhere in particular, such as an
  /// in-memory buffer.
  Unknown,
}

impl fmt::Display for Cause<'_> {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      Self::File(path) => write!(f, "{}", path.display()),
      Self::Offset(offset) => write!(f, "offset 0x{:06x}", offset),
      Self::Unknown => write!(f, "<input>"),
    }
  }
}

/// An action that SNESMAP performs, which an error may be associated with.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Action {
  /// Reading an image from disk and stripping its copier header.
  Loading,
  /// Checking an image against an expected title and checksum.
  Verifying,
  /// Reading a settings file.
  Configuring,
}

impl Action {
  fn describe(self) -> &'static str {
    match self {
      Self::Loading => "loading",
      Self::Verifying => "verifying",
      Self::Configuring => "configuring from",
    }
  }
}
