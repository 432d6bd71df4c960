//! Integer types used by SNESMAP.
//!
//! SNES addresses are 24 bits wide: an 8-bit "bank byte" followed by a 16-bit
//! address within that bank. This module provides a type for handling them
//! cleanly, along with parsing for the usual ways of writing them down.

use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;

/// A 24-bit 65816 address.
#[allow(non_camel_case_types)]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct u24 {
  /// The "bank byte", that is, the top byte of the address determining which
  /// bank it corresponds to.
  pub bank: u8,
  /// A 16-bit address within a bank.
  pub addr: u16,
}

impl u24 {
  /// The largest representable address, `$ff:ffff`.
  pub const MAX: u24 = u24::from_u32(0xff_ffff);

  /// Creates a `u24` by truncating a `u32`.
  #[inline]
  pub const fn from_u32(i: u32) -> Self {
    Self {
      bank: (i >> 16) as u8,
      addr: i as u16,
    }
  }

  /// Zero-extends this `u24` into a `u32`.
  #[inline]
  pub const fn to_u32(self) -> u32 {
    ((self.bank as u32) << 16) | (self.addr as u32)
  }

  /// Converts this `u24`'s bytes into an array, in little-endian order.
  #[inline]
  pub fn to_le_bytes(self) -> [u8; 3] {
    [
      self.addr.to_le_bytes()[0],
      self.addr.to_le_bytes()[1],
      self.bank,
    ]
  }
}

impl From<u16> for u24 {
  /// Widens a bank-less address into bank `$00`.
  #[inline]
  fn from(addr: u16) -> Self {
    u24 { bank: 0, addr }
  }
}

macro_rules! impl_fmt_u24 {
  ($($trait:ident),*) => {
    $(impl fmt::$trait for u24 {
      fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::$trait::fmt(&self.to_u32(), f)
      }
    })*
  }
}
impl_fmt_u24!(Display, Binary, Octal, LowerHex, UpperHex);

lazy_static! {
  static ref BANKED: Regex =
    Regex::new(r"^(?:\$|0[xX])?([0-9a-fA-F]{1,2}):([0-9a-fA-F]{1,4})$")
      .unwrap();
  static ref FLAT: Regex =
    Regex::new(r"^(?:\$|0[xX])?([0-9a-fA-F_]{1,9})$").unwrap();
}

/// Parses a hexadecimal integer, as written in a ROM tool.
///
/// Accepts an optional `$` (65816-style) or `0x` (C-style) prefix, and
/// underscores between digits.
///
/// ```
/// # use snesmap::int::parse_hex;
/// assert_eq!(parse_hex("$7fd5"), Some(0x7fd5));
/// assert_eq!(parse_hex("0x40_ffd5"), Some(0x40ffd5));
/// assert_eq!(parse_hex("zz"), None);
/// ```
pub fn parse_hex(s: &str) -> Option<u32> {
  let caps = FLAT.captures(s.trim())?;
  let digits = caps[1].replace('_', "");
  if digits.is_empty() {
    return None;
  }
  u32::from_str_radix(&digits, 16).ok()
}

/// An error produced when a string is not a valid 24-bit address.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ParseError(String);

impl fmt::Display for ParseError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "invalid SNES address: {:?}", self.0)
  }
}

impl std::error::Error for ParseError {}

impl FromStr for u24 {
  type Err = ParseError;

  /// Parses an address in one of the forms `$bb:aaaa`, `$bbaaaa`, `0xbbaaaa`,
  /// or a bare hexadecimal number.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let s = s.trim();
    if let Some(caps) = BANKED.captures(s) {
      // Both groups are bounded hex digit runs, so these cannot overflow.
      let bank = u8::from_str_radix(&caps[1], 16);
      let addr = u16::from_str_radix(&caps[2], 16);
      return match (bank, addr) {
        (Ok(bank), Ok(addr)) => Ok(u24 { bank, addr }),
        _ => Err(ParseError(s.to_string())),
      };
    }

    match parse_hex(s) {
      Some(n) if n <= u24::MAX.to_u32() => Ok(u24::from_u32(n)),
      _ => Err(ParseError(s.to_string())),
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;

  macro_rules! assert_parse {
    ($text:literal => None) => {
      assert!($text.parse::<u24>().is_err(), "{:?} should not parse", $text);
    };
    ($text:literal => $expected:literal) => {
      assert_eq!($text.parse::<u24>(), Ok(u24::from_u32($expected)));
    };
  }

  #[test]
  fn parse_forms() {
    assert_parse!("$80:8000" => 0x80_8000);
    assert_parse!("80:8000" => 0x80_8000);
    assert_parse!("$0:ffea" => 0x00_ffea);
    assert_parse!("$808000" => 0x80_8000);
    assert_parse!("0x808000" => 0x80_8000);
    assert_parse!("c0_0000" => 0xc0_0000);
    assert_parse!("8000" => 0x00_8000);
    assert_parse!("1000000" => None);
    assert_parse!("$80:18000" => None);
    assert_parse!("" => None);
    assert_parse!("lorom" => None);
  }

  #[test]
  fn split_and_join() {
    let addr = u24::from_u32(0x12_3456);
    assert_eq!(addr.bank, 0x12);
    assert_eq!(addr.addr, 0x3456);
    assert_eq!(addr.to_u32(), 0x12_3456);
    assert_eq!(addr.to_le_bytes(), [0x56, 0x34, 0x12]);
    assert_eq!(format!("{:06x}", addr), "123456");
    assert_eq!(u24::from(0xffeau16).to_u32(), 0xffea);
    assert_eq!(u24::from_u32(0x0100_8000), u24::from_u32(0x8000));
  }
}
