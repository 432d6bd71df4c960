//! Byte classifications.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// What a byte of ROM is believed to contain.
///
/// Multi-byte classes span `width()` consecutive PC offsets per value.
#[derive(
  Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Deserialize, Serialize,
)]
pub enum ByteClass {
  /// Nothing is known about this byte yet.
  Unreached,
  /// The first byte of an instruction.
  Opcode,
  /// An instruction operand byte.
  Operand,
  /// A single byte of data.
  Data8Bit,
  /// Graphics data.
  Graphics,
  /// Music or sound data.
  Music,
  /// Padding.
  Empty,
  /// A 16-bit data word.
  Data16Bit,
  /// A 16-bit pointer into the current bank.
  Pointer16Bit,
  /// A 24-bit data value.
  Data24Bit,
  /// A 24-bit long pointer.
  Pointer24Bit,
  /// A 32-bit data value.
  Data32Bit,
  /// A 32-bit pointer.
  Pointer32Bit,
  /// Text.
  Text,
}

/// `(class, label, width)`, in declaration order.
static TABLE: [(ByteClass, &str, u32); 14] = [
  (ByteClass::Unreached, "UNREACH", 1),
  (ByteClass::Opcode, "CODE", 1),
  (ByteClass::Operand, "LOOSE_OP", 1),
  (ByteClass::Data8Bit, "DATA8", 1),
  (ByteClass::Graphics, "GFX", 1),
  (ByteClass::Music, "MUSIC", 1),
  (ByteClass::Empty, "EMPTY", 1),
  (ByteClass::Data16Bit, "DATA16", 2),
  (ByteClass::Pointer16Bit, "PTR16", 2),
  (ByteClass::Data24Bit, "DATA24", 3),
  (ByteClass::Pointer24Bit, "PTR24", 3),
  (ByteClass::Data32Bit, "DATA32", 4),
  (ByteClass::Pointer32Bit, "PTR32", 4),
  (ByteClass::Text, "TEXT", 1),
];

impl ByteClass {
  /// Every `ByteClass`, in declaration order.
  pub fn all() -> impl Iterator<Item = ByteClass> {
    TABLE.iter().map(|&(class, _, _)| class)
  }

  /// Returns the short label used for this class in disassembly output, e.g.
  /// `"PTR16"`.
  pub fn label(self) -> &'static str {
    TABLE[self as usize].1
  }

  /// Returns the number of bytes one value of this class spans.
  pub fn width(self) -> u32 {
    TABLE[self as usize].2
  }

  /// Looks a class up by its label.
  pub fn from_label(label: &str) -> Option<Self> {
    TABLE
      .iter()
      .find(|&&(_, l, _)| l == label)
      .map(|&(class, _, _)| class)
  }

  /// Whether values of this class point somewhere else in the ROM.
  pub fn is_pointer(self) -> bool {
    match self {
      Self::Pointer16Bit | Self::Pointer24Bit | Self::Pointer32Bit => true,
      _ => false,
    }
  }
}

impl fmt::Display for ByteClass {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str(self.label())
  }
}
