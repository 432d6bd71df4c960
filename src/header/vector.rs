//! Interrupt vector labeling.
//!
//! The header is followed by two tables of six 16-bit vectors each: one for
//! native mode and one for emulation mode. Every vector points into bank
//! `$00`, so resolving it through the image's mapping gives the PC offset of a
//! handler that deserves a name.

use log::debug;
use serde::Deserialize;
use serde::Serialize;

use crate::header::Label;
use crate::header::LabelSet;
use crate::int::u24;
use crate::rom;
use crate::rom::map;
use crate::rom::MappingMode;

/// The number of vector tables.
pub const TABLE_COUNT: u32 = 2;
/// The number of vectors per table.
pub const ENTRY_COUNT: u32 = 6;

/// Every vector position, as `(table, entry, default name)`.
pub const VECTOR_SLOTS: [(u32, u32, &str); 12] = [
  (0, 0, "Native_COP"),
  (0, 1, "Native_BRK"),
  (0, 2, "Native_ABORT"),
  (0, 3, "Native_NMI"),
  (0, 4, "Native_RESET"),
  (0, 5, "Native_IRQ"),
  (1, 0, "Emulation_COP"),
  (1, 1, "Emulation_BRK"),
  (1, 2, "Emulation_ABORT"),
  (1, 3, "Emulation_NMI"),
  (1, 4, "Emulation_RESET"),
  (1, 5, "Emulation_IRQ"),
];

/// A configurable vector: the label it produces, and whether to produce one at
/// all.
///
/// A list of these is matched up with [`VECTOR_SLOTS`] by position.
///
/// [`VECTOR_SLOTS`]: constant.VECTOR_SLOTS.html
#[derive(Clone, PartialEq, Eq, Hash, Debug, Deserialize, Serialize)]
pub struct VectorSlot {
  /// The name of the generated label.
  pub name: String,
  /// Whether to label this vector.
  #[serde(default = "used_by_default")]
  pub used: bool,
}

fn used_by_default() -> bool {
  true
}

impl VectorSlot {
  /// Creates a new, used `VectorSlot`.
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      used: true,
    }
  }

  /// Returns the default vector table, with every vector used.
  pub fn defaults() -> Vec<VectorSlot> {
    VECTOR_SLOTS
      .iter()
      .map(|&(_, _, name)| Self::new(name))
      .collect()
  }
}

/// Returns the PC offset of the pointer for `(table, entry)`, relative to a
/// header anchored at `settings_offset`.
pub fn pointer_offset(settings_offset: u32, table: u32, entry: u32) -> u32 {
  settings_offset + 15 + 16 * table + 2 * entry
}

/// Generates labels for the interrupt handlers of `bytes`.
///
/// `slots` is matched with the vector positions in order; slots past the
/// twelfth are ignored, and unused slots keep their position but produce
/// nothing. A vector produces a label only if it maps to an offset inside the
/// image that isn't already labeled; the first vector to reach an offset
/// names it.
pub fn vector_labels(
  bytes: &[u8],
  settings_offset: u32,
  mode: MappingMode,
  slots: &[VectorSlot],
) -> LabelSet {
  let size = bytes.len() as u32;
  let mut labels = LabelSet::new();

  for (slot, &(table, entry, _)) in slots.iter().zip(VECTOR_SLOTS.iter()) {
    if !slot.used {
      continue;
    }

    let at = pointer_offset(settings_offset, table, entry);
    let pointer = match rom::read_word(bytes, at) {
      Some(pointer) => pointer,
      None => continue,
    };

    let pc = match map::snes_to_pc(u24::from(pointer), mode, size) {
      Some(pc) if pc < size => pc,
      _ => continue,
    };

    if let Err(dup) = labels.insert(Label::new(pc, slot.name.as_str())) {
      debug!(
        "vector {} at 0x{:06x} is already labeled; skipping",
        dup.name, pc
      );
    }
  }

  labels
}

#[cfg(test)]
mod test {
  use super::*;

  /// A one-bank LoROM image with the given vectors written at their pointer
  /// offsets.
  fn lorom_image(vectors: &[(u32, u32, u16)]) -> Vec<u8> {
    let mut bytes = vec![0; 0x8000];
    for &(table, entry, pointer) in vectors {
      let at = pointer_offset(0x7fd5, table, entry) as usize;
      bytes[at..at + 2].copy_from_slice(&pointer.to_le_bytes());
    }
    bytes
  }

  fn names(labels: &LabelSet) -> Vec<(u32, &str)> {
    labels.iter().map(|l| (l.address, l.name.as_str())).collect()
  }

  #[test]
  fn pointer_offsets() {
    assert_eq!(pointer_offset(0x7fd5, 0, 0), 0x7fe4);
    assert_eq!(pointer_offset(0x7fd5, 0, 3), 0x7fea);
    assert_eq!(pointer_offset(0x7fd5, 1, 4), 0x7ffc);
    assert_eq!(pointer_offset(0xffd5, 1, 5), 0xfffe);
  }

  #[test]
  fn reset_vector() {
    let bytes = lorom_image(&[(1, 4, 0x8000)]);
    let mut slots = VectorSlot::defaults();
    slots[10].name = "RESET".to_string();

    let labels = vector_labels(&bytes, 0x7fd5, MappingMode::LoRom, &slots);
    assert_eq!(labels.get(0), Some(&Label::new(0, "RESET")));
  }

  #[test]
  fn duplicates_are_skipped() {
    let bytes = lorom_image(&[(0, 0, 0x8000), (1, 4, 0x8000), (1, 3, 0x8123)]);
    let mut slots = VectorSlot::defaults();
    slots[0].name = "RESET".to_string();

    let labels = vector_labels(&bytes, 0x7fd5, MappingMode::LoRom, &slots);
    assert_eq!(names(&labels), [(0, "RESET"), (0x123, "Emulation_NMI")]);
  }

  #[test]
  fn unmapped_vectors_are_skipped() {
    // Every vector is zero, which is WRAM under LoROM.
    let bytes = lorom_image(&[]);
    let labels =
      vector_labels(&bytes, 0x7fd5, MappingMode::LoRom, &VectorSlot::defaults());
    assert!(labels.is_empty());

    // A 32 KiB image has no room for a HiROM header.
    let labels =
      vector_labels(&bytes, 0xffd5, MappingMode::HiRom, &VectorSlot::defaults());
    assert!(labels.is_empty());
  }

  #[test]
  fn unused_slots_keep_their_position() {
    let bytes = lorom_image(&[(0, 1, 0x8010), (0, 2, 0x8020)]);
    let mut slots = VectorSlot::defaults();
    slots[1].used = false;

    let labels = vector_labels(&bytes, 0x7fd5, MappingMode::LoRom, &slots);
    assert_eq!(names(&labels), [(0x20, "Native_ABORT")]);
  }

  #[test]
  fn short_tables() {
    let bytes = lorom_image(&[(0, 0, 0x8010), (0, 1, 0x8020)]);
    let slots = [VectorSlot::new("COP")];

    let labels = vector_labels(&bytes, 0x7fd5, MappingMode::LoRom, &slots);
    assert_eq!(names(&labels), [(0x10, "COP")]);
  }
}
