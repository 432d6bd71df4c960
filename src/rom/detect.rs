//! Mapping mode detection.
//!
//! No single header byte says which mapping mode an image uses. Instead, each
//! mode stores a marker in the map mode byte of *its own* header, so we probe
//! the LoROM, HiROM, and ExHiROM header locations in a fixed order and take
//! the first one that looks right.

use log::debug;
use log::warn;

use crate::rom::mode::EXHIROM_SETTINGS_OFFSET;
use crate::rom::mode::HIROM_SETTINGS_OFFSET;
use crate::rom::mode::LOROM_SETTINGS_OFFSET;
use crate::rom::MappingMode;

/// The result of probing an image for its mapping mode.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Detection {
  /// The detected (or guessed) mode.
  pub mode: MappingMode,
  /// Whether a header marker actually matched. If this is `false`, `mode` is
  /// a guess based on the image size alone, and the user should be asked.
  pub confident: bool,
}

/// Detects the mapping mode of a (header-stripped) ROM image.
///
/// If no marker matches, the guess is ExLoROM for images over 256 KiB and
/// LoROM otherwise.
///
/// ```
/// # use snesmap::rom::{detect, MappingMode};
/// let mut rom = vec![0; 0x30_0000];
/// rom[0x7fd5] = 0x23;
/// let detection = detect::detect(&rom);
/// assert_eq!(detection.mode, MappingMode::Sa1Rom);
/// assert!(detection.confident);
/// ```
pub fn detect(bytes: &[u8]) -> Detection {
  if let Some(mode) = probe(bytes) {
    debug!("detected {} mapping", mode);
    return Detection {
      mode,
      confident: true,
    };
  }

  let mode = if bytes.len() > 0x4_0000 {
    MappingMode::ExLoRom
  } else {
    MappingMode::LoRom
  };
  warn!(
    "no mapping mode marker found in a 0x{:x} byte image; guessing {}",
    bytes.len(),
    mode
  );
  Detection {
    mode,
    confident: false,
  }
}

/// Checks each mode's marker, in priority order.
fn probe(bytes: &[u8]) -> Option<MappingMode> {
  let size = bytes.len();
  let at = |offset: u32| bytes.get(offset as usize).copied().unwrap_or(0);

  // An image too short for even the LoROM header reads as all zeroes, which
  // matches nothing.
  let map = at(LOROM_SETTINGS_OFFSET);
  if map & 0xef == 0x23 {
    return Some(if size > 0x40_0000 {
      MappingMode::ExSa1Rom
    } else {
      MappingMode::Sa1Rom
    });
  }
  if map & 0xec == 0x20 {
    let chipset = at(LOROM_SETTINGS_OFFSET + 1);
    return Some(if chipset & 0xf0 == 0x10 {
      MappingMode::SuperFx
    } else {
      MappingMode::LoRom
    });
  }

  if size >= 0x1_0000 {
    let map = at(HIROM_SETTINGS_OFFSET);
    if map & 0xef == 0x21 {
      return Some(MappingMode::HiRom);
    }
    if map & 0xe7 == 0x22 {
      return Some(MappingMode::SuperMmc);
    }
  }

  if size >= 0x41_0000 && at(EXHIROM_SETTINGS_OFFSET) & 0xef == 0x25 {
    return Some(MappingMode::ExHiRom);
  }

  None
}
