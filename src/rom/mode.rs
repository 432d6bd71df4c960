//! Mapping modes and ROM speeds, and the header anchors that go with them.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

/// Offset of the header settings byte for LoROM images (`$00:ffd5`).
pub const LOROM_SETTINGS_OFFSET: u32 = 0x00_7fd5;
/// Offset of the header settings byte for HiROM images (`$c0:ffd5`).
pub const HIROM_SETTINGS_OFFSET: u32 = 0x00_ffd5;
/// Offset of the header settings byte for ExHiROM images (`$40:ffd5`).
pub const EXHIROM_SETTINGS_OFFSET: u32 = 0x40_ffd5;
/// Offset of the header settings byte for ExLoROM images.
pub const EXLOROM_SETTINGS_OFFSET: u32 = 0x40_7fd5;

/// A scheme for laying a contiguous ROM image out across the SNES address
/// space.
///
/// The serialized names match the ones used by project files, e.g.
/// `"LoROM"` or `"ExSA1ROM"`.
#[derive(
  Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Deserialize, Serialize,
)]
pub enum MappingMode {
  /// 32 KiB banks in the upper half of banks `$00..$7d`, mirrored to `$80..`.
  #[serde(rename = "LoROM")]
  LoRom,
  /// 64 KiB banks at `$40..$7d`, mirrored to `$c0..`.
  #[serde(rename = "HiROM")]
  HiRom,
  /// LoROM extended past 4 MiB; the first 4 MiB live in the high banks.
  #[serde(rename = "ExLoROM")]
  ExLoRom,
  /// HiROM extended past 4 MiB; the first 4 MiB live at `$c0..`.
  #[serde(rename = "ExHiROM")]
  ExHiRom,
  /// The SA-1 coprocessor's default mapping.
  #[serde(rename = "SA1ROM")]
  Sa1Rom,
  /// SA-1 mapping for images larger than 4 MiB.
  #[serde(rename = "ExSA1ROM")]
  ExSa1Rom,
  /// The SPC7110 family's MMC.
  #[serde(rename = "SuperMMC")]
  SuperMmc,
  /// The GSU ("Super FX") mapping, with BW-RAM at `$60..$7d`.
  #[serde(rename = "SuperFX")]
  SuperFx,
  /// No mapping; nothing translates.
  #[serde(rename = "Unknown")]
  Unknown,
}

/// Every `MappingMode`, in declaration order.
pub const ALL_MODES: [MappingMode; 9] = [
  MappingMode::LoRom,
  MappingMode::HiRom,
  MappingMode::ExLoRom,
  MappingMode::ExHiRom,
  MappingMode::Sa1Rom,
  MappingMode::ExSa1Rom,
  MappingMode::SuperMmc,
  MappingMode::SuperFx,
  MappingMode::Unknown,
];

impl MappingMode {
  /// Returns the display name of this mode, which is also its serialized
  /// name.
  pub fn name(self) -> &'static str {
    match self {
      Self::LoRom => "LoROM",
      Self::HiRom => "HiROM",
      Self::ExLoRom => "ExLoROM",
      Self::ExHiRom => "ExHiROM",
      Self::Sa1Rom => "SA1ROM",
      Self::ExSa1Rom => "ExSA1ROM",
      Self::SuperMmc => "SuperMMC",
      Self::SuperFx => "SuperFX",
      Self::Unknown => "Unknown",
    }
  }

  /// Returns the PC offset of the header "settings" byte (the map mode byte)
  /// for this mode.
  ///
  /// Every header field is located relative to this anchor: the title
  /// precedes it, and the checksums and vectors follow it. Modes without an
  /// anchor of their own keep their header where LoROM does.
  pub fn settings_offset(self) -> u32 {
    match self {
      Self::HiRom => HIROM_SETTINGS_OFFSET,
      Self::ExHiRom => EXHIROM_SETTINGS_OFFSET,
      Self::ExLoRom => EXLOROM_SETTINGS_OFFSET,
      Self::LoRom
      | Self::Sa1Rom
      | Self::ExSa1Rom
      | Self::SuperMmc
      | Self::SuperFx
      | Self::Unknown => LOROM_SETTINGS_OFFSET,
    }
  }

  /// Returns the number of ROM bytes shown in one SNES bank.
  pub fn bank_size(self) -> u32 {
    match self {
      Self::LoRom => 0x8000,
      _ => 0x1_0000,
    }
  }
}

impl fmt::Display for MappingMode {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for MappingMode {
  type Err = String;

  /// Parses a mode by name, case-insensitively.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    ALL_MODES
      .iter()
      .copied()
      .find(|mode| mode.name().eq_ignore_ascii_case(s))
      .ok_or_else(|| format!("unknown mapping mode: {:?}", s))
  }
}

/// The access speed of a ROM, taken from bit 4 of the map mode byte.
///
/// FastROM images are accessed through the mirrors at `$80..`, so this
/// affects which bank an offset translates into.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Deserialize, Serialize)]
pub enum RomSpeed {
  /// 2.68 MHz access.
  #[serde(rename = "SlowROM")]
  SlowRom,
  /// 3.58 MHz access.
  #[serde(rename = "FastROM")]
  FastRom,
  /// The header could not be read.
  #[serde(rename = "Unknown")]
  Unknown,
}

impl RomSpeed {
  /// Reads the speed bit from the byte at `offset`, normally a mode's
  /// settings offset.
  pub fn from_header(bytes: &[u8], offset: u32) -> Self {
    match bytes.get(offset as usize) {
      Some(byte) if byte & 0x10 != 0 => Self::FastRom,
      Some(_) => Self::SlowRom,
      None => Self::Unknown,
    }
  }

  /// Returns the display name of this speed, which is also its serialized
  /// name.
  pub fn name(self) -> &'static str {
    match self {
      Self::SlowRom => "SlowROM",
      Self::FastRom => "FastROM",
      Self::Unknown => "Unknown",
    }
  }
}

impl fmt::Display for RomSpeed {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for RomSpeed {
  type Err = String;

  /// Parses a speed by name, case-insensitively.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    [Self::SlowRom, Self::FastRom, Self::Unknown]
      .iter()
      .copied()
      .find(|speed| speed.name().eq_ignore_ascii_case(s))
      .ok_or_else(|| format!("unknown ROM speed: {:?}", s))
  }
}
