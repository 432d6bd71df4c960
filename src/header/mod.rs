//! Cartridge header decoding.
//!
//! Every mapping mode stores the same header, anchored at its settings
//! offset `S` (see [`MappingMode::settings_offset()`]):
//! ```text
//!   S-0x25 .. S-0x15  extended header (only on some carts)
//!   S-0x15 .. S       title
//!   S      .. S+7     map mode, chipset, sizes, region, version
//!   S+7    .. S+11    checksum complement and checksum
//!   S+11   .. S+0x2b  native and emulation vector tables
//! ```
//! [`annotate()`] classifies these bytes so a disassembler doesn't mistake them
//! for code, and [`vector_labels()`] names the interrupt handlers the vectors
//! point at.
//!
//! [`MappingMode::settings_offset()`]: ../rom/enum.MappingMode.html#method.settings_offset
//! [`annotate()`]: fn.annotate.html
//! [`vector_labels()`]: vector/fn.vector_labels.html

use std::collections::BTreeMap;
use std::ops::Range;

use crate::rom::TITLE_LEN;

mod class;
mod label;
pub mod vector;

pub use class::ByteClass;
pub use label::Label;
pub use label::LabelSet;
pub use vector::vector_labels;
pub use vector::VectorSlot;

/// A run of bytes sharing a classification.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Annotation {
  /// The PC offsets covered.
  pub range: Range<u32>,
  /// What those bytes contain.
  pub class: ByteClass,
}

impl Annotation {
  /// Iterates over the individual values in this run, each `class.width()`
  /// bytes wide. The last one is cut short if the run isn't a multiple of the
  /// width.
  pub fn fields(&self) -> impl Iterator<Item = Range<u32>> + '_ {
    let width = self.class.width();
    let end = self.range.end;
    self
      .range
      .clone()
      .step_by(width as usize)
      .map(move |start| start..end.min(start + width))
  }

  /// Returns the number of bytes covered.
  pub fn len(&self) -> u32 {
    self.range.end.saturating_sub(self.range.start)
  }

  /// Returns whether this annotation covers nothing.
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

/// A builder for a list of [`Annotation`]s.
///
/// Marks may overlap; where they do, the later mark wins byte by byte.
///
/// [`Annotation`]: struct.Annotation.html
#[derive(Clone, Default, Debug)]
pub struct AnnotationBuilder {
  bytes: BTreeMap<u32, ByteClass>,
}

impl AnnotationBuilder {
  /// Creates an empty `AnnotationBuilder`.
  pub fn new() -> Self {
    Self::default()
  }

  /// Classifies every byte in `range` as `class`.
  pub fn mark(&mut self, range: Range<u32>, class: ByteClass) -> &mut Self {
    for offset in range {
      self.bytes.insert(offset, class);
    }
    self
  }

  /// Finishes the list, merging adjacent bytes of the same class.
  ///
  /// The result is sorted by offset, and no two annotations overlap.
  pub fn finish(&self) -> Vec<Annotation> {
    let mut annotations: Vec<Annotation> = Vec::new();
    for (&offset, &class) in &self.bytes {
      match annotations.last_mut() {
        Some(last) if last.range.end == offset && last.class == class => {
          last.range.end += 1;
        }
        _ => annotations.push(Annotation {
          range: offset..offset + 1,
          class,
        }),
      }
    }
    annotations
  }
}

/// Classifies the header anchored at `settings_offset`.
///
/// Which extended header layout applies depends on the bytes themselves: a
/// zero just before the anchor means the whole extended header is data, while
/// a map mode of `$33` means it starts with a maker code and game code.
///
/// Ranges are not clipped to `bytes`; near the start of the address space they
/// are clipped to zero instead.
///
/// ```
/// # use snesmap::header::{self, ByteClass};
/// let mut rom = vec![b' '; 0x8000];
/// rom[0x7fc0..0x7fc8].copy_from_slice(b"TESTGAME");
/// let annotations = header::annotate(&rom, 0x7fd5);
/// assert_eq!(annotations[0].range, 0x7fc0..0x7fd5);
/// assert_eq!(annotations[0].class, ByteClass::Text);
/// ```
pub fn annotate(bytes: &[u8], settings_offset: u32) -> Vec<Annotation> {
  let s = settings_offset;
  let back = |n: u32| s.saturating_sub(n);
  let at = |offset: Option<u32>| offset.and_then(|o| bytes.get(o as usize)).copied();

  let mut builder = AnnotationBuilder::new();
  builder
    .mark(back(TITLE_LEN)..s, ByteClass::Text)
    .mark(s..s + 7, ByteClass::Data8Bit)
    .mark(s + 7..s + 11, ByteClass::Data16Bit)
    .mark(s + 11..s + 0x2b, ByteClass::Pointer16Bit);

  if at(s.checked_sub(1)) == Some(0) {
    builder
      .mark(back(1)..s, ByteClass::Data8Bit)
      .mark(back(0x25)..back(TITLE_LEN), ByteClass::Data8Bit);
  } else if at(s.checked_add(5)) == Some(0x33) {
    builder
      .mark(back(0x25)..back(0x1f), ByteClass::Text)
      .mark(back(0x1f)..back(TITLE_LEN), ByteClass::Data8Bit);
  }

  builder.finish()
}
