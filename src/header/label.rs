//! Labels attached to ROM offsets.

use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

/// A named location in a ROM image.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Deserialize, Serialize)]
pub struct Label {
  /// The PC offset being labeled.
  pub address: u32,
  /// The label's name.
  pub name: String,
  /// A free-form comment; empty for generated labels.
  #[serde(default)]
  pub comment: String,
}

impl Label {
  /// Creates a new `Label` with an empty comment.
  pub fn new(address: u32, name: impl Into<String>) -> Self {
    Self {
      address,
      name: name.into(),
      comment: String::new(),
    }
  }
}

/// A set of labels, keyed by PC offset.
///
/// At most one label exists per offset, and the first label inserted at an
/// offset is the one that stays.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct LabelSet {
  labels: BTreeMap<u32, Label>,
}

impl LabelSet {
  /// Creates an empty `LabelSet`.
  pub fn new() -> Self {
    Self::default()
  }

  /// Inserts `label`, unless its address already has one.
  ///
  /// On conflict, the rejected label is handed back.
  pub fn insert(&mut self, label: Label) -> Result<(), Label> {
    match self.labels.entry(label.address) {
      btree_map::Entry::Vacant(v) => {
        v.insert(label);
        Ok(())
      }
      btree_map::Entry::Occupied(_) => Err(label),
    }
  }

  /// Returns the label at `address`, if there is one.
  pub fn get(&self, address: u32) -> Option<&Label> {
    self.labels.get(&address)
  }

  /// Iterates over every label, in address order.
  pub fn iter(&self) -> impl Iterator<Item = &Label> + '_ {
    self.labels.values()
  }

  /// Returns the number of labels.
  pub fn len(&self) -> usize {
    self.labels.len()
  }

  /// Returns whether there are no labels at all.
  pub fn is_empty(&self) -> bool {
    self.labels.is_empty()
  }
}

impl IntoIterator for LabelSet {
  type Item = Label;
  type IntoIter = btree_map::IntoValues<u32, Label>;

  fn into_iter(self) -> Self::IntoIter {
    self.labels.into_values()
  }
}
