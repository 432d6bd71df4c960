//! SNESMAP, an address-space translation and header decoding engine for SNES
//! cartridge images.
//!
//! The crate converts between flat file offsets ("PC offsets") and 24-bit
//! SNES addresses under every common mapping mode, detects which mode an
//! image uses, and derives typed annotations and vector labels from the
//! cartridge header.

#![deny(missing_docs)]
#![deny(unused)]
#![deny(warnings)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod header;
pub mod int;
pub mod rom;
