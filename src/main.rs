//! SNESMAP, a SNES address translation and header inspection tool.

#![deny(missing_docs)]
#![deny(unused)]
#![deny(warnings)]
#![deny(unsafe_code)]

use std::path::PathBuf;

use log::LevelFilter;
use structopt::StructOpt;

use snesmap::config::Settings;
use snesmap::error::Error;
use snesmap::error::Errors;
use snesmap::header;
use snesmap::int;
use snesmap::int::u24;
use snesmap::rom::MappingMode;
use snesmap::rom::Rom;
use snesmap::rom::RomSpeed;

/// Translates addresses in, and decodes the headers of, SNES ROM images.
#[derive(StructOpt)]
#[structopt(name = "snesmap")]
struct Opts {
  /// Logs what is being done, in detail.
  #[structopt(short, long)]
  verbose: bool,
  /// A JSON5 settings file overriding the mode, speed, or vector names.
  #[structopt(long, parse(from_os_str))]
  config: Option<PathBuf>,
  #[structopt(subcommand)]
  command: Command,
}

#[derive(StructOpt)]
enum Command {
  /// Prints the mapping mode, speed, and title of an image.
  Detect {
    /// The image to read.
    #[structopt(parse(from_os_str))]
    rom: PathBuf,
  },
  /// Converts a PC offset into a SNES address.
  ToSnes {
    /// The image to read.
    #[structopt(parse(from_os_str))]
    rom: PathBuf,
    /// The offset, in hex.
    #[structopt(parse(try_from_str = parse_offset))]
    offset: u32,
  },
  /// Converts a SNES address into a PC offset.
  ToPc {
    /// The image to read.
    #[structopt(parse(from_os_str))]
    rom: PathBuf,
    /// The address, as `$bb:aaaa`, `$bbaaaa`, or `0xbbaaaa`.
    address: u24,
  },
  /// Prints the header layout and the labels its vectors produce.
  Header {
    /// The image to read.
    #[structopt(parse(from_os_str))]
    rom: PathBuf,
  },
  /// Checks an image's internal title and checksum word.
  Verify {
    /// The image to read.
    #[structopt(parse(from_os_str))]
    rom: PathBuf,
    /// The expected title, including padding.
    title: String,
    /// The expected checksum word, in hex.
    #[structopt(parse(try_from_str = parse_offset))]
    checksum: u32,
  },
}

fn parse_offset(s: &str) -> Result<u32, String> {
  int::parse_hex(s).ok_or_else(|| format!("invalid hex number: {:?}", s))
}

/// Unwraps `result`, or prints its error and exits.
fn or_die<T, E: Error>(result: Result<T, E>) -> T {
  or_die_all(result.map_err(Errors::<E>::from))
}

/// Unwraps `result`, or prints all of its errors and exits.
fn or_die_all<T, E: Error>(result: Result<T, Errors<E>>) -> T {
  match result {
    Ok(x) => x,
    Err(errors) => {
      errors.dump_and_die(1);
      std::process::exit(1)
    }
  }
}

/// An image along with the settings it is interpreted with.
struct Session {
  rom: Rom,
  settings: Settings,
  mode: MappingMode,
  /// Where `mode` came from.
  provenance: &'static str,
}

impl Session {
  fn open(rom: PathBuf, settings: Settings) -> Self {
    let rom = or_die(Rom::from_file(&rom));
    let (mode, provenance) = match settings.mode {
      Some(mode) => (mode, "configured"),
      None => {
        let detection = rom.detect();
        let provenance = if detection.confident {
          "detected"
        } else {
          "guessed"
        };
        (detection.mode, provenance)
      }
    };
    Self {
      rom,
      settings,
      mode,
      provenance,
    }
  }

  fn speed(&self) -> RomSpeed {
    match self.settings.speed {
      Some(speed) => speed,
      None => self.rom.speed(self.mode),
    }
  }
}

fn main() {
  let opts = Opts::from_args();

  let mut logger = env_logger::Builder::from_env(
    env_logger::Env::default().default_filter_or("info"),
  );
  if opts.verbose {
    logger.filter_level(LevelFilter::Debug);
  }
  logger.init();

  let settings = match &opts.config {
    Some(path) => or_die(Settings::from_file(path)),
    None => Settings::default(),
  };

  match opts.command {
    Command::Detect { rom } => {
      let session = Session::open(rom, settings);
      println!("mode:  {} ({})", session.mode, session.provenance);
      println!("speed: {}", session.speed());
      match session.rom.title(session.mode) {
        Some(title) => println!("title: {:?}", title),
        None => println!("title: <none>"),
      }
    }
    Command::ToSnes { rom, offset } => {
      let session = Session::open(rom, settings);
      let addr = session.rom.to_snes(offset, session.mode, session.speed());
      println!("${:02x}:{:04x}", addr.bank, addr.addr);
    }
    Command::ToPc { rom, address } => {
      let session = Session::open(rom, settings);
      match session.rom.to_pc(address, session.mode) {
        Some(pc) => println!("0x{:06x}", pc),
        None => println!("unmapped"),
      }
    }
    Command::Header { rom } => {
      let session = Session::open(rom, settings);
      let bytes = session.rom.bytes();
      let anchor = session.mode.settings_offset();

      for annotation in header::annotate(bytes, anchor) {
        println!(
          "{:06x}..{:06x} {}",
          annotation.range.start, annotation.range.end, annotation.class
        );
      }

      let table = session.settings.vector_table();
      for label in header::vector_labels(bytes, anchor, session.mode, &table) {
        let addr = session.rom.to_snes(label.address, session.mode, session.speed());
        println!(
          "{:06x} ${:02x}:{:04x} {}",
          label.address, addr.bank, addr.addr, label.name
        );
      }
    }
    Command::Verify {
      rom,
      title,
      checksum,
    } => {
      let session = Session::open(rom, settings);
      or_die_all(session.rom.verify(session.mode, &title, checksum));
      println!("ok");
    }
  }
}
