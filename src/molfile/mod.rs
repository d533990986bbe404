//! Reader for MDL molfile V3000 connection tables.
//!
//! ```
//! use molcrab::molfile::{read_v3000, Dimensionality};
//!
//! let text = "\
//! methanol
//!   molcrab           2D
//!
//!   0  0  0     0  0            999 V3000
//! M  V30 BEGIN CTAB
//! M  V30 COUNTS 2 1 0 0 0
//! M  V30 BEGIN ATOM
//! M  V30 1 C 0 0 0 0
//! M  V30 2 O 1.3 0.75 0 0
//! M  V30 END ATOM
//! M  V30 BEGIN BOND
//! M  V30 1 1 1 2
//! M  V30 END BOND
//! M  V30 END CTAB
//! M  END
//! ";
//! let molfile = read_v3000(text).unwrap();
//! assert_eq!(molfile.dimensionality, Dimensionality::TwoD);
//! assert_eq!(molfile.mol.atom_count(), 2);
//! let carbon = molfile.mol.atom_by_id(1).unwrap();
//! assert_eq!(molfile.mol.atom(carbon).hydrogen_count, 3);
//! ```

mod atom_block;
mod bond_block;
mod collection;
mod command;
mod ctab;
mod error;
mod finalize;
mod options;
mod sgroup_block;
mod state;

use std::io::{self, BufRead};

use crate::atom::Atom;
use crate::bond::Bond;
use crate::mol::Mol;

pub use command::strip_prefix;
pub use error::{FieldError, MolfileError, Warning, WarningKind};
pub use options::{parse_id_list, parse_options, IdList, Options};

use command::{CommandReader, PREFIX};
use state::ReadState;

/// How recoverable anomalies are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Unknown element symbols and unreadable valences are errors.
    Strict,
    /// Unknown element symbols become pseudo-atoms, unreadable valences are
    /// skipped. Both produce a warning.
    #[default]
    Relaxed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Keep every coordinate as 3D regardless of content.
    pub force_3d: bool,
    /// Read `D` and `T` as hydrogen with mass number 2 and 3.
    pub interpret_hydrogen_isotopes: bool,
    /// Perceive stereo elements once the table is read.
    pub add_stereo_elements: bool,
    /// Use atom parities when there are no coordinates.
    pub add_stereo_0d: bool,
    pub mode: Mode,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            force_3d: false,
            interpret_hydrogen_isotopes: true,
            add_stereo_elements: true,
            add_stereo_0d: true,
            mode: Mode::Relaxed,
        }
    }
}

impl ReaderOptions {
    pub fn with_force_3d(mut self, force_3d: bool) -> Self {
        self.force_3d = force_3d;
        self
    }

    pub fn with_interpret_hydrogen_isotopes(mut self, interpret: bool) -> Self {
        self.interpret_hydrogen_isotopes = interpret;
        self
    }

    pub fn with_add_stereo_elements(mut self, add: bool) -> Self {
        self.add_stereo_elements = add;
        self
    }

    pub fn with_add_stereo_0d(mut self, add: bool) -> Self {
        self.add_stereo_0d = add;
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }
}

/// Coordinate dimensionality of a structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dimensionality {
    #[default]
    Unknown,
    /// No usable coordinates.
    ZeroD,
    TwoD,
    ThreeD,
}

/// A connection table and what was learned while reading it.
#[derive(Debug)]
pub struct Molfile {
    pub mol: Mol<Atom, Bond>,
    pub dimensionality: Dimensionality,
    /// Chiral flag from the `COUNTS` line.
    pub chiral: bool,
    pub warnings: Vec<Warning>,
}

/// Reads one connection table from a line source.
pub struct V3000Reader<I> {
    reader: CommandReader<I>,
    options: ReaderOptions,
}

impl<I> V3000Reader<I>
where
    I: Iterator<Item = io::Result<String>>,
{
    pub fn new(lines: I, options: ReaderOptions) -> Self {
        Self {
            reader: CommandReader::new(lines),
            options,
        }
    }

    /// Reads up to and including `END CTAB` and finalizes the result.
    ///
    /// Nothing after `END CTAB` is consumed, so the line source can be
    /// reused by the caller.
    pub fn read(&mut self) -> Result<Molfile, MolfileError> {
        let mut state = ReadState::new();
        ctab::read_header(&mut self.reader, &mut state)?;
        ctab::read_ctab(&mut self.reader, &mut state, &self.options)?;
        finalize::finalize(&mut state, &self.options, self.reader.line());
        tracing::debug!(
            atoms = state.mol.atom_count(),
            bonds = state.mol.bond_count(),
            warnings = state.warnings.len(),
            "read connection table"
        );
        Ok(state.into_molfile())
    }

    /// Physical lines consumed so far.
    pub fn line(&self) -> usize {
        self.reader.line()
    }
}

pub fn read_v3000(text: &str) -> Result<Molfile, MolfileError> {
    read_v3000_with(text, &ReaderOptions::default())
}

pub fn read_v3000_with(text: &str, options: &ReaderOptions) -> Result<Molfile, MolfileError> {
    V3000Reader::new(text.lines().map(|l| Ok(l.to_owned())), options.clone()).read()
}

/// Reads from any buffered reader. Read failures become [`MolfileError::Io`].
pub fn read_v3000_from<R: BufRead>(
    input: R,
    options: &ReaderOptions,
) -> Result<Molfile, MolfileError> {
    V3000Reader::new(input.lines(), options.clone()).read()
}

/// Whether `text` looks like a V3000 molfile.
pub fn is_v3000(text: &str) -> bool {
    let mut lines = text.lines();
    match lines.next() {
        Some(first) if first.starts_with(PREFIX) => true,
        Some(_) => lines.nth(2).map_or(false, |counts| counts.contains("V3000")),
        None => false,
    }
}
