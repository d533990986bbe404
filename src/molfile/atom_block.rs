//! `BEGIN ATOM` ... `END ATOM`.
//!
//! Each record reads `id type x y z aamap [KEY=value ...]`.

use std::io;

use petgraph::graph::NodeIndex;

use crate::atom::{Atom, AtomKind, GenericAtom, Radical};
use crate::element::Element;
use crate::molfile::command::{is_block_end, CommandReader};
use crate::molfile::error::{FieldError, MolfileError, WarningKind};
use crate::molfile::options::{parse_options, Fields};
use crate::molfile::state::ReadState;
use crate::molfile::{Mode, ReaderOptions};

/// `VAL=15` declares a valence of zero.
const ZERO_VALENCE: u8 = 15;

pub fn read_atom_block<I>(
    reader: &mut CommandReader<I>,
    state: &mut ReadState,
    options: &ReaderOptions,
) -> Result<(), MolfileError>
where
    I: Iterator<Item = io::Result<String>>,
{
    tracing::info!(line = reader.line(), "reading ATOM block");
    state.rgroup_counter = 1;
    loop {
        let command = reader.expect_command()?;
        if is_block_end(&command, "ATOM") {
            return Ok(());
        }
        read_atom(&command, reader.line(), state, options)?;
    }
}

/// Adds the atom described by one record and registers it under its id.
pub fn read_atom(
    command: &str,
    line: usize,
    state: &mut ReadState,
    options: &ReaderOptions,
) -> Result<NodeIndex, MolfileError> {
    let mut fields = Fields::new(command, line);
    let id: u32 = fields.next_parsed("id")?;
    let symbol = fields.next_token("type")?;
    let x: f64 = fields.next_parsed("x")?;
    let y: f64 = fields.next_parsed("y")?;
    let z: f64 = fields.next_parsed("z")?;
    let aamap = fields.next_token("aamap")?;
    let (opts, trailing) = parse_options(fields.rest());

    let (kind, isotope) = resolve_kind(symbol, line, state, options)?;
    let mut atom = Atom {
        id,
        kind,
        isotope,
        position_3d: Some([x, y, z]),
        ..Atom::default()
    };

    if aamap != "0" {
        state.warn(line, WarningKind::AtomMapping(aamap.to_owned()));
    }

    for (key, value) in opts.iter() {
        match key {
            "CFG" => atom.stereo_parity = parse_field(line, key, value)?,
            "CHG" => atom.formal_charge = parse_field(line, key, value)?,
            "MASS" => atom.isotope = parse_field(line, key, value)?,
            "RAD" => {
                let code: i32 = parse_field(line, key, value)?;
                atom.radical = Radical::from_code(code).ok_or_else(|| {
                    MolfileError::field(line, key, value, FieldError::InvalidRadical(code))
                })?;
            }
            "VAL" => read_valence(&mut atom, value, line, state, options)?,
            _ => state.warn(
                line,
                WarningKind::UnknownKey {
                    key: key.to_owned(),
                    value: value.to_owned(),
                },
            ),
        }
    }
    if let Some(text) = trailing {
        state.warn(line, WarningKind::TrailingText(text));
    }

    let parity = atom.stereo_parity;
    let unpaired = atom.radical.single_electrons();
    tracing::debug!(line, id, symbol, "atom");
    let node = state.mol.add_atom(atom);
    for _ in 0..unpaired {
        state.mol.add_single_electron(node);
    }
    if parity != 0 {
        state.parity_hints.push((node, parity));
    }
    state.register_atom(id, node);
    Ok(node)
}

/// Kind and mass number for the type field of an atom record.
pub fn resolve_kind(
    symbol: &str,
    line: usize,
    state: &mut ReadState,
    options: &ReaderOptions,
) -> Result<(AtomKind, u16), MolfileError> {
    if let Some(element) = Element::from_symbol(symbol) {
        return Ok((AtomKind::Element(element), 0));
    }
    if options.interpret_hydrogen_isotopes {
        match symbol {
            "D" => return Ok((AtomKind::Element(Element::H), 2)),
            "T" => return Ok((AtomKind::Element(Element::H), 3)),
            _ => {}
        }
    }
    if let Some(generic) = GenericAtom::from_symbol(symbol) {
        return Ok((AtomKind::Generic(generic), 0));
    }
    if let Some(suffix) = symbol.strip_prefix('R') {
        let explicit = if suffix.is_empty() || suffix == "#" {
            Some(None)
        } else if suffix.bytes().all(|b| b.is_ascii_digit()) {
            suffix.parse::<u32>().ok().map(Some)
        } else {
            None
        };
        if let Some(explicit) = explicit {
            let number = match explicit {
                Some(n) => {
                    state.rgroup_counter = n;
                    n
                }
                None => {
                    let n = state.rgroup_counter;
                    state.rgroup_counter = n.checked_add(1).ok_or_else(|| {
                        MolfileError::format(line, format!("R-group number {} overflows", n))
                    })?;
                    n
                }
            };
            return Ok((AtomKind::RGroup(number), 0));
        }
    }
    match options.mode {
        Mode::Strict => Err(MolfileError::format(
            line,
            format!("invalid element type {}", symbol),
        )),
        Mode::Relaxed => {
            state.warn(line, WarningKind::UnknownElement(symbol.to_owned()));
            Ok((AtomKind::Unknown(symbol.to_owned()), 0))
        }
    }
}

fn read_valence(
    atom: &mut Atom,
    value: &str,
    line: usize,
    state: &mut ReadState,
    options: &ReaderOptions,
) -> Result<(), MolfileError> {
    if atom.is_pseudo() {
        state.warn(line, WarningKind::IgnoredValence(value.to_owned()));
        return Ok(());
    }
    match value.parse::<u8>() {
        Ok(0) => {}
        Ok(ZERO_VALENCE) => atom.valence = Some(0),
        Ok(v) => atom.valence = Some(v),
        Err(e) => match options.mode {
            Mode::Strict => return Err(MolfileError::field(line, "VAL", value, e)),
            Mode::Relaxed => state.warn(line, WarningKind::IgnoredValence(value.to_owned())),
        },
    }
    Ok(())
}

fn parse_field<T>(line: usize, key: &str, value: &str) -> Result<T, MolfileError>
where
    T: std::str::FromStr,
    T::Err: Into<FieldError>,
{
    value
        .parse()
        .map_err(|e: T::Err| MolfileError::field(line, key, value, e))
}
