//! Header lines and the top-level `CTAB` state machine.

use std::io;

use crate::molfile::atom_block::read_atom_block;
use crate::molfile::bond_block::read_bond_block;
use crate::molfile::collection::read_collection_block;
use crate::molfile::command::{CommandReader, PREFIX};
use crate::molfile::error::{MolfileError, WarningKind};
use crate::molfile::sgroup_block::read_sgroup_block;
use crate::molfile::state::ReadState;
use crate::molfile::{Dimensionality, ReaderOptions};

/// Column of the dimension code on the program/info line.
const DIMENSION_COLUMN: usize = 20;

/// Reads the four header lines, if present.
///
/// A first line that already carries the V3000 prefix means the header was
/// left out; the line is handed back to `reader`.
pub fn read_header<I>(
    reader: &mut CommandReader<I>,
    state: &mut ReadState,
) -> Result<(), MolfileError>
where
    I: Iterator<Item = io::Result<String>>,
{
    let Some(title) = reader.next_line()? else {
        return Err(MolfileError::format(
            reader.line(),
            "expected a header line, but found nothing",
        ));
    };
    if title.starts_with(PREFIX) {
        reader.unread(title);
        return Ok(());
    }
    if !title.is_empty() {
        state.mol.set_title(title);
    }

    let info = header_line(reader)?;
    state.dimensionality = dimension_hint(&info);
    let comment = header_line(reader)?;
    if !comment.is_empty() {
        state.mol.set_comment(comment);
    }
    let counts = header_line(reader)?;
    if !counts.contains("3000") {
        return Err(MolfileError::format(reader.line(), "not a V3000 molfile"));
    }
    tracing::debug!(hint = ?state.dimensionality, "read header");
    Ok(())
}

fn header_line<I>(reader: &mut CommandReader<I>) -> Result<String, MolfileError>
where
    I: Iterator<Item = io::Result<String>>,
{
    reader
        .next_line()?
        .ok_or_else(|| MolfileError::format(reader.line(), "unexpected end of file in header"))
}

/// Dimension code `2D`/`3D` at column 20 of the info line.
pub fn dimension_hint(info: &str) -> Dimensionality {
    match info.get(DIMENSION_COLUMN..DIMENSION_COLUMN + 2) {
        Some("2D") => Dimensionality::TwoD,
        Some("3D") => Dimensionality::ThreeD,
        _ => Dimensionality::Unknown,
    }
}

/// Dispatches top-level commands until `END CTAB`.
pub fn read_ctab<I>(
    reader: &mut CommandReader<I>,
    state: &mut ReadState,
    options: &ReaderOptions,
) -> Result<(), MolfileError>
where
    I: Iterator<Item = io::Result<String>>,
{
    loop {
        let command = reader.expect_command()?;
        let line = reader.line();
        tracing::debug!(line, command = %command, "command");
        let mut words = command.split_whitespace();
        match (words.next(), words.next()) {
            (Some("END"), Some("CTAB")) => return Ok(()),
            (Some("BEGIN"), Some("CTAB")) => {}
            (Some("COUNTS"), _) => {
                state.chiral = command.split_whitespace().nth(5) == Some("1");
            }
            (Some("BEGIN"), Some("ATOM")) => read_atom_block(reader, state, options)?,
            (Some("BEGIN"), Some("BOND")) => read_bond_block(reader, state)?,
            (Some("BEGIN"), Some("SGROUP")) => read_sgroup_block(reader, state)?,
            (Some("BEGIN"), Some("COLLECTION")) => read_collection_block(reader, state)?,
            _ => state.warn(line, WarningKind::UnknownCommand(command.clone())),
        }
    }
}
