//! `BEGIN SGROUP` ... `END SGROUP`.
//!
//! Records read `index type external-index [KEY=value ...]`. Only superatom
//! abbreviations (`SUP`) are built.

use std::io;

use crate::molfile::bond_block::lookup_atom;
use crate::molfile::command::{is_block_end, CommandReader};
use crate::molfile::error::{MolfileError, WarningKind};
use crate::molfile::options::{parse_options, Fields};
use crate::molfile::state::ReadState;
use crate::sgroup::{Sgroup, SgroupKind};

pub fn read_sgroup_block<I>(
    reader: &mut CommandReader<I>,
    state: &mut ReadState,
) -> Result<(), MolfileError>
where
    I: Iterator<Item = io::Result<String>>,
{
    tracing::info!(line = reader.line(), "reading SGROUP block");
    loop {
        let command = reader.expect_command()?;
        if is_block_end(&command, "SGROUP") {
            return Ok(());
        }
        read_sgroup(&command, reader.line(), state)?;
    }
}

pub fn read_sgroup(
    command: &str,
    line: usize,
    state: &mut ReadState,
) -> Result<(), MolfileError> {
    let mut fields = Fields::new(command, line);
    let index = fields.next_token("index")?;
    let kind = fields.next_token("type")?;
    let external = fields.next_token("external index")?;
    tracing::debug!(line, index, kind, external, "sgroup");

    if !kind.starts_with("SUP") {
        state.warn(line, WarningKind::UnsupportedSgroup(kind.to_owned()));
        return Ok(());
    }

    let (opts, trailing) = parse_options(fields.rest());
    let mut sgroup = Sgroup::new(SgroupKind::Abbreviation);
    let mut label = None;
    for (key, value) in opts.iter() {
        match key {
            "ATOMS" => {
                for id in state.id_list(line, key, value)? {
                    sgroup.add_atom(lookup_atom(id, line, state)?);
                }
            }
            "XBONDS" => {
                for id in state.id_list(line, key, value)? {
                    let bond = state.bond(id).ok_or_else(|| {
                        MolfileError::format(line, format!("no bond with id {}", id))
                    })?;
                    sgroup.add_bond(bond);
                }
            }
            "LABEL" => label = Some(value.to_owned()),
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

    if !sgroup.atoms.is_empty() {
        sgroup.subscript = label.filter(|l| !l.is_empty());
    }
    state.mol.add_sgroup(sgroup);
    Ok(())
}
