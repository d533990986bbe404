//! `BEGIN BOND` ... `END BOND`.
//!
//! Each record reads `id order atom1 atom2 [KEY=value ...]`.

use std::io;

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::bond::{Bond, BondOrder, BondStereo};
use crate::molfile::command::{is_block_end, CommandReader};
use crate::molfile::error::{FieldError, MolfileError, WarningKind};
use crate::molfile::options::{parse_options, Fields};
use crate::molfile::state::ReadState;
use crate::sgroup::{Sgroup, SgroupKind};

pub fn read_bond_block<I>(
    reader: &mut CommandReader<I>,
    state: &mut ReadState,
) -> Result<(), MolfileError>
where
    I: Iterator<Item = io::Result<String>>,
{
    tracing::info!(line = reader.line(), "reading BOND block");
    loop {
        let command = reader.expect_command()?;
        if is_block_end(&command, "BOND") {
            return Ok(());
        }
        read_bond(&command, reader.line(), state)?;
    }
}

/// Adds the bond described by one record and registers it under its id.
///
/// A bond with `ATTACH=ANY` also adds a multicenter [`Sgroup`] holding the
/// bond, its begin atom, and the `ENDPTS` atoms.
pub fn read_bond(
    command: &str,
    line: usize,
    state: &mut ReadState,
) -> Result<EdgeIndex, MolfileError> {
    let mut fields = Fields::new(command, line);
    let id: u32 = fields.next_parsed("id")?;
    let code: i32 = fields.next_parsed("order")?;
    let begin = resolve_atom(&mut fields, "atom1", state)?;
    let end = resolve_atom(&mut fields, "atom2", state)?;
    let (opts, trailing) = parse_options(fields.rest());

    let order = match code {
        1 => BondOrder::Single,
        2 => BondOrder::Double,
        3 => BondOrder::Triple,
        _ => match u32::try_from(code) {
            Ok(q) if q >= 4 => {
                state.warn(line, WarningKind::QueryBondOrder(q));
                BondOrder::Query(q)
            }
            _ => {
                return Err(MolfileError::field(
                    line,
                    "order",
                    code.to_string(),
                    FieldError::InvalidBondOrder(code),
                ))
            }
        },
    };
    let mut bond = Bond {
        id,
        order,
        stereo: BondStereo::None,
    };

    let mut endpoints = Vec::new();
    let mut attach = None;
    for (key, value) in opts.iter() {
        match key {
            "CFG" => {
                let cfg: i32 = value
                    .parse()
                    .map_err(|e| MolfileError::field(line, key, value, FieldError::Int(e)))?;
                match BondStereo::from_cfg(cfg) {
                    Some(stereo) => bond.stereo = stereo,
                    None => state.warn(
                        line,
                        WarningKind::UnknownKey {
                            key: key.to_owned(),
                            value: value.to_owned(),
                        },
                    ),
                }
            }
            "ENDPTS" => {
                let ids = state.id_list(line, key, value)?;
                endpoints = ids
                    .into_iter()
                    .map(|id| lookup_atom(id, line, state))
                    .collect::<Result<_, _>>()?;
            }
            "ATTACH" => attach = Some(value.to_owned()),
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

    tracing::debug!(line, id, order = ?bond.order, "bond");
    let edge = state.mol.add_bond(begin, end, bond);
    state.register_bond(id, edge);

    if attach.as_deref() == Some("ANY") {
        let mut sgroup = Sgroup::new(SgroupKind::ExtMulticenter);
        sgroup.add_atom(begin);
        sgroup.add_bond(edge);
        for atom in endpoints {
            sgroup.add_atom(atom);
        }
        state.mol.add_sgroup(sgroup);
    }
    Ok(edge)
}

fn resolve_atom(
    fields: &mut Fields<'_>,
    field: &str,
    state: &ReadState,
) -> Result<NodeIndex, MolfileError> {
    let line = fields.line();
    let id: u32 = fields.next_parsed(field)?;
    lookup_atom(id, line, state)
}

pub(crate) fn lookup_atom(
    id: u32,
    line: usize,
    state: &ReadState,
) -> Result<NodeIndex, MolfileError> {
    state
        .atom(id)
        .ok_or_else(|| MolfileError::format(line, format!("no atom with id {}", id)))
}
