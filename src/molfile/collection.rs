//! `BEGIN COLLECTION` ... `END COLLECTION`.
//!
//! Stereo group records look like `MDLV30/STERAC2 ATOMS=(3 4 7 9)`. The
//! digits after the prefix number the group; absolute groups carry none.

use std::collections::HashMap;
use std::io;

use crate::mol::{StereoGroup, StereoGroupKind};
use crate::molfile::command::{is_block_end, CommandReader};
use crate::molfile::error::MolfileError;
use crate::molfile::options::parse_options;
use crate::molfile::state::ReadState;

const PREFIXES: [(&str, StereoGroupKind); 3] = [
    ("MDLV30/STERAC", StereoGroupKind::Racemic),
    ("MDLV30/STEREL", StereoGroupKind::Relative),
    ("MDLV30/STEABS", StereoGroupKind::Absolute),
];

pub fn read_collection_block<I>(
    reader: &mut CommandReader<I>,
    state: &mut ReadState,
) -> Result<(), MolfileError>
where
    I: Iterator<Item = io::Result<String>>,
{
    tracing::info!(line = reader.line(), "reading COLLECTION block");
    loop {
        let command = reader.expect_command()?;
        if is_block_end(&command, "COLLECTION") {
            return Ok(());
        }
        read_collection(&command, reader.line(), state)?;
    }
}

pub fn read_collection(
    command: &str,
    line: usize,
    state: &mut ReadState,
) -> Result<(), MolfileError> {
    let Some((kind, rest)) = PREFIXES
        .iter()
        .find_map(|&(prefix, kind)| command.strip_prefix(prefix).map(|rest| (kind, rest)))
    else {
        tracing::debug!(line, command, "ignoring collection");
        return Ok(());
    };

    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    let number = if digits == 0 {
        0
    } else {
        rest[..digits]
            .parse()
            .map_err(|e| MolfileError::field(line, "group", &rest[..digits], e))?
    };
    let group = StereoGroup::new(kind, number);

    let (opts, _) = parse_options(&rest[digits..]);
    let ids = match opts.get("ATOMS") {
        Some(value) => state.id_list(line, "ATOMS", value)?,
        None => Vec::new(),
    };
    tracing::debug!(line, ?group, atoms = ids.len(), "stereo group");
    let groups = state.stereo_groups.get_or_insert_with(HashMap::new);
    for id in ids {
        groups.insert(id, group);
    }
    Ok(())
}
