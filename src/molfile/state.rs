use std::collections::HashMap;

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::atom::Atom;
use crate::bond::Bond;
use crate::mol::{Mol, StereoGroup};
use crate::molfile::error::{MolfileError, Warning, WarningKind};
use crate::molfile::options::parse_id_list;
use crate::molfile::{Dimensionality, Molfile};

/// Everything one parse accumulates before it is finalized.
#[derive(Debug, Default)]
pub struct ReadState {
    pub mol: Mol<Atom, Bond>,
    pub dimensionality: Dimensionality,
    pub chiral: bool,
    /// Stereo group of each atom id listed in a COLLECTION block. `None`
    /// when the file has no collection records.
    pub stereo_groups: Option<HashMap<u32, StereoGroup>>,
    /// Nonzero `CFG=` codes from atom records, in file order.
    pub parity_hints: Vec<(NodeIndex, u8)>,
    /// Number given to the next bare `R` atom.
    pub rgroup_counter: u32,
    pub warnings: Vec<Warning>,
    atom_by_id: IdMap<NodeIndex>,
    bond_by_id: IdMap<EdgeIndex>,
}

impl ReadState {
    pub fn new() -> Self {
        Self {
            rgroup_counter: 1,
            ..Self::default()
        }
    }

    /// Records that `id` names `atom`, replacing an earlier atom with the
    /// same id.
    pub fn register_atom(&mut self, id: u32, atom: NodeIndex) {
        self.atom_by_id.insert(id, atom);
    }

    pub fn register_bond(&mut self, id: u32, bond: EdgeIndex) {
        self.bond_by_id.insert(id, bond);
    }

    pub fn atom(&self, id: u32) -> Option<NodeIndex> {
        self.atom_by_id.get(id)
    }

    pub fn bond(&self, id: u32) -> Option<EdgeIndex> {
        self.bond_by_id.get(id)
    }

    pub fn stereo_group_of(&self, id: u32) -> Option<StereoGroup> {
        self.stereo_groups.as_ref()?.get(&id).copied()
    }

    /// Ids of a count-prefixed option value. A count that disagrees with
    /// the list is a warning; every listed id is kept.
    pub fn id_list(
        &mut self,
        line: usize,
        key: &str,
        value: &str,
    ) -> Result<Vec<u32>, MolfileError> {
        let list = parse_id_list(value).map_err(|e| MolfileError::field(line, key, value, e))?;
        if list.declared != list.ids.len() {
            self.warn(
                line,
                WarningKind::IdCountMismatch {
                    key: key.to_owned(),
                    declared: list.declared,
                    found: list.ids.len(),
                },
            );
        }
        Ok(list.ids)
    }

    pub fn warn(&mut self, line: usize, kind: WarningKind) {
        tracing::warn!(line, "{}", kind);
        self.warnings.push(Warning { line, kind });
    }

    pub fn into_molfile(self) -> Molfile {
        Molfile {
            mol: self.mol,
            dimensionality: self.dimensionality,
            chiral: self.chiral,
            warnings: self.warnings,
        }
    }
}

/// Slots indexed by id, with a keyed overflow for ids far past the dense
/// range.
#[derive(Debug)]
struct IdMap<T> {
    dense: Vec<Option<T>>,
    sparse: HashMap<u32, T>,
}

impl<T> Default for IdMap<T> {
    fn default() -> Self {
        Self {
            dense: Vec::new(),
            sparse: HashMap::new(),
        }
    }
}

impl<T: Copy> IdMap<T> {
    /// Ids up to this multiple of the current width grow the dense slots.
    const GROWTH_LIMIT: usize = 4;
    const MIN_WIDTH: usize = 64;

    fn insert(&mut self, id: u32, value: T) {
        let index = id as usize;
        if index >= self.dense.len() {
            let limit = Self::GROWTH_LIMIT * (self.dense.len() + Self::MIN_WIDTH);
            if index > limit {
                self.sparse.insert(id, value);
                return;
            }
            let grown = (self.dense.len() * 2).max(index + 1);
            self.dense.resize(grown, None);
        }
        self.sparse.remove(&id);
        self.dense[index] = Some(value);
    }

    fn get(&self, id: u32) -> Option<T> {
        self.dense
            .get(id as usize)
            .copied()
            .flatten()
            .or_else(|| self.sparse.get(&id).copied())
    }
}
