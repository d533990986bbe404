use petgraph::graph::{EdgeIndex, NodeIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SgroupKind {
    /// Superatom abbreviation (`SUP`), e.g. a collapsed `Ph` or `CO2H`.
    Abbreviation,
    /// Positional-variation attachment: one bond whose end may sit on any of
    /// several atoms.
    ExtMulticenter,
}

/// Substructure group: a typed subset of atoms and bonds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sgroup {
    pub kind: SgroupKind,
    pub atoms: Vec<NodeIndex>,
    /// Crossing bonds for abbreviations, the variable bond for multicenter groups.
    pub bonds: Vec<EdgeIndex>,
    pub subscript: Option<String>,
}

impl Sgroup {
    pub fn new(kind: SgroupKind) -> Self {
        Self {
            kind,
            atoms: Vec::new(),
            bonds: Vec::new(),
            subscript: None,
        }
    }

    pub fn add_atom(&mut self, atom: NodeIndex) {
        self.atoms.push(atom);
    }

    pub fn add_bond(&mut self, bond: EdgeIndex) {
        self.bonds.push(bond);
    }
}
