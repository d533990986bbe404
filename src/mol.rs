use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use crate::atom::Atom;
use crate::bond::Bond;
use crate::sgroup::Sgroup;

/// Neighbor reference in a stereo element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtomId {
    Node(NodeIndex),
    /// The implicit hydrogen carried by the given atom.
    ImplicitH(NodeIndex),
    /// The lone pair of a three-coordinate center such as a phosphine.
    LonePair(NodeIndex),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Winding {
    Clockwise,
    Anticlockwise,
}

impl Winding {
    pub fn invert(self) -> Winding {
        match self {
            Winding::Clockwise => Winding::Anticlockwise,
            Winding::Anticlockwise => Winding::Clockwise,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StereoGroupKind {
    /// `ABS`: the configuration drawn is the one present.
    Absolute,
    /// `OR`: one of the drawn configuration or its inverse, unknown which.
    Relative,
    /// `AND`: a mixture of the drawn configuration and its inverse.
    Racemic,
}

/// Enhanced stereo tag, e.g. `&1` is `Racemic` group 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StereoGroup {
    pub kind: StereoGroupKind,
    pub number: u32,
}

impl StereoGroup {
    pub fn new(kind: StereoGroupKind, number: u32) -> Self {
        Self { kind, number }
    }
}

/// Tetrahedral configuration around `center`.
///
/// Looking at the center with `carriers[3]` pointing away from the viewer,
/// `carriers[0]`, `carriers[1]`, `carriers[2]` run in the `winding` direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TetrahedralStereo {
    pub center: NodeIndex,
    pub carriers: [AtomId; 4],
    pub winding: Winding,
    pub group: Option<StereoGroup>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DoubleBondConfig {
    /// Carriers on the same side (Z-like).
    Together,
    /// Carriers on opposite sides (E-like).
    Opposite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DoubleBondStereo {
    pub bond: EdgeIndex,
    /// One neighbor of the begin atom and one of the end atom.
    pub carriers: [NodeIndex; 2],
    pub config: DoubleBondConfig,
}

pub struct Mol<A, B> {
    graph: UnGraph<A, B>,
    title: Option<String>,
    comment: Option<String>,
    single_electrons: Vec<NodeIndex>,
    sgroups: Option<Vec<Sgroup>>,
    tetrahedral_stereo: Vec<TetrahedralStereo>,
    double_bond_stereo: Vec<DoubleBondStereo>,
    is_query: bool,
}

impl<A, B> Mol<A, B> {
    pub fn new() -> Self {
        Self {
            graph: UnGraph::default(),
            title: None,
            comment: None,
            single_electrons: Vec::new(),
            sgroups: None,
            tetrahedral_stereo: Vec::new(),
            double_bond_stereo: Vec::new(),
            is_query: false,
        }
    }

    pub fn graph(&self) -> &UnGraph<A, B> {
        &self.graph
    }

    pub fn atom(&self, idx: NodeIndex) -> &A {
        &self.graph[idx]
    }

    pub fn atom_mut(&mut self, idx: NodeIndex) -> &mut A {
        &mut self.graph[idx]
    }

    pub fn bond(&self, idx: EdgeIndex) -> &B {
        &self.graph[idx]
    }

    pub fn bond_mut(&mut self, idx: EdgeIndex) -> &mut B {
        &mut self.graph[idx]
    }

    pub fn add_atom(&mut self, atom: A) -> NodeIndex {
        self.graph.add_node(atom)
    }

    /// Adds a bond from `begin` to `end`; [`bond_endpoints`](Self::bond_endpoints)
    /// reports them in the same order.
    pub fn add_bond(&mut self, begin: NodeIndex, end: NodeIndex, bond: B) -> EdgeIndex {
        self.graph.add_edge(begin, end, bond)
    }

    pub fn atom_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn neighbors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors(idx)
    }

    pub fn bonds_of(&self, idx: NodeIndex) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edges(idx).map(|e| e.id())
    }

    pub fn atoms(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    pub fn bonds(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edge_indices()
    }

    pub fn bond_between(&self, a: NodeIndex, b: NodeIndex) -> Option<EdgeIndex> {
        self.graph.find_edge(a, b)
    }

    pub fn bond_endpoints(&self, idx: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.graph.edge_endpoints(idx)
    }

    /// The endpoint of `bond` that is not `atom`.
    pub fn other_atom(&self, bond: EdgeIndex, atom: NodeIndex) -> Option<NodeIndex> {
        let (a, b) = self.bond_endpoints(bond)?;
        if a == atom {
            Some(b)
        } else if b == atom {
            Some(a)
        } else {
            None
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = Some(comment.into());
    }

    /// Places one unpaired electron on `atom`.
    pub fn add_single_electron(&mut self, atom: NodeIndex) {
        self.single_electrons.push(atom);
    }

    pub fn single_electrons(&self) -> &[NodeIndex] {
        &self.single_electrons
    }

    pub fn single_electron_count(&self, atom: NodeIndex) -> usize {
        self.single_electrons.iter().filter(|&&a| a == atom).count()
    }

    /// Substructure groups, empty until the first one is added.
    pub fn sgroups(&self) -> &[Sgroup] {
        self.sgroups.as_deref().unwrap_or(&[])
    }

    pub fn add_sgroup(&mut self, sgroup: Sgroup) {
        self.sgroups.get_or_insert_with(Vec::new).push(sgroup);
    }

    pub fn tetrahedral_stereo(&self) -> &[TetrahedralStereo] {
        &self.tetrahedral_stereo
    }

    pub fn tetrahedral_stereo_mut(&mut self) -> &mut [TetrahedralStereo] {
        &mut self.tetrahedral_stereo
    }

    pub fn set_tetrahedral_stereo(&mut self, stereo: Vec<TetrahedralStereo>) {
        self.tetrahedral_stereo = stereo;
    }

    pub fn tetrahedral_stereo_for(&self, center: NodeIndex) -> Option<&TetrahedralStereo> {
        self.tetrahedral_stereo.iter().find(|s| s.center == center)
    }

    pub fn add_tetrahedral_stereo(&mut self, stereo: TetrahedralStereo) {
        self.tetrahedral_stereo.push(stereo);
    }

    pub fn double_bond_stereo(&self) -> &[DoubleBondStereo] {
        &self.double_bond_stereo
    }

    pub fn set_double_bond_stereo(&mut self, stereo: Vec<DoubleBondStereo>) {
        self.double_bond_stereo = stereo;
    }

    pub fn double_bond_stereo_for(&self, bond: EdgeIndex) -> Option<&DoubleBondStereo> {
        self.double_bond_stereo.iter().find(|s| s.bond == bond)
    }

    pub fn add_double_bond_stereo(&mut self, stereo: DoubleBondStereo) {
        self.double_bond_stereo.push(stereo);
    }

    /// True when some bond carried a query order, so valence and stereo
    /// could not be resolved.
    pub fn is_query(&self) -> bool {
        self.is_query
    }

    pub fn set_query(&mut self, is_query: bool) {
        self.is_query = is_query;
    }
}

impl Mol<Atom, Bond> {
    /// Node holding the atom declared with record id `id`.
    ///
    /// When an id was declared twice the later atom is returned.
    pub fn atom_by_id(&self, id: u32) -> Option<NodeIndex> {
        self.atoms().filter(|&idx| self.atom(idx).id == id).last()
    }

    pub fn bond_by_id(&self, id: u32) -> Option<EdgeIndex> {
        self.bonds().filter(|&idx| self.bond(idx).id == id).last()
    }
}

impl<A: Clone, B: Clone> Clone for Mol<A, B> {
    fn clone(&self) -> Self {
        Self {
            graph: self.graph.clone(),
            title: self.title.clone(),
            comment: self.comment.clone(),
            single_electrons: self.single_electrons.clone(),
            sgroups: self.sgroups.clone(),
            tetrahedral_stereo: self.tetrahedral_stereo.clone(),
            double_bond_stereo: self.double_bond_stereo.clone(),
            is_query: self.is_query,
        }
    }
}

impl<A, B> Default for Mol<A, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: std::fmt::Debug, B: std::fmt::Debug> std::fmt::Debug for Mol<A, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mol")
            .field("title", &self.title)
            .field("atom_count", &self.atom_count())
            .field("bond_count", &self.bond_count())
            .field("single_electrons", &self.single_electrons.len())
            .field("sgroups", &self.sgroups().len())
            .field("tetrahedral_stereo", &self.tetrahedral_stereo)
            .field("double_bond_stereo", &self.double_bond_stereo)
            .field("is_query", &self.is_query)
            .finish()
    }
}
