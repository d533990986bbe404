//! Work done once the whole connection table has been read.

use std::collections::HashMap;

use crate::atom::Atom;
use crate::bond::Bond;
use crate::mol::{Mol, StereoGroup, StereoGroupKind};
use crate::molfile::error::WarningKind;
use crate::molfile::state::ReadState;
use crate::molfile::{Dimensionality, ReaderOptions};
use crate::stereo;
use crate::traits::{HasPosition2D, HasPosition3D};
use crate::valence::{apply_mdl_valence, bond_order_sum};

/// Runs dimensionality inference, the valence model and stereo perception,
/// in that order. `line` is where warnings raised here are reported.
///
/// With `force_3d` the header hint is kept and coordinates are stored as
/// read.
pub fn finalize(state: &mut ReadState, options: &ReaderOptions, line: usize) {
    if options.force_3d {
        if state.dimensionality == Dimensionality::Unknown {
            state.dimensionality = Dimensionality::ZeroD;
        }
    } else {
        state.dimensionality = resolve_dimensionality(&state.mol, state.dimensionality);
        apply_dimensionality(&mut state.mol, state.dimensionality);
    }

    apply_valence_model(state, line);

    if state.mol.is_query() || !options.add_stereo_elements {
        return;
    }
    match state.dimensionality {
        Dimensionality::ThreeD => stereo::perceive_3d(&mut state.mol),
        Dimensionality::TwoD => stereo::perceive_2d(&mut state.mol),
        Dimensionality::ZeroD | Dimensionality::Unknown if options.add_stereo_0d => {
            let elements: Vec<_> = state
                .parity_hints
                .iter()
                .filter_map(|&(atom, parity)| stereo::from_parity(&state.mol, atom, parity))
                .collect();
            for element in elements {
                state.mol.add_tetrahedral_stereo(element);
            }
        }
        _ => {}
    }
    assign_stereo_groups(&mut state.mol, state.stereo_groups.as_ref(), state.chiral);
}

/// Dimensionality implied by the coordinates, falling back to `hint`.
///
/// A nonzero z anywhere means 3D; otherwise an atom with both x and y
/// nonzero means 2D. A 3D hint is kept as is.
pub fn resolve_dimensionality<A, B>(mol: &Mol<A, B>, hint: Dimensionality) -> Dimensionality
where
    A: HasPosition2D + HasPosition3D,
{
    if hint == Dimensionality::ThreeD {
        return hint;
    }
    let mut found = Dimensionality::Unknown;
    for atom in mol.atoms() {
        let atom = mol.atom(atom);
        let (x, y, z) = match (atom.position_3d(), atom.position_2d()) {
            (Some([x, y, z]), _) => (x, y, z),
            (None, Some([x, y])) => (x, y, 0.0),
            (None, None) => continue,
        };
        if z != 0.0 {
            return Dimensionality::ThreeD;
        }
        if x != 0.0 && y != 0.0 {
            found = Dimensionality::TwoD;
        }
    }
    match (found, hint) {
        (Dimensionality::TwoD, _) => Dimensionality::TwoD,
        (_, Dimensionality::Unknown) => Dimensionality::ZeroD,
        (_, hint) => hint,
    }
}

/// Stores coordinates the way `dimensionality` says they should be read.
pub fn apply_dimensionality<A, B>(mol: &mut Mol<A, B>, dimensionality: Dimensionality)
where
    A: HasPosition2D + HasPosition3D,
{
    let atoms: Vec<_> = mol.atoms().collect();
    for idx in atoms {
        let atom = mol.atom_mut(idx);
        match dimensionality {
            Dimensionality::ZeroD => {
                atom.set_position_2d(None);
                atom.set_position_3d(None);
            }
            Dimensionality::TwoD => {
                if let Some([x, y, _]) = atom.position_3d() {
                    atom.set_position_2d(Some([x, y]));
                    atom.set_position_3d(None);
                }
            }
            Dimensionality::ThreeD | Dimensionality::Unknown => {}
        }
    }
}

/// Sets implicit hydrogen counts from bond orders and unpaired electrons.
///
/// An atom touching a query bond is left alone and marks the molecule as a
/// query.
pub fn apply_valence_model(state: &mut ReadState, line: usize) {
    let atoms: Vec<_> = state.mol.atoms().collect();
    for idx in atoms {
        let Some(order_sum) = bond_order_sum(&state.mol, idx) else {
            state.mol.set_query(true);
            let atom_id = state.mol.atom(idx).id;
            state.warn(line, WarningKind::QueryValence { atom_id });
            continue;
        };
        let unpaired = u8::try_from(state.mol.single_electron_count(idx)).unwrap_or(u8::MAX);
        apply_mdl_valence(
            state.mol.atom_mut(idx),
            order_sum.saturating_add(unpaired),
            unpaired,
        );
    }
}

/// Tags tetrahedral centers with their enhanced stereo group.
///
/// Centers listed in a collection get that group. Without the chiral flag
/// every other center joins a new racemic group numbered after the highest
/// racemic group in use, or racemic group 1 when there are no collections.
pub fn assign_stereo_groups(
    mol: &mut Mol<Atom, Bond>,
    groups: Option<&HashMap<u32, StereoGroup>>,
    chiral: bool,
) {
    let groups = groups.filter(|g| !g.is_empty());
    let default = match groups {
        _ if chiral => None,
        Some(groups) => {
            let max = groups
                .values()
                .filter(|g| g.kind == StereoGroupKind::Racemic)
                .map(|g| g.number)
                .max()
                .unwrap_or(0);
            Some(StereoGroup::new(StereoGroupKind::Racemic, max + 1))
        }
        None => Some(StereoGroup::new(StereoGroupKind::Racemic, 1)),
    };

    let ids: Vec<u32> = mol
        .tetrahedral_stereo()
        .iter()
        .map(|s| mol.atom(s.center).id)
        .collect();
    for (element, id) in mol.tetrahedral_stereo_mut().iter_mut().zip(ids) {
        let tag = groups.and_then(|g| g.get(&id).copied()).or(default);
        if tag.is_some() {
            element.group = tag;
        }
    }
}

#[cfg(test)]
mod tests {
    use petgraph::graph::NodeIndex;

    use super::*;
    use crate::atom::{AtomKind, Radical};
    use crate::bond::BondOrder;
    use crate::element::Element;
    use crate::mol::{AtomId, TetrahedralStereo, Winding};

    fn state_with(points: &[[f64; 3]]) -> ReadState {
        let mut state = ReadState::new();
        for (i, &p) in points.iter().enumerate() {
            let id = i as u32 + 1;
            let n = state.mol.add_atom(Atom {
                id,
                kind: AtomKind::Element(Element::C),
                position_3d: Some(p),
                ..Atom::default()
            });
            state.register_atom(id, n);
        }
        state
    }

    fn resolve(points: &[[f64; 3]], hint: Dimensionality) -> Dimensionality {
        resolve_dimensionality(&state_with(points).mol, hint)
    }

    #[test]
    fn dimensionality_from_coordinates() {
        use Dimensionality::*;
        assert_eq!(resolve(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.5]], Unknown), ThreeD);
        assert_eq!(resolve(&[[0.0, 0.0, 0.0], [1.0, 0.5, 0.0]], Unknown), TwoD);
        assert_eq!(resolve(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]], Unknown), ZeroD);
        assert_eq!(resolve(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]], TwoD), TwoD);
        assert_eq!(resolve(&[[0.0, 0.0, 0.0]], ThreeD), ThreeD);
        assert_eq!(resolve(&[[1.0, 1.0, 0.0]], ZeroD), TwoD);
    }

    #[test]
    fn two_dimensions_drop_z() {
        let mut state = state_with(&[[1.0, 2.0, 0.0]]);
        finalize(&mut state, &ReaderOptions::default(), 1);
        let atom = state.mol.atom(NodeIndex::new(0));
        assert_eq!(state.dimensionality, Dimensionality::TwoD);
        assert_eq!(atom.position_2d, Some([1.0, 2.0]));
        assert_eq!(atom.position_3d, None);
    }

    #[test]
    fn zero_dimensions_drop_coordinates() {
        let mut state = state_with(&[[0.0, 0.0, 0.0]]);
        finalize(&mut state, &ReaderOptions::default(), 1);
        let atom = state.mol.atom(NodeIndex::new(0));
        assert_eq!(state.dimensionality, Dimensionality::ZeroD);
        assert_eq!(atom.point(), None);
    }

    #[test]
    fn force_3d_keeps_hint_and_coordinates() {
        let mut state = state_with(&[[1.0, 2.0, 3.0]]);
        state.dimensionality = Dimensionality::TwoD;
        finalize(&mut state, &ReaderOptions::default().with_force_3d(true), 1);
        assert_eq!(state.dimensionality, Dimensionality::TwoD);
        let atom = state.mol.atom(NodeIndex::new(0));
        assert_eq!(atom.position_3d, Some([1.0, 2.0, 3.0]));
        assert_eq!(atom.position_2d, None);
    }

    #[test]
    fn force_3d_without_hint_reports_zero_dimensions() {
        let mut state = state_with(&[[0.0, 0.0, 0.0]]);
        finalize(&mut state, &ReaderOptions::default().with_force_3d(true), 1);
        assert_eq!(state.dimensionality, Dimensionality::ZeroD);
        assert_eq!(
            state.mol.atom(NodeIndex::new(0)).position_3d,
            Some([0.0, 0.0, 0.0])
        );
    }

    #[test]
    fn dimensionality_is_idempotent() {
        for points in [
            vec![[0.0, 0.0, 0.0], [1.0, 0.5, 0.0]],
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]],
            vec![[0.0, 0.0, 1.0]],
        ] {
            let mut state = state_with(&points);
            let opts = ReaderOptions::default();
            finalize(&mut state, &opts, 1);
            let first = state.dimensionality;
            finalize(&mut state, &opts, 1);
            assert_eq!(state.dimensionality, first);
        }
    }

    #[test]
    fn valence_model_fills_hydrogens() {
        let mut state = state_with(&[[0.0; 3], [0.0; 3]]);
        let (a, b) = (NodeIndex::new(0), NodeIndex::new(1));
        state.mol.add_bond(
            a,
            b,
            Bond {
                order: BondOrder::Double,
                ..Bond::default()
            },
        );
        state.mol.atom_mut(b).kind = AtomKind::Element(Element::O);
        apply_valence_model(&mut state, 1);
        assert_eq!(state.mol.atom(a).hydrogen_count, 2);
        assert_eq!(state.mol.atom(b).hydrogen_count, 0);
        assert_eq!(state.mol.atom(a).valence, Some(4));
    }

    #[test]
    fn radicals_count_toward_valence() {
        let mut state = state_with(&[[0.0; 3]]);
        let a = NodeIndex::new(0);
        state.mol.atom_mut(a).radical = Radical::Monovalent;
        state.mol.add_single_electron(a);
        apply_valence_model(&mut state, 1);
        let atom = state.mol.atom(a);
        assert_eq!(atom.hydrogen_count, 3);
        assert_eq!(atom.valence, Some(4));
    }

    #[test]
    fn query_bonds_mark_the_molecule() {
        let mut state = state_with(&[[0.0; 3], [0.0; 3], [0.0; 3]]);
        let (a, b, c) = (NodeIndex::new(0), NodeIndex::new(1), NodeIndex::new(2));
        state.mol.add_bond(
            a,
            b,
            Bond {
                order: BondOrder::Query(4),
                ..Bond::default()
            },
        );
        state.mol.add_bond(b, c, Bond::default());
        apply_valence_model(&mut state, 8);
        assert!(state.mol.is_query());
        assert_eq!(state.mol.atom(c).hydrogen_count, 3);
        assert_eq!(state.mol.atom(a).valence, None);
        assert_eq!(
            state.warnings[0].kind,
            WarningKind::QueryValence { atom_id: 1 }
        );
    }

    fn tetrahedral(center: usize) -> TetrahedralStereo {
        let n = |i: usize| AtomId::Node(NodeIndex::new(i));
        TetrahedralStereo {
            center: NodeIndex::new(center),
            carriers: [n(10), n(11), n(12), n(13)],
            winding: Winding::Clockwise,
            group: None,
        }
    }

    fn tagged(groups: Option<HashMap<u32, StereoGroup>>, chiral: bool) -> Vec<Option<StereoGroup>> {
        let mut state = state_with(&[[0.0; 3], [0.0; 3], [0.0; 3]]);
        state
            .mol
            .set_tetrahedral_stereo(vec![tetrahedral(0), tetrahedral(1), tetrahedral(2)]);
        assign_stereo_groups(&mut state.mol, groups.as_ref(), chiral);
        state.mol.tetrahedral_stereo().iter().map(|s| s.group).collect()
    }

    #[test]
    fn no_collection_and_no_chiral_flag_is_racemic_one() {
        let rac1 = Some(StereoGroup::new(StereoGroupKind::Racemic, 1));
        assert_eq!(tagged(None, false), [rac1; 3]);
        assert_eq!(tagged(Some(HashMap::new()), false), [rac1; 3]);
    }

    #[test]
    fn chiral_flag_without_collection_leaves_untagged() {
        assert_eq!(tagged(None, true), [None; 3]);
    }

    #[test]
    fn collection_tags_and_default_group() {
        let rac2 = StereoGroup::new(StereoGroupKind::Racemic, 2);
        let abs = StereoGroup::new(StereoGroupKind::Absolute, 0);
        let groups = HashMap::from([(1, rac2), (2, abs), (40, rac2)]);

        let rac3 = StereoGroup::new(StereoGroupKind::Racemic, 3);
        assert_eq!(
            tagged(Some(groups.clone()), false),
            [Some(rac2), Some(abs), Some(rac3)]
        );
        assert_eq!(tagged(Some(groups), true), [Some(rac2), Some(abs), None]);
    }

    #[test]
    fn parity_builds_stereo_without_coordinates() {
        let mut state = state_with(&[[0.0; 3]; 5]);
        state.mol.atom_mut(NodeIndex::new(2)).kind = AtomKind::Element(Element::F);
        state.mol.atom_mut(NodeIndex::new(3)).kind = AtomKind::Element(Element::Cl);
        state.mol.atom_mut(NodeIndex::new(4)).kind = AtomKind::Element(Element::Br);
        let center = NodeIndex::new(0);
        for i in 1..5 {
            state.mol.add_bond(center, NodeIndex::new(i), Bond::default());
        }
        state.parity_hints.push((center, 1));
        state.chiral = true;
        finalize(&mut state, &ReaderOptions::default(), 1);

        assert_eq!(state.dimensionality, Dimensionality::ZeroD);
        let elements = state.mol.tetrahedral_stereo();
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].center, center);
        assert_eq!(elements[0].winding, Winding::Clockwise);

        let mut state = state_with(&[[0.0; 3]; 5]);
        for i in 1..5 {
            state.mol.add_bond(center, NodeIndex::new(i), Bond::default());
        }
        state.parity_hints.push((center, 1));
        let opts = ReaderOptions::default().with_add_stereo_0d(false);
        finalize(&mut state, &opts, 1);
        assert!(state.mol.tetrahedral_stereo().is_empty());
    }
}
