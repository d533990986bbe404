//! Stereo element perception.
//!
//! Tetrahedral centers and double-bond configurations are derived from
//! atom coordinates (3D, or 2D plus wedge bonds) or, when a structure has no
//! coordinates, from the MDL 0D parity recorded on each atom.

use std::collections::VecDeque;

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder, BondStereo};
use crate::element::Element;
use crate::mol::{
    AtomId, DoubleBondConfig, DoubleBondStereo, Mol, TetrahedralStereo, Winding,
};
use crate::symmetry::{all_distinct, symmetry_classes};

const EPSILON: f64 = 1e-6;

/// Double bonds in rings smaller than this cannot be drawn with a defined
/// cis/trans choice that is not implied by the ring.
const MIN_STEREO_RING_SIZE: usize = 8;

type Vec3 = [f64; 3];

fn sub(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn cross(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn dot(a: Vec3, b: Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Winding of `p[0..3]` seen with `p[3]` pointing away from the viewer.
fn winding_of(p: [Vec3; 4]) -> Option<Winding> {
    let volume = dot(sub(p[0], p[3]), cross(sub(p[1], p[3]), sub(p[2], p[3])));
    if volume > EPSILON {
        Some(Winding::Anticlockwise)
    } else if volume < -EPSILON {
        Some(Winding::Clockwise)
    } else {
        None
    }
}

/// Where the geometry of a structure comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Geometry {
    Planar,
    Spatial,
}

/// Neighbors of a tetrahedral center in carrier order: explicit neighbors by
/// node index with explicit hydrogens last, then the implicit hydrogen or
/// lone pair when the center is three-coordinate.
fn ordered_carriers(mol: &Mol<Atom, Bond>, center: NodeIndex) -> Option<[AtomId; 4]> {
    let mut heavy: Vec<NodeIndex> = Vec::with_capacity(4);
    let mut hydrogens: Vec<NodeIndex> = Vec::with_capacity(1);
    for nb in mol.neighbors(center) {
        if mol.atom(nb).atomic_num() == 1 {
            hydrogens.push(nb);
        } else {
            heavy.push(nb);
        }
    }
    if hydrogens.len() > 1 {
        return None;
    }
    heavy.sort_unstable();
    let mut carriers: Vec<AtomId> = heavy.into_iter().map(AtomId::Node).collect();
    carriers.extend(hydrogens.into_iter().map(AtomId::Node));
    match carriers.len() {
        4 => {}
        3 if mol.atom(center).hydrogen_count == 1 => carriers.push(AtomId::ImplicitH(center)),
        3 if mol.atom(center).hydrogen_count == 0 => carriers.push(AtomId::LonePair(center)),
        _ => return None,
    }
    carriers.try_into().ok()
}

/// Whether the element, charge and bonding of `idx` allow a tetrahedral
/// configuration at all.
fn is_tetrahedral_candidate(mol: &Mol<Atom, Bond>, idx: NodeIndex) -> bool {
    let atom = mol.atom(idx);
    let Some(elem) = atom.element() else {
        return false;
    };
    let mut doubles = 0;
    for e in mol.bonds_of(idx) {
        match mol.bond(e).order {
            BondOrder::Single => {}
            BondOrder::Double => doubles += 1,
            BondOrder::Triple | BondOrder::Query(_) => return false,
        }
    }
    let degree = mol.neighbors(idx).count();
    let hydrogens = atom.hydrogen_count as usize;
    if hydrogens > 1 {
        return false;
    }
    let connections = degree + hydrogens;
    match elem {
        Element::C | Element::Si | Element::Ge | Element::Sn => {
            connections == 4 && doubles == 0 && atom.formal_charge == 0
        }
        Element::B => connections == 4 && doubles == 0 && atom.formal_charge == -1,
        Element::N => connections == 4 && doubles == 0 && atom.formal_charge == 1,
        Element::P | Element::As => match connections {
            4 => doubles <= 1,
            3 => doubles == 0 && hydrogens == 0,
            _ => false,
        },
        Element::S | Element::Se => {
            connections == 3 && hydrogens == 0 && (doubles == 1 || atom.formal_charge == 1)
        }
        _ => false,
    }
}

fn has_distinct_carriers(classes: &[usize], carriers: &[AtomId; 4]) -> bool {
    let nodes: Vec<NodeIndex> = carriers
        .iter()
        .filter_map(|c| match c {
            AtomId::Node(n) => Some(*n),
            AtomId::ImplicitH(_) | AtomId::LonePair(_) => None,
        })
        .collect();
    all_distinct(classes, &nodes)
}

/// Elevation of `nb` as seen from `center`: `+1` for a wedge starting at the
/// center, `-1` for a hash, `0` otherwise. `None` for a wavy bond.
fn elevation(mol: &Mol<Atom, Bond>, center: NodeIndex, nb: NodeIndex) -> Option<f64> {
    let Some(e) = mol.bond_between(center, nb) else {
        return Some(0.0);
    };
    let begins_here = mol.bond_endpoints(e).map(|(a, _)| a) == Some(center);
    if !begins_here {
        return Some(0.0);
    }
    match mol.bond(e).stereo {
        BondStereo::None => Some(0.0),
        BondStereo::Up => Some(1.0),
        BondStereo::Down => Some(-1.0),
        BondStereo::Either => None,
    }
}

fn carrier_point(
    mol: &Mol<Atom, Bond>,
    center: NodeIndex,
    carrier: AtomId,
    geometry: Geometry,
) -> Option<Vec3> {
    match carrier {
        AtomId::Node(nb) => {
            let [x, y, z] = mol.atom(nb).point()?;
            match geometry {
                Geometry::Spatial => Some([x, y, z]),
                Geometry::Planar => Some([x, y, elevation(mol, center, nb)?]),
            }
        }
        AtomId::ImplicitH(c) | AtomId::LonePair(c) => {
            let [x, y, z] = mol.atom(c).point()?;
            match geometry {
                Geometry::Spatial => Some([x, y, z]),
                Geometry::Planar => Some([x, y, 0.0]),
            }
        }
    }
}

fn tetrahedral_from_geometry(
    mol: &Mol<Atom, Bond>,
    classes: &[usize],
    center: NodeIndex,
    geometry: Geometry,
) -> Option<TetrahedralStereo> {
    if !is_tetrahedral_candidate(mol, center) {
        return None;
    }
    let carriers = ordered_carriers(mol, center)?;
    if !has_distinct_carriers(classes, &carriers) {
        return None;
    }
    let mut points = [[0.0; 3]; 4];
    for (p, &c) in points.iter_mut().zip(carriers.iter()) {
        *p = carrier_point(mol, center, c, geometry)?;
    }
    if geometry == Geometry::Planar && points.iter().all(|p| p[2] == 0.0) {
        return None;
    }
    Some(TetrahedralStereo {
        center,
        carriers,
        winding: winding_of(points)?,
        group: None,
    })
}

/// Length of the shortest path between the ends of `bond` that avoids the
/// bond itself, plus one; `None` when the bond is not in a ring.
fn smallest_ring_through(mol: &Mol<Atom, Bond>, bond: EdgeIndex) -> Option<usize> {
    let (from, to) = mol.bond_endpoints(bond)?;
    let mut dist = vec![usize::MAX; mol.atom_count()];
    let mut queue = VecDeque::new();
    dist[from.index()] = 0;
    queue.push_back(from);
    while let Some(node) = queue.pop_front() {
        for e in mol.bonds_of(node) {
            if e == bond {
                continue;
            }
            let Some(nb) = mol.other_atom(e, node) else {
                continue;
            };
            if dist[nb.index()] == usize::MAX {
                dist[nb.index()] = dist[node.index()] + 1;
                if nb == to {
                    return Some(dist[nb.index()] + 1);
                }
                queue.push_back(nb);
            }
        }
    }
    None
}

/// Lowest-index substituent of `end` other than `partner`, provided the end
/// can carry a configuration.
fn double_bond_carrier(
    mol: &Mol<Atom, Bond>,
    classes: &[usize],
    end: NodeIndex,
    partner: NodeIndex,
) -> Option<NodeIndex> {
    let mut others: Vec<NodeIndex> = Vec::with_capacity(2);
    for e in mol.bonds_of(end) {
        let bond = mol.bond(e);
        let nb = mol.other_atom(e, end)?;
        if nb == partner {
            continue;
        }
        if bond.order != BondOrder::Single {
            return None;
        }
        if bond.stereo == BondStereo::Either {
            return None;
        }
        others.push(nb);
    }
    let hydrogens = mol.atom(end).hydrogen_count as usize;
    match (others.len(), hydrogens) {
        (1, 0) | (1, 1) => {}
        (2, 0) => {
            if !all_distinct(classes, &others) {
                return None;
            }
        }
        _ => return None,
    }
    others.into_iter().min()
}

fn double_bond_from_geometry(
    mol: &Mol<Atom, Bond>,
    classes: &[usize],
    bond: EdgeIndex,
    geometry: Geometry,
) -> Option<DoubleBondStereo> {
    let b = mol.bond(bond);
    if b.order != BondOrder::Double || b.stereo == BondStereo::Either {
        return None;
    }
    let (begin, end) = mol.bond_endpoints(bond)?;
    if mol.atom(begin).is_pseudo() || mol.atom(end).is_pseudo() {
        return None;
    }
    if let Some(size) = smallest_ring_through(mol, bond) {
        if size < MIN_STEREO_RING_SIZE {
            return None;
        }
    }
    let a = double_bond_carrier(mol, classes, begin, end)?;
    let d = double_bond_carrier(mol, classes, end, begin)?;

    let pu = mol.atom(begin).point()?;
    let pv = mol.atom(end).point()?;
    let pa = mol.atom(a).point()?;
    let pd = mol.atom(d).point()?;
    let axis = sub(pv, pu);
    let side = match geometry {
        Geometry::Planar => {
            let sa = axis[0] * (pa[1] - pu[1]) - axis[1] * (pa[0] - pu[0]);
            let sd = axis[0] * (pd[1] - pu[1]) - axis[1] * (pd[0] - pu[0]);
            if sa.abs() < EPSILON || sd.abs() < EPSILON {
                return None;
            }
            sa * sd
        }
        Geometry::Spatial => {
            let na = cross(axis, sub(pa, pu));
            let nd = cross(axis, sub(pd, pu));
            let s = dot(na, nd);
            if s.abs() < EPSILON {
                return None;
            }
            s
        }
    };
    let config = if side > 0.0 {
        DoubleBondConfig::Together
    } else {
        DoubleBondConfig::Opposite
    };
    Some(DoubleBondStereo {
        bond,
        carriers: [a, d],
        config,
    })
}

fn from_geometry(mol: &mut Mol<Atom, Bond>, geometry: Geometry) {
    let view: &Mol<Atom, Bond> = mol;
    let classes = symmetry_classes(view);
    let tetrahedral: Vec<TetrahedralStereo> = view
        .atoms()
        .filter_map(|idx| tetrahedral_from_geometry(view, &classes, idx, geometry))
        .collect();
    let double_bonds: Vec<DoubleBondStereo> = view
        .bonds()
        .filter_map(|e| double_bond_from_geometry(view, &classes, e, geometry))
        .collect();
    tracing::debug!(
        tetrahedral = tetrahedral.len(),
        double_bonds = double_bonds.len(),
        ?geometry,
        "perceived stereo elements"
    );
    mol.set_tetrahedral_stereo(tetrahedral);
    mol.set_double_bond_stereo(double_bonds);
}

/// Replaces the stereo elements of `mol` with those implied by its 2D
/// coordinates and wedge bonds.
pub fn perceive_2d(mol: &mut Mol<Atom, Bond>) {
    from_geometry(mol, Geometry::Planar);
}

/// Replaces the stereo elements of `mol` with those implied by its 3D
/// coordinates.
pub fn perceive_3d(mol: &mut Mol<Atom, Bond>) {
    from_geometry(mol, Geometry::Spatial);
}

/// Tetrahedral element for a 0D parity code.
///
/// Parity 1 means that, numbering neighbors by their position in the file
/// with hydrogen last, the first three run clockwise when the last points
/// away from the viewer; parity 2 means anticlockwise. Any other code, or a
/// center that is not three- or four-coordinate, yields `None`.
pub fn from_parity(
    mol: &Mol<Atom, Bond>,
    center: NodeIndex,
    parity: u8,
) -> Option<TetrahedralStereo> {
    let winding = match parity {
        1 => Winding::Clockwise,
        2 => Winding::Anticlockwise,
        _ => return None,
    };
    let degree = mol.neighbors(center).count();
    if !(3..=4).contains(&degree) {
        return None;
    }
    Some(TetrahedralStereo {
        center,
        carriers: ordered_carriers(mol, center)?,
        winding,
        group: None,
    })
}
