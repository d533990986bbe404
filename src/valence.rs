//! MDL valence model.
//!
//! Molfiles do not store hydrogen counts for ordinary atoms. Readers are
//! expected to add as many implicit hydrogens as it takes to reach the
//! lowest allowed valence of the element at its charge that is not below
//! the valence already used by explicit bonds and unpaired electrons.

use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::element::Element;
use crate::mol::Mol;
use crate::traits::HasBondOrder;

/// Sum of the orders of all bonds on `atom`, or `None` when any of them is a
/// query bond.
pub fn bond_order_sum<A, B>(mol: &Mol<A, B>, atom: NodeIndex) -> Option<u8>
where
    B: HasBondOrder,
{
    mol.bonds_of(atom)
        .map(|ei| mol.bond(ei).bond_order().numeric())
        .try_fold(0u8, |acc, order| Some(acc.saturating_add(order?)))
}

/// Allowed valences for an element at a given formal charge, lowest first.
///
/// Elements the model has no opinion on (transition metals, noble gases)
/// get an empty list, which means no implicit hydrogens.
pub fn allowed_valences(atomic_num: u8, charge: i8) -> &'static [u8] {
    let Some(elem) = Element::from_atomic_num(atomic_num) else {
        return &[];
    };
    match elem {
        Element::H | Element::Li | Element::Na | Element::K | Element::Rb | Element::Cs
        | Element::Fr => match charge {
            0 => &[1],
            _ => &[],
        },
        Element::Be | Element::Mg | Element::Ca | Element::Sr | Element::Ba | Element::Ra => {
            match charge {
                0 => &[2],
                1 => &[1],
                _ => &[],
            }
        }
        Element::Tl if charge == 0 => &[1, 3],
        Element::Sn | Element::Pb if charge == 0 => &[2, 4],
        Element::B | Element::C | Element::N | Element::O | Element::F => {
            match elem.outer_shell_electrons() as i16 - charge as i16 {
                1 => &[1],
                2 => &[2],
                3 => &[3],
                4 => &[4],
                5 => &[3, 5],
                6 => &[2],
                7 => &[1],
                _ => &[],
            }
        }
        Element::Al | Element::Si | Element::P | Element::S | Element::Cl | Element::Ga
        | Element::Ge | Element::As | Element::Se | Element::Br | Element::In | Element::Sn
        | Element::Sb | Element::Te | Element::I | Element::Tl | Element::Pb | Element::Bi
        | Element::Po | Element::At => match elem.outer_shell_electrons() as i16 - charge as i16 {
            1 => &[1],
            2 => &[2],
            3 => &[3],
            4 => &[4],
            5 => &[3, 5],
            6 => &[2, 4, 6],
            7 => &[1, 3, 5, 7],
            _ => &[],
        },
        _ => &[],
    }
}

/// Lowest allowed valence that can accommodate `explicit`, or `explicit`
/// itself when none can.
pub fn implicit_valence(atomic_num: u8, charge: i8, explicit: u8) -> u8 {
    allowed_valences(atomic_num, charge)
        .iter()
        .copied()
        .find(|&v| v >= explicit)
        .unwrap_or(explicit)
}

/// Sets the implicit hydrogen count (and, when not declared, the valence)
/// of `atom`.
///
/// `explicit` is the bond order sum plus `unpaired`, the number of single
/// electrons on the atom.
pub fn apply_mdl_valence(atom: &mut Atom, explicit: u8, unpaired: u8) {
    if let Some(valence) = atom.valence {
        atom.hydrogen_count = if valence >= explicit {
            valence - (explicit - unpaired)
        } else {
            0
        };
        return;
    }

    let implicit = implicit_valence(atom.atomic_num(), atom.formal_charge, explicit);
    if implicit < explicit {
        atom.valence = Some(explicit);
        atom.hydrogen_count = 0;
    } else {
        atom.valence = Some(implicit);
        atom.hydrogen_count = implicit - explicit;
    }
}
