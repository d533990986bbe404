//! Topological symmetry classes.
//!
//! Two atoms share a class when no refinement of their local invariants
//! (element, charge, isotope, hydrogens, bonding) tells them apart. Stereo
//! perception uses this to drop centers carrying two equivalent substituents.

use std::hash::{Hash, Hasher};

use petgraph::graph::NodeIndex;

use crate::mol::Mol;
use crate::traits::{HasAtomicNum, HasBondOrder, HasFormalCharge, HasHydrogenCount, HasIsotope};

struct Fnv1aHasher(u64);

impl Fnv1aHasher {
    fn new() -> Self {
        Self(0xcbf29ce484222325)
    }
}

impl Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u64;
            self.0 = self.0.wrapping_mul(0x100000001b3);
        }
    }
}

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut h = Fnv1aHasher::new();
    value.hash(&mut h);
    h.finish()
}

fn order_code<B: HasBondOrder>(bond: &B) -> u8 {
    bond.bond_order().numeric().unwrap_or(0)
}

fn initial_values<A, B>(mol: &Mol<A, B>) -> Vec<u64>
where
    A: HasAtomicNum + HasFormalCharge + HasIsotope + HasHydrogenCount,
    B: HasBondOrder,
{
    mol.atoms()
        .map(|idx| {
            let atom = mol.atom(idx);
            let mut orders: Vec<u8> = mol.bonds_of(idx).map(|e| order_code(mol.bond(e))).collect();
            orders.sort_unstable();
            hash_of(&(
                atom.atomic_num(),
                atom.formal_charge(),
                atom.isotope(),
                atom.hydrogen_count(),
                orders,
            ))
        })
        .collect()
}

/// Dense ranks: equal values share a rank, ranks start at 0.
fn dense_ranks(values: &[u64]) -> Vec<usize> {
    let mut distinct = values.to_vec();
    distinct.sort_unstable();
    distinct.dedup();
    values
        .iter()
        .map(|v| distinct.binary_search(v).unwrap_or(0))
        .collect()
}

fn class_count(ranks: &[usize]) -> usize {
    ranks.iter().copied().max().map_or(0, |m| m + 1)
}

/// Symmetry class of every atom, indexed by node index.
pub fn symmetry_classes<A, B>(mol: &Mol<A, B>) -> Vec<usize>
where
    A: HasAtomicNum + HasFormalCharge + HasIsotope + HasHydrogenCount,
    B: HasBondOrder,
{
    let mut ranks = dense_ranks(&initial_values(mol));
    let mut classes = class_count(&ranks);

    loop {
        let values: Vec<u64> = mol
            .atoms()
            .map(|idx| {
                let mut around: Vec<(usize, u8)> = mol
                    .bonds_of(idx)
                    .filter_map(|e| {
                        let nb = mol.other_atom(e, idx)?;
                        Some((ranks[nb.index()], order_code(mol.bond(e))))
                    })
                    .collect();
                around.sort_unstable();
                hash_of(&(ranks[idx.index()], around))
            })
            .collect();
        let refined = dense_ranks(&values);
        let refined_classes = class_count(&refined);
        if refined_classes <= classes {
            return ranks;
        }
        ranks = refined;
        classes = refined_classes;
    }
}

/// True when no two of `atoms` share a symmetry class.
pub fn all_distinct(classes: &[usize], atoms: &[NodeIndex]) -> bool {
    let mut seen: Vec<usize> = atoms.iter().map(|a| classes[a.index()]).collect();
    seen.sort_unstable();
    seen.windows(2).all(|w| w[0] != w[1])
}
