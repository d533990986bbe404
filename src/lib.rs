pub mod atom;
pub mod bond;
pub mod element;
pub mod mol;
pub mod molfile;
pub mod sgroup;
pub mod stereo;
pub mod symmetry;
pub mod traits;
pub mod valence;

pub use atom::{Atom, AtomKind, GenericAtom, Radical};
pub use bond::{Bond, BondOrder, BondStereo};
pub use element::Element;
pub use mol::{
    AtomId, DoubleBondConfig, DoubleBondStereo, Mol, StereoGroup, StereoGroupKind,
    TetrahedralStereo, Winding,
};
pub use molfile::{
    is_v3000, read_v3000, read_v3000_from, read_v3000_with, Dimensionality, Mode, Molfile,
    MolfileError, ReaderOptions, V3000Reader, Warning, WarningKind,
};
pub use sgroup::{Sgroup, SgroupKind};
pub use traits::{
    HasAtomicNum, HasBondOrder, HasFormalCharge, HasHydrogenCount, HasIsotope, HasPosition2D,
    HasPosition3D,
};

#[cfg(test)]
mod tests;
