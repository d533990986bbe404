use std::borrow::Cow;

use crate::element::Element;

/// Generic (query) atom labels with a fixed meaning in a connection table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenericAtom {
    /// `A`: any atom except hydrogen.
    A,
    /// `Q`: any atom except hydrogen and carbon.
    Q,
    /// `*`: unspecified atom.
    Star,
    /// `LP`: lone pair.
    LonePair,
    /// `L`: atom list placeholder.
    List,
}

impl GenericAtom {
    pub fn from_symbol(s: &str) -> Option<GenericAtom> {
        match s {
            "A" => Some(GenericAtom::A),
            "Q" => Some(GenericAtom::Q),
            "*" => Some(GenericAtom::Star),
            "LP" => Some(GenericAtom::LonePair),
            "L" => Some(GenericAtom::List),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            GenericAtom::A => "A",
            GenericAtom::Q => "Q",
            GenericAtom::Star => "*",
            GenericAtom::LonePair => "LP",
            GenericAtom::List => "L",
        }
    }
}

/// What a graph node stands for.
///
/// Everything except [`AtomKind::Element`] is a pseudo-atom: it has no
/// atomic number and never receives implicit hydrogens.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AtomKind {
    Element(Element),
    Generic(GenericAtom),
    /// R-group attachment, `R1`, `R2`, ...
    RGroup(u32),
    /// Label that is neither an element nor a known pseudo-atom symbol.
    Unknown(String),
}

impl Default for AtomKind {
    fn default() -> Self {
        AtomKind::Generic(GenericAtom::Star)
    }
}

/// MDL spin multiplicity of an atom (`RAD=` field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Radical {
    #[default]
    None,
    /// Code 1, two paired electrons (carbene singlet).
    DivalentSinglet,
    /// Code 2, one unpaired electron.
    Monovalent,
    /// Code 3, two unpaired electrons.
    DivalentTriplet,
}

impl Radical {
    pub fn from_code(code: i32) -> Option<Radical> {
        match code {
            0 => Some(Radical::None),
            1 => Some(Radical::DivalentSinglet),
            2 => Some(Radical::Monovalent),
            3 => Some(Radical::DivalentTriplet),
            _ => None,
        }
    }

    /// Number of single-electron markers the multiplicity places on the atom.
    pub fn single_electrons(self) -> u8 {
        match self {
            Radical::None => 0,
            Radical::DivalentSinglet => 2,
            Radical::Monovalent => 1,
            Radical::DivalentTriplet => 2,
        }
    }
}

/// Atom record read from a connection table.
///
/// Coordinates are held as read until the reader decides the dimensionality
/// of the whole structure; afterwards at most one of `position_2d` and
/// `position_3d` is set.
///
/// # Examples
///
/// ```
/// use molcrab::{Atom, AtomKind, Element};
///
/// let carbon = Atom {
///     id: 1,
///     kind: AtomKind::Element(Element::C),
///     hydrogen_count: 3,
///     ..Atom::default()
/// };
/// assert_eq!(carbon.atomic_num(), 6);
/// assert_eq!(carbon.symbol(), "C");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Atom {
    /// Identifier declared by the atom record. Not necessarily the node index.
    pub id: u32,
    pub kind: AtomKind,
    pub formal_charge: i8,
    /// Mass number. `0` means natural isotopic abundance.
    pub isotope: u16,
    /// Number of implicit hydrogens, set when the structure is finalized.
    pub hydrogen_count: u8,
    /// Either declared with `VAL=` or derived from the valence model.
    pub valence: Option<u8>,
    pub radical: Radical,
    /// Raw 0D parity code (`CFG=`): 0 none, 1 odd, 2 even, 3 either.
    pub stereo_parity: u8,
    pub position_2d: Option<[f64; 2]>,
    pub position_3d: Option<[f64; 3]>,
}

impl Atom {
    /// Atomic number, or `0` for pseudo-atoms.
    pub fn atomic_num(&self) -> u8 {
        match self.kind {
            AtomKind::Element(e) => e.atomic_num(),
            _ => 0,
        }
    }

    pub fn element(&self) -> Option<Element> {
        match self.kind {
            AtomKind::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_pseudo(&self) -> bool {
        !matches!(self.kind, AtomKind::Element(_))
    }

    /// Label as it would appear in an atom record.
    pub fn symbol(&self) -> Cow<'_, str> {
        match &self.kind {
            AtomKind::Element(e) => Cow::Borrowed(e.symbol()),
            AtomKind::Generic(g) => Cow::Borrowed(g.symbol()),
            AtomKind::RGroup(n) => Cow::Owned(format!("R{}", n)),
            AtomKind::Unknown(s) => Cow::Borrowed(s.as_str()),
        }
    }

    /// Coordinates as a 3D point regardless of how they are stored.
    pub fn point(&self) -> Option<[f64; 3]> {
        match (self.position_3d, self.position_2d) {
            (Some(p), _) => Some(p),
            (None, Some([x, y])) => Some([x, y, 0.0]),
            (None, None) => None,
        }
    }
}

impl crate::traits::HasAtomicNum for Atom {
    fn atomic_num(&self) -> u8 {
        Atom::atomic_num(self)
    }
}

impl crate::traits::HasFormalCharge for Atom {
    fn formal_charge(&self) -> i8 {
        self.formal_charge
    }
}

impl crate::traits::HasIsotope for Atom {
    fn isotope(&self) -> u16 {
        self.isotope
    }
}

impl crate::traits::HasHydrogenCount for Atom {
    fn hydrogen_count(&self) -> u8 {
        self.hydrogen_count
    }
}

impl crate::traits::HasPosition2D for Atom {
    fn position_2d(&self) -> Option<[f64; 2]> {
        self.position_2d
    }
    fn set_position_2d(&mut self, pos: Option<[f64; 2]>) {
        self.position_2d = pos;
    }
}

impl crate::traits::HasPosition3D for Atom {
    fn position_3d(&self) -> Option<[f64; 3]> {
        self.position_3d
    }
    fn set_position_3d(&mut self, pos: Option<[f64; 3]>) {
        self.position_3d = pos;
    }
}
