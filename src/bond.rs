/// Bond order as recorded in the bond block.
///
/// Codes 4 and above are query orders (aromatic, single-or-double, any, ...)
/// and are kept verbatim in [`BondOrder::Query`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BondOrder {
    #[default]
    Single,
    Double,
    Triple,
    Query(u32),
}

impl BondOrder {
    /// Bond order contribution to valence, `None` for query orders.
    pub fn numeric(self) -> Option<u8> {
        match self {
            BondOrder::Single => Some(1),
            BondOrder::Double => Some(2),
            BondOrder::Triple => Some(3),
            BondOrder::Query(_) => None,
        }
    }

    pub fn is_query(self) -> bool {
        matches!(self, BondOrder::Query(_))
    }
}

/// Wedge/hash display flag (`CFG=` on a bond), relative to the begin atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BondStereo {
    #[default]
    None,
    /// Wedge, end atom towards the viewer.
    Up,
    /// Wavy bond, configuration unknown.
    Either,
    /// Hashed wedge, end atom away from the viewer.
    Down,
}

impl BondStereo {
    pub fn from_cfg(cfg: i32) -> Option<BondStereo> {
        match cfg {
            0 => Some(BondStereo::None),
            1 => Some(BondStereo::Up),
            2 => Some(BondStereo::Either),
            3 => Some(BondStereo::Down),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Bond {
    /// Identifier declared by the bond record.
    pub id: u32,
    pub order: BondOrder,
    pub stereo: BondStereo,
}

impl crate::traits::HasBondOrder for Bond {
    fn bond_order(&self) -> BondOrder {
        self.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_orders() {
        assert_eq!(BondOrder::Single.numeric(), Some(1));
        assert_eq!(BondOrder::Triple.numeric(), Some(3));
        assert_eq!(BondOrder::Query(4).numeric(), None);
        assert!(BondOrder::Query(8).is_query());
    }

    #[test]
    fn stereo_codes() {
        assert_eq!(BondStereo::from_cfg(0), Some(BondStereo::None));
        assert_eq!(BondStereo::from_cfg(1), Some(BondStereo::Up));
        assert_eq!(BondStereo::from_cfg(2), Some(BondStereo::Either));
        assert_eq!(BondStereo::from_cfg(3), Some(BondStereo::Down));
        assert_eq!(BondStereo::from_cfg(6), None);
    }
}
