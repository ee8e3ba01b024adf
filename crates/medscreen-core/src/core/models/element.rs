use phf::phf_map;

/// Static properties of a chemical element needed by the descriptor and
/// hydrogen-perception code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Element {
    pub symbol: &'static str,
    pub atomic_number: u8,
    pub mass: f64,
    /// Allowed neutral valences, smallest first. Empty for elements that never
    /// receive implicit hydrogens.
    pub valences: &'static [u8],
}

impl Element {
    /// The `*` pattern atom. Only ever appears in substructure queries.
    pub const WILDCARD: Element = Element {
        symbol: "*",
        atomic_number: 0,
        mass: 0.0,
        valences: &[],
    };

    pub fn from_symbol(symbol: &str) -> Option<Element> {
        ELEMENTS.get(symbol).copied()
    }

    pub fn is_wildcard(&self) -> bool {
        self.atomic_number == 0
    }

    pub fn is_carbon(&self) -> bool {
        self.atomic_number == 6
    }

    pub fn is_hydrogen(&self) -> bool {
        self.atomic_number == 1
    }

    pub fn is_halogen(&self) -> bool {
        matches!(self.atomic_number, 9 | 17 | 35 | 53)
    }

    /// Heteroatom in the medicinal-chemistry sense: any heavy atom that is not carbon.
    pub fn is_heteroatom(&self) -> bool {
        !self.is_carbon() && !self.is_hydrogen() && !self.is_wildcard()
    }

    /// Elements that may be written without brackets in SMILES.
    pub fn is_organic_subset(&self) -> bool {
        matches!(self.atomic_number, 5 | 6 | 7 | 8 | 9 | 15 | 16 | 17 | 35 | 53)
    }
}

pub const HYDROGEN_MASS: f64 = 1.008;

macro_rules! element {
    ($sym:literal, $z:literal, $mass:literal, [$($v:literal),*]) => {
        Element {
            symbol: $sym,
            atomic_number: $z,
            mass: $mass,
            valences: &[$($v),*],
        }
    };
}

static ELEMENTS: phf::Map<&'static str, Element> = phf_map! {
    "H" => element!("H", 1, 1.008, [1]),
    "He" => element!("He", 2, 4.003, []),
    "Li" => element!("Li", 3, 6.941, []),
    "Be" => element!("Be", 4, 9.012, []),
    "B" => element!("B", 5, 10.811, [3]),
    "C" => element!("C", 6, 12.011, [4]),
    "N" => element!("N", 7, 14.007, [3, 5]),
    "O" => element!("O", 8, 15.999, [2]),
    "F" => element!("F", 9, 18.998, [1]),
    "Ne" => element!("Ne", 10, 20.180, []),
    "Na" => element!("Na", 11, 22.990, []),
    "Mg" => element!("Mg", 12, 24.305, []),
    "Al" => element!("Al", 13, 26.982, []),
    "Si" => element!("Si", 14, 28.086, [4]),
    "P" => element!("P", 15, 30.974, [3, 5]),
    "S" => element!("S", 16, 32.065, [2, 4, 6]),
    "Cl" => element!("Cl", 17, 35.453, [1]),
    "Ar" => element!("Ar", 18, 39.948, []),
    "K" => element!("K", 19, 39.098, []),
    "Ca" => element!("Ca", 20, 40.078, []),
    "Fe" => element!("Fe", 26, 55.845, []),
    "Co" => element!("Co", 27, 58.933, []),
    "Ni" => element!("Ni", 28, 58.693, []),
    "Cu" => element!("Cu", 29, 63.546, []),
    "Zn" => element!("Zn", 30, 65.380, []),
    "Ge" => element!("Ge", 32, 72.630, [4]),
    "As" => element!("As", 33, 74.922, [3, 5]),
    "Se" => element!("Se", 34, 78.971, [2, 4, 6]),
    "Br" => element!("Br", 35, 79.904, [1]),
    "Sn" => element!("Sn", 50, 118.710, []),
    "Te" => element!("Te", 52, 127.600, [2, 4, 6]),
    "I" => element!("I", 53, 126.904, [1, 3, 5]),
    "Pt" => element!("Pt", 78, 195.084, []),
    "Hg" => element!("Hg", 80, 200.592, []),
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_common_elements() {
        let c = Element::from_symbol("C").unwrap();
        assert_eq!(c.atomic_number, 6);
        assert!(c.is_carbon());
        assert!(c.is_organic_subset());

        let cl = Element::from_symbol("Cl").unwrap();
        assert!(cl.is_halogen());
        assert!(cl.is_heteroatom());
    }

    #[test]
    fn unknown_symbol_is_none() {
        assert!(Element::from_symbol("Xx").is_none());
        assert!(Element::from_symbol("c").is_none());
    }

    #[test]
    fn wildcard_is_neither_carbon_nor_heteroatom() {
        assert!(Element::WILDCARD.is_wildcard());
        assert!(!Element::WILDCARD.is_heteroatom());
        assert!(!Element::WILDCARD.is_carbon());
    }
}
