use super::element::Element;
use std::collections::{HashSet, VecDeque};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BondOrder {
    Single,
    Double,
    Triple,
    Aromatic,
}

impl BondOrder {
    /// Integer contribution to the valence of each endpoint. Aromatic bonds count
    /// as one here; the extra pi electron is added per atom during perception.
    pub fn valence_units(self) -> u8 {
        match self {
            BondOrder::Single | BondOrder::Aromatic => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
        }
    }

    /// Number of pi bonds contributed, used for unsaturation counts.
    pub fn unsaturation(self) -> u8 {
        match self {
            BondOrder::Single | BondOrder::Aromatic => 0,
            BondOrder::Double => 1,
            BondOrder::Triple => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub element: Element,
    pub aromatic: bool,
    pub charge: i8,
    pub isotope: Option<u16>,
    /// Hydrogen count written explicitly in a bracket atom. `None` means the
    /// count is perceived from the default valence.
    pub explicit_hydrogens: Option<u8>,
    pub chiral: bool,
    implicit_hydrogens: u8,
}

impl Atom {
    pub fn new(element: Element) -> Self {
        Self {
            element,
            aromatic: false,
            charge: 0,
            isotope: None,
            explicit_hydrogens: None,
            chiral: false,
            implicit_hydrogens: 0,
        }
    }

    pub fn aromatic(mut self, aromatic: bool) -> Self {
        self.aromatic = aromatic;
        self
    }

    pub fn with_charge(mut self, charge: i8) -> Self {
        self.charge = charge;
        self
    }

    pub fn with_hydrogens(mut self, count: u8) -> Self {
        self.explicit_hydrogens = Some(count);
        self
    }

    pub fn with_chirality(mut self, chiral: bool) -> Self {
        self.chiral = chiral;
        self
    }

    pub fn is_bracketed(&self) -> bool {
        self.explicit_hydrogens.is_some()
    }

    /// Hydrogens attached to this atom that are not graph atoms themselves.
    pub fn hydrogens(&self) -> u8 {
        self.explicit_hydrogens.unwrap_or(self.implicit_hydrogens)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bond {
    pub begin: usize,
    pub end: usize,
    pub order: BondOrder,
}

impl Bond {
    pub fn new(begin: usize, end: usize, order: BondOrder) -> Self {
        Self { begin, end, order }
    }

    pub fn other(&self, atom: usize) -> usize {
        if self.begin == atom {
            self.end
        } else {
            self.begin
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoleculeError {
    #[error("Bond {bond} references atom {atom}, but the molecule has only {count} atoms")]
    AtomIndex {
        bond: usize,
        atom: usize,
        count: usize,
    },
    #[error("Bond {0} connects an atom to itself")]
    SelfBond(usize),
    #[error("Atoms {0} and {1} are bonded more than once")]
    DuplicateBond(usize, usize),
    #[error("Explicit valence {valence} exceeds the allowed valence of {symbol} (atom {atom})")]
    Valence {
        atom: usize,
        symbol: &'static str,
        valence: u8,
    },
    #[error("Molecule contains no atoms")]
    Empty,
}

/// A connection table with perceived hydrogens and ring membership.
///
/// Molecules are immutable once built; every derived property (implicit
/// hydrogens, ring bonds, smallest rings) is computed in the constructor.
#[derive(Debug, Clone, PartialEq)]
pub struct Molecule {
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
    adjacency: Vec<Vec<(usize, usize)>>,
    ring_bonds: Vec<bool>,
    rings: Vec<Vec<usize>>,
    components: usize,
}

impl Molecule {
    /// Builds a molecule and perceives implicit hydrogens from default valences.
    pub fn new(atoms: Vec<Atom>, bonds: Vec<Bond>) -> Result<Self, MoleculeError> {
        let mut molecule = Self::assemble(atoms, bonds)?;
        molecule.perceive_hydrogens()?;
        Ok(molecule)
    }

    /// Builds a substructure query. No valence checks and no implicit hydrogens.
    pub fn new_query(atoms: Vec<Atom>, bonds: Vec<Bond>) -> Result<Self, MoleculeError> {
        Self::assemble(atoms, bonds)
    }

    fn assemble(atoms: Vec<Atom>, bonds: Vec<Bond>) -> Result<Self, MoleculeError> {
        if atoms.is_empty() {
            return Err(MoleculeError::Empty);
        }

        let mut adjacency = vec![Vec::new(); atoms.len()];
        let mut seen = HashSet::with_capacity(bonds.len());
        for (idx, bond) in bonds.iter().enumerate() {
            for atom in [bond.begin, bond.end] {
                if atom >= atoms.len() {
                    return Err(MoleculeError::AtomIndex {
                        bond: idx,
                        atom,
                        count: atoms.len(),
                    });
                }
            }
            if bond.begin == bond.end {
                return Err(MoleculeError::SelfBond(idx));
            }
            let key = (bond.begin.min(bond.end), bond.begin.max(bond.end));
            if !seen.insert(key) {
                return Err(MoleculeError::DuplicateBond(key.0, key.1));
            }
            adjacency[bond.begin].push((bond.end, idx));
            adjacency[bond.end].push((bond.begin, idx));
        }

        let mut molecule = Self {
            ring_bonds: vec![false; bonds.len()],
            atoms,
            bonds,
            adjacency,
            rings: Vec::new(),
            components: 0,
        };
        molecule.components = molecule.count_components();
        molecule.perceive_rings();
        Ok(molecule)
    }

    fn perceive_hydrogens(&mut self) -> Result<(), MoleculeError> {
        for idx in 0..self.atoms.len() {
            if self.atoms[idx].is_bracketed() {
                continue;
            }
            let atom = &self.atoms[idx];
            let mut used: u8 = 0;
            let mut aromatic_bonds = 0;
            for &(_, bond_idx) in &self.adjacency[idx] {
                let order = self.bonds[bond_idx].order;
                if order == BondOrder::Aromatic {
                    aromatic_bonds += 1;
                }
                used += order.valence_units();
            }
            // Aromatic C, N, B and P carry one extra pi bond; O, S and Se donate a lone pair.
            if atom.aromatic
                && aromatic_bonds > 0
                && matches!(atom.element.atomic_number, 5 | 6 | 7 | 15)
            {
                used += 1;
            }

            let valences = atom.element.valences;
            if valences.is_empty() {
                continue;
            }
            let target = valences.iter().copied().find(|&v| v >= used).ok_or(
                MoleculeError::Valence {
                    atom: idx,
                    symbol: atom.element.symbol,
                    valence: used,
                },
            )?;
            self.atoms[idx].implicit_hydrogens = target - used;
        }
        Ok(())
    }

    fn count_components(&self) -> usize {
        let mut visited = vec![false; self.atoms.len()];
        let mut count = 0;
        for start in 0..self.atoms.len() {
            if visited[start] {
                continue;
            }
            count += 1;
            let mut queue = VecDeque::from([start]);
            visited[start] = true;
            while let Some(atom) = queue.pop_front() {
                for &(next, _) in &self.adjacency[atom] {
                    if !visited[next] {
                        visited[next] = true;
                        queue.push_back(next);
                    }
                }
            }
        }
        count
    }

    /// Shortest path between the endpoints of `excluded`, not using that bond.
    fn shortest_cycle_through(&self, excluded: usize) -> Option<Vec<usize>> {
        let Bond { begin, end, .. } = self.bonds[excluded];
        let mut parent = vec![usize::MAX; self.atoms.len()];
        parent[begin] = begin;
        let mut queue = VecDeque::from([begin]);
        while let Some(atom) = queue.pop_front() {
            if atom == end {
                let mut path = vec![end];
                let mut cursor = end;
                while cursor != begin {
                    cursor = parent[cursor];
                    path.push(cursor);
                }
                return Some(path);
            }
            for &(next, bond_idx) in &self.adjacency[atom] {
                if bond_idx != excluded && parent[next] == usize::MAX {
                    parent[next] = atom;
                    queue.push_back(next);
                }
            }
        }
        None
    }

    fn perceive_rings(&mut self) {
        let mut candidates: Vec<Vec<usize>> = Vec::new();
        let mut seen: HashSet<Vec<usize>> = HashSet::new();
        for bond_idx in 0..self.bonds.len() {
            if let Some(ring) = self.shortest_cycle_through(bond_idx) {
                self.ring_bonds[bond_idx] = true;
                let mut key = ring.clone();
                key.sort_unstable();
                if seen.insert(key) {
                    candidates.push(ring);
                }
            }
        }

        let cyclomatic = (self.bonds.len() + self.components).saturating_sub(self.atoms.len());
        candidates.sort_by_key(Vec::len);

        let mut covered: HashSet<(usize, usize)> = HashSet::new();
        for ring in candidates {
            if self.rings.len() == cyclomatic {
                break;
            }
            let edges: Vec<(usize, usize)> = ring
                .iter()
                .zip(ring.iter().cycle().skip(1))
                .map(|(&a, &b)| (a.min(b), a.max(b)))
                .collect();
            if edges.iter().any(|edge| !covered.contains(edge)) {
                covered.extend(edges);
                self.rings.push(ring);
            }
        }
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn atom(&self, idx: usize) -> Option<&Atom> {
        self.atoms.get(idx)
    }

    /// Neighbouring atoms paired with the index of the connecting bond.
    pub fn neighbors(&self, idx: usize) -> &[(usize, usize)] {
        &self.adjacency[idx]
    }

    pub fn bond_between(&self, a: usize, b: usize) -> Option<&Bond> {
        self.adjacency[a]
            .iter()
            .find(|&&(other, _)| other == b)
            .map(|&(_, bond_idx)| &self.bonds[bond_idx])
    }

    /// Number of non-hydrogen neighbours.
    pub fn heavy_degree(&self, idx: usize) -> usize {
        self.adjacency[idx]
            .iter()
            .filter(|&&(other, _)| !self.atoms[other].element.is_hydrogen())
            .count()
    }

    /// Attached hydrogens, whether implicit, bracketed or explicit graph atoms.
    pub fn total_hydrogens(&self, idx: usize) -> u8 {
        let graph_hydrogens = self.adjacency[idx]
            .iter()
            .filter(|&&(other, _)| self.atoms[other].element.is_hydrogen())
            .count() as u8;
        self.atoms[idx].hydrogens() + graph_hydrogens
    }

    pub fn heavy_atom_count(&self) -> usize {
        self.atoms
            .iter()
            .filter(|a| !a.element.is_hydrogen())
            .count()
    }

    pub fn formal_charge(&self) -> i32 {
        self.atoms.iter().map(|a| a.charge as i32).sum()
    }

    pub fn is_ring_bond(&self, bond_idx: usize) -> bool {
        self.ring_bonds[bond_idx]
    }

    pub fn is_ring_atom(&self, idx: usize) -> bool {
        self.adjacency[idx]
            .iter()
            .any(|&(_, bond_idx)| self.ring_bonds[bond_idx])
    }

    /// Smallest set of smallest rings, each as an ordered atom cycle.
    pub fn rings(&self) -> &[Vec<usize>] {
        &self.rings
    }

    pub fn ring_count(&self) -> usize {
        self.rings.len()
    }

    pub fn fragment_count(&self) -> usize {
        self.components
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn el(symbol: &str) -> Element {
        Element::from_symbol(symbol).unwrap()
    }

    fn chain(symbols: &[&str]) -> Molecule {
        let atoms = symbols.iter().map(|s| Atom::new(el(s))).collect();
        let bonds = (1..symbols.len())
            .map(|i| Bond::new(i - 1, i, BondOrder::Single))
            .collect();
        Molecule::new(atoms, bonds).unwrap()
    }

    fn benzene() -> Molecule {
        let atoms = (0..6).map(|_| Atom::new(el("C")).aromatic(true)).collect();
        let bonds = (0..6)
            .map(|i| Bond::new(i, (i + 1) % 6, BondOrder::Aromatic))
            .collect();
        Molecule::new(atoms, bonds).unwrap()
    }

    #[test]
    fn perceives_implicit_hydrogens_on_ethanol() {
        let mol = chain(&["C", "C", "O"]);
        assert_eq!(mol.total_hydrogens(0), 3);
        assert_eq!(mol.total_hydrogens(1), 2);
        assert_eq!(mol.total_hydrogens(2), 1);
    }

    #[test]
    fn aromatic_carbons_get_one_hydrogen() {
        let mol = benzene();
        assert!((0..6).all(|i| mol.total_hydrogens(i) == 1));
        assert_eq!(mol.ring_count(), 1);
        assert!(mol.is_ring_bond(0));
    }

    #[test]
    fn chain_has_no_rings() {
        let mol = chain(&["C", "C", "C", "C"]);
        assert_eq!(mol.ring_count(), 0);
        assert!(!mol.is_ring_atom(1));
        assert_eq!(mol.fragment_count(), 1);
    }

    #[test]
    fn pentavalent_carbon_is_rejected() {
        let atoms = (0..6).map(|_| Atom::new(el("C"))).collect();
        let bonds = (1..6).map(|i| Bond::new(0, i, BondOrder::Single)).collect();
        let err = Molecule::new(atoms, bonds).unwrap_err();
        assert!(matches!(err, MoleculeError::Valence { atom: 0, .. }));
    }

    #[test]
    fn bracket_hydrogens_are_not_perceived() {
        let atoms = vec![Atom::new(el("N")).with_hydrogens(4).with_charge(1)];
        let mol = Molecule::new(atoms, vec![]).unwrap();
        assert_eq!(mol.total_hydrogens(0), 4);
        assert_eq!(mol.formal_charge(), 1);
    }

    #[test]
    fn rejects_duplicate_and_dangling_bonds() {
        let atoms = vec![Atom::new(el("C")), Atom::new(el("C"))];
        let dup = vec![
            Bond::new(0, 1, BondOrder::Single),
            Bond::new(1, 0, BondOrder::Single),
        ];
        assert_eq!(
            Molecule::new(atoms.clone(), dup).unwrap_err(),
            MoleculeError::DuplicateBond(0, 1)
        );
        let dangling = vec![Bond::new(0, 5, BondOrder::Single)];
        assert!(matches!(
            Molecule::new(atoms, dangling).unwrap_err(),
            MoleculeError::AtomIndex { atom: 5, .. }
        ));
    }

    #[test]
    fn fused_rings_are_counted_once_each() {
        // Naphthalene skeleton: two six-membered rings sharing bond 0-5.
        let atoms = (0..10).map(|_| Atom::new(el("C")).aromatic(true)).collect();
        let mut bonds: Vec<Bond> = (0..6)
            .map(|i| Bond::new(i, (i + 1) % 6, BondOrder::Aromatic))
            .collect();
        bonds.extend([
            Bond::new(5, 6, BondOrder::Aromatic),
            Bond::new(6, 7, BondOrder::Aromatic),
            Bond::new(7, 8, BondOrder::Aromatic),
            Bond::new(8, 9, BondOrder::Aromatic),
            Bond::new(9, 0, BondOrder::Aromatic),
        ]);
        let mol = Molecule::new(atoms, bonds).unwrap();
        assert_eq!(mol.ring_count(), 2);
        assert!(mol.rings().iter().all(|r| r.len() == 6));
        assert_eq!(mol.total_hydrogens(0), 0);
        assert_eq!(mol.total_hydrogens(1), 1);
    }
}
