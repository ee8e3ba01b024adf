use crate::core::models::element::HYDROGEN_MASS;
use crate::core::models::molecule::{BondOrder, Molecule};

/// Physicochemical descriptors consumed by the rule and constraint stages.
///
/// logP and TPSA are fragment-contribution estimates; they track the trends of
/// the reference methods closely enough for triage but are not reproductions
/// of any particular toolkit's numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptors {
    pub molecular_weight: f64,
    pub logp: f64,
    pub tpsa: f64,
    pub hbd: u32,
    pub hba: u32,
    pub rotatable_bonds: u32,
    pub heavy_atoms: u32,
    pub total_atoms: u32,
    pub rings: u32,
    pub aromatic_rings: u32,
    pub formal_charge: i32,
}

impl Descriptors {
    pub fn compute(mol: &Molecule) -> Self {
        let mut molecular_weight = 0.0;
        let mut total_atoms = 0u32;
        let mut hbd = 0u32;
        let mut hba = 0u32;

        for (idx, atom) in mol.atoms().iter().enumerate() {
            let hydrogens = atom.hydrogens() as u32;
            molecular_weight += atom.element.mass + hydrogens as f64 * HYDROGEN_MASS;
            total_atoms += 1 + hydrogens;

            if matches!(atom.element.atomic_number, 7 | 8) {
                hba += 1;
                hbd += mol.total_hydrogens(idx) as u32;
            }
        }

        Self {
            molecular_weight,
            logp: estimate_logp(mol),
            tpsa: estimate_tpsa(mol),
            hbd,
            hba,
            rotatable_bonds: count_rotatable_bonds(mol),
            heavy_atoms: mol.heavy_atom_count() as u32,
            total_atoms,
            rings: mol.ring_count() as u32,
            aromatic_rings: count_aromatic_rings(mol),
            formal_charge: mol.formal_charge(),
        }
    }
}

/// Single, non-ring bonds between two non-terminal heavy atoms, excluding
/// bonds adjacent to a triple bond.
pub fn count_rotatable_bonds(mol: &Molecule) -> u32 {
    let next_to_triple = |atom: usize| {
        mol.neighbors(atom)
            .iter()
            .any(|&(_, b)| mol.bonds()[b].order == BondOrder::Triple)
    };

    mol.bonds()
        .iter()
        .enumerate()
        .filter(|(idx, bond)| {
            bond.order == BondOrder::Single
                && !mol.is_ring_bond(*idx)
                && mol.heavy_degree(bond.begin) > 1
                && mol.heavy_degree(bond.end) > 1
                && !mol.atoms()[bond.begin].element.is_hydrogen()
                && !mol.atoms()[bond.end].element.is_hydrogen()
                && !next_to_triple(bond.begin)
                && !next_to_triple(bond.end)
        })
        .count() as u32
}

pub fn count_aromatic_rings(mol: &Molecule) -> u32 {
    mol.rings()
        .iter()
        .filter(|ring| ring.iter().all(|&a| mol.atoms()[a].aromatic))
        .count() as u32
}

fn has_double_bond_to_heteroatom(mol: &Molecule, idx: usize) -> bool {
    mol.neighbors(idx).iter().any(|&(other, b)| {
        mol.bonds()[b].order == BondOrder::Double && mol.atoms()[other].element.is_heteroatom()
    })
}

/// Atom-contribution logP estimate in the spirit of Wildman-Crippen.
pub fn estimate_logp(mol: &Molecule) -> f64 {
    let mut logp = 0.0;
    for (idx, atom) in mol.atoms().iter().enumerate() {
        let h = mol.total_hydrogens(idx) as f64;
        let contribution = match atom.element.atomic_number {
            1 => 0.0,
            6 if atom.aromatic => 0.1581 + 0.123 * h,
            6 if has_double_bond_to_heteroatom(mol, idx) => -0.1526 + 0.123 * h,
            6 => {
                let hetero_neighbors = mol
                    .neighbors(idx)
                    .iter()
                    .filter(|&&(o, _)| mol.atoms()[o].element.is_heteroatom())
                    .count() as f64;
                0.1441 + 0.123 * h - 0.2035 * hetero_neighbors
            }
            7 if atom.aromatic => -0.4806 + 0.2142 * h,
            7 if atom.charge > 0 => -1.019,
            7 => -0.5427 + 0.1142 * h,
            8 if atom.aromatic => 0.1552,
            8 if atom.charge < 0 => -1.326,
            8 if mol.heavy_degree(idx) == 1 && h == 0.0 => -0.1526,
            8 => -0.2893 - 0.0743 * h,
            9 => 0.4202,
            15 => 0.8612,
            16 if atom.aromatic => 0.6237,
            16 => 0.6482,
            17 => 0.6895,
            35 => 0.8456,
            53 => 0.8857,
            _ => -0.3,
        };
        logp += contribution;
    }
    logp
}

/// Topological polar surface area from N and O fragment contributions (Å²).
pub fn estimate_tpsa(mol: &Molecule) -> f64 {
    let mut tpsa = 0.0;
    for (idx, atom) in mol.atoms().iter().enumerate() {
        let h = mol.total_hydrogens(idx);
        let degree = mol.heavy_degree(idx);
        let orders: Vec<BondOrder> = mol
            .neighbors(idx)
            .iter()
            .map(|&(_, b)| mol.bonds()[b].order)
            .collect();
        let has = |order: BondOrder| orders.contains(&order);

        tpsa += match atom.element.atomic_number {
            7 if atom.aromatic => {
                if h > 0 {
                    15.79
                } else if degree == 3 {
                    4.41
                } else {
                    12.89
                }
            }
            7 if atom.charge > 0 => match h {
                0 => 0.0,
                1 => 4.44,
                2 => 16.61,
                _ => 27.64,
            },
            7 if has(BondOrder::Triple) => 23.79,
            7 if has(BondOrder::Double) => {
                if h > 0 {
                    23.85
                } else {
                    12.36
                }
            }
            7 => match h {
                0 => 3.24,
                1 => 12.03,
                _ => 26.02,
            },
            8 if atom.aromatic => 13.14,
            8 if atom.charge < 0 => 23.06,
            8 if has(BondOrder::Double) => 17.07,
            8 if h > 0 => 20.23,
            8 => 9.23,
            _ => 0.0,
        };
    }
    tpsa
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::smiles;

    fn descriptors(s: &str) -> Descriptors {
        Descriptors::compute(&smiles::parse(s).unwrap())
    }

    #[test]
    fn ethanol_descriptors() {
        let d = descriptors("CCO");
        assert!((d.molecular_weight - 46.069).abs() < 0.01);
        assert_eq!(d.hbd, 1);
        assert_eq!(d.hba, 1);
        assert_eq!(d.heavy_atoms, 3);
        assert_eq!(d.total_atoms, 9);
        assert_eq!(d.rotatable_bonds, 0);
        assert!((d.tpsa - 20.23).abs() < 1e-9);
    }

    #[test]
    fn aspirin_descriptors() {
        let d = descriptors("CC(=O)Oc1ccccc1C(=O)O");
        assert!((d.molecular_weight - 180.16).abs() < 0.05);
        assert_eq!(d.hbd, 1);
        assert_eq!(d.hba, 4);
        assert_eq!(d.rings, 1);
        assert_eq!(d.aromatic_rings, 1);
        assert_eq!(d.rotatable_bonds, 3);
        assert!((d.tpsa - 63.6).abs() < 0.1);
    }

    #[test]
    fn logp_orders_polar_below_apolar() {
        let hexane = descriptors("CCCCCC").logp;
        let glycerol = descriptors("OCC(O)CO").logp;
        assert!(hexane > 1.5);
        assert!(glycerol < 0.0);
    }

    #[test]
    fn ring_and_triple_bonds_are_not_rotatable() {
        assert_eq!(descriptors("C1CCCCC1").rotatable_bonds, 0);
        assert_eq!(descriptors("CC#CC").rotatable_bonds, 0);
        assert_eq!(descriptors("CCCC").rotatable_bonds, 1);
    }
}
