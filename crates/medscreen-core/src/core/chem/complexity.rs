use crate::core::models::molecule::{BondOrder, Molecule};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityMethod {
    #[default]
    Bertz,
    Whitlock,
    Barone,
}

impl ComplexityMethod {
    pub const ALL: [ComplexityMethod; 3] = [
        ComplexityMethod::Bertz,
        ComplexityMethod::Whitlock,
        ComplexityMethod::Barone,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplexityMethod::Bertz => "bertz",
            ComplexityMethod::Whitlock => "whitlock",
            ComplexityMethod::Barone => "barone",
        }
    }

    pub fn score(&self, mol: &Molecule) -> f64 {
        match self {
            ComplexityMethod::Bertz => bertz(mol),
            ComplexityMethod::Whitlock => whitlock(mol),
            ComplexityMethod::Barone => barone(mol),
        }
    }
}

impl fmt::Display for ComplexityMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComplexityMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bertz" => Ok(ComplexityMethod::Bertz),
            "whitlock" => Ok(ComplexityMethod::Whitlock),
            "barone" => Ok(ComplexityMethod::Barone),
            other => Err(format!(
                "unknown complexity method '{other}' (expected bertz, whitlock or barone)"
            )),
        }
    }
}

/// `n log2 n - Σ n_k log2 n_k` over a partition of `n` items into classes.
fn information_content<K>(classes: &HashMap<K, usize>) -> f64 {
    let n: usize = classes.values().sum();
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    n * n.log2()
        - classes
            .values()
            .map(|&k| {
                let k = k as f64;
                k * k.log2()
            })
            .sum::<f64>()
}

fn multiplicity(order: BondOrder) -> usize {
    match order {
        BondOrder::Single | BondOrder::Aromatic => 1,
        BondOrder::Double => 2,
        BondOrder::Triple => 3,
    }
}

/// Bertz-style complexity: information content of bond connections plus that of atom types.
pub fn bertz(mol: &Molecule) -> f64 {
    let mut connections: HashMap<(String, String, String), usize> = HashMap::new();
    for (center, atom) in mol.atoms().iter().enumerate() {
        if atom.element.is_hydrogen() {
            continue;
        }
        let mut edges: Vec<String> = Vec::new();
        for &(other, bond_idx) in mol.neighbors(center) {
            let neighbor = &mol.atoms()[other];
            if neighbor.element.is_hydrogen() {
                continue;
            }
            let order = mol.bonds()[bond_idx].order;
            let label = format!("{}{:?}", neighbor.element.symbol, order);
            edges.extend(std::iter::repeat_n(label, multiplicity(order)));
        }
        for i in 0..edges.len() {
            for j in (i + 1)..edges.len() {
                let (a, b) = if edges[i] <= edges[j] {
                    (edges[i].clone(), edges[j].clone())
                } else {
                    (edges[j].clone(), edges[i].clone())
                };
                *connections
                    .entry((atom.element.symbol.to_string(), a, b))
                    .or_default() += 1;
            }
        }
    }

    let mut atom_types: HashMap<&str, usize> = HashMap::new();
    for atom in mol.atoms().iter().filter(|a| !a.element.is_hydrogen()) {
        *atom_types.entry(atom.element.symbol).or_default() += 1;
    }

    let eta: usize = connections.values().sum();
    let connection_term = if eta == 0 {
        0.0
    } else {
        eta as f64 * (eta as f64).log2() + information_content(&connections)
    };
    connection_term + information_content(&atom_types)
}

/// Whitlock: 4 per ring, 2 per unsaturation, 1 per heteroatom, 2 per stereocentre.
pub fn whitlock(mol: &Molecule) -> f64 {
    let rings = mol.ring_count();
    let aromatic_bonds = mol
        .bonds()
        .iter()
        .filter(|b| b.order == BondOrder::Aromatic)
        .count();
    let unsaturations: usize = mol
        .bonds()
        .iter()
        .map(|b| b.order.unsaturation() as usize)
        .sum::<usize>()
        + aromatic_bonds / 2;
    let heteroatoms = mol
        .atoms()
        .iter()
        .filter(|a| a.element.is_heteroatom())
        .count();
    let stereocentres = mol.atoms().iter().filter(|a| a.chiral).count();

    (4 * rings + 2 * unsaturations + heteroatoms + 2 * stereocentres) as f64
}

/// Barone–Chanon style: atom-type, connectivity and ring-size contributions.
pub fn barone(mol: &Molecule) -> f64 {
    let atom_term: usize = mol
        .atoms()
        .iter()
        .enumerate()
        .filter(|(_, a)| !a.element.is_hydrogen())
        .map(|(idx, a)| {
            let type_weight = if a.element.is_carbon() { 3 } else { 6 };
            type_weight + 3 * mol.heavy_degree(idx)
        })
        .sum();
    let ring_term: usize = mol.rings().iter().map(|ring| 6 * ring.len()).sum();
    (atom_term + ring_term) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::smiles;

    fn score(method: ComplexityMethod, smi: &str) -> f64 {
        method.score(&smiles::parse(smi).unwrap())
    }

    #[test]
    fn whitlock_counts_benzene_and_pyridine() {
        assert_eq!(score(ComplexityMethod::Whitlock, "c1ccccc1"), 10.0);
        assert_eq!(score(ComplexityMethod::Whitlock, "c1ccncc1"), 11.0);
        assert_eq!(score(ComplexityMethod::Whitlock, "C[C@H](N)C(=O)O"), 2.0 + 3.0 + 2.0);
    }

    #[test]
    fn barone_of_ethane() {
        // Two carbons, each 3 + 3·1.
        assert_eq!(score(ComplexityMethod::Barone, "CC"), 12.0);
    }

    #[test]
    fn bertz_grows_with_size_and_heterogeneity() {
        let methane = score(ComplexityMethod::Bertz, "C");
        let butane = score(ComplexityMethod::Bertz, "CCCC");
        let aspirin = score(ComplexityMethod::Bertz, "CC(=O)Oc1ccccc1C(=O)O");
        assert_eq!(methane, 0.0);
        assert!(butane > methane);
        assert!(aspirin > 10.0 * butane);
    }

    #[test]
    fn every_method_is_monotonic_on_a_homologous_pair() {
        for method in ComplexityMethod::ALL {
            let small = score(method, "c1ccccc1");
            let large = score(method, "c1ccc2ccccc2c1");
            assert!(large > small, "{method}: {large} <= {small}");
        }
    }

    #[test]
    fn method_names_round_trip() {
        for method in ComplexityMethod::ALL {
            assert_eq!(method.as_str().parse::<ComplexityMethod>(), Ok(method));
        }
        assert!("spacial".parse::<ComplexityMethod>().is_err());
    }
}
