use super::ChemError;
use crate::core::models::molecule::{BondOrder, Molecule};

/// Default upper bound on candidate atom assignments per search.
pub const DEFAULT_STEP_BUDGET: usize = 200_000;

/// Backtracking subgraph matcher for SMILES-notation queries.
///
/// Query atoms are visited in a connected order so that every atom after the
/// first of its fragment is matched against neighbours of an already-mapped
/// atom. The search is bounded by a step budget; running out is reported as an
/// error rather than as "no match".
pub struct SubstructureMatcher<'q> {
    query: &'q Molecule,
    order: Vec<(usize, Option<usize>)>,
    budget: usize,
}

impl<'q> SubstructureMatcher<'q> {
    pub fn new(query: &'q Molecule, budget: usize) -> Self {
        Self {
            query,
            order: connected_order(query),
            budget,
        }
    }

    pub fn is_match(&self, target: &Molecule) -> Result<bool, ChemError> {
        if self.query.atoms().len() > target.atoms().len() {
            return Ok(false);
        }
        let mut search = Search {
            query: self.query,
            target,
            order: &self.order,
            mapping: vec![usize::MAX; self.query.atoms().len()],
            used: vec![false; target.atoms().len()],
            steps: 0,
            budget: self.budget,
        };
        search.extend(0)
    }
}

fn connected_order(query: &Molecule) -> Vec<(usize, Option<usize>)> {
    let n = query.atoms().len();
    let mut seen = vec![false; n];
    let mut order = Vec::with_capacity(n);
    for root in 0..n {
        if seen[root] {
            continue;
        }
        seen[root] = true;
        order.push((root, None));
        let mut cursor = order.len() - 1;
        while cursor < order.len() {
            let (atom, _) = order[cursor];
            for &(next, _) in query.neighbors(atom) {
                if !seen[next] {
                    seen[next] = true;
                    order.push((next, Some(atom)));
                }
            }
            cursor += 1;
        }
    }
    order
}

struct Search<'a> {
    query: &'a Molecule,
    target: &'a Molecule,
    order: &'a [(usize, Option<usize>)],
    mapping: Vec<usize>,
    used: Vec<bool>,
    steps: usize,
    budget: usize,
}

impl Search<'_> {
    fn extend(&mut self, depth: usize) -> Result<bool, ChemError> {
        if depth == self.order.len() {
            return Ok(true);
        }
        let (q_atom, anchor) = self.order[depth];
        let candidates: Vec<usize> = match anchor {
            Some(parent) => self
                .target
                .neighbors(self.mapping[parent])
                .iter()
                .map(|&(t, _)| t)
                .collect(),
            None => (0..self.target.atoms().len()).collect(),
        };

        for t_atom in candidates {
            self.steps += 1;
            if self.steps > self.budget {
                return Err(ChemError::SearchBudgetExceeded {
                    budget: self.budget,
                });
            }
            if self.used[t_atom] || !self.atoms_compatible(q_atom, t_atom) {
                continue;
            }
            if !self.bonds_compatible(q_atom, t_atom) {
                continue;
            }

            self.mapping[q_atom] = t_atom;
            self.used[t_atom] = true;
            if self.extend(depth + 1)? {
                return Ok(true);
            }
            self.used[t_atom] = false;
            self.mapping[q_atom] = usize::MAX;
        }
        Ok(false)
    }

    fn atoms_compatible(&self, q: usize, t: usize) -> bool {
        let qa = &self.query.atoms()[q];
        let ta = &self.target.atoms()[t];
        if qa.element.is_wildcard() {
            return true;
        }
        if qa.element.atomic_number != ta.element.atomic_number || qa.aromatic != ta.aromatic {
            return false;
        }
        if qa.is_bracketed() {
            return qa.charge == ta.charge && qa.hydrogens() == self.target.total_hydrogens(t);
        }
        true
    }

    /// Every query bond from `q` to an already-mapped atom must exist in the target.
    fn bonds_compatible(&self, q: usize, t: usize) -> bool {
        self.query.neighbors(q).iter().all(|&(q_other, q_bond)| {
            let mapped = self.mapping[q_other];
            if mapped == usize::MAX {
                return true;
            }
            let q_order = self.query.bonds()[q_bond].order;
            self.target
                .bond_between(t, mapped)
                .is_some_and(|bond| orders_compatible(q_order, bond.order))
        })
    }
}

fn orders_compatible(query: BondOrder, target: BondOrder) -> bool {
    query == target
}
