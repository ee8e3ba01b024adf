use crate::core::models::element::Element;
use crate::core::models::molecule::{Atom, Bond, BondOrder, Molecule, MoleculeError};
use std::collections::HashMap;
use std::fmt::Write;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SmilesError {
    #[error("Empty SMILES string")]
    Empty,
    #[error("Unexpected character '{ch}' at position {position}")]
    UnexpectedChar { ch: char, position: usize },
    #[error("Unknown element '{symbol}' at position {position}")]
    UnknownElement { symbol: String, position: usize },
    #[error("Unclosed bracket atom starting at position {0}")]
    UnclosedBracket(usize),
    #[error("Unbalanced parenthesis at position {0}")]
    UnbalancedParenthesis(usize),
    #[error("Ring closure {0} was opened but never closed")]
    UnclosedRing(u32),
    #[error("Bond symbol at position {0} is not followed by an atom")]
    DanglingBond(usize),
    #[error("Number '{number}' at position {position} is out of range")]
    NumberOutOfRange { number: String, position: usize },
    #[error("Atom charge out of range at position {0}")]
    ChargeOutOfRange(usize),
    #[error("Invalid structure: {0}")]
    Structure(#[from] MoleculeError),
}

/// Parses a SMILES string into a molecule with perceived hydrogens.
pub fn parse(smiles: &str) -> Result<Molecule, SmilesError> {
    let (atoms, bonds) = Parser::new(smiles, false).run()?;
    Ok(Molecule::new(atoms, bonds)?)
}

/// Parses a substructure query written in SMILES notation. `*` matches any atom.
pub fn parse_query(pattern: &str) -> Result<Molecule, SmilesError> {
    let (atoms, bonds) = Parser::new(pattern, true).run()?;
    Ok(Molecule::new_query(atoms, bonds)?)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    allow_wildcard: bool,
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
}

struct RingOpening {
    atom: usize,
    order: Option<BondOrder>,
}

impl Parser {
    fn new(source: &str, allow_wildcard: bool) -> Self {
        Self {
            chars: source.trim().chars().collect(),
            pos: 0,
            allow_wildcard,
            atoms: Vec::new(),
            bonds: Vec::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn run(mut self) -> Result<(Vec<Atom>, Vec<Bond>), SmilesError> {
        if self.chars.is_empty() {
            return Err(SmilesError::Empty);
        }

        let mut previous: Option<usize> = None;
        let mut branch_stack: Vec<Option<usize>> = Vec::new();
        let mut pending_bond: Option<(BondOrder, usize)> = None;
        let mut rings: HashMap<u32, RingOpening> = HashMap::new();

        while let Some(ch) = self.peek() {
            let start = self.pos;
            match ch {
                '(' => {
                    if previous.is_none() {
                        return Err(SmilesError::UnbalancedParenthesis(start));
                    }
                    branch_stack.push(previous);
                    self.pos += 1;
                }
                ')' => {
                    if pending_bond.is_some() {
                        return Err(SmilesError::DanglingBond(start));
                    }
                    previous = branch_stack
                        .pop()
                        .ok_or(SmilesError::UnbalancedParenthesis(start))?;
                    self.pos += 1;
                }
                '.' => {
                    if pending_bond.is_some() {
                        return Err(SmilesError::DanglingBond(start));
                    }
                    previous = None;
                    self.pos += 1;
                }
                '-' | '=' | '#' | ':' | '/' | '\\' => {
                    let order = match ch {
                        '=' => BondOrder::Double,
                        '#' => BondOrder::Triple,
                        ':' => BondOrder::Aromatic,
                        _ => BondOrder::Single,
                    };
                    if previous.is_none() || pending_bond.is_some() {
                        return Err(SmilesError::UnexpectedChar { ch, position: start });
                    }
                    pending_bond = Some((order, start));
                    self.pos += 1;
                }
                '0'..='9' | '%' => {
                    let Some(current) = previous else {
                        return Err(SmilesError::UnexpectedChar { ch, position: start });
                    };
                    let label = self.ring_label()?;
                    let order = pending_bond.take().map(|(o, _)| o);
                    match rings.remove(&label) {
                        Some(opening) => {
                            let order = order
                                .or(opening.order)
                                .unwrap_or_else(|| self.default_order(opening.atom, current));
                            self.bonds.push(Bond::new(opening.atom, current, order));
                        }
                        None => {
                            rings.insert(
                                label,
                                RingOpening {
                                    atom: current,
                                    order,
                                },
                            );
                        }
                    }
                }
                _ => {
                    let atom = if ch == '[' {
                        self.bracket_atom()?
                    } else {
                        self.organic_atom()?
                    };
                    let idx = self.atoms.len();
                    self.atoms.push(atom);
                    if let Some(prev) = previous {
                        let order = pending_bond
                            .take()
                            .map(|(o, _)| o)
                            .unwrap_or_else(|| self.default_order(prev, idx));
                        self.bonds.push(Bond::new(prev, idx, order));
                    }
                    previous = Some(idx);
                }
            }
        }

        if let Some((_, position)) = pending_bond {
            return Err(SmilesError::DanglingBond(position));
        }
        if !branch_stack.is_empty() {
            return Err(SmilesError::UnbalancedParenthesis(self.chars.len()));
        }
        if let Some(label) = rings.keys().min() {
            return Err(SmilesError::UnclosedRing(*label));
        }
        Ok((self.atoms, self.bonds))
    }

    fn default_order(&self, a: usize, b: usize) -> BondOrder {
        if self.atoms[a].aromatic && self.atoms[b].aromatic {
            BondOrder::Aromatic
        } else {
            BondOrder::Single
        }
    }

    fn ring_label(&mut self) -> Result<u32, SmilesError> {
        let start = self.pos;
        if self.peek() == Some('%') {
            self.pos += 1;
            let digits: String = self.chars.iter().skip(self.pos).take(2).collect();
            if digits.len() != 2 || !digits.chars().all(|c| c.is_ascii_digit()) {
                return Err(SmilesError::UnexpectedChar {
                    ch: '%',
                    position: start,
                });
            }
            self.pos += 2;
            return digits
                .parse()
                .map_err(|_| SmilesError::UnexpectedChar { ch: '%', position: start });
        }
        let digit = self.chars[self.pos];
        self.pos += 1;
        Ok(digit.to_digit(10).unwrap_or_default())
    }

    fn organic_atom(&mut self) -> Result<Atom, SmilesError> {
        let start = self.pos;
        let ch = self.chars[self.pos];
        if ch == '*' {
            self.pos += 1;
            return self.wildcard(start);
        }

        let two: String = self.chars.iter().skip(self.pos).take(2).collect();
        if two == "Cl" || two == "Br" {
            self.pos += 2;
            return Ok(Atom::new(self.element(&two, start)?));
        }

        self.pos += 1;
        match ch {
            'B' | 'C' | 'N' | 'O' | 'P' | 'S' | 'F' | 'I' => {
                Ok(Atom::new(self.element(&ch.to_string(), start)?))
            }
            'b' | 'c' | 'n' | 'o' | 'p' | 's' => {
                let symbol = ch.to_ascii_uppercase().to_string();
                Ok(Atom::new(self.element(&symbol, start)?).aromatic(true))
            }
            _ => Err(SmilesError::UnexpectedChar { ch, position: start }),
        }
    }

    fn wildcard(&self, position: usize) -> Result<Atom, SmilesError> {
        if self.allow_wildcard {
            Ok(Atom::new(Element::WILDCARD))
        } else {
            Err(SmilesError::UnexpectedChar { ch: '*', position })
        }
    }

    fn element(&self, symbol: &str, position: usize) -> Result<Element, SmilesError> {
        Element::from_symbol(symbol).ok_or_else(|| SmilesError::UnknownElement {
            symbol: symbol.to_string(),
            position,
        })
    }

    /// Reads a run of digits, failing when the number does not fit in `T`.
    fn read_number<T: TryFrom<u32>>(&mut self) -> Result<Option<T>, SmilesError> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        if start == self.pos {
            return Ok(None);
        }
        let digits: String = self.chars[start..self.pos].iter().collect();
        digits
            .parse::<u32>()
            .ok()
            .and_then(|n| T::try_from(n).ok())
            .map(Some)
            .ok_or(SmilesError::NumberOutOfRange {
                number: digits,
                position: start,
            })
    }

    fn bracket_atom(&mut self) -> Result<Atom, SmilesError> {
        let open = self.pos;
        let close = self.chars[open..]
            .iter()
            .position(|&c| c == ']')
            .map(|offset| open + offset)
            .ok_or(SmilesError::UnclosedBracket(open))?;
        self.pos += 1;

        let isotope = self.read_number::<u16>()?;

        let symbol_start = self.pos;
        let mut atom = match self.peek() {
            Some('*') => {
                self.pos += 1;
                self.wildcard(symbol_start)?
            }
            Some(c) if c.is_ascii_lowercase() => {
                let two: String = self.chars[self.pos..close].iter().take(2).collect();
                let symbol = if two == "se" || two == "as" {
                    self.pos += 2;
                    let mut s = two.clone();
                    s[..1].make_ascii_uppercase();
                    s
                } else {
                    self.pos += 1;
                    c.to_ascii_uppercase().to_string()
                };
                Atom::new(self.element(&symbol, symbol_start)?).aromatic(true)
            }
            Some(c) if c.is_ascii_uppercase() => {
                self.pos += 1;
                let mut symbol = c.to_string();
                if let Some(next) = self.peek().filter(|n| n.is_ascii_lowercase()) {
                    let candidate = format!("{c}{next}");
                    if Element::from_symbol(&candidate).is_some() {
                        symbol = candidate;
                        self.pos += 1;
                    }
                }
                Atom::new(self.element(&symbol, symbol_start)?)
            }
            Some(c) => {
                return Err(SmilesError::UnexpectedChar {
                    ch: c,
                    position: self.pos,
                });
            }
            None => return Err(SmilesError::UnclosedBracket(open)),
        };
        atom.isotope = isotope;

        let mut chiral = false;
        while self.peek() == Some('@') {
            chiral = true;
            self.pos += 1;
        }
        atom = atom.with_chirality(chiral);

        let mut hydrogens = 0u8;
        if self.peek() == Some('H') {
            self.pos += 1;
            hydrogens = self.read_number::<u8>()?.unwrap_or(1);
        }
        atom = atom.with_hydrogens(hydrogens);

        let mut charge: i8 = 0;
        while let Some(sign @ ('+' | '-')) = self.peek() {
            let position = self.pos;
            self.pos += 1;
            let magnitude = self.read_number::<i8>()?.unwrap_or(1);
            let delta = if sign == '+' { magnitude } else { -magnitude };
            charge = charge
                .checked_add(delta)
                .ok_or(SmilesError::ChargeOutOfRange(position))?;
        }
        atom = atom.with_charge(charge);

        // Atom class, ignored.
        if self.peek() == Some(':') {
            self.pos += 1;
            self.read_number::<u32>()?;
        }

        if self.pos != close {
            return Err(SmilesError::UnexpectedChar {
                ch: self.chars[self.pos],
                position: self.pos,
            });
        }
        self.pos = close + 1;
        Ok(atom)
    }
}

/// Writes a (non-canonical) SMILES string by depth-first traversal.
pub fn write(molecule: &Molecule) -> String {
    let n = molecule.atoms().len();
    let mut order = vec![usize::MAX; n];
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut tree_bond = vec![false; molecule.bonds().len()];
    let mut roots = Vec::new();
    let mut counter = 0;

    for root in 0..n {
        if order[root] != usize::MAX {
            continue;
        }
        roots.push(root);
        let mut stack = vec![(root, usize::MAX)];
        while let Some((atom, via)) = stack.pop() {
            if order[atom] != usize::MAX {
                continue;
            }
            order[atom] = counter;
            counter += 1;
            if via != usize::MAX {
                tree_bond[via] = true;
                children[molecule.bonds()[via].other(atom)].push(atom);
            }
            for &(next, bond_idx) in molecule.neighbors(atom).iter().rev() {
                if order[next] == usize::MAX {
                    stack.push((next, bond_idx));
                }
            }
        }
    }

    let mut openings: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut closings: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (idx, bond) in molecule.bonds().iter().enumerate() {
        if tree_bond[idx] {
            continue;
        }
        let (first, second) = if order[bond.begin] < order[bond.end] {
            (bond.begin, bond.end)
        } else {
            (bond.end, bond.begin)
        };
        openings[first].push(idx);
        closings[second].push(idx);
    }

    let mut writer = Writer {
        molecule,
        children,
        openings,
        closings,
        labels: HashMap::new(),
        in_use: Vec::new(),
        out: String::new(),
    };
    for (i, root) in roots.into_iter().enumerate() {
        if i > 0 {
            writer.out.push('.');
        }
        writer.emit(root);
    }
    writer.out
}

struct Writer<'a> {
    molecule: &'a Molecule,
    children: Vec<Vec<usize>>,
    openings: Vec<Vec<usize>>,
    closings: Vec<Vec<usize>>,
    labels: HashMap<usize, u32>,
    in_use: Vec<u32>,
    out: String,
}

impl Writer<'_> {
    fn emit(&mut self, atom: usize) {
        self.write_atom(atom);

        for bond_idx in self.closings[atom].clone() {
            if let Some(label) = self.labels.remove(&bond_idx) {
                self.in_use.retain(|&l| l != label);
                self.write_label(label);
            }
        }
        for bond_idx in self.openings[atom].clone() {
            let label = (1..).find(|l| !self.in_use.contains(l)).unwrap_or(1);
            self.in_use.push(label);
            self.labels.insert(bond_idx, label);
            let bond = self.molecule.bonds()[bond_idx];
            self.write_bond(&bond);
            self.write_label(label);
        }

        let children = self.children[atom].clone();
        let last = children.len().saturating_sub(1);
        for (i, child) in children.into_iter().enumerate() {
            if i < last {
                self.out.push('(');
            }
            if let Some(bond) = self.molecule.bond_between(atom, child).copied() {
                self.write_bond(&bond);
            }
            self.emit(child);
            if i < last {
                self.out.push(')');
            }
        }
    }

    fn write_label(&mut self, label: u32) {
        if label < 10 {
            let _ = write!(self.out, "{label}");
        } else {
            let _ = write!(self.out, "%{label:02}");
        }
    }

    fn write_bond(&mut self, bond: &Bond) {
        let both_aromatic = self.molecule.atoms()[bond.begin].aromatic
            && self.molecule.atoms()[bond.end].aromatic;
        match bond.order {
            BondOrder::Double => self.out.push('='),
            BondOrder::Triple => self.out.push('#'),
            BondOrder::Single if both_aromatic => self.out.push('-'),
            BondOrder::Aromatic if !both_aromatic => self.out.push(':'),
            _ => {}
        }
    }

    fn write_atom(&mut self, idx: usize) {
        let atom = &self.molecule.atoms()[idx];
        let symbol = if atom.aromatic {
            atom.element.symbol.to_ascii_lowercase()
        } else {
            atom.element.symbol.to_string()
        };
        let needs_bracket = atom.is_bracketed()
            || atom.charge != 0
            || atom.isotope.is_some()
            || !(atom.element.is_organic_subset() || atom.element.is_wildcard());
        if !needs_bracket {
            self.out.push_str(&symbol);
            return;
        }

        self.out.push('[');
        if let Some(isotope) = atom.isotope {
            let _ = write!(self.out, "{isotope}");
        }
        self.out.push_str(&symbol);
        if atom.chiral {
            self.out.push('@');
        }
        match atom.hydrogens() {
            0 => {}
            1 => self.out.push('H'),
            h => {
                let _ = write!(self.out, "H{h}");
            }
        }
        match atom.charge {
            0 => {}
            1 => self.out.push('+'),
            -1 => self.out.push('-'),
            c if c > 0 => {
                let _ = write!(self.out, "+{c}");
            }
            c => {
                let _ = write!(self.out, "-{}", -c);
            }
        }
        self.out.push(']');
    }
}
