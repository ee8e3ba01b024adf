use super::descriptors::Descriptors;
use phf::phf_ordered_map;

/// A named medicinal-chemistry rule of thumb evaluated over descriptors.
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub description: &'static str,
    check: fn(&Descriptors) -> bool,
}

impl Rule {
    pub fn lookup(name: &str) -> Option<&'static Rule> {
        RULES.get(name)
    }

    pub fn all() -> impl Iterator<Item = &'static Rule> {
        RULES.values()
    }

    pub fn passes(&self, descriptors: &Descriptors) -> bool {
        (self.check)(descriptors)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

fn within(value: f64, min: f64, max: f64) -> bool {
    (min..=max).contains(&value)
}

fn rule_of_five(d: &Descriptors) -> bool {
    d.molecular_weight <= 500.0 && d.logp <= 5.0 && d.hbd <= 5 && d.hba <= 10
}

fn rule_of_five_beyond(d: &Descriptors) -> bool {
    d.molecular_weight <= 1000.0
        && within(d.logp, -2.0, 10.0)
        && d.hbd <= 6
        && d.hba <= 15
        && d.tpsa <= 250.0
        && d.rotatable_bonds <= 20
}

fn rule_of_three(d: &Descriptors) -> bool {
    d.molecular_weight <= 300.0
        && d.logp <= 3.0
        && d.hbd <= 3
        && d.hba <= 3
        && d.rotatable_bonds <= 3
}

fn rule_of_cns(d: &Descriptors) -> bool {
    within(d.molecular_weight, 135.0, 582.0)
        && within(d.logp, -0.2, 6.1)
        && within(d.tpsa, 3.0, 118.0)
        && d.hbd <= 3
        && d.hba <= 5
}

fn rule_of_veber(d: &Descriptors) -> bool {
    d.rotatable_bonds <= 10 && d.tpsa <= 140.0
}

fn rule_of_egan(d: &Descriptors) -> bool {
    within(d.logp, -1.0, 5.8) && d.tpsa <= 130.0
}

fn rule_of_ghose(d: &Descriptors) -> bool {
    within(d.molecular_weight, 160.0, 480.0)
        && within(d.logp, -0.4, 5.6)
        && (20..=70).contains(&d.total_atoms)
}

fn rule_of_reos(d: &Descriptors) -> bool {
    within(d.molecular_weight, 200.0, 500.0)
        && within(d.logp, -5.0, 5.0)
        && d.hbd <= 5
        && d.hba <= 10
        && (-2..=2).contains(&d.formal_charge)
        && d.rotatable_bonds <= 8
        && (15..=50).contains(&d.heavy_atoms)
}

fn rule_of_leadlike(d: &Descriptors) -> bool {
    within(d.molecular_weight, 250.0, 450.0)
        && within(d.logp, -3.5, 4.5)
        && d.rotatable_bonds <= 7
        && d.hbd <= 4
        && d.hba <= 8
        && d.rings <= 4
}

fn rule_of_drug(d: &Descriptors) -> bool {
    rule_of_five(d) && rule_of_veber(d) && d.heavy_atoms >= 6
}

static RULES: phf::OrderedMap<&'static str, Rule> = phf_ordered_map! {
    "rule_of_five" => Rule {
        name: "rule_of_five",
        description: "Lipinski: MW <= 500, logP <= 5, HBD <= 5, HBA <= 10",
        check: rule_of_five,
    },
    "rule_of_five_beyond" => Rule {
        name: "rule_of_five_beyond",
        description: "Beyond rule of five: MW <= 1000, -2 <= logP <= 10, HBD <= 6, HBA <= 15, TPSA <= 250, RotB <= 20",
        check: rule_of_five_beyond,
    },
    "rule_of_three" => Rule {
        name: "rule_of_three",
        description: "Fragment-likeness: MW <= 300, logP <= 3, HBD <= 3, HBA <= 3, RotB <= 3",
        check: rule_of_three,
    },
    "rule_of_cns" => Rule {
        name: "rule_of_cns",
        description: "CNS penetration: 135 <= MW <= 582, -0.2 <= logP <= 6.1, 3 <= TPSA <= 118, HBD <= 3, HBA <= 5",
        check: rule_of_cns,
    },
    "rule_of_veber" => Rule {
        name: "rule_of_veber",
        description: "Oral bioavailability: RotB <= 10, TPSA <= 140",
        check: rule_of_veber,
    },
    "rule_of_egan" => Rule {
        name: "rule_of_egan",
        description: "Absorption: -1 <= logP <= 5.8, TPSA <= 130",
        check: rule_of_egan,
    },
    "rule_of_ghose" => Rule {
        name: "rule_of_ghose",
        description: "Ghose: 160 <= MW <= 480, -0.4 <= logP <= 5.6, 20 <= atoms <= 70",
        check: rule_of_ghose,
    },
    "rule_of_reos" => Rule {
        name: "rule_of_reos",
        description: "REOS: 200 <= MW <= 500, -5 <= logP <= 5, HBD <= 5, HBA <= 10, |charge| <= 2, RotB <= 8, 15 <= heavy atoms <= 50",
        check: rule_of_reos,
    },
    "rule_of_leadlike" => Rule {
        name: "rule_of_leadlike",
        description: "Lead-likeness: 250 <= MW <= 450, -3.5 <= logP <= 4.5, RotB <= 7, HBD <= 4, HBA <= 8, rings <= 4",
        check: rule_of_leadlike,
    },
    "rule_of_drug" => Rule {
        name: "rule_of_drug",
        description: "Drug-likeness: rule of five and Veber, at least 6 heavy atoms",
        check: rule_of_drug,
    },
};
