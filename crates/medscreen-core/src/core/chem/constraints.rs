use super::descriptors::Descriptors;
use serde::Deserialize;

/// Property windows a molecule must fall inside. Unset bounds are not checked.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct PropertyConstraints {
    pub mw_range: Option<(f64, f64)>,
    pub logp_range: Option<(f64, f64)>,
    pub tpsa_max: Option<f64>,
    pub hbd_max: Option<u32>,
    pub hba_max: Option<u32>,
    pub rotatable_bonds_max: Option<u32>,
}

impl PropertyConstraints {
    pub fn is_empty(&self) -> bool {
        self.mw_range.is_none()
            && self.logp_range.is_none()
            && self.tpsa_max.is_none()
            && self.hbd_max.is_none()
            && self.hba_max.is_none()
            && self.rotatable_bonds_max.is_none()
    }

    /// Returns one human-readable entry per violated bound, in declaration order.
    pub fn violations(&self, d: &Descriptors) -> Vec<String> {
        let mut violations = Vec::new();

        let mut check_range = |label: &str, value: f64, range: Option<(f64, f64)>| {
            if let Some((min, max)) = range {
                if value < min {
                    violations.push(format!("{label} {value:.2} < {min}"));
                } else if value > max {
                    violations.push(format!("{label} {value:.2} > {max}"));
                }
            }
        };
        check_range("mw", d.molecular_weight, self.mw_range);
        check_range("logp", d.logp, self.logp_range);
        check_range("tpsa", d.tpsa, self.tpsa_max.map(|max| (f64::NEG_INFINITY, max)));

        for (label, value, max) in [
            ("hbd", d.hbd, self.hbd_max),
            ("hba", d.hba, self.hba_max),
            ("rotatable_bonds", d.rotatable_bonds, self.rotatable_bonds_max),
        ] {
            if let Some(max) = max.filter(|&max| value > max) {
                violations.push(format!("{label} {value} > {max}"));
            }
        }
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::smiles;

    fn descriptors(s: &str) -> Descriptors {
        Descriptors::compute(&smiles::parse(s).unwrap())
    }

    #[test]
    fn empty_constraints_never_violate() {
        let constraints = PropertyConstraints::default();
        assert!(constraints.is_empty());
        assert!(constraints.violations(&descriptors("CCO")).is_empty());
    }

    #[test]
    fn reports_each_violated_bound() {
        let constraints = PropertyConstraints {
            mw_range: Some((100.0, 500.0)),
            hbd_max: Some(0),
            tpsa_max: Some(200.0),
            ..Default::default()
        };
        let violations = constraints.violations(&descriptors("CCO"));
        assert_eq!(violations.len(), 2);
        assert!(violations[0].starts_with("mw 46.07 < 100"));
        assert_eq!(violations[1], "hbd 1 > 0");
    }

    #[test]
    fn deserializes_from_kebab_case_toml() {
        let constraints: PropertyConstraints =
            toml::from_str("mw-range = [200.0, 500.0]\nhba-max = 10\n").unwrap();
        assert_eq!(constraints.mw_range, Some((200.0, 500.0)));
        assert_eq!(constraints.hba_max, Some(10));
        assert!(constraints.tpsa_max.is_none());
    }
}
