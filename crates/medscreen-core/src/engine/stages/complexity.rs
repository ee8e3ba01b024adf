use crate::core::chem::ChemError;
use crate::core::chem::complexity::ComplexityMethod;
use crate::core::models::molecule::Molecule;
use crate::engine::schema::{Field, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct ComplexityStage {
    method: ComplexityMethod,
    max: f64,
    schema: Vec<Field>,
}

impl ComplexityStage {
    pub fn new(method: ComplexityMethod, max: f64) -> Self {
        Self {
            method,
            max,
            schema: vec![
                Field::float("complexity_score").score_like(),
                Field::bool("passes_complexity"),
            ],
        }
    }

    pub fn schema(&self) -> &[Field] {
        &self.schema
    }

    /// A molecule passes when its score is at most the threshold. A
    /// non-finite score leaves both cells null.
    pub fn evaluate(&self, molecule: &Molecule) -> Result<Vec<Value>, ChemError> {
        let score = Value::float(self.method.score(molecule));
        let passes = match score.as_f64() {
            Some(s) => Value::Bool(s <= self.max),
            None => Value::Null,
        };
        Ok(vec![score, passes])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::smiles;

    #[test]
    fn threshold_is_inclusive() {
        let benzene = smiles::parse("c1ccccc1").unwrap();
        let score = ComplexityMethod::Whitlock.score(&benzene);
        let at = ComplexityStage::new(ComplexityMethod::Whitlock, score);
        assert_eq!(at.evaluate(&benzene).unwrap()[1], Value::Bool(true));
        let below = ComplexityStage::new(ComplexityMethod::Whitlock, score - 0.5);
        assert_eq!(below.evaluate(&benzene).unwrap()[1], Value::Bool(false));
    }
}
