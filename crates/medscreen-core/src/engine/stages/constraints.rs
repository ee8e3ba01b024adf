use crate::core::chem::ChemError;
use crate::core::chem::constraints::PropertyConstraints;
use crate::core::chem::descriptors::Descriptors;
use crate::core::models::molecule::Molecule;
use crate::engine::schema::{Field, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintStage {
    constraints: PropertyConstraints,
    schema: Vec<Field>,
}

impl ConstraintStage {
    pub fn new(constraints: PropertyConstraints) -> Self {
        Self {
            constraints,
            schema: vec![
                Field::bool("passes_constraints"),
                Field::text("constraint_violations"),
            ],
        }
    }

    pub fn schema(&self) -> &[Field] {
        &self.schema
    }

    pub fn evaluate(&self, molecule: &Molecule) -> Result<Vec<Value>, ChemError> {
        let violations = self.constraints.violations(&Descriptors::compute(molecule));
        Ok(vec![
            Value::Bool(violations.is_empty()),
            Value::Text(violations.join(", ")),
        ])
    }
}
