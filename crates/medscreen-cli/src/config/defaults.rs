use medscreen::core::chem::complexity::ComplexityMethod;

/// Built-in values used when neither the config file nor the command line sets them.
pub struct DefaultsConfig {
    pub smiles_column: String,
    pub complexity_method: ComplexityMethod,
    pub jobs: i64,
    pub write_summary: bool,
    pub filter_output: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            smiles_column: "smiles".to_string(),
            complexity_method: ComplexityMethod::Bertz,
            jobs: -1,
            write_summary: true,
            filter_output: false,
        }
    }
}
