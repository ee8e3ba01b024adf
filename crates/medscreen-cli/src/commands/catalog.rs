use crate::error::{CliError, Result};
use medscreen::core::chem::alerts::{AlertCatalog, AlertSet};
use medscreen::core::chem::complexity::ComplexityMethod;
use medscreen::core::chem::groups;
use medscreen::core::chem::rules::Rule;
use std::fmt::Write;
use tracing::info;

pub async fn run() -> Result<()> {
    let catalog = AlertCatalog::builtin().map_err(|e| CliError::Other(e.into()))?;
    print!("{}", render(&catalog));
    info!("Catalog listed.");
    Ok(())
}

/// Human-readable listing of everything `screen` can be asked to compute.
fn render(catalog: &AlertCatalog) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Rules (--rules):");
    for rule in Rule::all() {
        let _ = writeln!(out, "  {:<22} {}", rule.name, rule.description);
    }

    let _ = writeln!(out, "\nAlert sets:");
    for set in AlertSet::ALL {
        let flag = match set {
            AlertSet::Common => "--common-alerts",
            AlertSet::Nibr => "--nibr",
            AlertSet::Lilly => "--lilly",
            AlertSet::Pains => "--pains",
        };
        let _ = writeln!(
            out,
            "  {:<22} {} patterns ({})",
            set.as_str(),
            catalog.alerts(set).len(),
            flag
        );
    }

    let _ = writeln!(out, "\nComplexity methods (--complexity-method):");
    for method in ComplexityMethod::ALL {
        let _ = writeln!(out, "  {method}");
    }

    let _ = writeln!(out, "\nChemical groups (--groups):");
    let names: Vec<&str> = groups::known_groups().collect();
    for chunk in names.chunks(4) {
        let _ = writeln!(out, "  {}", chunk.join(", "));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_covers_every_category() {
        let text = render(&AlertCatalog::builtin().unwrap());
        assert!(text.contains("rule_of_five"));
        assert!(text.contains("rule_of_leadlike"));
        assert!(text.contains("pains"));
        assert!(text.contains("--lilly"));
        assert!(text.contains("  whitlock"));
        assert!(text.contains("alcohol"));
        assert!(text.contains("sulfonamide"));
    }

    #[test]
    fn alert_counts_come_from_the_catalog() {
        let text = render(&AlertCatalog::empty());
        assert!(text.contains("common                 0 patterns"));
    }
}
