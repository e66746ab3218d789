use super::exit_codes;
use crate::cli::args::FormulaArgs;
use lumenrank_core::config::FormulaFile;

/// Prints one bound set in the same YAML shape the formula file accepts.
pub fn cmd_formula(args: FormulaArgs) -> anyhow::Result<i32> {
    let registry = match super::load_formulas(&args.formulas) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };
    let Some(set) = registry.get(&args.formula_version) else {
        eprintln!(
            "config error: unknown formula version '{}' (known: {})",
            args.formula_version,
            registry.versions().collect::<Vec<_>>().join(", ")
        );
        return Ok(exit_codes::CONFIG_ERROR);
    };

    let mut file = FormulaFile::default();
    file.formulas
        .insert(args.formula_version.clone(), set.clone());
    print!("{}", serde_yaml::to_string(&file)?);
    Ok(exit_codes::OK)
}
