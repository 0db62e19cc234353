use std::path::Path;

use miette::{IntoDiagnostic, WrapErr};

use loris_model::attributes::AttributeCatalog;
use loris_model::propositions::PropositionCatalog;

pub(crate) fn run(out: &Path, basic: bool) -> miette::Result<()> {
    let catalog = if basic {
        PropositionCatalog::basic(&AttributeCatalog::default_gui())
    } else {
        PropositionCatalog::minimal()
    };
    catalog
        .save(out)
        .into_diagnostic()
        .wrap_err_with(|| format!("cannot write catalog to {}", out.display()))?;
    println!(
        "wrote {} catalog with {} rules to {}",
        if basic { "basic" } else { "minimal" },
        catalog.rules.len(),
        out.display()
    );
    Ok(())
}
