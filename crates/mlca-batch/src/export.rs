use std::path::Path;

use mlca_core::errors::{ErrorInfo, LcaError};

use crate::report::BatchRanking;

fn wrap_csv(path: &Path, err: impl ToString) -> LcaError {
    LcaError::Serde(
        ErrorInfo::new("ranking_csv_write", "failed to write ranking table")
            .with_context("path", path.display().to_string())
            .with_hint(err.to_string()),
    )
}

/// Writes the ranking as `rank,name,total_net_emissions_kg_co2e,emission_intensity_kg_co2e_per_kg`.
pub fn write_ranking_csv(path: &Path, ranking: &BatchRanking) -> Result<(), LcaError> {
    let mut wtr = csv::Writer::from_path(path).map_err(|err| wrap_csv(path, err))?;
    wtr.write_record([
        "rank",
        "name",
        "total_net_emissions_kg_co2e",
        "emission_intensity_kg_co2e_per_kg",
    ])
    .map_err(|err| wrap_csv(path, err))?;
    for (idx, entry) in ranking.entries.iter().enumerate() {
        wtr.write_record([
            (idx + 1).to_string(),
            entry.name.clone(),
            entry.total_net_emissions_kg_co2e.to_string(),
            entry.emission_intensity_kg_co2e_per_kg.to_string(),
        ])
        .map_err(|err| wrap_csv(path, err))?;
    }
    wtr.flush().map_err(|err| wrap_csv(path, err))
}
