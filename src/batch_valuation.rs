use anyhow::{Context, Result};
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use storage_valuer::ContractScenario;

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioValue {
    pub scenario: String,
    pub value: f64,
    pub sale_revenue: f64,
    pub purchase_cost: f64,
    pub storage_cost: f64,
    pub storage_months: u32,
    pub executed_events: usize,
    pub skipped_events: usize,
}

pub fn value_scenario_file(path: &Path) -> Result<ScenarioValue> {
    let scenario = ContractScenario::from_json_file(path)
        .with_context(|| format!("Failed to read scenario {:?}", path))?;
    let valuation = scenario
        .valuate()
        .with_context(|| format!("Failed to value scenario {:?}", path))?;

    Ok(ScenarioValue {
        scenario: path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string(),
        value: valuation.value,
        sale_revenue: valuation.sale_revenue,
        purchase_cost: valuation.purchase_cost,
        storage_cost: valuation.storage_cost,
        storage_months: valuation.storage_months,
        executed_events: valuation.events.len(),
        skipped_events: valuation.diagnostics.len(),
    })
}

/// Value every scenario file matching `pattern` in parallel and write a ranking CSV.
pub fn value_all_scenarios(pattern: &str, output_dir: &Path) -> Result<Vec<ScenarioValue>> {
    println!("💰 Storage Contract Batch Valuation");
    println!("{}", "=".repeat(60));

    let files: Vec<PathBuf> = glob(pattern)?.filter_map(Result::ok).collect();
    println!("Found {} scenario files", files.len());

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")?);

    let mut results: Vec<ScenarioValue> = files
        .par_iter()
        .filter_map(|path| {
            let result = value_scenario_file(path);
            pb.inc(1);
            match result {
                Ok(value) => Some(value),
                Err(e) => {
                    eprintln!("Error valuing {:?}: {:#}", path, e);
                    None
                }
            }
        })
        .collect();

    pb.finish_with_message("done");

    results.sort_by(|a, b| b.value.total_cmp(&a.value));

    println!("\n{:<30} {:>16} {:>8} {:>8}", "Scenario", "Value", "Events", "Skipped");
    for result in &results {
        println!(
            "{:<30} {:>16.2} {:>8} {:>8}",
            result.scenario, result.value, result.executed_events, result.skipped_events
        );
    }

    std::fs::create_dir_all(output_dir)?;
    let output_path = output_dir.join("batch_valuations.csv");
    let mut writer = csv::Writer::from_path(&output_path)?;
    for result in &results {
        writer.serialize(result)?;
    }
    writer.flush()?;

    println!("\n✅ Valued {} of {} scenarios, saved {:?}", results.len(), files.len(), output_path);
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_ranks_scenarios_and_skips_bad_files() {
        let dir = tempfile::tempdir().unwrap();

        let example = ContractScenario::example().unwrap();
        std::fs::write(
            dir.path().join("may_november.json"),
            serde_json::to_string(&example).unwrap(),
        )
        .unwrap();

        let mut cheaper_storage = example.clone();
        cheaper_storage.parameters.storage_cost = 0.0;
        std::fs::write(
            dir.path().join("free_storage.json"),
            serde_json::to_string(&cheaper_storage).unwrap(),
        )
        .unwrap();

        std::fs::write(dir.path().join("broken.json"), "{ not json").unwrap();

        let pattern = dir.path().join("*.json");
        let results = value_all_scenarios(pattern.to_str().unwrap(), dir.path()).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].scenario, "free_storage");
        assert!((results[0].value - 2_640_000.0).abs() < 1e-6);
        assert!((results[1].value - 2_040_000.0).abs() < 1e-6);
        assert!(dir.path().join("batch_valuations.csv").exists());
    }
}
