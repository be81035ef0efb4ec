//! The module responsible for writing output data to disk.
use crate::analysis::AnalysisReport;
use crate::building::BuildingType;
use crate::economics::SystemType;
use crate::emissions::FuelType;
use crate::units::{
    Area, Dimensionless, EnergyPerYear, Irradiance, Liters, LitersPerDay, MassPerYear, Money,
    MoneyPerYear, Year,
};
use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// The root folder in which request-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "swh_results";

/// The output file name for analysis results
pub const RESULTS_FILE_NAME: &str = "results.csv";

/// Get the default output directory for the request at the specified path.
///
/// This is named after the folder containing the request file.
pub fn get_output_dir(request_path: &Path) -> Result<PathBuf> {
    // Canonicalise in case the user has specified a bare file name
    let request_path = request_path
        .canonicalize()
        .context("Could not resolve path to analysis request")?;

    let request_name = request_path
        .parent()
        .and_then(Path::file_name)
        .context("Analysis request cannot be in root folder")?
        .to_str()
        .context("Invalid chars in request folder name")?;

    Ok([OUTPUT_DIRECTORY_ROOT, request_name].iter().collect())
}

/// Create a new output directory, if it doesn't already exist.
///
/// An existing directory which is not empty is only reused if `allow_overwrite` is true, in which
/// case its contents are deleted.
///
/// # Returns
///
/// Whether an existing directory was overwritten
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    let overwrite = if let Ok(mut entries) = fs::read_dir(output_dir) {
        if entries.next().is_none() {
            // Directory exists but is empty
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. Use --overwrite to replace it."
        );
        fs::remove_dir_all(output_dir)?;
        true
    } else {
        false
    };

    // Try to create the directory, with parents
    fs::create_dir_all(output_dir)?;

    Ok(overwrite)
}

/// Represents the single row of the results CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct ResultRow {
    building_type: BuildingType,
    quantity: f64,
    desired_temp: f64,
    occupancy_rate: Dimensionless,
    system_type: SystemType,
    irradiance: Irradiance,
    ambient_temp: f64,
    fuel_type: FuelType,
    analysis_period: u32,
    daily_demand_liters: LitersPerDay,
    collector_area_m2: Area,
    tank_size_liters: Liters,
    equipment_cost: Money,
    installation_cost: Money,
    maintenance_cost_annual: MoneyPerYear,
    capex: Money,
    annual_savings: MoneyPerYear,
    roi_percent: Dimensionless,
    payback_period_years: Year,
    npv: Money,
    co2_avoided_kg: MassPerYear,
    annual_energy_savings_kwh: EnergyPerYear,
}

impl ResultRow {
    fn new(report: &AnalysisReport) -> Self {
        let economics = &report.economics;
        Self {
            building_type: report.building.building_type,
            quantity: report.building.quantity,
            desired_temp: report.building.desired_temp,
            occupancy_rate: report.building.occupancy_rate,
            system_type: report.system_type,
            irradiance: report.site.irradiance,
            ambient_temp: report.site.ambient_temp,
            fuel_type: report.fuel_type,
            analysis_period: report.analysis_period,
            daily_demand_liters: report.daily_demand.rounded(),
            collector_area_m2: report.sizing.collector_area,
            tank_size_liters: report.sizing.tank_size,
            equipment_cost: economics.equipment_cost,
            installation_cost: economics.installation_cost,
            maintenance_cost_annual: economics.maintenance_cost_annual,
            capex: economics.capex,
            annual_savings: economics.annual_savings,
            roi_percent: economics.roi_percent,
            payback_period_years: economics.payback_period_years,
            npv: economics.npv,
            co2_avoided_kg: report.co2_avoided,
            annual_energy_savings_kwh: report.annual_energy_savings.rounded(),
        }
    }
}

/// Write the results of an analysis to a CSV file in `output_path`.
///
/// # Returns
///
/// The path to the file written
pub fn write_results(output_path: &Path, report: &AnalysisReport) -> Result<PathBuf> {
    let file_path = output_path.join(RESULTS_FILE_NAME);
    let mut writer = csv::Writer::from_path(&file_path)
        .with_context(|| format!("Could not create {}", file_path.display()))?;
    writer.serialize(ResultRow::new(report))?;
    writer.flush()?;

    Ok(file_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnalysisRequest, run_analysis};
    use crate::fixture::{assert_error, request, write_file};
    use crate::parameters::Defaults;
    use itertools::Itertools;
    use rstest::rstest;
    use tempfile::tempdir;

    #[rstest]
    fn test_write_results(request: AnalysisRequest) {
        let report = run_analysis(&request, &Defaults::default()).unwrap();
        let dir = tempdir().unwrap();
        let file_path = write_results(dir.path(), &report).unwrap();
        assert_eq!(file_path, dir.path().join(RESULTS_FILE_NAME));

        // Read back and compare
        let records: Vec<ResultRow> = csv::Reader::from_path(&file_path)
            .unwrap()
            .into_deserialize()
            .try_collect()
            .unwrap();
        assert_eq!(records, [ResultRow::new(&report)]);
        assert_eq!(records[0].tank_size_liters, Liters(144.0));
        assert_eq!(records[0].co2_avoided_kg, MassPerYear(687.09));
    }

    #[rstest]
    // No temperature rise, so only maintenance costs
    #[case(None, -24.0)]
    // ...and no maintenance either
    #[case(Some(Dimensionless(0.0)), f64::INFINITY)]
    fn test_write_results_never_pays_back(
        mut request: AnalysisRequest,
        #[case] maintenance_pct: Option<Dimensionless>,
        #[case] expected_payback: f64,
    ) {
        request.building.desired_temp = 20.0;
        request.economics.maintenance_pct = maintenance_pct;
        let report = run_analysis(&request, &Defaults::default()).unwrap();
        let dir = tempdir().unwrap();
        let file_path = write_results(dir.path(), &report).unwrap();

        let records: Vec<ResultRow> = csv::Reader::from_path(&file_path)
            .unwrap()
            .into_deserialize()
            .try_collect()
            .unwrap();
        assert_eq!(records[0].payback_period_years, Year(expected_payback));
    }

    #[test]
    fn test_create_output_directory_new() {
        let dir = tempdir().unwrap();
        let output_dir = dir.path().join("results");
        assert!(!create_output_directory(&output_dir, false).unwrap());
        assert!(output_dir.is_dir());
    }

    #[test]
    fn test_create_output_directory_empty() {
        let dir = tempdir().unwrap();
        assert!(!create_output_directory(dir.path(), false).unwrap());
    }

    #[test]
    fn test_create_output_directory_not_empty() {
        let dir = tempdir().unwrap();
        write_file(dir.path(), RESULTS_FILE_NAME, "old");
        assert_error!(
            create_output_directory(dir.path(), false),
            "Output folder already exists and is not empty. Use --overwrite to replace it."
        );

        assert!(create_output_directory(dir.path(), true).unwrap());
        assert!(dir.path().is_dir());
        assert!(!dir.path().join(RESULTS_FILE_NAME).exists());
    }

    #[test]
    fn test_get_output_dir() {
        let dir = tempdir().unwrap();
        let request_dir = dir.path().join("hospital");
        fs::create_dir(&request_dir).unwrap();
        let file_path = write_file(&request_dir, "analysis.toml", "");
        assert_eq!(
            get_output_dir(&file_path).unwrap(),
            PathBuf::from("swh_results/hospital")
        );
    }
}
