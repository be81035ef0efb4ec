//! Defines the `Defaults` struct, which holds the assumptions used when a request doesn't override
//! them.
//!
//! The defaults are an immutable value passed explicitly into each calculation. They can be read
//! from a TOML file, in which any missing value takes the built-in default for the Kenyan market.
use crate::economics::CostParameters;
use crate::emissions::EmissionParameters;
use crate::input::{input_err_msg, read_toml};
use crate::sizing::CollectorPerformance;
use crate::units::Dimensionless;
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::path::Path;

/// Default assumptions for sizing, economics and emissions
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Defaults {
    /// Prices, tariff and financial assumptions
    #[serde(default)]
    pub costs: CostParameters,
    /// Emission factors for the displaced fuel
    #[serde(default)]
    pub emissions: EmissionParameters,
    /// Collector efficiency and storage losses
    #[serde(default)]
    pub performance: CollectorPerformance,
}

/// Check that the collector performance assumptions are usable
fn check_performance(performance: &CollectorPerformance) -> Result<()> {
    // efficiency and storage_loss are already known to be proportions
    ensure!(
        performance.efficiency > Dimensionless(0.0),
        "efficiency must be greater than zero"
    );
    ensure!(
        performance.storage_loss < Dimensionless(1.0),
        "storage_loss must be less than one"
    );

    Ok(())
}

impl Defaults {
    /// Read defaults from the specified TOML file.
    ///
    /// # Arguments
    ///
    /// * `file_path` - Path to the defaults file
    ///
    /// # Returns
    ///
    /// The file contents as a [`Defaults`] struct or an error if the file is invalid
    pub fn from_path(file_path: &Path) -> Result<Defaults> {
        let defaults: Defaults = read_toml(file_path)?;
        defaults
            .validate()
            .with_context(|| input_err_msg(file_path))?;

        Ok(defaults)
    }

    /// Validate the parameters
    pub fn validate(&self) -> Result<()> {
        self.costs.validate()?;
        self.emissions.validate()?;
        check_performance(&self.performance)?;

        Ok(())
    }
}
