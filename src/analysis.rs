//! Runs a complete analysis for one building: hot water demand, system sizing, economics and
//! avoided emissions.
//!
//! An analysis is described by a TOML request file with `[building]`, `[site]`, `[system]`,
//! `[economics]` and `[emissions]` sections. Values in the last three sections are optional and
//! override the [`Defaults`] for this request only.
use crate::building::BuildingProfile;
use crate::economics::{CostParameters, EconomicResult, SystemType, analyze};
use crate::emissions::{EmissionParameters, FuelType, emissions_reduction};
use crate::error::CalcError;
use crate::input::{deserialise_proportion_opt, input_err_msg, read_toml};
use crate::parameters::Defaults;
use crate::site::{SiteDataSource, WardTable};
use crate::sizing::{
    CollectorPerformance, SPECIFIC_HEAT_WATER_KWH, SiteConditions, SizingResult,
    size_system_for_site,
};
use crate::units::{
    Dimensionless, EnergyPerYear, LitersPerDay, MassPerEnergy, MassPerYear, MoneyPerEnergy,
    MoneyPerLiter, Year,
};
use anyhow::{Context, Result, ensure};
use log::info;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Number of days of hot water use in a year
pub const DAYS_PER_YEAR: f64 = 365.0;

/// The ward data file used if a request doesn't name one
const DEFAULT_WARD_FILE_NAME: &str = "wards.csv";

fn default_ward_file() -> PathBuf {
    PathBuf::from(DEFAULT_WARD_FILE_NAME)
}

/// Where the solar resource data for a site comes from
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SiteSource {
    /// Irradiance and ambient temperature given directly
    Inline(SiteConditions),
    /// A ward to look up in a ward data file
    Ward {
        /// The ward name, matched ignoring case
        ward: String,
        /// The ward data CSV file. Relative paths are resolved against the request file.
        #[serde(default = "default_ward_file")]
        ward_file: PathBuf,
    },
}

impl SiteSource {
    /// Get the conditions at the site, reading the ward data file if needed
    pub fn site_conditions(&self) -> Result<SiteConditions> {
        match self {
            Self::Inline(site) => Ok(*site),
            Self::Ward { ward, ward_file } => {
                let table = WardTable::from_path(ward_file)?;
                let site = table
                    .site_conditions(ward)
                    .with_context(|| input_err_msg(ward_file))?;
                Ok(site)
            }
        }
    }
}

/// The choice of solar water heater and any changes to its performance
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SystemOptions {
    /// The type of collector
    #[serde(default)]
    pub system_type: SystemType,
    /// Replaces the default collector efficiency
    #[serde(default, deserialize_with = "deserialise_proportion_opt")]
    pub efficiency: Option<Dimensionless>,
    /// Replaces the default storage loss
    #[serde(default, deserialize_with = "deserialise_proportion_opt")]
    pub storage_loss: Option<Dimensionless>,
}

impl SystemOptions {
    fn apply(&self, base: &CollectorPerformance) -> CollectorPerformance {
        CollectorPerformance {
            efficiency: self.efficiency.unwrap_or(base.efficiency),
            storage_loss: self.storage_loss.unwrap_or(base.storage_loss),
        }
    }
}

/// Changes to the cost assumptions for a single request
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CostOverrides {
    /// Electricity tariff (KSh/kWh)
    pub tariff: Option<MoneyPerEnergy>,
    /// Replaces the market price for the chosen system type
    pub cost_per_liter: Option<MoneyPerLiter>,
    /// Annual maintenance cost as a fraction of equipment cost
    #[serde(default, deserialize_with = "deserialise_proportion_opt")]
    pub maintenance_pct: Option<Dimensionless>,
    /// Installation cost as a fraction of equipment cost
    #[serde(default, deserialize_with = "deserialise_proportion_opt")]
    pub installation_pct: Option<Dimensionless>,
    /// Annual discount rate
    #[serde(default, deserialize_with = "deserialise_proportion_opt")]
    pub discount_rate: Option<Dimensionless>,
    /// Number of years over which the NPV is calculated
    pub analysis_period: Option<u32>,
}

impl CostOverrides {
    fn apply(&self, base: &CostParameters) -> CostParameters {
        CostParameters {
            tariff: self.tariff.unwrap_or(base.tariff),
            market_pricing: base.market_pricing.clone(),
            cost_per_liter: self.cost_per_liter.or(base.cost_per_liter),
            maintenance_pct: self.maintenance_pct.unwrap_or(base.maintenance_pct),
            installation_pct: self.installation_pct.unwrap_or(base.installation_pct),
            discount_rate: self.discount_rate.unwrap_or(base.discount_rate),
            analysis_period: self.analysis_period.unwrap_or(base.analysis_period),
        }
    }
}

/// Changes to the emission assumptions for a single request
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmissionOverrides {
    /// The fuel being displaced
    pub fuel_type: Option<FuelType>,
    /// Grid emission factor at the start of the analysis period (t CO₂/MWh)
    pub grid_emission_start: Option<MassPerEnergy>,
    /// Grid emission factor at the end of the analysis period (t CO₂/MWh)
    pub grid_emission_end: Option<MassPerEnergy>,
    /// Mass of CO₂ emitted per mass of LPG burned
    pub lpg_emission: Option<Dimensionless>,
    /// LPG no longer burned each year (kg/year). Only used when the fuel type is LPG.
    pub annual_lpg_savings: Option<MassPerYear>,
}

impl EmissionOverrides {
    fn apply(&self, base: &EmissionParameters) -> EmissionParameters {
        EmissionParameters {
            fuel_type: self.fuel_type.unwrap_or(base.fuel_type),
            grid_emission_start: self.grid_emission_start.unwrap_or(base.grid_emission_start),
            grid_emission_end: self.grid_emission_end.unwrap_or(base.grid_emission_end),
            lpg_emission: self.lpg_emission.unwrap_or(base.lpg_emission),
        }
    }
}

/// A request to analyse a solar water heating system for a building
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisRequest {
    /// The building and how it uses hot water
    pub building: BuildingProfile,
    /// The installation site
    pub site: SiteSource,
    /// The system to install
    #[serde(default)]
    pub system: SystemOptions,
    /// Overrides for the cost assumptions
    #[serde(default)]
    pub economics: CostOverrides,
    /// Overrides for the emission assumptions
    #[serde(default)]
    pub emissions: EmissionOverrides,
}

impl AnalysisRequest {
    /// Read an analysis request from a TOML file.
    ///
    /// The path of a ward data file is resolved relative to the directory containing the request.
    pub fn from_path(file_path: &Path) -> Result<Self> {
        let mut request: AnalysisRequest = read_toml(file_path)?;
        request
            .validate()
            .with_context(|| input_err_msg(file_path))?;

        if let (SiteSource::Ward { ward_file, .. }, Some(request_dir)) =
            (&mut request.site, file_path.parent())
        {
            *ward_file = request_dir.join(&ward_file);
        }

        Ok(request)
    }

    /// Check the building description
    pub fn validate(&self) -> Result<()> {
        let building = &self.building;
        ensure!(
            building.quantity.is_finite() && building.quantity >= 0.0,
            "quantity must be a finite, non-negative number"
        );
        ensure!(
            building.desired_temp.is_finite(),
            "desired_temp must be a finite number"
        );
        if let Some(base_demand) = building.base_demand_per_unit {
            ensure!(
                base_demand.is_finite() && base_demand >= LitersPerDay(0.0),
                "base_demand_per_unit must be a finite, non-negative number"
            );
        }

        Ok(())
    }

    /// Combine `defaults` with the overrides in this request.
    ///
    /// The combined assumptions are validated in the same way as a defaults file.
    pub fn assumptions(&self, defaults: &Defaults) -> Result<Defaults> {
        let assumptions = Defaults {
            costs: self.economics.apply(&defaults.costs),
            emissions: self.emissions.apply(&defaults.emissions),
            performance: self.system.apply(&defaults.performance),
        };
        assumptions
            .validate()
            .context("Invalid assumptions for analysis")?;

        Ok(assumptions)
    }
}

/// Calculate the energy saved each year by heating the daily demand with solar energy.
///
/// Water is heated from the ambient temperature to `desired_temp` every day of the year.
pub fn annual_energy_savings(
    daily_demand: LitersPerDay,
    desired_temp: f64,
    ambient_temp: f64,
) -> EnergyPerYear {
    let temperature_rise = desired_temp - ambient_temp;
    EnergyPerYear(daily_demand.value() * DAYS_PER_YEAR * SPECIFIC_HEAT_WATER_KWH * temperature_rise)
}

/// The results of an analysis, along with the inputs which produced them
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    /// The building analysed
    pub building: BuildingProfile,
    /// The type of collector
    pub system_type: SystemType,
    /// Conditions at the site
    pub site: SiteConditions,
    /// The fuel displaced by the system
    pub fuel_type: FuelType,
    /// Number of years over which the NPV is calculated
    pub analysis_period: u32,
    /// Daily hot water demand
    pub daily_demand: LitersPerDay,
    /// Collector area and tank size
    pub sizing: SizingResult,
    /// Energy no longer bought each year (not rounded)
    pub annual_energy_savings: EnergyPerYear,
    /// Costs and returns
    pub economics: EconomicResult,
    /// CO₂ emissions avoided each year
    pub co2_avoided: MassPerYear,
}

impl AnalysisReport {
    /// Carry out the full chain of calculations for a building at a site.
    ///
    /// # Arguments
    ///
    /// * `building` - The building and how it uses hot water
    /// * `system_type` - The type of collector
    /// * `site` - The solar resource and ambient temperature at the site
    /// * `assumptions` - Costs, emission factors and collector performance
    /// * `annual_lpg_savings` - LPG no longer burned each year, if known
    pub fn calculate(
        building: &BuildingProfile,
        system_type: SystemType,
        site: &SiteConditions,
        assumptions: &Defaults,
        annual_lpg_savings: Option<MassPerYear>,
    ) -> Result<Self, CalcError> {
        let daily_demand = building.daily_demand();
        let sizing = size_system_for_site(daily_demand, site, &assumptions.performance)?;
        let annual_energy_savings =
            annual_energy_savings(daily_demand, building.desired_temp, site.ambient_temp);
        let economics = analyze(
            system_type,
            sizing.tank_size,
            annual_energy_savings,
            &assumptions.costs,
        )?;
        let co2_avoided = emissions_reduction(
            Some(annual_energy_savings),
            annual_lpg_savings,
            &assumptions.emissions,
        );

        Ok(Self {
            building: building.clone(),
            system_type,
            site: *site,
            fuel_type: assumptions.emissions.fuel_type,
            analysis_period: assumptions.costs.analysis_period,
            daily_demand,
            sizing,
            annual_energy_savings,
            economics,
            co2_avoided,
        })
    }

    /// Whether the system pays back within the analysis period
    pub fn pays_back_within_period(&self) -> bool {
        self.economics.pays_back()
            && self.economics.payback_period_years <= Year(f64::from(self.analysis_period))
    }

    /// Write a summary of the results to the log
    pub fn log_summary(&self) {
        let economics = &self.economics;
        info!("Hot water demand: {} L/day", self.daily_demand.rounded());
        info!(
            "{}: collector area {} m², tank {} L",
            self.system_type.description(),
            self.sizing.collector_area,
            self.sizing.tank_size
        );
        info!(
            "Capital cost {} KSh; net savings {} KSh/year; ROI {} %; NPV over {} years {} KSh",
            economics.capex,
            economics.annual_savings,
            economics.roi_percent,
            self.analysis_period,
            economics.npv
        );
        if !economics.pays_back() {
            info!(
                "The system never pays back (payback period {} years): annual savings do not \
                exceed maintenance costs",
                economics.payback_period_years
            );
        } else if self.pays_back_within_period() {
            info!("Payback period: {} years", economics.payback_period_years);
        } else {
            info!(
                "Payback period: {} years, longer than the {} year analysis period",
                economics.payback_period_years, self.analysis_period
            );
        }
        info!("CO₂ avoided: {} kg/year", self.co2_avoided);
    }
}

/// Read the site data for a request and run the analysis
pub fn run_analysis(request: &AnalysisRequest, defaults: &Defaults) -> Result<AnalysisReport> {
    let assumptions = request.assumptions(defaults)?;
    let site = request
        .site
        .site_conditions()
        .context("Failed to get site conditions.")?;
    let report = AnalysisReport::calculate(
        &request.building,
        request.system.system_type,
        &site,
        &assumptions,
        request.emissions.annual_lpg_savings,
    )?;

    Ok(report)
}
