//! Carbon dioxide emissions avoided by replacing a conventional water heater.
use crate::error::CalcError;
use crate::input::parse_label;
use crate::units::{Dimensionless, EnergyPerYear, MassPerEnergy, MassPerYear};
use anyhow::ensure;
use log::debug;
use serde::de::Error;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use strum::{Display, EnumIter};

/// The fuel used by the water heater which the solar system replaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Display, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FuelType {
    /// An electric (resistance) water heater on the grid
    #[default]
    Electricity,
    /// A liquefied petroleum gas water heater
    Lpg,
}

impl FromStr for FuelType {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label(s, "fuel type")
    }
}

impl<'de> Deserialize<'de> for FuelType {
    fn deserialize<D>(deserialiser: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserialiser)?;
        s.parse().map_err(D::Error::custom)
    }
}

fn default_grid_emission_start() -> MassPerEnergy {
    MassPerEnergy(0.425)
}

fn default_grid_emission_end() -> MassPerEnergy {
    MassPerEnergy(0.25)
}

fn default_lpg_emission() -> Dimensionless {
    Dimensionless(3.0)
}

/// Emission factors for the displaced fuel
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct EmissionParameters {
    /// The fuel being displaced
    #[serde(default)]
    pub fuel_type: FuelType,
    /// Grid emission factor at the start of the analysis period (t CO₂/MWh)
    #[serde(default = "default_grid_emission_start")]
    pub grid_emission_start: MassPerEnergy,
    /// Grid emission factor at the end of the analysis period (t CO₂/MWh)
    #[serde(default = "default_grid_emission_end")]
    pub grid_emission_end: MassPerEnergy,
    /// Mass of CO₂ emitted per mass of LPG burned (kg/kg)
    #[serde(default = "default_lpg_emission")]
    pub lpg_emission: Dimensionless,
}

impl Default for EmissionParameters {
    fn default() -> Self {
        Self {
            fuel_type: FuelType::default(),
            grid_emission_start: default_grid_emission_start(),
            grid_emission_end: default_grid_emission_end(),
            lpg_emission: default_lpg_emission(),
        }
    }
}

impl EmissionParameters {
    /// The mean grid emission factor over the analysis period.
    ///
    /// The factor is assumed to fall linearly from start to end, so the mean is the midpoint.
    pub fn average_grid_emission(&self) -> MassPerEnergy {
        (self.grid_emission_start + self.grid_emission_end) / Dimensionless(2.0)
    }

    /// Check that the emission factors are usable
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, value) in [
            ("grid_emission_start", self.grid_emission_start.value()),
            ("grid_emission_end", self.grid_emission_end.value()),
            ("lpg_emission", self.lpg_emission.value()),
        ] {
            ensure!(
                value.is_finite() && value >= 0.0,
                "{name} must be a finite, non-negative number"
            );
        }

        Ok(())
    }
}

/// Calculate the CO₂ emissions avoided each year.
///
/// Only the savings quantity relevant to the selected fuel is used; if it is missing, the
/// reduction is zero.
///
/// # Arguments
///
/// * `annual_energy_savings` - Electricity no longer consumed each year (for [`FuelType::Electricity`])
/// * `annual_lpg_savings` - LPG no longer burned each year (for [`FuelType::Lpg`])
/// * `params` - The displaced fuel and its emission factors
///
/// # Returns
///
/// Avoided emissions in kg CO₂ per year, rounded to 2 d.p.
pub fn emissions_reduction(
    annual_energy_savings: Option<EnergyPerYear>,
    annual_lpg_savings: Option<MassPerYear>,
    params: &EmissionParameters,
) -> MassPerYear {
    let reduction = match params.fuel_type {
        FuelType::Electricity => {
            // t/MWh is numerically equal to kg/kWh
            let factor = params.average_grid_emission();
            debug!("Average grid emission factor: {factor} kg CO2/kWh");
            annual_energy_savings.unwrap_or_default() * factor
        }
        FuelType::Lpg => annual_lpg_savings.unwrap_or_default() * params.lpg_emission,
    };

    reduction.rounded()
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    fn params_for(fuel_type: FuelType) -> EmissionParameters {
        EmissionParameters {
            fuel_type,
            ..EmissionParameters::default()
        }
    }

    #[test]
    fn test_average_grid_emission() {
        assert_approx_eq!(
            MassPerEnergy,
            EmissionParameters::default().average_grid_emission(),
            MassPerEnergy(0.3375)
        );
    }

    #[test]
    fn test_electricity_reduction() {
        let reduction = emissions_reduction(
            Some(EnergyPerYear(1000.0)),
            None,
            &params_for(FuelType::Electricity),
        );
        assert_approx_eq!(MassPerYear, reduction, MassPerYear(337.5));
    }

    #[test]
    fn test_lpg_reduction() {
        let reduction = emissions_reduction(
            Some(EnergyPerYear(1000.0)),
            Some(MassPerYear(5000.0)),
            &params_for(FuelType::Lpg),
        );
        assert_approx_eq!(MassPerYear, reduction, MassPerYear(15_000.0));
    }

    #[test]
    fn test_lpg_reduction_tie_rounds_to_even() {
        // 4.375 kg * 3.0 = 13.125 kg exactly
        let reduction = emissions_reduction(
            None,
            Some(MassPerYear(4.375)),
            &params_for(FuelType::Lpg),
        );
        assert_eq!(reduction, MassPerYear(13.12));
    }

    #[test]
    fn test_missing_savings_is_zero() {
        for fuel_type in [FuelType::Electricity, FuelType::Lpg] {
            assert_eq!(
                emissions_reduction(None, None, &params_for(fuel_type)),
                MassPerYear(0.0)
            );
        }

        // Savings for the wrong fuel are ignored
        assert_eq!(
            emissions_reduction(
                None,
                Some(MassPerYear(100.0)),
                &params_for(FuelType::Electricity)
            ),
            MassPerYear(0.0)
        );
    }

    #[test]
    fn test_reduction_is_deterministic() {
        let params = params_for(FuelType::Electricity);
        let run = || emissions_reduction(Some(EnergyPerYear(2345.67)), None, &params);
        assert_eq!(run(), run());
    }

    #[test]
    fn test_fuel_type_from_str() {
        assert_eq!("lpg".parse::<FuelType>(), Ok(FuelType::Lpg));
        assert!(matches!(
            "diesel".parse::<FuelType>(),
            Err(CalcError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_emission_parameters_from_toml() {
        let params: EmissionParameters =
            toml::from_str("fuel_type = \"lpg\"\nlpg_emission = 2.9").unwrap();
        assert_eq!(params.fuel_type, FuelType::Lpg);
        assert_eq!(params.lpg_emission, Dimensionless(2.9));
        assert_eq!(params.grid_emission_start, MassPerEnergy(0.425));

        assert!(toml::from_str::<EmissionParameters>("fuel_type = \"coal\"").is_err());
    }

    #[test]
    fn test_emission_parameters_validate() {
        assert!(EmissionParameters::default().validate().is_ok());
        let params = EmissionParameters {
            lpg_emission: Dimensionless(-1.0),
            ..EmissionParameters::default()
        };
        assert!(params.validate().is_err());
    }
}
