//! Buildings and their daily hot water demand.
use crate::error::CalcError;
use crate::input::{deserialise_proportion, parse_label};
use crate::units::{Dimensionless, LitersPerDay};
use log::{debug, warn};
use serde::de::Error;
use serde::{Deserialize, Deserializer, Serialize};
use std::ops::RangeInclusive;
use std::str::FromStr;
use strum::{Display, EnumIter};

/// The cold water temperature at which demand is zero (°C)
pub const REFERENCE_INLET_TEMP: f64 = 15.0;

/// The delivery temperature at which the base demand applies unscaled (°C)
pub const BASELINE_TARGET_TEMP: f64 = 60.0;

/// The range of desired temperatures for which the linear demand scaling is reasonable (°C)
pub const RECOMMENDED_TEMP_RANGE: RangeInclusive<f64> = 35.0..=80.0;

/// The category of building being supplied with hot water.
///
/// Each type has its own usage unit (people, beds, meals, ...) and a base demand per unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BuildingType {
    /// Houses and flats, per person
    Residential,
    /// Schools and colleges, per student
    Educational,
    /// Hospitals and clinics, per bed
    Health,
    /// Hotels and lodges, per bed
    CommercialHotel,
    /// Restaurants, per meal served
    Restaurant,
    /// Laundries, per kg of laundry washed
    Laundry,
}

impl BuildingType {
    /// Baseline domestic hot water demand (DHWD) per usage unit at 60 °C
    pub fn base_demand_per_unit(self) -> LitersPerDay {
        let liters = match self {
            Self::Residential => 30.0,
            Self::Educational | Self::Restaurant | Self::Laundry => 5.0,
            Self::Health => 50.0,
            Self::CommercialHotel => 40.0,
        };

        LitersPerDay(liters)
    }

    /// A description of what `quantity` counts for this building type
    pub fn usage_unit(self) -> &'static str {
        match self {
            Self::Residential => "people",
            Self::Educational => "students",
            Self::Health | Self::CommercialHotel => "beds",
            Self::Restaurant => "meals/day",
            Self::Laundry => "kg laundry/day",
        }
    }
}

impl FromStr for BuildingType {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label(s, "building type")
    }
}

impl<'de> Deserialize<'de> for BuildingType {
    fn deserialize<D>(deserialiser: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserialiser)?;
        s.parse().map_err(D::Error::custom)
    }
}

fn default_desired_temp() -> f64 {
    BASELINE_TARGET_TEMP
}

fn default_occupancy_rate() -> Dimensionless {
    Dimensionless(1.0)
}

/// Describes how a building uses hot water
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BuildingProfile {
    /// The type of building
    pub building_type: BuildingType,
    /// Number of usage units (people, students, beds, meals or kg of laundry)
    pub quantity: f64,
    /// Desired hot water delivery temperature (°C)
    #[serde(default = "default_desired_temp")]
    pub desired_temp: f64,
    /// Fraction of the year the building is occupied
    #[serde(default = "default_occupancy_rate")]
    #[serde(deserialize_with = "deserialise_proportion")]
    pub occupancy_rate: Dimensionless,
    /// Replaces the base demand for the building type, if present
    #[serde(default)]
    pub base_demand_per_unit: Option<LitersPerDay>,
}

impl BuildingProfile {
    /// Create a profile which uses the standard base demand for its building type
    pub fn new(
        building_type: BuildingType,
        quantity: f64,
        desired_temp: f64,
        occupancy_rate: Dimensionless,
    ) -> Self {
        Self {
            building_type,
            quantity,
            desired_temp,
            occupancy_rate,
            base_demand_per_unit: None,
        }
    }

    /// Estimate the daily hot water demand for this building
    pub fn daily_demand(&self) -> LitersPerDay {
        let base_demand = self
            .base_demand_per_unit
            .unwrap_or_else(|| self.building_type.base_demand_per_unit());

        let demand = scaled_demand(
            base_demand,
            self.quantity,
            self.desired_temp,
            self.occupancy_rate,
        );
        debug!(
            "Hot water demand for {} {} ({}): {} L/day",
            self.quantity,
            self.building_type.usage_unit(),
            self.building_type,
            demand
        );

        demand
    }
}

/// Estimate the daily hot water demand of a building.
///
/// Demand scales linearly with `quantity` and `occupancy_rate`, and with the temperature rise
/// above [`REFERENCE_INLET_TEMP`] relative to [`BASELINE_TARGET_TEMP`]. The temperature factor is
/// not clamped, so a `desired_temp` below 15 °C gives a negative demand.
///
/// # Arguments
///
/// * `building_type` - The type of building
/// * `quantity` - Number of usage units (see [`BuildingType::usage_unit`])
/// * `desired_temp` - Desired hot water temperature (°C)
/// * `occupancy_rate` - Fraction of the time the building is in use
pub fn estimate_daily_demand(
    building_type: BuildingType,
    quantity: f64,
    desired_temp: f64,
    occupancy_rate: Dimensionless,
) -> LitersPerDay {
    BuildingProfile::new(building_type, quantity, desired_temp, occupancy_rate).daily_demand()
}

/// The scaling of demand with desired temperature (1.0 at 60 °C)
pub fn temperature_factor(desired_temp: f64) -> Dimensionless {
    if desired_temp < REFERENCE_INLET_TEMP {
        warn!(
            "Desired temperature {desired_temp} °C is below the {REFERENCE_INLET_TEMP} °C inlet \
            reference: hot water demand will be negative"
        );
    } else if !RECOMMENDED_TEMP_RANGE.contains(&desired_temp) {
        warn!(
            "Desired temperature {desired_temp} °C is outside the recommended range of {}-{} °C",
            RECOMMENDED_TEMP_RANGE.start(),
            RECOMMENDED_TEMP_RANGE.end()
        );
    }

    Dimensionless(
        (desired_temp - REFERENCE_INLET_TEMP) / (BASELINE_TARGET_TEMP - REFERENCE_INLET_TEMP),
    )
}

fn scaled_demand(
    base_demand: LitersPerDay,
    quantity: f64,
    desired_temp: f64,
    occupancy_rate: Dimensionless,
) -> LitersPerDay {
    base_demand * Dimensionless(quantity) * occupancy_rate * temperature_factor(desired_temp)
}
