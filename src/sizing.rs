//! Thermal sizing of the collector array and storage tank.
use crate::error::CalcError;
use crate::input::deserialise_proportion;
use crate::units::{Area, Dimensionless, EnergyPerDay, Irradiance, Liters, LitersPerDay};
use log::debug;
use serde::{Deserialize, Serialize};

/// Energy needed to heat one liter of water by one degree (kWh/L/°C)
pub const SPECIFIC_HEAT_WATER_KWH: f64 = 1.162e-3;

/// Temperature at which the system delivers hot water (°C)
pub const DELIVERY_TEMP: f64 = 60.0;

/// Tank volume as a multiple of one day's demand
pub const TANK_OVERSIZE_FACTOR: f64 = 1.2;

/// Default thermal efficiency of the collectors
pub const DEFAULT_EFFICIENCY: f64 = 0.65;

/// Default fraction of collected heat lost from storage
pub const DEFAULT_STORAGE_LOSS: f64 = 0.10;

/// Solar resource and climate at the installation site
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct SiteConditions {
    /// Average daily irradiation on the collector plane
    pub irradiance: Irradiance,
    /// Average ambient temperature (°C), also used as the cold water inlet temperature
    pub ambient_temp: f64,
}

fn default_efficiency() -> Dimensionless {
    Dimensionless(DEFAULT_EFFICIENCY)
}

fn default_storage_loss() -> Dimensionless {
    Dimensionless(DEFAULT_STORAGE_LOSS)
}

/// Collector and storage performance assumptions
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct CollectorPerformance {
    /// Fraction of incident solar energy converted to useful heat
    #[serde(default = "default_efficiency")]
    #[serde(deserialize_with = "deserialise_proportion")]
    pub efficiency: Dimensionless,
    /// Fraction of useful heat lost from the storage tank
    #[serde(default = "default_storage_loss")]
    #[serde(deserialize_with = "deserialise_proportion")]
    pub storage_loss: Dimensionless,
}

impl Default for CollectorPerformance {
    fn default() -> Self {
        Self {
            efficiency: default_efficiency(),
            storage_loss: default_storage_loss(),
        }
    }
}

/// The physical size of a solar water heating system
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SizingResult {
    /// Collector aperture area needed to meet demand (m², 2 d.p.)
    #[serde(rename = "collector_area_m2")]
    pub collector_area: Area,
    /// Storage tank volume (L, 2 d.p.)
    #[serde(rename = "tank_size_liters")]
    pub tank_size: Liters,
}

/// Whether a value is strictly positive (false for NaN)
fn is_positive(value: f64) -> bool {
    value > 0.0
}

/// Thermal energy needed each day to heat `daily_demand` from `inlet_temp` to 60 °C
pub fn required_energy(daily_demand: LitersPerDay, inlet_temp: f64) -> EnergyPerDay {
    EnergyPerDay(daily_demand.value() * SPECIFIC_HEAT_WATER_KWH * (DELIVERY_TEMP - inlet_temp))
}

/// Size the collector area and storage tank for a given daily demand.
///
/// # Arguments
///
/// * `daily_demand` - Daily hot water demand
/// * `irradiance` - Average daily solar irradiation at the site
/// * `inlet_temp` - Cold water inlet temperature (°C)
/// * `performance` - Collector efficiency and storage losses
///
/// # Returns
///
/// The collector area and tank size, or [`CalcError::InvalidInput`] if the irradiance or
/// efficiency is not positive.
pub fn size_system(
    daily_demand: LitersPerDay,
    irradiance: Irradiance,
    inlet_temp: f64,
    performance: &CollectorPerformance,
) -> Result<SizingResult, CalcError> {
    if !is_positive(irradiance.value()) {
        return Err(CalcError::InvalidInput(format!(
            "Irradiance must be greater than zero (got {irradiance} kWh/m²/day)"
        )));
    }
    if !is_positive(performance.efficiency.value()) {
        return Err(CalcError::InvalidInput(format!(
            "Collector efficiency must be greater than zero (got {})",
            performance.efficiency
        )));
    }

    let required = required_energy(daily_demand, inlet_temp);
    let effective =
        required / (performance.efficiency * (Dimensionless(1.0) - performance.storage_loss));
    let collector_area = effective / irradiance;
    let tank_size = Liters(daily_demand.value() * TANK_OVERSIZE_FACTOR);
    debug!(
        "Required heat: {required} kWh/day; collector output needed: {effective} kWh/day; \
        area: {collector_area} m²; tank: {tank_size} L"
    );

    Ok(SizingResult {
        collector_area: collector_area.rounded(),
        tank_size: tank_size.rounded(),
    })
}

/// Size a system for a site, using the site's ambient temperature as the inlet temperature
pub fn size_system_for_site(
    daily_demand: LitersPerDay,
    site: &SiteConditions,
    performance: &CollectorPerformance,
) -> Result<SizingResult, CalcError> {
    size_system(daily_demand, site.irradiance, site.ambient_temp, performance)
}
