//! Economic appraisal of a solar water heating system: capital and operating costs, ROI, payback
//! period and net present value.
use crate::error::CalcError;
use crate::finance::{net_present_value, payback_period, return_on_investment};
use crate::input::{deserialise_proportion, parse_label};
use crate::units::{
    Dimensionless, EnergyPerYear, Liters, Money, MoneyPerEnergy, MoneyPerLiter, MoneyPerYear, Year,
};
use anyhow::ensure;
use indexmap::IndexMap;
use log::debug;
use serde::de::Error;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use strum::{Display, EnumIter};

/// The type of solar collector used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Display, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SystemType {
    /// Glazed flat-plate collector
    FlatPlateCollector,
    /// Evacuated (vacuum) tube collector
    #[default]
    VacuumTubesCollector,
}

impl SystemType {
    /// The name of the collector type as used in the market
    pub fn description(self) -> &'static str {
        match self {
            Self::FlatPlateCollector => "Flat-Plate Collector",
            Self::VacuumTubesCollector => "Vacuum Tubes Collector",
        }
    }
}

impl FromStr for SystemType {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label(s, "system type")
    }
}

impl<'de> Deserialize<'de> for SystemType {
    fn deserialize<D>(deserialiser: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserialiser)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// Read a map of system type labels to prices, rejecting unknown system types
fn deserialise_market_pricing<'de, D>(
    deserialiser: D,
) -> Result<IndexMap<SystemType, MoneyPerLiter>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: IndexMap<String, MoneyPerLiter> = Deserialize::deserialize(deserialiser)?;
    raw.into_iter()
        .map(|(label, price)| {
            let system_type: SystemType = label.parse().map_err(D::Error::custom)?;
            Ok::<_, D::Error>((system_type, price))
        })
        .collect()
}

/// Default electricity tariff (KSh/kWh)
pub const DEFAULT_TARIFF: f64 = 28.69;

fn default_tariff() -> MoneyPerEnergy {
    MoneyPerEnergy(DEFAULT_TARIFF)
}

/// Default market price of an installed system per liter of storage (KSh/L)
pub fn default_market_pricing() -> IndexMap<SystemType, MoneyPerLiter> {
    [
        (SystemType::FlatPlateCollector, MoneyPerLiter(585.0)),
        (SystemType::VacuumTubesCollector, MoneyPerLiter(565.0)),
    ]
    .into_iter()
    .collect()
}

fn default_maintenance_pct() -> Dimensionless {
    Dimensionless(0.05)
}

fn default_installation_pct() -> Dimensionless {
    Dimensionless(0.20)
}

fn default_discount_rate() -> Dimensionless {
    Dimensionless(0.08)
}

fn default_analysis_period() -> u32 {
    7
}

/// Cost and tariff assumptions for the economic appraisal
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CostParameters {
    /// Price of the energy displaced by the system
    #[serde(default = "default_tariff")]
    pub tariff: MoneyPerEnergy,
    /// Equipment price per liter of storage for each system type
    #[serde(default = "default_market_pricing")]
    #[serde(deserialize_with = "deserialise_market_pricing")]
    pub market_pricing: IndexMap<SystemType, MoneyPerLiter>,
    /// Equipment price per liter which takes precedence over `market_pricing`
    #[serde(default)]
    pub cost_per_liter: Option<MoneyPerLiter>,
    /// Annual maintenance cost as a fraction of equipment cost
    #[serde(default = "default_maintenance_pct")]
    #[serde(deserialize_with = "deserialise_proportion")]
    pub maintenance_pct: Dimensionless,
    /// Installation cost as a fraction of equipment cost
    #[serde(default = "default_installation_pct")]
    #[serde(deserialize_with = "deserialise_proportion")]
    pub installation_pct: Dimensionless,
    /// Annual discount rate for the NPV
    #[serde(default = "default_discount_rate")]
    #[serde(deserialize_with = "deserialise_proportion")]
    pub discount_rate: Dimensionless,
    /// Number of years over which savings are counted in the NPV
    #[serde(default = "default_analysis_period")]
    pub analysis_period: u32,
}

impl Default for CostParameters {
    fn default() -> Self {
        Self {
            tariff: default_tariff(),
            market_pricing: default_market_pricing(),
            cost_per_liter: None,
            maintenance_pct: default_maintenance_pct(),
            installation_pct: default_installation_pct(),
            discount_rate: default_discount_rate(),
            analysis_period: default_analysis_period(),
        }
    }
}

impl CostParameters {
    /// The equipment price per liter for the given system type.
    ///
    /// An explicit `cost_per_liter` takes precedence over the market price.
    pub fn cost_per_liter(&self, system_type: SystemType) -> Result<MoneyPerLiter, CalcError> {
        if let Some(cost) = self.cost_per_liter {
            return Ok(cost);
        }

        self.market_pricing
            .get(&system_type)
            .copied()
            .ok_or_else(|| {
                CalcError::KeyNotFound(format!(
                    "No market price for system type '{system_type}'"
                ))
            })
    }

    /// Check that the parameters are usable
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.tariff.is_finite() && self.tariff >= MoneyPerEnergy(0.0),
            "tariff must be a finite, non-negative number"
        );
        for (system_type, price) in &self.market_pricing {
            ensure!(
                price.is_finite() && *price >= MoneyPerLiter(0.0),
                "Price for {system_type} must be a finite, non-negative number"
            );
        }
        if let Some(price) = self.cost_per_liter {
            ensure!(
                price.is_finite() && price >= MoneyPerLiter(0.0),
                "cost_per_liter must be a finite, non-negative number"
            );
        }
        ensure!(self.analysis_period >= 1, "analysis_period must be at least 1 year");

        Ok(())
    }
}

/// The outcome of an economic appraisal. Monetary values are rounded to 2 d.p.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EconomicResult {
    /// Cost of the collector, tank and ancillaries
    pub equipment_cost: Money,
    /// Cost of installing the equipment
    pub installation_cost: Money,
    /// Annual maintenance cost
    pub maintenance_cost_annual: MoneyPerYear,
    /// Total upfront cost (equipment plus installation)
    pub capex: Money,
    /// Value of energy saved each year, net of maintenance
    pub annual_savings: MoneyPerYear,
    /// Annual savings as a percentage of capex
    pub roi_percent: Dimensionless,
    /// Simple payback period. Negative if savings are negative and infinite if they are zero.
    pub payback_period_years: Year,
    /// Net present value over the analysis period
    pub npv: Money,
}

impl EconomicResult {
    /// Whether the savings ever recover the capital cost.
    ///
    /// The payback period must be finite and not negative. A zero payback (no capital cost and
    /// positive savings) counts, but a negative zero (no capital cost, negative savings) doesn't.
    pub fn pays_back(&self) -> bool {
        let payback = self.payback_period_years.value();
        payback.is_finite() && payback.is_sign_positive()
    }
}

/// Carry out an economic appraisal of a system.
///
/// # Arguments
///
/// * `system_type` - The type of collector, used to look up the price per liter
/// * `tank_size` - The storage tank volume, which the equipment cost is proportional to
/// * `annual_energy_savings` - Energy no longer bought each year
/// * `params` - Cost and tariff assumptions
///
/// # Returns
///
/// The appraisal, or [`CalcError::KeyNotFound`] if there is no price for `system_type`.
pub fn analyze(
    system_type: SystemType,
    tank_size: Liters,
    annual_energy_savings: EnergyPerYear,
    params: &CostParameters,
) -> Result<EconomicResult, CalcError> {
    let cost_per_liter = params.cost_per_liter(system_type)?;

    let equipment_cost = tank_size * cost_per_liter;
    let installation_cost = equipment_cost * params.installation_pct;
    let maintenance_cost_annual = MoneyPerYear(equipment_cost.value()) * params.maintenance_pct;
    let capex = equipment_cost + installation_cost;
    let annual_savings = annual_energy_savings * params.tariff - maintenance_cost_annual;
    let roi_percent = return_on_investment(annual_savings, capex);
    let payback_period_years = payback_period(capex, annual_savings);
    let npv = net_present_value(
        capex,
        annual_savings,
        params.analysis_period,
        params.discount_rate,
    );
    debug!(
        "{}: {cost_per_liter} KSh/L x {tank_size} L; capex {capex} KSh; net savings \
        {annual_savings} KSh/year",
        system_type.description()
    );

    Ok(EconomicResult {
        equipment_cost: equipment_cost.rounded(),
        installation_cost: installation_cost.rounded(),
        maintenance_cost_annual: maintenance_cost_annual.rounded(),
        capex: capex.rounded(),
        annual_savings: annual_savings.rounded(),
        roi_percent: roi_percent.rounded(),
        payback_period_years: payback_period_years.rounded(),
        npv: npv.rounded(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn params() -> CostParameters {
        CostParameters::default()
    }

    #[rstest]
    fn test_analyze(params: CostParameters) {
        let result = analyze(
            SystemType::VacuumTubesCollector,
            Liters(144.0),
            EnergyPerYear(800.0),
            &params,
        )
        .unwrap();

        // 144 L * 565 KSh/L
        assert_eq!(result.equipment_cost, Money(81_360.0));
        assert_eq!(result.installation_cost, Money(16_272.0));
        assert_eq!(result.maintenance_cost_annual, MoneyPerYear(4068.0));
        assert_eq!(result.capex, Money(97_632.0));
        // 800 kWh * 28.69 KSh/kWh - 4068 KSh
        assert_approx_eq!(MoneyPerYear, result.annual_savings, MoneyPerYear(18_884.0));
        assert_approx_eq!(Dimensionless, result.roi_percent, Dimensionless(19.34));
        assert_approx_eq!(Year, result.payback_period_years, Year(5.17));
        assert_approx_eq!(Money, result.npv, Money(685.09));
        assert!(result.pays_back());
    }

    #[rstest]
    fn test_analyze_zero_savings(mut params: CostParameters) {
        params.maintenance_pct = Dimensionless(0.0);
        let result = analyze(
            SystemType::VacuumTubesCollector,
            Liters(144.0),
            EnergyPerYear(0.0),
            &params,
        )
        .unwrap();
        assert_eq!(result.annual_savings, MoneyPerYear(0.0));
        assert_eq!(result.payback_period_years, Year(f64::INFINITY));
        assert!(!result.pays_back());
        assert_eq!(result.npv, -result.capex);
    }

    #[rstest]
    fn test_analyze_negative_savings(params: CostParameters) {
        let result = analyze(
            SystemType::FlatPlateCollector,
            Liters(200.0),
            EnergyPerYear(0.0),
            &params,
        )
        .unwrap();
        // 200 L * 585 KSh/L * 5 % maintenance and nothing saved
        assert_eq!(result.annual_savings, MoneyPerYear(-5850.0));
        assert_eq!(result.capex, Money(140_400.0));
        assert_eq!(result.payback_period_years, Year(-24.0));
        assert!(result.roi_percent < Dimensionless(0.0));
        assert!(!result.pays_back());
        assert!(result.npv < -result.capex);
    }

    #[rstest]
    fn test_analyze_zero_capex(params: CostParameters) {
        let result = analyze(
            SystemType::FlatPlateCollector,
            Liters(0.0),
            EnergyPerYear(800.0),
            &params,
        )
        .unwrap();
        assert_eq!(result.capex, Money(0.0));
        assert_eq!(result.roi_percent, Dimensionless(0.0));
        assert_eq!(result.payback_period_years, Year(0.0));
        assert!(result.pays_back());
    }

    #[rstest]
    fn test_analyze_missing_price(mut params: CostParameters) {
        params.market_pricing.swap_remove(&SystemType::FlatPlateCollector);
        let result = analyze(
            SystemType::FlatPlateCollector,
            Liters(144.0),
            EnergyPerYear(800.0),
            &params,
        );
        assert!(matches!(result, Err(CalcError::KeyNotFound(_))));

        // An explicit price means the market price isn't needed
        params.cost_per_liter = Some(MoneyPerLiter(600.0));
        let result = analyze(
            SystemType::FlatPlateCollector,
            Liters(144.0),
            EnergyPerYear(800.0),
            &params,
        )
        .unwrap();
        assert_eq!(result.equipment_cost, Money(86_400.0));
    }

    #[rstest]
    fn test_npv_monotonic_in_energy_savings(params: CostParameters) {
        let npvs: Vec<_> = [0.0, 500.0, 1000.0, 5000.0]
            .into_iter()
            .map(|kwh| {
                analyze(
                    SystemType::FlatPlateCollector,
                    Liters(144.0),
                    EnergyPerYear(kwh),
                    &params,
                )
                .unwrap()
                .npv
            })
            .collect();
        assert!(npvs.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[rstest]
    fn test_analyze_is_deterministic(params: CostParameters) {
        let run = || {
            analyze(
                SystemType::VacuumTubesCollector,
                Liters(321.5),
                EnergyPerYear(1234.5),
                &params,
            )
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_cost_parameters_from_toml() {
        let params: CostParameters = toml::from_str(
            "tariff = 30.0\nanalysis_period = 10\n\n[market_pricing]\nflat_plate_collector = 600",
        )
        .unwrap();
        assert_eq!(params.tariff, MoneyPerEnergy(30.0));
        assert_eq!(params.analysis_period, 10);
        assert_eq!(params.market_pricing.len(), 1);
        assert_eq!(
            params.cost_per_liter(SystemType::FlatPlateCollector),
            Ok(MoneyPerLiter(600.0))
        );
        assert_eq!(params.discount_rate, Dimensionless(0.08));

        // Unknown system type
        assert!(
            toml::from_str::<CostParameters>("[market_pricing]\nsolar_kettle = 100").is_err()
        );
    }

    #[rstest]
    fn test_cost_parameters_validate(mut params: CostParameters) {
        assert!(params.validate().is_ok());
        params.analysis_period = 0;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_system_type_from_str() {
        assert_eq!(
            "vacuum_tubes_collector".parse::<SystemType>(),
            Ok(SystemType::VacuumTubesCollector)
        );
        assert!(matches!(
            "Vacuum Tubes Collector".parse::<SystemType>(),
            Err(CalcError::InvalidInput(_))
        ));
    }
}
