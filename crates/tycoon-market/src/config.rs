//! Configuration loading and typed config structures for the market.
//!
//! The canonical configuration lives in `tycoon-config.yaml` at the project
//! root. Every section and field has a default, so a partial (or empty)
//! file is valid.

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;

use tycoon_types::PropertyKind;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level market configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MarketConfig {
    /// Land and property valuation factors.
    #[serde(default)]
    pub valuation: ValuationConfig,

    /// Parking demand coefficients.
    #[serde(default)]
    pub demand: DemandConfig,

    /// Real estate agency commission.
    #[serde(default)]
    pub commission: CommissionConfig,

    /// Tax rates.
    #[serde(default)]
    pub taxes: TaxConfig,

    /// Construction price list.
    #[serde(default)]
    pub construction: ConstructionConfig,

    /// Starting balances.
    #[serde(default)]
    pub accounts: AccountsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MarketConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }
}

/// Valuation factors.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ValuationConfig {
    /// Price of a parcel before location factors.
    #[serde(default = "default_base_land_value")]
    pub base_land_value: Decimal,

    /// Multiplier applied once per ring scanned while looking for a street.
    #[serde(default = "default_distance_from_road_loss")]
    pub distance_from_road_loss: Decimal,

    /// Gain per building next to a street-facing parcel, divided by distance.
    #[serde(default = "default_distance_from_building_gain")]
    pub distance_from_building_gain: Decimal,

    /// Multiplier per ring containing an antenna, scaled by ring distance.
    #[serde(default = "default_antenna_surrounding_loss")]
    pub antenna_surrounding_loss: Decimal,

    /// Share of the land value a road is worth.
    #[serde(default = "default_road_value_factor")]
    pub road_value_factor: Decimal,

    /// Cost of holding a construction site for one month.
    #[serde(default = "default_monthly_under_construction_cost")]
    pub monthly_under_construction_cost: Decimal,

    /// Monthly income from one taken parking place.
    #[serde(default = "default_income_per_taken_place")]
    pub income_per_taken_place: Decimal,

    /// Premium of a finished building over its cost.
    #[serde(default = "default_ready_price_gain_multiplier")]
    pub ready_price_gain_multiplier: Decimal,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            base_land_value: default_base_land_value(),
            distance_from_road_loss: default_distance_from_road_loss(),
            distance_from_building_gain: default_distance_from_building_gain(),
            antenna_surrounding_loss: default_antenna_surrounding_loss(),
            road_value_factor: default_road_value_factor(),
            monthly_under_construction_cost: default_monthly_under_construction_cost(),
            income_per_taken_place: default_income_per_taken_place(),
            ready_price_gain_multiplier: default_ready_price_gain_multiplier(),
        }
    }
}

/// Cars attracted by each kind of demand-generating tile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DemandConfig {
    /// Residential buildings and offices.
    #[serde(default = "default_building_cars")]
    pub building: Decimal,

    /// Police stations, courts, town hall.
    #[serde(default = "default_civic_building_cars")]
    pub civic_building: Decimal,

    /// Schools.
    #[serde(default = "default_school_cars")]
    pub school: Decimal,

    /// Hospitals.
    #[serde(default = "default_hospital_cars")]
    pub hospital: Decimal,

    /// Football pitches.
    #[serde(default = "default_football_pitch_cars")]
    pub football_pitch: Decimal,

    /// Warehouses.
    #[serde(default = "default_warehouse_cars")]
    pub warehouse: Decimal,
}

impl Default for DemandConfig {
    fn default() -> Self {
        Self {
            building: default_building_cars(),
            civic_building: default_civic_building_cars(),
            school: default_school_cars(),
            hospital: default_hospital_cars(),
            football_pitch: default_football_pitch_cars(),
            warehouse: default_warehouse_cars(),
        }
    }
}

/// Real estate agency commission.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommissionConfig {
    /// Share of the sale price charged on top of the base fee.
    #[serde(default = "default_commission_rate")]
    pub rate: Decimal,

    /// Above this amount only a tenth of the excess is charged.
    #[serde(default = "default_commission_threshold")]
    pub threshold: Decimal,

    /// Base fee for land.
    #[serde(default = "default_land_fee")]
    pub land_fee: Decimal,

    /// Base fee for roads.
    #[serde(default = "default_road_fee")]
    pub road_fee: Decimal,

    /// Base fee for parking lots.
    #[serde(default = "default_parking_fee")]
    pub parking_fee: Decimal,

    /// Base fee for residential buildings.
    #[serde(default = "default_residential_fee")]
    pub residential_fee: Decimal,
}

impl CommissionConfig {
    /// Base fee for a property kind.
    pub const fn base_fee(&self, kind: PropertyKind) -> Decimal {
        match kind {
            PropertyKind::Land => self.land_fee,
            PropertyKind::Road => self.road_fee,
            PropertyKind::Parking => self.parking_fee,
            PropertyKind::ResidentialBuilding => self.residential_fee,
        }
    }
}

impl Default for CommissionConfig {
    fn default() -> Self {
        Self {
            rate: default_commission_rate(),
            threshold: default_commission_threshold(),
            land_fee: default_land_fee(),
            road_fee: default_road_fee(),
            parking_fee: default_parking_fee(),
            residential_fee: default_residential_fee(),
        }
    }
}

/// Tax rates.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaxConfig {
    /// Tax on property sale invoices.
    #[serde(default = "default_property_purchase_tax")]
    pub property_purchase: Decimal,

    /// Tax on agency services (commission invoices).
    #[serde(default = "default_services_tax")]
    pub services: Decimal,

    /// Income tax rate used for refunds on profitable sales.
    #[serde(default = "default_income_tax")]
    pub income: Decimal,

    /// Tax on construction invoices.
    #[serde(default = "default_construction_tax")]
    pub construction: Decimal,
}

impl Default for TaxConfig {
    fn default() -> Self {
        Self {
            property_purchase: default_property_purchase_tax(),
            services: default_services_tax(),
            income: default_income_tax(),
            construction: default_construction_tax(),
        }
    }
}

/// Construction price list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConstructionConfig {
    /// Net cost of a road.
    #[serde(default = "default_road_cost")]
    pub road_cost: Decimal,

    /// Months to build a road.
    #[serde(default = "default_road_months")]
    pub road_months: u32,

    /// Net cost of a parking lot.
    #[serde(default = "default_parking_cost")]
    pub parking_cost: Decimal,

    /// Months to build a parking lot.
    #[serde(default = "default_parking_months")]
    pub parking_months: u32,

    /// Fixed net cost of a residential building.
    #[serde(default = "default_residential_base_cost")]
    pub residential_base_cost: Decimal,

    /// Additional net cost per storey.
    #[serde(default = "default_residential_storey_cost")]
    pub residential_storey_cost: Decimal,

    /// Fixed months to build a residential building.
    #[serde(default = "default_residential_base_months")]
    pub residential_base_months: u32,

    /// Storeys built per additional month.
    #[serde(default = "default_storeys_per_month")]
    pub storeys_per_month: u32,

    /// Storeys assumed when none are given.
    #[serde(default = "default_storeys")]
    pub default_storeys: u8,
}

impl Default for ConstructionConfig {
    fn default() -> Self {
        Self {
            road_cost: default_road_cost(),
            road_months: default_road_months(),
            parking_cost: default_parking_cost(),
            parking_months: default_parking_months(),
            residential_base_cost: default_residential_base_cost(),
            residential_storey_cost: default_residential_storey_cost(),
            residential_base_months: default_residential_base_months(),
            storeys_per_month: default_storeys_per_month(),
            default_storeys: default_storeys(),
        }
    }
}

/// Starting balances for new wallets.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccountsConfig {
    /// Balance of a newly joined player.
    #[serde(default = "default_player_starting_balance")]
    pub player_starting_balance: Decimal,

    /// Balance the treasury starts with.
    #[serde(default = "default_treasury_starting_balance")]
    pub treasury_starting_balance: Decimal,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            player_starting_balance: default_player_starting_balance(),
            treasury_starting_balance: default_treasury_starting_balance(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

const fn default_base_land_value() -> Decimal {
    Decimal::from_parts(90_000, 0, 0, false, 0)
}

const fn default_distance_from_road_loss() -> Decimal {
    Decimal::from_parts(8, 0, 0, false, 1)
}

const fn default_distance_from_building_gain() -> Decimal {
    Decimal::from_parts(45, 0, 0, false, 2)
}

const fn default_antenna_surrounding_loss() -> Decimal {
    Decimal::from_parts(22, 0, 0, false, 2)
}

const fn default_road_value_factor() -> Decimal {
    Decimal::from_parts(1, 0, 0, false, 1)
}

const fn default_monthly_under_construction_cost() -> Decimal {
    Decimal::from_parts(2_500, 0, 0, false, 0)
}

const fn default_income_per_taken_place() -> Decimal {
    Decimal::from_parts(90, 0, 0, false, 0)
}

const fn default_ready_price_gain_multiplier() -> Decimal {
    Decimal::from_parts(12, 0, 0, false, 1)
}

const fn default_building_cars() -> Decimal {
    Decimal::from_parts(8, 0, 0, false, 0)
}

const fn default_civic_building_cars() -> Decimal {
    Decimal::from_parts(10, 0, 0, false, 0)
}

const fn default_school_cars() -> Decimal {
    Decimal::from_parts(6, 0, 0, false, 0)
}

const fn default_hospital_cars() -> Decimal {
    Decimal::from_parts(12, 0, 0, false, 0)
}

const fn default_football_pitch_cars() -> Decimal {
    Decimal::from_parts(20, 0, 0, false, 0)
}

const fn default_warehouse_cars() -> Decimal {
    Decimal::from_parts(4, 0, 0, false, 0)
}

const fn default_commission_rate() -> Decimal {
    Decimal::from_parts(1, 0, 0, false, 2)
}

const fn default_commission_threshold() -> Decimal {
    Decimal::from_parts(10_000, 0, 0, false, 0)
}

const fn default_land_fee() -> Decimal {
    Decimal::from_parts(1_000, 0, 0, false, 0)
}

const fn default_road_fee() -> Decimal {
    Decimal::from_parts(100, 0, 0, false, 0)
}

const fn default_parking_fee() -> Decimal {
    Decimal::from_parts(1_500, 0, 0, false, 0)
}

const fn default_residential_fee() -> Decimal {
    Decimal::from_parts(3_000, 0, 0, false, 0)
}

const fn default_property_purchase_tax() -> Decimal {
    Decimal::from_parts(1, 0, 0, false, 2)
}

const fn default_services_tax() -> Decimal {
    Decimal::from_parts(23, 0, 0, false, 2)
}

const fn default_income_tax() -> Decimal {
    Decimal::from_parts(19, 0, 0, false, 2)
}

const fn default_construction_tax() -> Decimal {
    Decimal::from_parts(8, 0, 0, false, 2)
}

const fn default_road_cost() -> Decimal {
    Decimal::from_parts(20_000, 0, 0, false, 0)
}

const fn default_road_months() -> u32 {
    1
}

const fn default_parking_cost() -> Decimal {
    Decimal::from_parts(45_000, 0, 0, false, 0)
}

const fn default_parking_months() -> u32 {
    2
}

const fn default_residential_base_cost() -> Decimal {
    Decimal::from_parts(150_000, 0, 0, false, 0)
}

const fn default_residential_storey_cost() -> Decimal {
    Decimal::from_parts(60_000, 0, 0, false, 0)
}

const fn default_residential_base_months() -> u32 {
    3
}

const fn default_storeys_per_month() -> u32 {
    2
}

const fn default_storeys() -> u8 {
    4
}

const fn default_player_starting_balance() -> Decimal {
    Decimal::from_parts(1_000_000, 0, 0, false, 0)
}

const fn default_treasury_starting_balance() -> Decimal {
    Decimal::from_parts(100_000_000, 0, 0, false, 0)
}

fn default_log_level() -> String {
    "info".to_owned()
}
