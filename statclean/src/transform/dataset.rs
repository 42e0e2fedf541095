//! Dataset configurations.
//!
//! A [`DatasetSpec`] binds one raw schema to a year rule, a key and a set of
//! filters. The three built-in datasets are plain values returned by
//! [`DatasetKind::spec`]; custom ones load from JSON.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::columns::YearRule;
use super::reshape::YearWindow;
use crate::error::SpecError;

/// What happens between column selection and output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReshapeMode {
    /// Input is already one row per key: keep it wide, cells untouched.
    PassThrough,
    /// Coerce, melt, mean over duplicate (key, year), pivot.
    Aggregate,
}

/// Full configuration of one normalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSpec {
    pub name: String,
    pub input_file: String,
    pub output_file: String,

    /// Metadata lines before the header row.
    #[serde(default)]
    pub skip_rows: usize,

    /// Source column that becomes `country_name`.
    pub country_column: String,

    /// Source column that becomes `indicator_name`, if the dataset has one.
    #[serde(default)]
    pub indicator_column: Option<String>,

    pub year_rule: YearRule,

    /// Inclusive year window applied after aggregation.
    #[serde(default)]
    pub year_window: Option<YearWindow>,

    /// Drop rows whose year cells are all missing before reshaping.
    #[serde(default)]
    pub drop_all_missing: bool,

    /// Trim whitespace around key values.
    #[serde(default)]
    pub trim_keys: bool,

    pub reshape: ReshapeMode,
}

impl DatasetSpec {
    /// Parse a spec from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self, SpecError> {
        let spec: DatasetSpec = serde_json::from_str(json)?;
        spec.validate()?;
        Ok(spec)
    }

    pub fn to_json(&self) -> Result<String, SpecError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject option combinations the pipeline cannot honor.
    pub fn validate(&self) -> Result<(), SpecError> {
        let invalid = |message: &str| SpecError::Invalid {
            name: self.name.clone(),
            message: message.to_string(),
        };

        if self.reshape == ReshapeMode::PassThrough {
            if !self.year_rule.is_per_column() {
                return Err(invalid("pass_through needs years in column names"));
            }
            if self.year_window.is_some() {
                return Err(invalid("year_window only applies to aggregate mode"));
            }
        }
        if self.drop_all_missing && self.reshape != ReshapeMode::PassThrough {
            return Err(invalid("drop_all_missing only applies to pass_through mode"));
        }
        if let Some(window) = self.year_window {
            if window.start > window.end {
                return Err(invalid("year_window start is after its end"));
            }
        }
        if self.input_file.is_empty() || self.output_file.is_empty() {
            return Err(invalid("input_file and output_file are required"));
        }
        Ok(())
    }
}

/// The built-in datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    Undernourishment,
    ConsumerPriceIndex,
    EnergySupplyAdequacy,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 3] = [
        DatasetKind::Undernourishment,
        DatasetKind::ConsumerPriceIndex,
        DatasetKind::EnergySupplyAdequacy,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DatasetKind::Undernourishment => "undernourishment",
            DatasetKind::ConsumerPriceIndex => "consumer_price_index",
            DatasetKind::EnergySupplyAdequacy => "energy_supply_adequacy",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            DatasetKind::Undernourishment => {
                "Prevalence of undernourishment (wide, bare year columns, 2001+)"
            }
            DatasetKind::ConsumerPriceIndex => {
                "Consumer price indices (Y-prefixed years, mean per indicator, 2000-2025)"
            }
            DatasetKind::EnergySupplyAdequacy => {
                "Average dietary energy supply adequacy (Year ranges -> midpoint)"
            }
        }
    }

    /// Built-in configuration for this dataset.
    pub fn spec(&self) -> DatasetSpec {
        match self {
            DatasetKind::Undernourishment => DatasetSpec {
                name: self.name().to_string(),
                input_file: "undernourishment.csv".to_string(),
                output_file: "undernourishment_clean.csv".to_string(),
                skip_rows: 4,
                country_column: "Country Name".to_string(),
                indicator_column: None,
                year_rule: YearRule::bare_digits(2001),
                year_window: None,
                drop_all_missing: true,
                trim_keys: true,
                reshape: ReshapeMode::PassThrough,
            },
            DatasetKind::ConsumerPriceIndex => DatasetSpec {
                name: self.name().to_string(),
                input_file: "consumer_price_index.csv".to_string(),
                output_file: "consumer_price_index_clean.csv".to_string(),
                skip_rows: 0,
                country_column: "Area".to_string(),
                indicator_column: Some("Item".to_string()),
                year_rule: YearRule::prefixed("Y"),
                year_window: Some(YearWindow::new(2000, 2025)),
                drop_all_missing: false,
                trim_keys: false,
                reshape: ReshapeMode::Aggregate,
            },
            DatasetKind::EnergySupplyAdequacy => DatasetSpec {
                name: self.name().to_string(),
                input_file: "energy_supply_adequacy.csv".to_string(),
                output_file: "energy_supply_adequacy_clean.csv".to_string(),
                skip_rows: 0,
                country_column: "Area".to_string(),
                indicator_column: None,
                year_rule: YearRule::field("Year", "Value"),
                year_window: None,
                drop_all_missing: false,
                trim_keys: false,
                reshape: ReshapeMode::Aggregate,
            },
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DatasetKind {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "undernourishment" => Ok(DatasetKind::Undernourishment),
            "consumer_price_index" | "cpi" => Ok(DatasetKind::ConsumerPriceIndex),
            "energy_supply_adequacy" | "energy" => Ok(DatasetKind::EnergySupplyAdequacy),
            _ => Err(SpecError::UnknownDataset(s.to_string())),
        }
    }
}
