// Static nutrition lookup loaded from a JSON array of fruit entries

use crate::catalog::{FruitRecord, NO_DATA};
use crate::error::Result;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{info, warn};

const KEY_NAME: &str = "과일명";
const KEY_CALORIES: &str = "칼로리 (kcal/100g)";
const KEY_SWEETNESS: &str = "당도 (°Brix)";
const KEY_ORIGIN: &str = "주요 원산지";
const KEY_SEASON: &str = "재배 시기";

/// Display-ready nutrition facts. Absent fields hold `NO_DATA`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutritionInfo {
    pub calories: String,
    pub sweetness: String,
    pub origin: String,
    pub season: String,
}

impl NutritionInfo {
    pub fn unknown() -> Self {
        NutritionInfo {
            calories: NO_DATA.to_string(),
            sweetness: NO_DATA.to_string(),
            origin: NO_DATA.to_string(),
            season: NO_DATA.to_string(),
        }
    }

    pub fn calories_display(&self) -> String {
        with_unit(&self.calories, "kcal/100g")
    }

    pub fn sweetness_display(&self) -> String {
        with_unit(&self.sweetness, "°Brix")
    }
}

fn with_unit(value: &str, unit: &str) -> String {
    if value == NO_DATA {
        value.to_string()
    } else {
        format!("{} {}", value, unit)
    }
}

/// Numbers and strings render as-is; null or a missing key is `NO_DATA`.
fn field(entry: &Map<String, Value>, key: &str) -> String {
    match entry.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => NO_DATA.to_string(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct NutritionTable {
    entries: Vec<Map<String, Value>>,
}

impl NutritionTable {
    /// Load the table from a JSON file. A missing file is an empty table,
    /// anything else that goes wrong is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = %path.display(), "nutrition table not found, using empty table");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let table = Self::from_json(&content)?;
        info!(entries = table.len(), path = %path.display(), "loaded nutrition table");
        Ok(table)
    }

    /// Non-object array items are skipped
    pub fn from_json(content: &str) -> Result<Self> {
        let values: Vec<Value> = serde_json::from_str(content)?;
        let entries = values
            .into_iter()
            .filter_map(|v| match v {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect();
        Ok(NutritionTable { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact-name lookup; the first entry wins when a name repeats
    pub fn lookup(&self, name: &str) -> NutritionInfo {
        self.entries
            .iter()
            .find(|entry| entry.get(KEY_NAME).and_then(Value::as_str) == Some(name))
            .map(|entry| NutritionInfo {
                calories: field(entry, KEY_CALORIES),
                sweetness: field(entry, KEY_SWEETNESS),
                origin: field(entry, KEY_ORIGIN),
                season: field(entry, KEY_SEASON),
            })
            .unwrap_or_else(NutritionInfo::unknown)
    }

    pub fn calories(&self, name: &str) -> String {
        self.lookup(name).calories
    }
}

// ============================================================================
// FRUIT DETAIL
// ============================================================================

/// Everything the nutrition view shows for one fruit name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FruitDetail {
    pub name: String,
    pub nutrition: NutritionInfo,
    pub variety_count: usize,
    pub avg_price: Option<f64>,
    pub min_price: Option<f64>,
    pub varieties: Vec<FruitRecord>,
}

impl FruitDetail {
    /// `None` when the catalog has no varieties for the name
    pub fn build(name: &str, varieties: Vec<FruitRecord>, table: &NutritionTable) -> Option<Self> {
        if varieties.is_empty() {
            return None;
        }

        let prices: Vec<f64> = varieties.iter().filter_map(|v| v.price()).collect();
        let avg_price = if prices.is_empty() {
            None
        } else {
            Some(prices.iter().sum::<f64>() / prices.len() as f64)
        };
        let min_price = prices.iter().copied().reduce(f64::min);

        Some(FruitDetail {
            name: name.to_string(),
            nutrition: table.lookup(name),
            variety_count: varieties.len(),
            avg_price,
            min_price,
            varieties,
        })
    }

    pub fn avg_price_display(&self) -> String {
        price_or_sentinel(self.avg_price)
    }

    pub fn min_price_display(&self) -> String {
        price_or_sentinel(self.min_price)
    }
}

fn price_or_sentinel(price: Option<f64>) -> String {
    match price {
        Some(p) => format!("{:.0}원/100g", p),
        None => NO_DATA.to_string(),
    }
}
