use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use strsim::jaro_winkler;

use crate::error::{PlanError, Result};
use crate::interface::render_report;
use crate::models::{FoodItem, NutrientVector};
use crate::planner::PlanConfig;
use crate::solver::SolvedModel;

/// Columns the food table must provide. Extra columns are ignored.
pub const REQUIRED_COLUMNS: [&str; 14] = [
    "alimento",
    "calorias",
    "carboidratos",
    "proteinas",
    "gorduras",
    "ferro",
    "magnesio",
    "vitamina_c",
    "zinco",
    "sodio",
    "preco",
    "max_porcoes_dia",
    "max_dias",
    "grupo",
];

/// Minimum similarity for a header to be offered as a correction.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// One raw row of the food table.
///
/// Integer columns are read as floats since spreadsheet exports often write `3.0`.
#[derive(Debug, Deserialize)]
struct FoodRow {
    alimento: String,
    calorias: f64,
    carboidratos: f64,
    proteinas: f64,
    gorduras: f64,
    ferro: f64,
    magnesio: f64,
    vitamina_c: f64,
    zinco: f64,
    sodio: f64,
    preco: f64,
    max_porcoes_dia: f64,
    max_dias: f64,
    grupo: f64,
}

impl TryFrom<FoodRow> for FoodItem {
    type Error = PlanError;

    fn try_from(row: FoodRow) -> Result<Self> {
        let name = row.alimento.trim().to_string();
        let whole = |column: &str, value: f64| -> Result<u32> {
            if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64 {
                Ok(value as u32)
            } else {
                Err(PlanError::InvalidFood {
                    name: name.clone(),
                    reason: format!("{} must be a non-negative integer, got {}", column, value),
                })
            }
        };

        let max_portions_per_day = whole("max_porcoes_dia", row.max_porcoes_dia)?;
        let max_days_per_week = whole("max_dias", row.max_dias)?;
        let group = whole("grupo", row.grupo)?;
        let group = u8::try_from(group).map_err(|_| PlanError::InvalidFood {
            name: name.clone(),
            reason: format!("grupo {} out of range", group),
        })?;

        Ok(FoodItem {
            nutrients: NutrientVector::new([
                row.calorias,
                row.carboidratos,
                row.proteinas,
                row.gorduras,
                row.ferro,
                row.magnesio,
                row.vitamina_c,
                row.zinco,
                row.sodio,
            ]),
            price: row.preco,
            max_portions_per_day,
            max_days_per_week,
            group,
            name,
        })
    }
}

/// Load the food table from a CSV file.
pub fn load_foods<P: AsRef<Path>>(path: P) -> Result<Vec<FoodItem>> {
    let file = File::open(path)?;
    read_foods(file)
}

/// Read the food table from CSV data.
///
/// Fails on a missing required column (naming the closest header, if any) and on a
/// table without rows.
pub fn read_foods<R: Read>(reader: R) -> Result<Vec<FoodItem>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    check_columns(&headers)?;

    let mut foods = Vec::new();
    for row in rdr.deserialize::<FoodRow>() {
        foods.push(FoodItem::try_from(row?)?);
    }

    if foods.is_empty() {
        return Err(PlanError::EmptyFoodTable);
    }
    tracing::debug!(count = foods.len(), "Loaded food table");
    Ok(foods)
}

fn check_columns(headers: &[String]) -> Result<()> {
    for column in REQUIRED_COLUMNS {
        if headers.iter().any(|h| h == column) {
            continue;
        }
        let suggestion = headers
            .iter()
            .filter(|h| !REQUIRED_COLUMNS.contains(&h.as_str()))
            .map(|h| (h, jaro_winkler(h, column)))
            .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(h, _)| h.clone());
        return Err(PlanError::MissingColumn {
            column: column.to_string(),
            suggestion,
        });
    }
    Ok(())
}

/// Load a plan configuration from JSON. Omitted fields take their defaults.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PlanConfig> {
    let content = fs::read_to_string(path)?;
    let config: PlanConfig = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Write the report for `solved`, replacing any previous file.
pub fn write_report<P: AsRef<Path>>(path: P, solved: &SolvedModel) -> Result<()> {
    fs::write(path, render_report(solved))?;
    Ok(())
}
