use std::fs;
use std::path::Path;
use csv::Writer;
use serde::Serialize;

use crate::errors::{TattooQuoteError, Result};
use crate::pipeline::AnalysisResult;

/// One line of `quotes.csv`
#[derive(Debug, Clone)]
pub enum BatchRow {
    Quoted {
        filename: String,
        result: AnalysisResult,
    },
    Failed {
        filename: String,
        error: String,
    },
}

impl BatchRow {
    pub fn filename(&self) -> &str {
        match self {
            BatchRow::Quoted { filename, .. } | BatchRow::Failed { filename, .. } => filename,
        }
    }
}

const HEADER: [&str; 12] = [
    "Filename",
    "Type",
    "Filled_Area_cm2",
    "Contour_Area_cm2",
    "Perimeter_cm",
    "Contour_Count",
    "Hole_Count",
    "Texture_Std",
    "Px_Per_cm",
    "Price",
    "Status",
    "Note",
];

fn record(row: &BatchRow) -> Vec<String> {
    match row {
        BatchRow::Quoted { filename, result } => {
            let status = if result.measurement.is_degraded() {
                "degraded"
            } else if result.price.fallback.is_some() {
                "fallback"
            } else {
                "ok"
            };
            let note = result
                .measurement
                .degradation_reason()
                .map(str::to_string)
                .or_else(|| result.price.fallback.as_ref().map(|f| f.reason.clone()))
                .unwrap_or_default();

            vec![
                filename.clone(),
                result.tattoo_type.to_string(),
                format!("{:.4}", result.filled_area_cm2),
                format!("{:.4}", result.contour_area_cm2),
                format!("{:.4}", result.perimeter_cm),
                result.contour_count.to_string(),
                result.hole_count.to_string(),
                format!("{:.4}", result.texture_std),
                format!("{:.4}", result.px_per_cm),
                result.price.amount.to_string(),
                status.to_string(),
                note,
            ]
        }
        BatchRow::Failed { filename, error } => {
            let mut fields = vec![filename.clone()];
            fields.extend(std::iter::repeat(String::new()).take(HEADER.len() - 3));
            fields.push("error".to_string());
            fields.push(error.clone());
            fields
        }
    }
}

/// Write batch results to `<output_dir>/quotes.csv`, sorted by filename
pub fn write_quotes_csv<P: AsRef<Path>>(rows: &[BatchRow], output_dir: P) -> Result<()> {
    let output_dir = output_dir.as_ref();
    fs::create_dir_all(output_dir)?;
    let output_path = output_dir.join("quotes.csv");

    let mut writer = Writer::from_path(&output_path)?;
    writer.write_record(HEADER)?;

    let mut sorted: Vec<&BatchRow> = rows.iter().collect();
    sorted.sort_by(|a, b| a.filename().cmp(b.filename()));

    for row in sorted {
        writer.write_record(record(row))?;
    }

    writer
        .flush()
        .map_err(|e| TattooQuoteError::CsvOutput(csv::Error::from(e)))?;

    log::info!("Wrote {} rows to {}", rows.len(), output_path.display());
    Ok(())
}

/// Pretty-print any serializable report as JSON
pub fn write_json_report<T: Serialize, P: AsRef<Path>>(report: &T, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json)?;
    Ok(())
}
