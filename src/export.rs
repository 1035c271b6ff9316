/// Result export formats.
///
/// - Structured: the full `AnalysisResult` as pretty JSON, camelCase keys.
/// - Tabular: `Year,<variable>` rows followed by a `Field,Value` metadata
///   footer. Values are written to 2 decimals and coordinates to 4; this
///   rounding is presentation only.
/// - Summary: a short human-readable block for the terminal.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::logging::{self, DataSource};
use crate::model::AnalysisResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Summary,
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "summary" | "text" => Ok(ExportFormat::Summary),
            other => Err(format!("unknown export format '{}' (json, csv, summary)", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Structured
// ---------------------------------------------------------------------------

pub fn to_json(result: &AnalysisResult) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(result)
}

pub fn from_json(text: &str) -> Result<AnalysisResult, serde_json::Error> {
    serde_json::from_str(text)
}

// ---------------------------------------------------------------------------
// Tabular
// ---------------------------------------------------------------------------

/// Quotes a CSV field if it contains a comma, quote, or newline.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub fn to_csv(result: &AnalysisResult) -> String {
    let meta = &result.metadata;
    let mut out = String::new();

    let header = format!("{} ({})", meta.variable.name, meta.variable.unit);
    let _ = writeln!(out, "Year,{}", csv_field(&header));
    for entry in &result.yearly_data {
        let _ = writeln!(out, "{},{:.2}", entry.year, entry.max_value);
    }

    let window = format!(
        "{:02}-{:02} ±{} days ({} to {})",
        meta.date_window.month,
        meta.date_window.day,
        meta.date_window.window_days,
        meta.date_window.start,
        meta.date_window.end
    );
    let interval = format!(
        "{:.2}-{:.2}",
        result.confidence_interval.low, result.confidence_interval.high
    );

    let footer: Vec<(&str, String)> = vec![
        ("Latitude", format!("{:.4}", meta.location.latitude)),
        ("Longitude", format!("{:.4}", meta.location.longitude)),
        ("Variable", meta.variable.id.to_string()),
        ("Date Window", window),
        ("Threshold", format!("{:.2}", meta.threshold)),
        ("Probability (%)", format!("{:.2}", result.probability)),
        ("95% CI (%)", interval),
        ("Interval Method", meta.interval_method.clone()),
        ("Years Analyzed", result.years_analyzed.to_string()),
        ("P25", format!("{:.2}", result.percentiles.p25)),
        ("P50", format!("{:.2}", result.percentiles.p50)),
        ("P75", format!("{:.2}", result.percentiles.p75)),
        ("P90", format!("{:.2}", result.percentiles.p90)),
        (
            "Date Range",
            format!("{}-{}", meta.date_range.start_year, meta.date_range.end_year),
        ),
        ("Data Source", format!("{} ({})", meta.data_source, meta.api_url)),
        ("Generated At", meta.generated_at.clone()),
    ];

    out.push('\n');
    out.push_str("Field,Value\n");
    for (field, value) in footer {
        let _ = writeln!(out, "{},{}", field, csv_field(&value));
    }
    out
}

// ---------------------------------------------------------------------------
// Terminal summary
// ---------------------------------------------------------------------------

pub fn render_summary(result: &AnalysisResult) -> String {
    let meta = &result.metadata;
    let unit = &meta.variable.unit;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} at {:.4}, {:.4} | {:02}-{:02} ±{} days, {}-{}",
        meta.variable.name,
        meta.location.latitude,
        meta.location.longitude,
        meta.date_window.month,
        meta.date_window.day,
        meta.date_window.window_days,
        meta.date_range.start_year,
        meta.date_range.end_year
    );
    let _ = writeln!(
        out,
        "Probability of exceeding {}{}: {:.1}%",
        meta.threshold, unit, result.probability
    );
    let _ = writeln!(
        out,
        "95% CI: [{:.1}%, {:.1}%] ({})",
        result.confidence_interval.low, result.confidence_interval.high, meta.interval_method
    );
    let _ = writeln!(out, "Years analyzed: {}", result.years_analyzed);
    let _ = writeln!(
        out,
        "Percentiles ({}): 25th {:.1}, 50th {:.1}, 75th {:.1}, 90th {:.1}",
        unit,
        result.percentiles.p25,
        result.percentiles.p50,
        result.percentiles.p75,
        result.percentiles.p90
    );
    out
}

/// Renders `result` in `format`.
pub fn render(result: &AnalysisResult, format: ExportFormat) -> Result<String, serde_json::Error> {
    match format {
        ExportFormat::Json => to_json(result),
        ExportFormat::Csv => Ok(to_csv(result)),
        ExportFormat::Summary => Ok(render_summary(result)),
    }
}

/// Writes `result` to `path` in `format`.
pub fn write_export(path: &Path, result: &AnalysisResult, format: ExportFormat) -> std::io::Result<()> {
    let text = render(result, format).map_err(std::io::Error::other)?;
    fs::write(path, text)?;
    logging::info(
        DataSource::Export,
        None,
        &format!("Wrote {} years to {}", result.years_analyzed, path.display()),
    );
    Ok(())
}
