//! Packaging of computed aggregates into an `AnalysisResult`.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::analysis::summary::{IntervalMethod, Summary};
use crate::analysis::window::WindowSpan;
use crate::model::{
    AnalysisRequest, AnalysisResult, DateRange, DateWindow, Location, ResultMetadata, VariableInfo,
    YearlyExtremum,
};
use crate::variables;

pub const DATA_SOURCE: &str = "NASA POWER API";
pub const API_URL: &str = "https://power.larc.nasa.gov/";

/// Everything the assembler needs besides the request itself.
#[derive(Debug, Clone, Copy)]
pub struct Provenance {
    pub start_year: i32,
    pub end_year: i32,
    pub interval_method: IntervalMethod,
}

/// Builds the result, stamping `generated_at` with `now`.
pub fn assemble_at(
    request: &AnalysisRequest,
    span: &WindowSpan,
    summary: &Summary,
    yearly_data: Vec<YearlyExtremum>,
    provenance: Provenance,
    now: DateTime<Utc>,
) -> AnalysisResult {
    let variable = variables::by_id(request.variable);

    AnalysisResult {
        probability: summary.probability,
        confidence_interval: summary.confidence_interval,
        years_analyzed: yearly_data.len(),
        percentiles: summary.percentiles,
        yearly_data,
        metadata: ResultMetadata {
            location: Location {
                latitude: request.latitude,
                longitude: request.longitude,
            },
            date_window: DateWindow {
                month: request.month,
                day: request.day,
                window_days: request.window,
                start: span.start.to_string(),
                end: span.end.to_string(),
                wraps_year: span.wraps_year(),
            },
            threshold: request.threshold,
            variable: VariableInfo {
                id: variable.id,
                name: variable.name.to_string(),
                unit: variable.unit.to_string(),
            },
            data_source: DATA_SOURCE.to_string(),
            api_url: API_URL.to_string(),
            date_range: DateRange {
                start_year: provenance.start_year,
                end_year: provenance.end_year,
            },
            interval_method: provenance.interval_method.to_string(),
            generated_at: now.to_rfc3339_opts(SecondsFormat::Secs, true),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::summary::summarize;
    use crate::analysis::window::resolve_window;
    use crate::variables::VariableId;
    use chrono::TimeZone;

    #[test]
    fn test_assembled_result_carries_request_and_provenance() {
        let request = AnalysisRequest {
            latitude: 40.6936,
            longitude: -89.589,
            month: 1,
            day: 2,
            window: 4,
            threshold: 5.0,
            variable: VariableId::MaxTemperature,
        };
        let span = resolve_window(request.month, request.day, request.window).unwrap();
        let yearly = vec![
            YearlyExtremum { year: 1990, max_value: 3.0 },
            YearlyExtremum { year: 1991, max_value: 7.0 },
        ];
        let summary = summarize(&yearly, request.threshold, IntervalMethod::Wald).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap();

        let result = assemble_at(
            &request,
            &span,
            &summary,
            yearly.clone(),
            Provenance { start_year: 1990, end_year: 1991, interval_method: IntervalMethod::Wald },
            now,
        );

        assert_eq!(result.years_analyzed, 2);
        assert_eq!(result.yearly_data, yearly);
        assert_eq!(result.probability, 50.0);
        assert_eq!(result.metadata.date_window.start, "12-29");
        assert_eq!(result.metadata.date_window.end, "01-06");
        assert!(result.metadata.date_window.wraps_year);
        assert_eq!(result.metadata.variable.unit, "°C");
        assert_eq!(result.metadata.data_source, DATA_SOURCE);
        assert_eq!(result.metadata.generated_at, "2024-05-01T13:00:00Z");
        assert_eq!(result.metadata.interval_method, "wald");
    }
}
