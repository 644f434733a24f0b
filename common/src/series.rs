use std::collections::{HashMap, HashSet};

use csv::StringRecord;
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{config::ConfigError, metric::Metric, record::BenchRecord};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    Triangle,
    #[default]
    Circle,
    Dot,
    None,
}

/// Selects the rows of one series by their exact label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSpec {
    pub label: String,
    /// Legend text, the label when absent
    pub legend: Option<String>,
    pub marker: Option<Marker>,
}

impl SeriesSpec {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_owned(),
            legend: None,
            marker: None,
        }
    }

    pub fn legend(&self) -> &str {
        self.legend.as_deref().unwrap_or(&self.label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: u32,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub label: String,
    pub legend: String,
    #[serde(skip)]
    pub marker: Marker,
    pub points: Vec<Point>,
}

impl Series {
    fn from_spec(spec: &SeriesSpec) -> Self {
        Self {
            label: spec.label.clone(),
            legend: spec.legend().to_owned(),
            marker: spec.marker.unwrap_or_default(),
            points: Vec::new(),
        }
    }
}

pub fn validate_specs(specs: &[SeriesSpec]) -> Result<(), ConfigError> {
    if specs.is_empty() {
        return Err(ConfigError::NoSeries);
    }
    let mut seen = HashSet::new();
    for spec in specs {
        if !seen.insert(spec.label.as_str()) {
            return Err(ConfigError::DuplicateSeries(spec.label.clone()));
        }
    }
    Ok(())
}

/// Builds one [`Series`] per spec from raw rows.
///
/// Rows whose label no spec selects are dropped without being parsed. Points
/// keep file order, the first bad row aborts the whole collection.
pub fn collect_series(
    rows: &[StringRecord],
    specs: &[SeriesSpec],
    metric: &Metric,
) -> Result<Vec<Series>> {
    let mut series = specs.iter().map(Series::from_spec).collect::<Vec<_>>();
    let index = specs
        .iter()
        .enumerate()
        .map(|(i, spec)| (spec.label.as_str(), i))
        .collect::<HashMap<_, _>>();

    let mut skipped = 0;
    for (i, row) in rows.iter().enumerate() {
        let line = row.position().map_or(i + 1, |pos| pos.line() as usize);
        let Some(&target) = row.get(0).and_then(|label| index.get(label)) else {
            skipped += 1;
            continue;
        };
        let record = BenchRecord::from_row(row, line)?;
        let y = metric
            .apply(&record)
            .with_context(|| format!("Derive value for row {line}"))?;
        series[target].points.push(Point { x: record.x, y });
    }

    if skipped > 0 {
        debug!("Skipped {skipped} rows with unselected labels");
    }
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::parse_rows;

    #[test]
    fn keeps_only_selected_labels() {
        let rows = parse_rows("qstm2048,1,100.0\nother,1,999.0\n").unwrap();
        let series = collect_series(
            &rows,
            &[SeriesSpec::new("qstm2048")],
            &Metric::Scaled { scale: 100.0 },
        )
        .unwrap();

        assert_eq!(series.len(), 1);
        assert_eq!(series[0].points, vec![Point { x: 1, y: 1.0 }]);
    }

    #[test]
    fn unselected_rows_are_not_parsed() {
        let rows = parse_rows("debug,not-a-number,???\nqstm8,4,2.0\n").unwrap();
        let series = collect_series(&rows, &[SeriesSpec::new("qstm8")], &Metric::default()).unwrap();
        assert_eq!(series[0].points, vec![Point { x: 4, y: 2.0 }]);
    }

    #[test]
    fn preserves_spec_and_file_order() {
        let text = "mnemosyne,1,3.0\nqstm2k,1,1.0\nmnemosyne,4,6.0\nqstm2k,4,2.0\n";
        let rows = parse_rows(text).unwrap();
        let specs = [SeriesSpec::new("qstm2k"), SeriesSpec::new("mnemosyne")];
        let series = collect_series(&rows, &specs, &Metric::default()).unwrap();

        assert_eq!(series[0].label, "qstm2k");
        assert_eq!(
            series[0].points,
            vec![Point { x: 1, y: 1.0 }, Point { x: 4, y: 2.0 }]
        );
        assert_eq!(series[1].label, "mnemosyne");
        assert_eq!(
            series[1].points,
            vec![Point { x: 1, y: 3.0 }, Point { x: 4, y: 6.0 }]
        );
    }

    #[test]
    fn missing_series_is_empty_not_an_error() {
        let rows = parse_rows("qstm2k,1,1.0\n").unwrap();
        let specs = [SeriesSpec::new("qstm2k"), SeriesSpec::new("mnemosyne")];
        let series = collect_series(&rows, &specs, &Metric::default()).unwrap();
        assert!(series[1].points.is_empty());
    }

    #[test]
    fn successive_collections_do_not_share_points() {
        let stack = parse_rows("qstm2048,1,5.0\n").unwrap();
        let list = parse_rows("qstm2048,8,7.0\n").unwrap();
        let specs = [SeriesSpec::new("qstm2048")];

        let first = collect_series(&stack, &specs, &Metric::default()).unwrap();
        let second = collect_series(&list, &specs, &Metric::default()).unwrap();

        assert_eq!(first[0].points, vec![Point { x: 1, y: 5.0 }]);
        assert_eq!(second[0].points, vec![Point { x: 8, y: 7.0 }]);
    }

    #[test]
    fn malformed_selected_row_fails() {
        let rows = parse_rows("qstm2k,1,1.0\nqstm2k,two,2.0\n").unwrap();
        let err = collect_series(&rows, &[SeriesSpec::new("qstm2k")], &Metric::default())
            .unwrap_err();
        assert!(err.to_string().contains("row 2"));
    }

    #[test]
    fn errors_name_the_file_line() {
        let rows = parse_rows("qstm2k,1,1.0\n\nqstm2k,two,2.0\n").unwrap();
        let err = collect_series(&rows, &[SeriesSpec::new("qstm2k")], &Metric::default())
            .unwrap_err();
        assert!(err.to_string().contains("row 3"), "{err}");
    }

    #[test]
    fn ratio_uses_fourth_column() {
        let rows = parse_rows("qstm128,2,4.0,400000\n").unwrap();
        let series = collect_series(
            &rows,
            &[SeriesSpec::new("qstm128")],
            &Metric::Ratio { scale: 100_000.0 },
        )
        .unwrap();
        assert_eq!(series[0].points, vec![Point { x: 2, y: 1.0 }]);
    }

    #[test]
    fn legend_defaults_to_label() {
        let mut spec = SeriesSpec::new("qstm2k");
        assert_eq!(spec.legend(), "qstm2k");
        spec.legend = Some("QSTM-2k".to_owned());
        assert_eq!(spec.legend(), "QSTM-2k");
    }

    #[test]
    fn rejects_duplicate_and_empty_specs() {
        assert_eq!(validate_specs(&[]), Err(ConfigError::NoSeries));
        assert_eq!(
            validate_specs(&[SeriesSpec::new("a"), SeriesSpec::new("a")]),
            Err(ConfigError::DuplicateSeries("a".to_owned()))
        );
    }
}
