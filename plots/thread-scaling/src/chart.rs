use std::{ops::Range, path::Path};

use common::series::{Marker, Series};
use eyre::Result;
use plotters::{
    coord::ranged1d::{DefaultFormatting, KeyPointHint},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::Bounds;

/// Line colours, cycled per series
const COLORS: &[RGBColor] = &[
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegendPosition {
    UpperRight,
    UpperLeft,
    LowerRight,
    LowerLeft,
    MiddleRight,
}

impl From<LegendPosition> for SeriesLabelPosition {
    fn from(value: LegendPosition) -> Self {
        match value {
            LegendPosition::UpperRight => SeriesLabelPosition::UpperRight,
            LegendPosition::UpperLeft => SeriesLabelPosition::UpperLeft,
            LegendPosition::LowerRight => SeriesLabelPosition::LowerRight,
            LegendPosition::LowerLeft => SeriesLabelPosition::LowerLeft,
            LegendPosition::MiddleRight => SeriesLabelPosition::MiddleRight,
        }
    }
}

/// Linear thread axis whose labels are exactly the given ticks
#[derive(Debug, Clone)]
struct ThreadAxis {
    start: f64,
    end: f64,
    ticks: Vec<f64>,
}

impl Ranged for ThreadAxis {
    type FormatOption = DefaultFormatting;
    type ValueType = f64;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        let span = self.end - self.start;
        let pixels = limit.1 - limit.0;
        if span <= 0.0 || pixels == 0 {
            return limit.1;
        }
        let ratio = (value - self.start) / span;
        limit.0 + (f64::from(pixels) * ratio + 1e-3).floor() as i32
    }

    fn key_points<Hint: KeyPointHint>(&self, hint: Hint) -> Vec<f64> {
        // the light mesh would only repeat the ticks
        if hint.weight().allow_light_points() || hint.max_num_points() == 0 {
            return Vec::new();
        }
        self.ticks.clone()
    }

    fn range(&self) -> Range<f64> {
        self.start..self.end
    }
}

/// Everything needed to draw one chart, owned so it can move to a blocking task
#[derive(Debug, Clone)]
pub struct LineChart {
    pub series: Vec<Series>,
    pub bounds: Bounds,
    pub x_label: String,
    pub y_label: String,
    pub title: Option<String>,
    pub legend: Option<LegendPosition>,
    pub width: u32,
    pub height: u32,
    pub font_size: u32,
}

impl LineChart {
    pub fn render(&self, path: &Path) -> Result<()> {
        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE)?;

        let font = self.font_size;
        let stroke = (self.width / 640).max(2);
        let marker_size = stroke * 4;

        let mut builder = ChartBuilder::on(&root);
        builder
            .margin(font / 2)
            .x_label_area_size(font * 2)
            .y_label_area_size(font * 3);
        if let Some(title) = &self.title {
            builder.caption(title, ("sans-serif", font + font / 4));
        }
        let mut chart = builder.build_cartesian_2d(
            ThreadAxis {
                start: self.bounds.x_min,
                end: self.bounds.x_max,
                ticks: self.bounds.ticks.clone(),
            },
            0f64..self.bounds.y_max,
        )?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_label_formatter(&|x| format!("{x:.0}"))
            .x_desc(self.x_label.as_str())
            .y_desc(self.y_label.as_str())
            .label_style(("sans-serif", font * 3 / 4))
            .axis_desc_style(("sans-serif", font))
            .draw()?;

        for (idx, series) in self.series.iter().enumerate() {
            let color = COLORS[idx % COLORS.len()];
            let data = series
                .points
                .iter()
                .map(|p| (f64::from(p.x), p.y))
                .collect::<Vec<_>>();

            chart
                .draw_series(LineSeries::new(data.clone(), color.stroke_width(stroke)))?
                .label(series.legend.as_str())
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(stroke))
                });

            match series.marker {
                Marker::Triangle => {
                    chart.draw_series(
                        data.iter()
                            .map(|&c| TriangleMarker::new(c, marker_size, color.filled())),
                    )?;
                }
                Marker::Circle => {
                    chart.draw_series(
                        data.iter()
                            .map(|&c| Circle::new(c, marker_size, color.filled())),
                    )?;
                }
                Marker::Dot => {
                    chart.draw_series(
                        data.iter()
                            .map(|&c| Circle::new(c, marker_size / 2, color.filled())),
                    )?;
                }
                Marker::None => {}
            }
        }

        if let Some(position) = self.legend {
            chart
                .configure_series_labels()
                .position(position.into())
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .label_font(("sans-serif", font * 3 / 4))
                .draw()?;
        }

        root.present()?;
        Ok(())
    }
}
