pub use series_export::SeriesExport;
pub use thread_scaling::ThreadScaling;

/// Names of the plot types this build can deserialize
pub const PLOT_TYPES: &[&str] = &["ThreadScaling", "SeriesExport"];

/// Links the plot crates into the binary so their registrations are kept
pub fn init_plots() {
    // hack to prevent serde issues
    serde_json::to_string(&ThreadScaling::default()).unwrap();
    serde_json::to_string(&SeriesExport::default()).unwrap();
}
