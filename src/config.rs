/// Number of campaigns kept in the top/bottom rankings.
pub const DEFAULT_TOP_N: usize = 5;
/// A creative is labelled `Good` when its ROAS is strictly above this.
pub const DEFAULT_GOOD_ROAS_THRESHOLD: f64 = 2.0;
/// Rows of the uploaded file echoed back after a successful upload.
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashboardConfig {
    pub top_n: usize,
    pub good_roas_threshold: f64,
    pub preview_rows: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            good_roas_threshold: DEFAULT_GOOD_ROAS_THRESHOLD,
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }
}
