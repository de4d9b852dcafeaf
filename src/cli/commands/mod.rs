pub mod analyze;
pub mod report;

pub use analyze::{run_analyze, run_check};
pub use report::{run_metrics, run_show};
