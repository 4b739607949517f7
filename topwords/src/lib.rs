//! Ranks the most frequent words across every `.txt` file under a directory.
//!
//! ```rust,no_run
//! use topwords::{scan, ScanConfig};
//!
//! let report = scan(&ScanConfig::new("corpus").with_top(10))?;
//! print!("{}", report.render_plain());
//! # Ok::<(), topwords::ScanError>(())
//! ```
pub mod cancel;
pub mod config;
pub mod errors;
pub mod filters;
pub mod frequency;
pub mod metrics;
pub mod ranking;
pub mod results;
pub mod scan;
pub mod tokenizer;

pub use cancel::CancellationToken;
pub use config::ScanConfig;
pub use errors::{ScanError, ScanResult};
pub use frequency::{FrequencyTable, WordCount};
pub use ranking::TopKSelector;
pub use results::Report;
pub use scan::{scan, Coordinator, CoordinatorState};
