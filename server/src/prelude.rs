pub use civiroll_core::app::App;
pub use civiroll_types::error::{CvResult, Error};
pub use civiroll_types::types::Timestamp;

pub use tracing::{debug, debug_span, error, error_span, info, info_span, warn, warn_span};

// vim: ts=4
