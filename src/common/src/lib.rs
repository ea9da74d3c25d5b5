pub mod constants;
pub mod error;
pub mod event;
pub mod metrics;

pub use error::IngestError;
pub use event::{Actor, Event, Severity, Source, Status, Workflow};
pub use metrics::MetricsHooks;
