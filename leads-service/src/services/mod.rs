pub mod archive;
pub mod database;
pub mod diagnostics;
pub mod metrics;

pub use archive::{Archive, ArchiveExporter, ExclusionSet, DEFAULT_EXCLUDES};
pub use database::{create_document, DocumentStore, MongoDb};
pub use diagnostics::{DatabaseProbe, DiagnosticsResponse, MAX_LISTED_COLLECTIONS};
pub use metrics::{get_metrics, init_metrics};
