pub mod diagnostics;
pub mod download;
pub mod health;
pub mod leads;
pub mod root;

pub use diagnostics::test_database;
pub use download::{download_backend, ARCHIVE_FILENAME};
pub use health::{health_check, metrics, readiness_check};
pub use leads::{create_lead, CreateLeadResponse};
pub use root::{hello, read_root};
