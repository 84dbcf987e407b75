pub mod lead;

pub use lead::{Lead, LEAD_COLLECTION};
