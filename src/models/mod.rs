pub mod observation;
pub mod station;

pub use observation::{Observation, RecordKey};
pub use station::{StationCatalog, StationEntry};
