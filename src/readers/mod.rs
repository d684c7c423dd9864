pub mod dedup_index;
pub mod response_parser;
pub mod station_reader;

pub use dedup_index::DedupIndex;
pub use response_parser::ResponseParser;
pub use station_reader::StationReader;
