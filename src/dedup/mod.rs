pub use dedup::{Deduper, Kind, Mode};

mod dedup;
