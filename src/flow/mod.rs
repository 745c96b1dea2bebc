pub mod clock;
pub mod decode;
pub mod flow;

pub use clock::Clock;
pub use decode::{decode, encode, RECORD_SIZE};
pub use flow::{Direction, FlowId, Metrics, Protocol, RawRecord, Record, MAP_FULL};

#[cfg(test)]
mod test;
