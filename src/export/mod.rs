use crate::flow::Record;

pub use sink::sink;
pub use tcp::Tcp;

mod sink;
mod tcp;

/// Accepts batches of decorated flow records. Delivery guarantees, retries
/// and encoding belong to the implementation.
pub trait Exporter: Send + Sync {
    fn export(&self, batch: Vec<Record>);
}

#[cfg(test)]
mod test;
