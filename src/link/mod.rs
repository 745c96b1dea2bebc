pub use address::{address, select, Family, Iface, Link};
pub use monitor::Links;

mod address;
mod monitor;

/// Resolves interface indexes to names. Lookups must not block.
pub trait Resolver: Send + Sync {
    fn lookup(&self, index: u32) -> Option<String>;
}

#[cfg(test)]
mod test;
