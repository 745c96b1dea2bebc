pub use cache::{Cache, FlushHandle};

mod cache;
