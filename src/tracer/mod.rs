pub use flush::{Flush, Flushers};
pub use ringbuf::RingBufTracer;
pub use source::{FileSource, ReadError, Source};
pub use stats::{Stats, Summary};

mod flush;
mod ringbuf;
mod source;
mod stats;
