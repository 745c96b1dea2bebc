use std::sync::Arc;

/// Forces eviction of an upstream flow map. Must tolerate concurrent and
/// repeated calls.
pub trait Flush: Send + Sync {
    fn flush(&self);
}

#[derive(Clone, Default)]
pub struct Flushers {
    all: Vec<Arc<dyn Flush>>,
}

impl Flushers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, flusher: Arc<dyn Flush>) {
        self.all.push(flusher);
    }
}

impl Flush for Flushers {
    fn flush(&self) {
        self.all.iter().for_each(|f| f.flush());
    }
}
