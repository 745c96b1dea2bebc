pub use decorate::Decorator;

mod decorate;
