pub use agent::{Agent, Deps};
pub use config::{Config, Export};
pub use status::{State, Status};

mod agent;
mod config;
mod status;
