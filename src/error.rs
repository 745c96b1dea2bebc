use std::fmt;

#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    Export(String),
    Missing(&'static str),
    Deduper(String),
    Invalid(String),
    Address(String),
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match self {
            Error::Export(kind)  => write!(f, "invalid export kind '{}'", kind),
            Error::Missing(name) => write!(f, "missing required setting '{}'", name),
            Error::Deduper(kind) => write!(f, "invalid deduper kind '{}'", kind),
            Error::Invalid(msg)  => write!(f, "invalid configuration: {}", msg),
            Error::Address(msg)  => write!(f, "agent address: {}", msg),
        }
    }
}
