//! Consultant/client directory implementations.

pub mod in_memory;
pub mod yaml;

pub use in_memory::InMemoryPartyDirectory;
pub use invoicer_invoicing::{DirectoryError, PartyDirectory};
pub use yaml::YamlPartyDirectory;
