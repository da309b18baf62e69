//! Infrastructure layer: files on disk, YAML configuration, rendering, the
//! rate service, and the application-level orchestration on top of them.

pub mod artifact;
pub mod command_dispatcher;
pub mod config;
pub mod journal_store;
pub mod output;
pub mod parties;
pub mod publish;
pub mod rates;
pub mod regeneration;
pub mod render;
pub mod reports;
pub mod sequencer;


pub use command_dispatcher::{CommandDispatcher, DispatchError, ResetReport};
pub use config::{ArtifactFormat, ConfigError, Settings};
pub use regeneration::{IssuedInvoice, RegenerationEngine, RegenerationError, RegenerationReport};
pub use reports::{ReportError, ReportService};
