use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::de::DeserializeOwned;

use invoicer_invoicing::{Client, Consultant, DirectoryError, PartyDirectory};

pub const CONSULTANT_FILE: &str = "consultant.yaml";
pub const CLIENTS_FILE: &str = "clients.yaml";

#[derive(Debug, Deserialize)]
struct ConsultantFile {
    consultant: Consultant,
}

#[derive(Debug, Deserialize)]
struct ClientsFile {
    clients: Vec<Client>,
}

/// Directory backed by `consultant.yaml` and `clients.yaml`.
///
/// Files are read on every lookup, so commands that never need a party (the
/// reports, `reset`) work without any configuration present.
#[derive(Debug, Clone)]
pub struct YamlPartyDirectory {
    config_dir: PathBuf,
}

impl YamlPartyDirectory {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    fn read<T: DeserializeOwned>(&self, file: &str) -> Result<T, DirectoryError> {
        let path = self.config_dir.join(file);
        let raw = fs::read_to_string(&path)
            .map_err(|e| DirectoryError::Unavailable(format!("{}: {e}", path.display())))?;
        serde_yaml::from_str(&raw)
            .map_err(|e| DirectoryError::Unavailable(format!("{}: {e}", path.display())))
    }
}

impl PartyDirectory for YamlPartyDirectory {
    fn consultant(&self) -> Result<Consultant, DirectoryError> {
        self.read::<ConsultantFile>(CONSULTANT_FILE).map(|f| f.consultant)
    }

    fn client(&self, alias: &str) -> Result<Client, DirectoryError> {
        self.read::<ClientsFile>(CLIENTS_FILE)?
            .clients
            .into_iter()
            .find(|c| c.alias == alias)
            .ok_or_else(|| DirectoryError::ClientNotFound(alias.to_string()))
    }
}
