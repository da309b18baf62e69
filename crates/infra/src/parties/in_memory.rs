use std::collections::HashMap;

use invoicer_core::Entity;
use invoicer_invoicing::{Client, Consultant, DirectoryError, PartyDirectory};

/// Fixed directory for tests/dev.
#[derive(Debug, Clone)]
pub struct InMemoryPartyDirectory {
    consultant: Consultant,
    clients: HashMap<String, Client>,
}

impl InMemoryPartyDirectory {
    pub fn new(consultant: Consultant) -> Self {
        Self {
            consultant,
            clients: HashMap::new(),
        }
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.clients.insert(client.id().clone(), client);
        self
    }
}

impl PartyDirectory for InMemoryPartyDirectory {
    fn consultant(&self) -> Result<Consultant, DirectoryError> {
        Ok(self.consultant.clone())
    }

    fn client(&self, alias: &str) -> Result<Client, DirectoryError> {
        self.clients
            .get(alias)
            .cloned()
            .ok_or_else(|| DirectoryError::ClientNotFound(alias.to_string()))
    }
}
