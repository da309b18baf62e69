//! Consultant and client records, and the directory they are looked up in.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use invoicer_core::Entity;

/// The single consultant issuing every invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consultant {
    pub name: String,
    pub address: String,
    pub city_postal_code: String,
    pub country: String,
    #[serde(deserialize_with = "string_or_number")]
    pub phone_number: String,
    pub email: String,
    #[serde(deserialize_with = "string_or_number")]
    pub siret_number: String,
    pub ape_code: String,
    pub vat_number: String,
    pub bank_name: String,
    pub bank_account_number: String,
    pub bank_routing_number: String,
}

/// A billed client. `alias` is what operators type; `short_name` goes into
/// invoice numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub full_name: String,
    pub short_name: String,
    pub alias: String,
    pub address: String,
    pub city_state_zip_code: String,
    pub country: String,
}

impl Entity for Client {
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.alias
    }
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("client {0:?} not found in client configuration")]
    ClientNotFound(String),

    #[error("party directory unavailable: {0}")]
    Unavailable(String),
}

/// Lookup of the consultant record and client records by alias.
pub trait PartyDirectory {
    fn consultant(&self) -> Result<Consultant, DirectoryError>;

    /// Fails with [`DirectoryError::ClientNotFound`] when `alias` is unknown.
    fn client(&self, alias: &str) -> Result<Client, DirectoryError>;
}

impl<D> PartyDirectory for &D
where
    D: PartyDirectory + ?Sized,
{
    fn consultant(&self) -> Result<Consultant, DirectoryError> {
        (**self).consultant()
    }

    fn client(&self, alias: &str) -> Result<Client, DirectoryError> {
        (**self).client(alias)
    }
}

/// YAML happily reads `phone_number: 33612345678` as an integer.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Int(i64),
        Unsigned(u64),
    }

    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::Text(s) => s,
        Scalar::Int(n) => n.to_string(),
        Scalar::Unsigned(n) => n.to_string(),
    })
}
