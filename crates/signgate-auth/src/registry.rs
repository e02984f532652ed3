//! Client registry trait and implementations.
//!
//! The verifier never owns client storage. It resolves a claimed key id
//! through a [`ClientRegistry`], which may be backed by a static list loaded
//! at boot ([`StaticClientRegistry`]) or by any caller-provided lookup
//! ([`FnClientRegistry`]).

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::AuthError;

/// A client allowed to sign requests.
///
/// Deserializes from the registry record shape:
///
/// ```json
/// { "id": "11111111-1111-1111-1111-111111111111", "secretKey": "topsecret", "roles": ["ADMIN"] }
/// ```
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizedClient {
    /// The key id the client signs with.
    pub id: Uuid,
    /// The shared HMAC secret.
    pub secret_key: String,
    /// Role names granted to the client.
    #[serde(default)]
    pub roles: Vec<String>,
}

impl AuthorizedClient {
    /// Create a new client record.
    pub fn new(
        id: Uuid,
        secret_key: impl Into<String>,
        roles: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            id,
            secret_key: secret_key.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Debug for AuthorizedClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizedClient")
            .field("id", &self.id)
            .field("secret_key", &"<redacted>")
            .field("roles", &self.roles)
            .finish()
    }
}

/// Trait for resolving authorized clients by key id.
///
/// Lookups are by exact id and return at most one client. `Ok(None)` is the
/// normal "not registered" outcome; `Err` is reserved for a backend that
/// could not answer at all.
pub trait ClientRegistry: Send + Sync {
    /// Find the client registered under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Lookup`] if the backing store cannot be queried.
    fn find_by_id(&self, id: &Uuid) -> Result<Option<AuthorizedClient>, AuthError>;
}

/// An in-memory registry backed by a `HashMap`.
///
/// # Examples
///
/// ```
/// use signgate_auth::registry::{AuthorizedClient, ClientRegistry, StaticClientRegistry};
/// use uuid::Uuid;
///
/// let id = Uuid::from_u128(0x1111_1111_1111_1111_1111_1111_1111_1111);
/// let registry =
///     StaticClientRegistry::new(vec![AuthorizedClient::new(id, "topsecret", ["ADMIN"])]).unwrap();
///
/// let client = registry.find_by_id(&id).unwrap().unwrap();
/// assert_eq!(client.roles, vec!["ADMIN"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticClientRegistry {
    clients: HashMap<Uuid, AuthorizedClient>,
}

impl StaticClientRegistry {
    /// Build a registry from a list of clients.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Configuration`] if two clients share an id or a
    /// client has a blank secret.
    pub fn new(clients: impl IntoIterator<Item = AuthorizedClient>) -> Result<Self, AuthError> {
        let mut map = HashMap::new();
        for client in clients {
            if client.secret_key.trim().is_empty() {
                return Err(AuthError::Configuration(format!(
                    "client {} has a blank secret key",
                    client.id
                )));
            }
            if map.contains_key(&client.id) {
                return Err(AuthError::Configuration(format!(
                    "client {} is registered more than once",
                    client.id
                )));
            }
            map.insert(client.id, client);
        }
        Ok(Self { clients: map })
    }

    /// Build a registry from a JSON array of client records.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Configuration`] if the document is not a valid
    /// list of clients, or for the reasons listed on [`Self::new`].
    pub fn from_json(json: &str) -> Result<Self, AuthError> {
        let clients: Vec<AuthorizedClient> = serde_json::from_str(json)
            .map_err(|e| AuthError::Configuration(format!("invalid client registry: {e}")))?;
        Self::new(clients)
    }

    /// Load a registry from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Io`] if the file cannot be read, otherwise the
    /// errors of [`Self::from_json`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, AuthError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let registry = Self::from_json(&json)?;
        info!(
            path = %path.display(),
            clients = registry.len(),
            "loaded client registry"
        );
        Ok(registry)
    }

    /// Number of registered clients.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Whether no client is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

impl ClientRegistry for StaticClientRegistry {
    fn find_by_id(&self, id: &Uuid) -> Result<Option<AuthorizedClient>, AuthError> {
        let client = self.clients.get(id).cloned();
        debug!(client_id = %id, found = client.is_some(), "static registry lookup");
        Ok(client)
    }
}

/// A registry that delegates every lookup to a closure.
///
/// Lets an embedding application plug in a database or remote service
/// without implementing the trait on its own type.
pub struct FnClientRegistry<F> {
    lookup: F,
}

impl<F> FnClientRegistry<F>
where
    F: Fn(&Uuid) -> Result<Option<AuthorizedClient>, AuthError> + Send + Sync,
{
    /// Wrap a lookup function.
    pub fn new(lookup: F) -> Self {
        Self { lookup }
    }
}

impl<F> fmt::Debug for FnClientRegistry<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnClientRegistry").finish_non_exhaustive()
    }
}

impl<F> ClientRegistry for FnClientRegistry<F>
where
    F: Fn(&Uuid) -> Result<Option<AuthorizedClient>, AuthError> + Send + Sync,
{
    fn find_by_id(&self, id: &Uuid) -> Result<Option<AuthorizedClient>, AuthError> {
        (self.lookup)(id)
    }
}
