//! Trusted contacts.
//!
//! A driver registers a short list of people to be told when an alert is
//! raised. Contacts are appended and cleared in bulk; they are never edited
//! or removed one by one.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;

use crate::error::{Error, Result};
use crate::storage::DocumentStore;

/// Maximum length of a contact name, in characters.
pub const MAX_NAME_LEN: usize = 60;

/// Maximum length of a raw phone number, in characters.
pub const MAX_PHONE_LEN: usize = 30;

/// Default number of trusted contacts a driver can register.
pub const DEFAULT_MAX_CONTACTS: usize = 3;

/// Message returned when a name or phone is missing.
pub const REQUIRED_FIELDS_MESSAGE: &str = "Nome e telefone são obrigatórios.";

/// A trusted contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Upper-cased display name.
    pub name: String,
    /// Digits only, with an optional leading `+`.
    pub phone: String,
}

impl Contact {
    /// Build a contact from raw form input.
    ///
    /// Both fields are trimmed and truncated; the name is upper-cased and
    /// the phone normalized.
    ///
    /// # Errors
    ///
    /// Returns a validation error if either field is empty after trimming.
    pub fn from_input(name: &str, phone: &str) -> Result<Self> {
        let name = truncate_chars(name.trim(), MAX_NAME_LEN);
        let phone = truncate_chars(phone.trim(), MAX_PHONE_LEN);

        if name.is_empty() || phone.is_empty() {
            return Err(Error::validation(REQUIRED_FIELDS_MESSAGE));
        }

        Ok(Self {
            name: name.to_uppercase(),
            phone: normalize_phone(phone),
        })
    }
}

/// Normalize a phone number to its digits, keeping a leading `+`.
///
/// ```
/// assert_eq!(vyra::contact::normalize_phone("+55 11 9999-8888"), "+551199998888");
/// assert_eq!(vyra::contact::normalize_phone("(11) 9999-8888"), "1199998888");
/// ```
#[must_use]
pub fn normalize_phone(phone: &str) -> String {
    let compact: String = phone.chars().filter(|c| *c != ' ').collect();
    let mut normalized = String::with_capacity(compact.len());
    if compact.starts_with('+') {
        normalized.push('+');
    }
    normalized.extend(compact.chars().filter(char::is_ascii_digit));
    normalized
}

/// Keep at most `max` characters of `s`.
pub(crate) fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// The list of trusted contacts.
///
/// Every operation reads the whole document and, for mutations, writes it
/// back. Mutations are serialized so concurrent callers never overwrite
/// each other's additions.
#[derive(Clone)]
pub struct ContactBook {
    store: Arc<dyn DocumentStore<Contact>>,
    write_lock: Arc<Mutex<()>>,
    limit: usize,
}

impl fmt::Debug for ContactBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContactBook")
            .field("store", &self.store.location())
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}

impl ContactBook {
    /// Create a contact book over `store`, holding at most `limit` contacts.
    pub fn new(store: Arc<dyn DocumentStore<Contact>>, limit: usize) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
            limit,
        }
    }

    /// Get the maximum number of contacts.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// List the contacts in registration order.
    pub async fn list(&self) -> Vec<Contact> {
        self.store.load().await
    }

    /// Register a new contact and return the updated list.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the name or phone is empty, a capacity
    /// error if the list is full, or a storage error if the write fails.
    pub async fn add(&self, name: &str, phone: &str) -> Result<Vec<Contact>> {
        let contact = Contact::from_input(name, phone)?;

        let _guard = self.write_lock.lock().await;
        let mut contacts = self.store.load().await;
        if contacts.len() >= self.limit {
            return Err(Error::Capacity { limit: self.limit });
        }

        info!(
            "Registering contact {} ({} of {})",
            contact.name,
            contacts.len() + 1,
            self.limit
        );
        contacts.push(contact);
        self.store.save(&contacts).await?;
        Ok(contacts)
    }

    /// Remove every contact.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.store.save(&[]).await?;
        info!("Cleared contacts at {}", self.store.location());
        Ok(())
    }
}
