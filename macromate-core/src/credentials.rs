//! Account credentials: users keyed by normalized email, with a random salt
//! and salted SHA-256 hash per account.

use rand::Rng;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::models::User;

/// Salt length in bytes before hex encoding.
pub const SALT_LEN: usize = 16;

/// Trims and lowercases an email so lookups are case-insensitive.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Generates a random salt, hex encoded.
pub fn generate_salt() -> String {
    let mut bytes = [0u8; SALT_LEN];
    rand::rng().fill(&mut bytes);
    hex::encode(bytes)
}

/// SHA-256 of `salt` followed by `password`, as lowercase hex.
pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Why a credential operation was refused.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CredentialRejection {
    #[error("email is empty")]
    EmptyEmail,

    #[error("password is blank")]
    BlankPassword,

    #[error("email is already registered")]
    EmailTaken,

    #[error("no account for email")]
    UnknownEmail,
}

/// The user table together with the salt and hash tables.
///
/// All three maps share the same key set. Credentials are never stored on
/// the `User` itself.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    users: BTreeMap<String, User>,
    salts: BTreeMap<String, String>,
    hashes: BTreeMap<String, String>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a store from persisted tables. Entries missing from any of
    /// the three tables are dropped.
    pub fn from_parts(
        users: BTreeMap<String, User>,
        salts: BTreeMap<String, String>,
        hashes: BTreeMap<String, String>,
    ) -> Self {
        let mut store = Self::new();
        for (email, user) in users {
            match (salts.get(&email), hashes.get(&email)) {
                (Some(salt), Some(hash)) => {
                    store.salts.insert(email.clone(), salt.clone());
                    store.hashes.insert(email.clone(), hash.clone());
                    store.users.insert(email, user);
                }
                _ => tracing::debug!("Dropping user {} without stored credentials", email),
            }
        }
        store
    }

    pub fn users(&self) -> &BTreeMap<String, User> {
        &self.users
    }

    pub fn salts(&self) -> &BTreeMap<String, String> {
        &self.salts
    }

    pub fn hashes(&self) -> &BTreeMap<String, String> {
        &self.hashes
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn contains(&self, email: &str) -> bool {
        self.users.contains_key(&normalize_email(email))
    }

    pub fn get(&self, email: &str) -> Option<&User> {
        self.users.get(&normalize_email(email))
    }

    pub fn get_mut(&mut self, email: &str) -> Option<&mut User> {
        self.users.get_mut(&normalize_email(email))
    }

    /// Registers a new account and returns its normalized email.
    pub fn register(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<String, CredentialRejection> {
        let key = normalize_email(email);
        if key.is_empty() {
            return Err(CredentialRejection::EmptyEmail);
        }
        if password.trim().is_empty() {
            return Err(CredentialRejection::BlankPassword);
        }
        if self.users.contains_key(&key) {
            return Err(CredentialRejection::EmailTaken);
        }

        let salt = generate_salt();
        let hash = hash_password(&salt, password);

        self.users.insert(key.clone(), User::new(key.clone(), name.trim()));
        self.salts.insert(key.clone(), salt);
        self.hashes.insert(key.clone(), hash);
        Ok(key)
    }

    /// Checks a password. Unknown emails and wrong passwords both return
    /// `None`, and both compute a hash.
    pub fn verify(&self, email: &str, password: &str) -> Option<&User> {
        let key = normalize_email(email);
        let salt = self.salts.get(&key).map(String::as_str).unwrap_or("");
        let computed = hash_password(salt, password);

        match self.hashes.get(&key) {
            Some(stored) if *stored == computed => self.users.get(&key),
            _ => None,
        }
    }

    /// Moves an account to a new email across all three tables and updates
    /// the user's id. Returns the new normalized key. Renaming to the same
    /// address counts as a conflict.
    pub fn rename(&mut self, old_email: &str, new_email: &str) -> Result<String, CredentialRejection> {
        let old_key = normalize_email(old_email);
        let new_key = normalize_email(new_email);
        if old_key.is_empty() || new_key.is_empty() {
            return Err(CredentialRejection::EmptyEmail);
        }
        if !self.users.contains_key(&old_key) {
            return Err(CredentialRejection::UnknownEmail);
        }
        if self.users.contains_key(&new_key) {
            return Err(CredentialRejection::EmailTaken);
        }

        if let Some(mut user) = self.users.remove(&old_key) {
            user.id = new_key.clone();
            self.users.insert(new_key.clone(), user);
        }
        if let Some(salt) = self.salts.remove(&old_key) {
            self.salts.insert(new_key.clone(), salt);
        }
        if let Some(hash) = self.hashes.remove(&old_key) {
            self.hashes.insert(new_key.clone(), hash);
        }
        Ok(new_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  A@X.Com "), "a@x.com");
        assert_eq!(normalize_email("   "), "");
    }

    #[test]
    fn test_salt_is_random_hex() {
        let a = generate_salt();
        let b = generate_salt();
        assert_eq!(a.len(), SALT_LEN * 2);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_password_known_value() {
        // sha256("abc")
        assert_eq!(
            hash_password("a", "bc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_register_and_verify_case_insensitive() {
        let mut store = CredentialStore::new();
        let key = store.register("Ann", "a@x.com", "pw1").unwrap();
        assert_eq!(key, "a@x.com");

        assert!(store.verify("A@X.com", "pw1").is_some());
        assert!(store.verify("a@x.com", "pw2").is_none());
        assert!(store.verify("nobody@x.com", "pw1").is_none());
    }

    #[test]
    fn test_register_rejections() {
        let mut store = CredentialStore::new();
        assert_eq!(
            store.register("Ann", "  ", "pw"),
            Err(CredentialRejection::EmptyEmail)
        );
        assert_eq!(
            store.register("Ann", "a@x.com", "   "),
            Err(CredentialRejection::BlankPassword)
        );
        store.register("Ann", "a@x.com", "pw").unwrap();
        assert_eq!(
            store.register("Other", "A@x.COM", "pw"),
            Err(CredentialRejection::EmailTaken)
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_rejection_messages() {
        assert_eq!(CredentialRejection::EmailTaken.to_string(), "email is already registered");
        let err: Box<dyn std::error::Error> = CredentialRejection::UnknownEmail.into();
        assert_eq!(err.to_string(), "no account for email");
    }

    #[test]
    fn test_same_password_different_salts() {
        let mut store = CredentialStore::new();
        store.register("A", "a@x.com", "same").unwrap();
        store.register("B", "b@x.com", "same").unwrap();
        assert_ne!(store.hashes()["a@x.com"], store.hashes()["b@x.com"]);
    }

    #[test]
    fn test_rename_moves_all_tables() {
        let mut store = CredentialStore::new();
        store.register("Ann", "a@x.com", "pw").unwrap();
        store.register("Bob", "b@x.com", "pw").unwrap();

        assert_eq!(
            store.rename("a@x.com", "B@x.com"),
            Err(CredentialRejection::EmailTaken)
        );
        assert_eq!(store.rename("a@x.com", ""), Err(CredentialRejection::EmptyEmail));
        assert_eq!(
            store.rename("a@x.com", "A@X.COM"),
            Err(CredentialRejection::EmailTaken)
        );
        assert_eq!(
            store.rename("zed@x.com", "z@x.com"),
            Err(CredentialRejection::UnknownEmail)
        );

        let key = store.rename("a@x.com", "Ann@New.com").unwrap();
        assert_eq!(key, "ann@new.com");
        assert!(!store.contains("a@x.com"));
        assert!(!store.salts().contains_key("a@x.com"));
        assert_eq!(store.get("ann@new.com").unwrap().id, "ann@new.com");
        assert!(store.verify("ann@new.com", "pw").is_some());
    }

    #[test]
    fn test_from_parts_drops_incomplete_accounts() {
        let mut users = BTreeMap::new();
        users.insert("a@x.com".to_string(), User::new("a@x.com", "Ann"));
        users.insert("b@x.com".to_string(), User::new("b@x.com", "Bob"));
        let mut salts = BTreeMap::new();
        salts.insert("a@x.com".to_string(), "00".to_string());
        let mut hashes = BTreeMap::new();
        hashes.insert("a@x.com".to_string(), hash_password("00", "pw"));

        let store = CredentialStore::from_parts(users, salts, hashes);
        assert_eq!(store.len(), 1);
        assert!(store.verify("a@x.com", "pw").is_some());
    }
}
