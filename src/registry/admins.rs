//! Admin accounts.
//!
//! Credentials are kept as argon2 PHC strings in `admins.json`. Files written
//! by older versions stored plaintext passwords; such an entry is accepted
//! once on a matching login and immediately replaced by a hash.

use crate::config::{read_json_or_default, write_json, Paths};
use crate::error::{AdminError, AdminResult};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{info, warn};

/// Hash a password with a fresh salt.
pub fn hash_password(password: &str) -> AdminResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AdminError::Hash(e.to_string()))
}

/// Check a password against a PHC hash string.
pub fn verify_password(password: &str, hashed: &str) -> AdminResult<bool> {
    let parsed = PasswordHash::new(hashed).map_err(|e| AdminError::Hash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Admin credential store.
#[derive(Debug, Clone)]
pub struct AdminStore {
    file: PathBuf,
    admins: BTreeMap<String, String>,
}

impl AdminStore {
    /// Load admins from the configuration directory.
    pub fn load(paths: &Paths) -> AdminResult<Self> {
        Self::load_from(paths.admins_file())
    }

    /// Load admins from a specific file. A missing file has no admins.
    pub fn load_from(file: impl Into<PathBuf>) -> AdminResult<Self> {
        let file = file.into();
        let admins = read_json_or_default(&file)?;
        Ok(Self { file, admins })
    }

    fn save(&self) -> AdminResult<()> {
        write_json(&self.file, &self.admins)?;
        Ok(())
    }

    /// Usernames, sorted.
    pub fn usernames(&self) -> Vec<&str> {
        self.admins.keys().map(String::as_str).collect()
    }

    /// Check if no admin account exists yet.
    pub fn is_empty(&self) -> bool {
        self.admins.is_empty()
    }

    /// Check if an admin exists.
    pub fn contains(&self, username: &str) -> bool {
        self.admins.contains_key(username)
    }

    /// Create a new admin.
    pub fn add(&mut self, username: &str, password: &str) -> AdminResult<()> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AdminError::EmptyCredentials);
        }
        if self.contains(username) {
            return Err(AdminError::AlreadyExists(username.to_string()));
        }

        self.admins
            .insert(username.to_string(), hash_password(password)?);
        self.save()?;
        info!(%username, "admin added");

        Ok(())
    }

    /// Remove an admin. Nobody can remove their own account.
    pub fn remove(&mut self, username: &str, requester: &str) -> AdminResult<()> {
        if username == requester {
            return Err(AdminError::CannotRemoveSelf);
        }
        if self.admins.remove(username).is_none() {
            return Err(AdminError::NotFound(username.to_string()));
        }

        self.save()?;
        info!(%username, by = %requester, "admin removed");

        Ok(())
    }

    /// Replace an admin's password.
    pub fn change_password(&mut self, username: &str, new_password: &str) -> AdminResult<()> {
        if new_password.is_empty() {
            return Err(AdminError::EmptyCredentials);
        }
        let entry = self
            .admins
            .get_mut(username)
            .ok_or_else(|| AdminError::NotFound(username.to_string()))?;

        *entry = hash_password(new_password)?;
        self.save()?;
        info!(%username, "admin password changed");

        Ok(())
    }

    /// Check a username and password.
    pub fn verify(&mut self, username: &str, password: &str) -> AdminResult<bool> {
        let stored = match self.admins.get(username) {
            Some(stored) => stored.clone(),
            None => return Ok(false),
        };

        if PasswordHash::new(&stored).is_ok() {
            return verify_password(password, &stored);
        }

        // Plaintext entry left by an older version.
        if stored != password {
            return Ok(false);
        }
        warn!(%username, "upgrading plaintext admin password to a hash");
        self.admins
            .insert(username.to_string(), hash_password(password)?);
        self.save()?;

        Ok(true)
    }

    /// Verify credentials, failing with `InvalidCredentials` on a mismatch.
    pub fn authenticate(&mut self, username: &str, password: &str) -> AdminResult<()> {
        if self.verify(username, password)? {
            Ok(())
        } else {
            Err(AdminError::InvalidCredentials)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn store(dir: &tempfile::TempDir) -> AdminStore {
        AdminStore::load_from(dir.path().join("admins.json")).unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_add_stores_hash_not_plaintext() {
        let dir = tempfile::tempdir().unwrap();
        let mut admins = store(&dir);
        admins.add("head", "s3cret").unwrap();

        let content = fs::read_to_string(dir.path().join("admins.json")).unwrap();
        assert!(!content.contains("s3cret"));
        assert!(store(&dir).verify("head", "s3cret").unwrap());
    }

    #[test]
    fn test_duplicate_and_empty_admins_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut admins = store(&dir);
        admins.add("head", "pw").unwrap();

        assert!(matches!(admins.add("head", "pw2"), Err(AdminError::AlreadyExists(_))));
        assert!(matches!(admins.add(" ", "pw"), Err(AdminError::EmptyCredentials)));
        assert!(matches!(admins.add("clerk", ""), Err(AdminError::EmptyCredentials)));
    }

    #[test]
    fn test_cannot_remove_self() {
        let dir = tempfile::tempdir().unwrap();
        let mut admins = store(&dir);
        admins.add("head", "pw").unwrap();
        admins.add("clerk", "pw").unwrap();

        assert!(matches!(admins.remove("head", "head"), Err(AdminError::CannotRemoveSelf)));
        admins.remove("clerk", "head").unwrap();
        assert_eq!(admins.usernames(), vec!["head"]);
        assert!(matches!(admins.remove("ghost", "head"), Err(AdminError::NotFound(_))));
    }

    #[test]
    fn test_change_password() {
        let dir = tempfile::tempdir().unwrap();
        let mut admins = store(&dir);
        admins.add("head", "old").unwrap();
        admins.change_password("head", "new").unwrap();

        assert!(!admins.verify("head", "old").unwrap());
        assert!(admins.verify("head", "new").unwrap());
        assert!(admins.authenticate("head", "old").is_err());
    }

    #[test]
    fn test_unknown_user_does_not_verify() {
        let dir = tempfile::tempdir().unwrap();
        let mut admins = store(&dir);
        assert!(!admins.verify("nobody", "pw").unwrap());
        assert!(matches!(
            admins.authenticate("nobody", "pw"),
            Err(AdminError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_plaintext_entry_upgraded_on_login() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("admins.json");
        fs::write(&file, r#"{"legacy": "letmein"}"#).unwrap();

        let mut admins = store(&dir);
        assert!(!admins.verify("legacy", "wrong").unwrap());
        assert!(admins.verify("legacy", "letmein").unwrap());

        let content = fs::read_to_string(&file).unwrap();
        assert!(!content.contains("letmein"));
        assert!(store(&dir).verify("legacy", "letmein").unwrap());
    }
}
