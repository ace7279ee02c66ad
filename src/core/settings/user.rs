//! Web site users and password hashing

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use ulid::Ulid;

const HASH_SCHEME: &str = "sha256";

/// A user that may log in to the web site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub unique_id: String,
    pub enabled: bool,
    pub login_name: String,
    pub name: String,
    /// `sha256$<salt>$<digest>`, both hex; empty when no password is set
    pub password_hash: String,
    pub can_use_web_site: bool,
}

impl Default for User {
    fn default() -> Self {
        Self {
            unique_id: Ulid::new().to_string(),
            enabled: true,
            login_name: String::new(),
            name: String::new(),
            password_hash: String::new(),
            can_use_web_site: true,
        }
    }
}

impl User {
    pub fn new(login_name: impl Into<String>) -> Self {
        let login_name = login_name.into();
        Self {
            name: login_name.clone(),
            login_name,
            ..Self::default()
        }
    }

    pub fn has_password(&self) -> bool {
        !self.password_hash.is_empty()
    }

    /// Replace the password with a freshly salted hash
    pub fn set_password(&mut self, password: &str) {
        let salt: [u8; 16] = rand::random();
        let salt_hex = to_hex(&salt);
        let digest = digest(&salt_hex, password);
        self.password_hash = format!("{}${}${}", HASH_SCHEME, salt_hex, digest);
    }

    pub fn verify_password(&self, password: &str) -> bool {
        let mut parts = self.password_hash.splitn(3, '$');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(HASH_SCHEME), Some(salt), Some(expected)) => digest(salt, password) == expected,
            _ => false,
        }
    }

    /// May this user log in to the web site right now?
    pub fn can_log_in(&self) -> bool {
        self.enabled && self.can_use_web_site && self.has_password()
    }
}

fn digest(salt_hex: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt_hex.as_bytes());
    hasher.update(password.as_bytes());
    to_hex(&hasher.finalize())
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_round_trip() {
        let mut user = User::new("alice");
        assert!(!user.has_password());
        assert!(!user.verify_password(""));

        user.set_password("hunter2");
        assert!(user.password_hash.starts_with("sha256$"));
        assert!(user.verify_password("hunter2"));
        assert!(!user.verify_password("hunter3"));
        assert!(user.can_log_in());
    }

    #[test]
    fn test_salt_differs_between_hashes() {
        let mut a = User::new("a");
        let mut b = User::new("b");
        a.set_password("same");
        b.set_password("same");
        assert_ne!(a.password_hash, b.password_hash);
    }

    #[test]
    fn test_new_user_gets_unique_id() {
        let a = User::new("a");
        let b = User::new("b");
        assert_eq!(a.unique_id.len(), 26);
        assert_ne!(a.unique_id, b.unique_id);
        assert_eq!(a.name, "a");
    }

    #[test]
    fn test_disabled_user_cannot_log_in() {
        let mut user = User::new("bob");
        user.set_password("pw");
        user.enabled = false;
        assert!(!user.can_log_in());
    }
}
