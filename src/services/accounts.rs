//! Account storage: register/authenticate against a JSON-file-persisted map
//! of username to argon2id password hash.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2, PasswordHash, PasswordVerifier,
};

use crate::error::{AppError, AppResult};

/// Symbols accepted by the password policy
const PASSWORD_SYMBOLS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Validates the password acceptance policy: at least 8 characters, one
/// uppercase, one lowercase, one digit, and one symbol.
///
/// Enforced at the registration boundary, not inside the store.
pub fn validate_password(password: &str) -> AppResult<()> {
    if password.chars().count() < 8 {
        return Err(AppError::InvalidInput(
            "Password must be at least 8 characters long".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(AppError::InvalidInput(
            "Password must contain at least one uppercase letter".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(AppError::InvalidInput(
            "Password must contain at least one lowercase letter".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AppError::InvalidInput(
            "Password must contain at least one digit".to_string(),
        ));
    }
    if !password.chars().any(|c| PASSWORD_SYMBOLS.contains(c)) {
        return Err(AppError::InvalidInput(format!(
            "Password must contain at least one symbol from {}",
            PASSWORD_SYMBOLS
        )));
    }
    Ok(())
}

/// Username-keyed credential storage
pub trait AccountStore: Send + Sync {
    /// Creates an account; returns false when the username is taken
    fn register(&self, username: &str, password: &str) -> AppResult<bool>;

    /// Checks a username/password pair
    fn authenticate(&self, username: &str, password: &str) -> AppResult<bool>;
}

/// JSON-file-backed account store. The whole map is rewritten on every
/// registration; fine at the user counts this serves.
pub struct JsonAccountStore {
    path: Option<PathBuf>,
    users: RwLock<HashMap<String, String>>,
}

impl JsonAccountStore {
    /// Opens (or initializes) the store at `path`
    pub fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();
        let users = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                AppError::Internal(format!("corrupt account store {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                return Err(AppError::Internal(format!(
                    "cannot read account store {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        tracing::info!(accounts = users.len(), path = %path.display(), "Account store opened");

        Ok(Self {
            path: Some(path),
            users: RwLock::new(users),
        })
    }

    /// Store with no backing file, for tests and ephemeral deployments
    pub fn in_memory() -> Self {
        Self {
            path: None,
            users: RwLock::new(HashMap::new()),
        }
    }

    fn persist(&self, users: &HashMap<String, String>) -> AppResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let contents = serde_json::to_string_pretty(users)
            .map_err(|e| AppError::Internal(format!("account store serialization: {}", e)))?;
        std::fs::write(path, contents).map_err(|e| {
            AppError::Internal(format!("cannot write account store {}: {}", path.display(), e))
        })
    }
}

impl AccountStore for JsonAccountStore {
    fn register(&self, username: &str, password: &str) -> AppResult<bool> {
        let mut users = self
            .users
            .write()
            .map_err(|_| AppError::Internal("account store lock poisoned".to_string()))?;

        if users.contains_key(username) {
            return Ok(false);
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("password hashing failed: {}", e)))?
            .to_string();

        users.insert(username.to_string(), hash);
        self.persist(&users)?;

        tracing::info!(username = %username, "Account registered");
        Ok(true)
    }

    fn authenticate(&self, username: &str, password: &str) -> AppResult<bool> {
        let users = self
            .users
            .read()
            .map_err(|_| AppError::Internal("account store lock poisoned".to_string()))?;

        let Some(stored) = users.get(username) else {
            return Ok(false);
        };

        let parsed = PasswordHash::new(stored)
            .map_err(|e| AppError::Internal(format!("stored hash unreadable: {}", e)))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_policy_accepts_strong() {
        assert!(validate_password("Str0ng!pass").is_ok());
    }

    #[test]
    fn test_password_policy_rejections() {
        assert!(validate_password("Sh0rt!a").is_err()); // 7 chars
        assert!(validate_password("n0caps!here").is_err());
        assert!(validate_password("N0LOWER!CASE").is_err());
        assert!(validate_password("NoDigits!here").is_err());
        assert!(validate_password("N0symbols4here").is_err());
    }

    #[test]
    fn test_register_and_authenticate() {
        let store = JsonAccountStore::in_memory();
        assert!(store.register("alice", "Str0ng!pass").unwrap());
        assert!(store.authenticate("alice", "Str0ng!pass").unwrap());
        assert!(!store.authenticate("alice", "Wr0ng!pass").unwrap());
        assert!(!store.authenticate("bob", "Str0ng!pass").unwrap());
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let store = JsonAccountStore::in_memory();
        assert!(store.register("alice", "Str0ng!pass").unwrap());
        assert!(!store.register("alice", "An0ther!pass").unwrap());
    }
}
