//! User directory - registered users in a flat JSON file

mod session;

pub use session::{Session, SessionStore};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::helpers::write_atomic;
use crate::{Error, Result};

/// Shortest accepted password, in characters
pub const MIN_PASSWORD_LEN: usize = 6;

/// A stored user record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    /// argon2 PHC string, never the plaintext
    pub password: String,
    pub created_at: String,
}

/// The fields of a user that may leave the directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPublic {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserPublic {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Users keyed by email, persisted as one JSON array
pub struct UserDirectory {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl UserDirectory {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every stored user; a missing file is an empty directory
    pub fn all(&self) -> Result<Vec<User>> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(Vec::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.all()?.into_iter().find(|user| user.email == email))
    }

    /// Add a user and return its public fields
    pub fn register(&self, name: &str, email: &str, password: &str) -> Result<UserPublic> {
        let name = name.trim();
        let email = email.trim();
        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(Error::validation("name, email and password are required"));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(Error::validation(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let _guard = self.lock();
        let mut users = self.all()?;
        if users.iter().any(|user| user.email == email) {
            return Err(Error::validation("email already registered"));
        }

        let hashed = hash_password(password)?;
        let now = Utc::now();

        // Millisecond timestamp, bumped past any id already taken
        let mut id = now.timestamp_millis();
        while users.iter().any(|user| user.id == id.to_string()) {
            id += 1;
        }

        let user = User {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            password: hashed,
            created_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        let public = UserPublic::from(&user);

        users.push(user);
        self.save(&users)?;

        tracing::info!(user_id = %public.id, "Registered user");
        Ok(public)
    }

    /// Check credentials.
    ///
    /// Unknown emails and wrong passwords both yield [`Error::Unauthenticated`],
    /// and both pay for one argon2 computation.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<UserPublic> {
        let Some(user) = self.find_by_email(email.trim())? else {
            // Burn the same work a verification would
            let _ = hash_password(password);
            return Err(Error::Unauthenticated);
        };

        if verify_password(password, &user.password) {
            Ok(UserPublic::from(&user))
        } else {
            Err(Error::Unauthenticated)
        }
    }

    fn save(&self, users: &[User]) -> Result<()> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let json = serde_json::to_string_pretty(users)?;
        write_atomic(&dir, &self.path, json.as_bytes())?;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::Hash(e.to_string()))
}

fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("Unreadable password hash in user directory: {}", e);
            false
        }
    }
}
