use std::collections::HashMap;
use std::sync::Arc;

use argon2::{Algorithm, Argon2, Params, PasswordHasher, PasswordVerifier, Version};
use password_hash::{PasswordHash, SaltString};
use rand::Rng;

use crate::auth::AuthError;
use crate::error::Error;
use crate::types::UserId;

/// A registered identity.
///
/// The credential is kept only as an argon2 PHC string.
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: UserId,
    pub login: String,
    pub display_name: String,
    credential_hash: String,
}

/// Accounts available at startup: `(id, login, display name, password)`.
const SEED_USERS: &[(u32, &str, &str, &str)] = &[
    (1, "user", "Ivan Petrov", "qwerty"),
    (2, "admin", "Maria Sokolova", "admin123"),
];

/// Fixed in-memory registry of identities.
///
/// Populated once at startup and immutable afterwards, so it is shared
/// between requests through a plain `Arc` without locking.
pub struct UserDirectory {
    hasher: Argon2<'static>,
    by_login: HashMap<String, Arc<Identity>>,
    by_id: HashMap<UserId, Arc<Identity>>,
    // Verified against when the login is unknown, so both failure paths
    // spend the same hashing time.
    dummy_hash: String,
}

impl UserDirectory {
    /// Build the directory with the seed accounts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Credential`] if hashing a seed credential fails.
    pub fn seeded(params: Params) -> Result<Self, Error> {
        let mut directory = Self::empty(params)?;
        for &(id, login, display_name, password) in SEED_USERS {
            directory.insert(UserId(id), login, display_name, password)?;
        }
        Ok(directory)
    }

    fn empty(params: Params) -> Result<Self, Error> {
        let hasher = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let dummy_hash = hash_credential(&hasher, "not-a-real-credential")?;
        Ok(Self {
            hasher,
            by_login: HashMap::new(),
            by_id: HashMap::new(),
            dummy_hash,
        })
    }

    fn insert(
        &mut self,
        id: UserId,
        login: &str,
        display_name: &str,
        password: &str,
    ) -> Result<(), Error> {
        let identity = Arc::new(Identity {
            id,
            login: login.to_string(),
            display_name: display_name.to_string(),
            credential_hash: hash_credential(&self.hasher, password)?,
        });
        self.by_login.insert(identity.login.clone(), identity.clone());
        self.by_id.insert(id, identity);
        Ok(())
    }

    #[must_use]
    pub fn find_by_login(&self, login: &str) -> Option<Arc<Identity>> {
        self.by_login.get(login).cloned()
    }

    #[must_use]
    pub fn find_by_id(&self, id: UserId) -> Option<Arc<Identity>> {
        self.by_id.get(&id).cloned()
    }

    /// Check a supplied credential against the stored hash.
    #[must_use]
    pub fn verify_credential(&self, identity: &Identity, supplied: &str) -> bool {
        verify_hash(&self.hasher, &identity.credential_hash, supplied)
    }

    /// Look up `login` and verify `supplied` in one step.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown login or a
    /// credential mismatch; the two cases are not distinguished.
    pub fn authenticate(&self, login: &str, supplied: &str) -> Result<Arc<Identity>, AuthError> {
        match self.find_by_login(login) {
            Some(identity) if self.verify_credential(&identity, supplied) => Ok(identity),
            Some(_) => Err(AuthError::InvalidCredentials),
            None => {
                let _ = verify_hash(&self.hasher, &self.dummy_hash, supplied);
                Err(AuthError::InvalidCredentials)
            }
        }
    }
}

fn hash_credential(hasher: &Argon2<'_>, password: &str) -> Result<String, Error> {
    let salt_bytes: [u8; 16] = rand::rng().random();
    let salt =
        SaltString::encode_b64(&salt_bytes).map_err(|e| Error::Credential(e.to_string()))?;
    let phc = hasher
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::Credential(e.to_string()))?;
    Ok(phc.to_string())
}

fn verify_hash(hasher: &Argon2<'_>, phc: &str, supplied: &str) -> bool {
    match PasswordHash::new(phc) {
        Ok(parsed) => hasher.verify_password(supplied.as_bytes(), &parsed).is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
pub(crate) fn test_params() -> Params {
    Params::new(Params::MIN_M_COST, 1, 1, None).unwrap()
}
