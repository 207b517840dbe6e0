//! Account provisioning: validation, password hashing and uniqueness
//! checks in front of the persistence API.

use crate::{AppError, AppResult};
use hkdf::Hkdf;
use regex::Regex;
use serde::Deserialize;
use sha2::Sha256;
use std::sync::{Arc, OnceLock};
use waza_client::{ClientError, NewUser, UserAccount, UserType, WazaApiClient};

const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;
const HASH_SCHEME: &str = "hkdf-sha256";
const HASH_INFO: &[u8] = b"waza password v1";

/// Incoming account-creation request. Statically shaped; the password is
/// plaintext here and exists only until it is hashed.
#[derive(Clone, Debug, Deserialize)]
pub struct NewUserRequest {
    pub user_id: Option<String>,
    pub username: String,
    pub email: String,
    pub password: String,
    pub user_type: UserType,
    pub profile_pic: Option<String>,
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex compiles"))
}

pub fn validate_email(email: &str) -> Result<(), String> {
    if email_regex().is_match(email) {
        Ok(())
    } else {
        Err("Invalid email format".into())
    }
}

/// At least 8 characters with one uppercase letter, one lowercase letter,
/// one digit and one special character.
pub fn validate_password(password: &str) -> Result<(), String> {
    let long_enough = password.chars().count() >= 8;
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| !c.is_alphanumeric());
    if long_enough && has_upper && has_lower && has_digit && has_special {
        Ok(())
    } else {
        Err("Invalid password format. Password must be at least 8 characters long and \
             include at least one uppercase letter, one lowercase letter, one digit, \
             and one special character"
            .into())
    }
}

fn validate_request(req: &NewUserRequest) -> AppResult<()> {
    if req.username.trim().is_empty() || req.email.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::Validation("Missing required fields".into()));
    }
    validate_email(&req.email).map_err(AppError::Validation)?;
    validate_password(&req.password).map_err(AppError::Validation)?;
    Ok(())
}

fn derive_hash(salt: &[u8], password: &str) -> AppResult<[u8; HASH_LEN]> {
    let hk = Hkdf::<Sha256>::new(Some(salt), password.as_bytes());
    let mut okm = [0u8; HASH_LEN];
    hk.expand(HASH_INFO, &mut okm)
        .map_err(|e| AppError::Internal(format!("password hash derivation: {e}")))?;
    Ok(okm)
}

/// Derive a salted password hash, `hkdf-sha256$<salt>$<digest>` with both
/// parts hex-encoded. The salt comes from the OS RNG.
pub fn hash_password(password: &str) -> AppResult<String> {
    let mut salt = [0u8; SALT_LEN];
    getrandom::fill(&mut salt).map_err(|e| AppError::Internal(format!("salt generation: {e}")))?;
    let digest = derive_hash(&salt, password)?;
    Ok(format!(
        "{}${}${}",
        HASH_SCHEME,
        hex::encode(salt),
        hex::encode(digest)
    ))
}

/// Check a plaintext password against a stored `hash_password` string.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (Some(scheme), Some(salt_hex), Some(digest_hex), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    if scheme != HASH_SCHEME {
        return false;
    }
    let (Ok(salt), Ok(digest)) = (hex::decode(salt_hex), hex::decode(digest_hex)) else {
        return false;
    };
    match derive_hash(&salt, password) {
        Ok(derived) => derived.as_slice() == digest.as_slice(),
        Err(_) => false,
    }
}

/// Provisioning facade over the user store.
pub struct UserDirectory {
    client: Arc<dyn WazaApiClient>,
}

impl UserDirectory {
    pub fn new(client: Arc<dyn WazaApiClient>) -> Self {
        Self { client }
    }

    /// Validate, hash and store a new account. Username and email must be
    /// unused; a duplicate-key answer from the store maps to `Conflict`.
    /// The returned account never carries the hash.
    pub async fn provision_user(&self, req: NewUserRequest) -> AppResult<UserAccount> {
        validate_request(&req)?;

        if self
            .client
            .find_user_by_username(&req.username)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("Username already exists".into()));
        }
        if self.client.find_user_by_email(&req.email).await?.is_some() {
            return Err(AppError::Conflict("Email already exists".into()));
        }

        let now = chrono::Utc::now()
            .to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        let user = NewUser {
            user_id: req
                .user_id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            username: req.username,
            email: req.email,
            password_hash: hash_password(&req.password)?,
            user_type: req.user_type,
            profile_pic: req.profile_pic,
            date_joined: now.clone(),
            last_login: now,
        };

        match self.client.create_user(user).await {
            Ok(account) => {
                metrics::counter!("users_provisioned_total").increment(1);
                Ok(account)
            }
            Err(ClientError::Upstream { status: 409, .. }) => {
                Err(AppError::Conflict("Duplicate user_id".into()))
            }
            Err(e) => Err(AppError::Api(e)),
        }
    }
}
