//! Accounts: signup, login and my page
//!
//! An account lives at `users/{reserveId}`. The reserve id is handed to the
//! user at signup and is the login name; the student id doubles as the
//! password and is stored as an argon2 PHC hash.

use std::sync::Arc;

use booth_store::{CasOutcome, RealtimeDatabase, RealtimeDatabaseExt, StoreError, path};
use serde::{Deserialize, Serialize};
use shared::models::{USERS_COLLECTION, UserAccount};
use shared::util::next_account_key;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::audit_log;
use crate::error::AccountError;

/// Minimum student id length, since it is also the password
pub const MIN_STUDENT_ID_LEN: usize = 4;

/// Fresh keys tried before giving up on a collision-free reserve id
const RESERVE_ID_ATTEMPTS: usize = 5;

/// Signup page input
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupForm {
    #[validate(email(message = "email is invalid"))]
    pub email: String,
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub student_id: String,
}

impl SignupForm {
    pub fn new(
        email: impl Into<String>,
        name: impl Into<String>,
        student_id: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into().trim().to_string(),
            name: name.into().trim().to_string(),
            student_id: student_id.into().trim().to_string(),
        }
    }
}

/// What the my page shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MyPage {
    LoggedIn {
        reserve_id: String,
        /// `"{name} ({email})"`
        greeting: String,
    },
    LoginRequired,
}

impl MyPage {
    pub fn for_user(user: Option<&UserAccount>) -> Self {
        let Some(user) = user else {
            return MyPage::LoginRequired;
        };
        let name = if user.name.is_empty() {
            user.reserve_id.as_str()
        } else {
            user.name.as_str()
        };
        let contact = if user.email.is_empty() {
            user.reserve_id.as_str()
        } else {
            user.email.as_str()
        };
        MyPage::LoggedIn {
            reserve_id: user.reserve_id.clone(),
            greeting: format!("{name} ({contact})"),
        }
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self, MyPage::LoggedIn { .. })
    }
}

/// Hash a password with argon2 and a random salt
pub fn hash_password(password: &str) -> Result<String, AccountError> {
    use argon2::password_hash::SaltString;
    use argon2::{Argon2, PasswordHasher};

    let salt_bytes: [u8; 16] = rand::random();
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| AccountError::Hash(e.to_string()))?;
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AccountError::Hash(e.to_string()))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[derive(Clone)]
pub struct AccountService {
    db: Arc<dyn RealtimeDatabase>,
}

impl AccountService {
    pub fn new(db: Arc<dyn RealtimeDatabase>) -> Self {
        Self { db }
    }

    /// Create an account and return it, including the new reserve id
    #[instrument(skip_all, fields(student_id = %form.student_id))]
    pub async fn signup(&self, form: SignupForm) -> Result<UserAccount, AccountError> {
        if form.student_id.chars().count() < MIN_STUDENT_ID_LEN {
            return Err(AccountError::StudentIdTooShort {
                min: MIN_STUDENT_ID_LEN,
            });
        }
        form.validate()
            .map_err(|e| AccountError::Validation(crate::form::describe(&e)))?;

        let password = hash_password(&form.student_id)?;
        for _ in 0..RESERVE_ID_ATTEMPTS {
            let account = UserAccount {
                reserve_id: next_account_key(),
                email: form.email.clone(),
                name: form.name.clone(),
                student_id: form.student_id.clone(),
                password: password.clone(),
            };
            let account_path = path::child(USERS_COLLECTION, &account.reserve_id)?;
            let value = serde_json::to_value(&account)
                .map_err(|e| AccountError::Store(e.into()))?;

            // never overwrite an existing account on a key collision
            match self.db.compare_and_swap(&account_path, None, value).await? {
                CasOutcome::Swapped => {
                    info!(reserve_id = %account.reserve_id, "Account created");
                    audit_log!(
                        account.student_id.as_str(),
                        "signup",
                        format!("user:{}", account.reserve_id).as_str()
                    );
                    return Ok(account);
                }
                CasOutcome::Conflict { .. } => {
                    warn!(reserve_id = %account.reserve_id, "Reserve id collision, regenerating");
                }
            }
        }
        Err(AccountError::Store(StoreError::Unavailable(format!(
            "no free reserve id after {RESERVE_ID_ATTEMPTS} attempts"
        ))))
    }

    pub async fn find(&self, reserve_id: &str) -> Result<Option<UserAccount>, AccountError> {
        let account_path = path::child(USERS_COLLECTION, reserve_id)?;
        Ok(self.db.get_as(&account_path).await?)
    }

    /// Look up the account and check the student id against it
    #[instrument(skip(self, student_id))]
    pub async fn authenticate(
        &self,
        reserve_id: &str,
        student_id: &str,
    ) -> Result<UserAccount, AccountError> {
        let reserve_id = reserve_id.trim();
        let student_id = student_id.trim();
        if reserve_id.is_empty() || student_id.is_empty() {
            return Err(AccountError::MissingCredentials);
        }
        // reserve ids are path segments; anything else cannot name an account
        if reserve_id.contains('/') {
            return Err(AccountError::UnknownReserveId(reserve_id.to_string()));
        }

        let account = self
            .find(reserve_id)
            .await?
            .ok_or_else(|| AccountError::UnknownReserveId(reserve_id.to_string()))?;

        let matches = if account.password.starts_with('$') {
            verify_password(student_id, &account.password)
        } else {
            // records written without a hash keep the student id in the clear
            account.student_id == student_id
        };
        if !matches {
            warn!("Student id mismatch");
            return Err(AccountError::StudentIdMismatch(reserve_id.to_string()));
        }
        Ok(account)
    }
}
