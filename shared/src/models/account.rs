//! User Account Model

use serde::{Deserialize, Serialize};

/// Collection holding user accounts, keyed by reserve id
pub const USERS_COLLECTION: &str = "users";

/// User account record (created at signup, read at login)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    /// Account lookup key handed to the user at signup
    pub reserve_id: String,
    pub email: String,
    pub name: String,
    pub student_id: String,
    /// argon2 PHC hash of the student id, which doubles as the password
    pub password: String,
}
