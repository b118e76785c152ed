//! User account model.

use serde::{Deserialize, Serialize};

/// Domain appended to derived demo e-mail addresses.
pub const MAIL_DOMAIN: &str = "example.com";

pub const ROLE_EDITOR: &str = "editor";
pub const ROLE_AUTHOR: &str = "author";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub mail: String,
    /// Active account flag.
    pub status: bool,
    pub roles: Vec<String>,
}

impl User {
    /// Creates an active account with one role and a derived mail address.
    pub fn new(name: impl Into<String>, role: &str) -> Self {
        let name = name.into();
        Self {
            mail: derive_mail(&name),
            name,
            status: true,
            roles: vec![role.to_string()],
        }
    }
}

/// Derives the demo mail address: lowercase name, spaces become dots.
///
/// `Margaret Hopper` -> `margaret.hopper@example.com`.
pub fn derive_mail(name: &str) -> String {
    format!("{}@{MAIL_DOMAIN}", name.replace(' ', ".").to_lowercase())
}
