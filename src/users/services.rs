use lazy_static::lazy_static;
use regex::Regex;
use time::OffsetDateTime;

use crate::users::error::{PasswordError, ValidationError};
use crate::users::password::hash_password;
use crate::users::repo_types::{Password, User};

/// Which rule set `User::validate` applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Update,
    Login,
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(
            r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
        )
        .unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '\'' => out.push_str("&#39;"),
            '"' => out.push_str("&#34;"),
            _ => out.push(c),
        }
    }
    out
}

impl User {
    /// Sanitize request input in place before validation.
    ///
    /// Resets the id, trims and escapes nickname and email, drops any
    /// stored hash and stamps both timestamps with the same instant.
    /// A plaintext password from the request is kept for `before_save`.
    pub fn prepare(&mut self) {
        self.id = 0;
        self.nickname = escape_html(self.nickname.trim());
        self.email = escape_html(self.email.trim());
        if matches!(self.password, Password::Hashed(_)) {
            self.password = Password::Empty;
        }
        let now = OffsetDateTime::now_utc();
        self.created_at = now;
        self.updated_at = now;
    }

    /// Replace the plaintext password with its hash. Must run once per save.
    pub fn before_save(&mut self) -> Result<(), PasswordError> {
        let hash = self.hash_plaintext()?;
        self.password = Password::Hashed(hash);
        Ok(())
    }

    /// Hash the plaintext password without touching `self`.
    pub(crate) fn hash_plaintext(&self) -> Result<String, PasswordError> {
        match &self.password {
            Password::Plain(plain) if !plain.is_empty() => hash_password(plain),
            Password::Hashed(_) => Err(PasswordError::AlreadyHashed),
            _ => Err(PasswordError::Missing),
        }
    }

    pub fn validate(&self, action: Action) -> Result<(), ValidationError> {
        if action != Action::Login && self.nickname.is_empty() {
            return Err(ValidationError::RequiredNickname);
        }
        if self.password.is_empty() {
            return Err(ValidationError::RequiredPassword);
        }
        if self.email.is_empty() {
            return Err(ValidationError::RequiredEmail);
        }
        if !is_valid_email(&self.email) {
            return Err(ValidationError::InvalidEmail);
        }
        Ok(())
    }
}
