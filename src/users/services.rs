use std::fmt;
use std::str::FromStr;

use argon2::{password_hash::SaltString, Argon2, PasswordHasher};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use regex::Regex;
use tracing::error;

use crate::error::ApiError;
use crate::store::NewUser;
use crate::users::dto::CreateUserRequest;

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Doctor,
    Nurse,
    Patient,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Doctor => "doctor",
            Role::Nurse => "nurse",
            Role::Patient => "patient",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "doctor" => Ok(Role::Doctor),
            "nurse" => Ok(Role::Nurse),
            "patient" => Ok(Role::Patient),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// Normalizes and checks a registration request. The password is still
/// plaintext in the returned value.
pub fn validate(req: CreateUserRequest) -> Result<NewUser, ApiError> {
    let username = req.username.trim().to_string();
    if username.is_empty() {
        return Err(ApiError::BadRequest("Username is required".into()));
    }

    let email = req.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(ApiError::BadRequest("Invalid email".into()));
    }

    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest("Password too short".into()));
    }

    let role: Role = req.role.parse().map_err(ApiError::BadRequest)?;

    Ok(NewUser {
        username,
        email,
        password: req.password,
        role: role.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::{PasswordHash, PasswordVerifier};

    fn request(username: &str, email: &str, password: &str, role: &str) -> CreateUserRequest {
        CreateUserRequest {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            role: role.into(),
        }
    }

    #[test]
    fn hash_verifies_against_original_password() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password).expect("hashing should succeed");
        assert_ne!(hash, password);
        let parsed = PasswordHash::new(&hash).expect("hash is a PHC string");
        assert!(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok());
        assert!(Argon2::default()
            .verify_password(b"wrong-password", &parsed)
            .is_err());
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("alice@example.com"));
        assert!(!is_valid_email("alice@example"));
        assert!(!is_valid_email("alice example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn role_parsing_is_case_insensitive() {
        assert_eq!("Doctor".parse::<Role>().unwrap(), Role::Doctor);
        assert_eq!(" NURSE ".parse::<Role>().unwrap(), Role::Nurse);
        assert_eq!("patient".parse::<Role>().unwrap(), Role::Patient);
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn validate_normalizes_fields() {
        let user = validate(request("  alice ", " Alice@Example.COM", "secret123", "PATIENT"))
            .expect("valid request");
        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.password, "secret123");
        assert_eq!(user.role, "patient");
    }

    #[test]
    fn validate_rejects_bad_input() {
        let cases = [
            request("   ", "alice@example.com", "secret123", "patient"),
            request("alice", "not-an-email", "secret123", "patient"),
            request("alice", "alice@example.com", "short", "patient"),
            request("alice", "alice@example.com", "secret123", "admin"),
        ];
        for req in cases {
            let err = validate(req).unwrap_err();
            assert!(matches!(err, ApiError::BadRequest(_)), "got {err:?}");
        }
    }
}
