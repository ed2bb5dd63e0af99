//! Accounts, passwords, and session tokens
//!
//! Passwords are stored as Argon2id PHC strings. Session tokens are random
//! UUIDs handed to the client; only their SHA-256 digest is persisted.

use std::sync::OnceLock;

use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{Session, User};

/// Longest accepted username
pub const USERNAME_MAX_LENGTH: usize = 150;

/// Shortest accepted password
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Passwords rejected outright
///
/// A short stand-in for a full common-password list; only the most frequent
/// choices are caught.
const COMMON_PASSWORDS: &[&str] = &[
    "password", "password1", "password123", "12345678", "123456789", "1234567890", "qwerty123",
    "qwertyuiop", "iloveyou", "sunshine", "princess", "football", "baseball", "welcome1",
    "abc12345", "letmein1", "trustno1", "passw0rd", "superman", "starwars", "dragon123",
    "monkey123", "master123", "whatever", "computer", "internet", "11111111", "00000000",
    "88888888", "asdfghjkl", "zaq12wsx", "qwerty12", "1q2w3e4r", "admin123", "changeme",
];

fn username_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[\w.@+-]+$").expect("valid regex"))
}

/// Check signup input, collecting every problem rather than stopping at the first
pub fn validate_signup(username: &str, password1: &str, password2: &str) -> Result<()> {
    let mut errors = Vec::new();

    if username.is_empty() {
        errors.push("Username: This field is required.".to_string());
    } else if username.chars().count() > USERNAME_MAX_LENGTH {
        errors.push(format!(
            "Username: Ensure this value has at most {} characters.",
            USERNAME_MAX_LENGTH
        ));
    } else if !username_regex().is_match(username) {
        errors.push(
            "Username: Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
                .to_string(),
        );
    }

    if password1.is_empty() {
        errors.push("Password: This field is required.".to_string());
    } else if password1 != password2 {
        errors.push("Password confirmation: The two password fields didn't match.".to_string());
    } else {
        errors.extend(password_problems(username, password1));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation(errors))
    }
}

fn password_problems(username: &str, password: &str) -> Vec<String> {
    let mut problems = Vec::new();
    let lowered = password.to_lowercase();

    if is_too_similar(&username.to_lowercase(), &lowered) {
        problems.push("Password: The password is too similar to the username.".to_string());
    }
    if password.chars().count() < PASSWORD_MIN_LENGTH {
        problems.push(format!(
            "Password: This password is too short. It must contain at least {} characters.",
            PASSWORD_MIN_LENGTH
        ));
    }
    if COMMON_PASSWORDS.contains(&lowered.as_str()) {
        problems.push("Password: This password is too common.".to_string());
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        problems.push("Password: This password is entirely numeric.".to_string());
    }

    problems
}

/// One string contains the other (usernames under 3 chars are ignored)
///
/// Containment only approximates a fuzzy similarity ratio: near-misses such as
/// a username with one letter changed are not caught.
fn is_too_similar(username: &str, password: &str) -> bool {
    if username.chars().count() < 3 {
        return false;
    }
    password.contains(username) || username.contains(password)
}

/// Hash a password into a PHC string
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::encode_b64(uuid::Uuid::new_v4().as_bytes())
        .map_err(|e| Error::Encryption(format!("Failed to create salt: {}", e)))?;

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::Encryption(format!("Failed to hash password: {}", e)))?;

    Ok(hash.to_string())
}

/// Check a password against a stored PHC string
pub fn verify_password(password: &str, stored: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored)
        .map_err(|e| Error::Encryption(format!("Stored password hash is malformed: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Fresh opaque session token
pub fn generate_token() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Digest stored in place of the raw token
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// A session issued at login; `token` goes to the client and is never stored
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub user: User,
    pub session: Session,
}

/// Validate signup input and create the account
pub fn register_user(
    db: &Database,
    username: &str,
    password1: &str,
    password2: &str,
) -> Result<User> {
    let username = username.trim();
    validate_signup(username, password1, password2)?;

    let hash = hash_password(password1)?;
    let id = db.create_user(username, &hash)?;
    info!(user_id = id, username, "Registered user");

    db.get_user(id)?
        .ok_or_else(|| Error::NotFound(format!("User {}", id)))
}

/// Check credentials; `Unauthorized` for unknown users and wrong passwords alike
pub fn authenticate(db: &Database, username: &str, password: &str) -> Result<User> {
    let Some((user, stored)) = db.get_user_credentials(username.trim())? else {
        debug!(username, "Login for unknown user");
        return Err(invalid_login());
    };

    if verify_password(password, &stored)? {
        Ok(user)
    } else {
        debug!(user_id = user.id, "Login with wrong password");
        Err(invalid_login())
    }
}

fn invalid_login() -> Error {
    Error::Unauthorized(
        "Please enter a correct username and password. Note that both fields may be case-sensitive."
            .to_string(),
    )
}

/// Authenticate and open a session lasting `ttl`
pub fn login(
    db: &Database,
    username: &str,
    password: &str,
    ttl: chrono::Duration,
) -> Result<IssuedSession> {
    let user = authenticate(db, username, password)?;
    let token = generate_token();
    let session = db.create_session(&hash_token(&token), user.id, ttl)?;
    info!(user_id = user.id, "Session opened");

    Ok(IssuedSession {
        token,
        user,
        session,
    })
}

/// Resolve a raw token to its user, sliding the expiry forward
///
/// Returns `None` for unknown or expired tokens.
pub fn resume_session(db: &Database, token: &str, ttl: chrono::Duration) -> Result<Option<User>> {
    let Some(session) = db.touch_session(&hash_token(token), ttl)? else {
        return Ok(None);
    };
    db.get_user(session.user_id)
}

/// End a session; unknown tokens are ignored
pub fn logout(db: &Database, token: &str) -> Result<bool> {
    db.delete_session(&hash_token(token))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(result: Result<()>) -> Vec<String> {
        match result {
            Err(Error::Validation(errors)) => errors,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_signup() {
        assert!(validate_signup("alice", "correct horse battery", "correct horse battery").is_ok());
        assert!(validate_signup("a.b+c@d-e_f", "Xk9!mq2Lw", "Xk9!mq2Lw").is_ok());
    }

    #[test]
    fn test_username_rules() {
        let errors = messages(validate_signup("", "Xk9!mq2Lw", "Xk9!mq2Lw"));
        assert!(errors[0].contains("required"));

        let errors = messages(validate_signup("bad name", "Xk9!mq2Lw", "Xk9!mq2Lw"));
        assert!(errors[0].contains("valid username"));

        let long = "a".repeat(USERNAME_MAX_LENGTH + 1);
        let errors = messages(validate_signup(&long, "Xk9!mq2Lw", "Xk9!mq2Lw"));
        assert!(errors[0].contains("at most 150"));
    }

    #[test]
    fn test_password_mismatch() {
        let errors = messages(validate_signup("alice", "Xk9!mq2Lw", "Xk9!mq2Lx"));
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("didn't match"));
    }

    #[test]
    fn test_password_strength_collects_all_problems() {
        let errors = messages(validate_signup("alice", "1234", "1234"));
        assert!(errors.iter().any(|e| e.contains("too short")));
        assert!(errors.iter().any(|e| e.contains("entirely numeric")));

        let errors = messages(validate_signup("alice", "password", "password"));
        assert!(errors.iter().any(|e| e.contains("too common")));

        let errors = messages(validate_signup("alice", "alice2024!", "alice2024!"));
        assert!(errors.iter().any(|e| e.contains("too similar")));
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("s3cret-pass").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("s3cret-pass", &hash).unwrap());
        assert!(!verify_password("wrong-pass", &hash).unwrap());

        // Salted: same password, different hash
        assert_ne!(hash, hash_password("s3cret-pass").unwrap());
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(matches!(
            verify_password("x", "not-a-phc-string"),
            Err(Error::Encryption(_))
        ));
    }

    #[test]
    fn test_tokens() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);

        let digest = hash_token(&a);
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, hash_token(&a));
        assert_ne!(digest, a);
    }

    #[test]
    fn test_register_login_resume_logout() {
        let db = Database::in_memory().unwrap();
        let ttl = chrono::Duration::seconds(300);

        let user = register_user(&db, " carol ", "Xk9!mq2Lw", "Xk9!mq2Lw").unwrap();
        assert_eq!(user.username, "carol");

        // Duplicate usernames are rejected case-insensitively
        assert!(matches!(
            register_user(&db, "CAROL", "Xk9!mq2Lw", "Xk9!mq2Lw"),
            Err(Error::Validation(_))
        ));

        assert!(matches!(
            login(&db, "carol", "wrong-password", ttl),
            Err(Error::Unauthorized(_))
        ));
        assert!(matches!(
            login(&db, "nobody", "Xk9!mq2Lw", ttl),
            Err(Error::Unauthorized(_))
        ));

        let issued = login(&db, "carol", "Xk9!mq2Lw", ttl).unwrap();
        assert_eq!(issued.user.id, user.id);

        let resumed = resume_session(&db, &issued.token, ttl).unwrap().unwrap();
        assert_eq!(resumed.id, user.id);
        assert!(resume_session(&db, "not-a-token", ttl).unwrap().is_none());

        assert!(logout(&db, &issued.token).unwrap());
        assert!(resume_session(&db, &issued.token, ttl).unwrap().is_none());
        assert!(!logout(&db, &issued.token).unwrap());
    }

    #[test]
    fn test_login_username_is_case_sensitive() {
        let db = Database::in_memory().unwrap();
        let ttl = chrono::Duration::seconds(300);
        register_user(&db, "Carol", "Xk9!mq2Lw", "Xk9!mq2Lw").unwrap();

        assert!(matches!(
            login(&db, "carol", "Xk9!mq2Lw", ttl),
            Err(Error::Unauthorized(_))
        ));
        assert!(login(&db, "Carol", "Xk9!mq2Lw", ttl).is_ok());
    }
}
