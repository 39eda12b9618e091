//! Accounts — registration, login and logout.
//!
//! This is the identity provider for the vault core: a successful
//! authentication yields a [`User`], whose [`User::identity`] carries the
//! owner id and key salt every vault call needs. Passwords are stored as
//! Argon2id PHC strings. The key salt is random and unrelated to the
//! password.

pub mod user;

pub use user::User;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rand::RngCore;
use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use crate::audit::{emit, AuditAction, AuditEvent, AuditSink};
use crate::crypto::{Argon2Params, KeySalt};
use crate::db::Database;
use crate::errors::{NoteVaultError, Result};
use crate::identity::{OwnerId, RequestContext};

/// Minimum password length to prevent trivially weak passwords.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Longest email address accepted.
const MAX_EMAIL_LEN: usize = 254;

const USER_COLUMNS: &str = "id, email, password_hash, key_salt, created_at, last_login_at";

/// Account service over the shared database.
pub struct Accounts<A: AuditSink> {
    db: Database,
    params: Argon2Params,
    audit: A,
}

impl<A: AuditSink> Accounts<A> {
    /// `params` are used for new password hashes; existing hashes carry
    /// their own parameters.
    pub fn new(db: Database, params: Argon2Params, audit: A) -> Result<Self> {
        params.validate()?;
        Ok(Self { db, params, audit })
    }

    /// Create a new user with a fresh key salt.
    pub fn register(&self, email: &str, password: &str, ctx: &RequestContext) -> Result<User> {
        let email = normalize_email(email)?;
        validate_password(password)?;

        if self.find_by_email(&email)?.is_some() {
            return Err(NoteVaultError::UserAlreadyExists(email));
        }

        let user = User {
            id: OwnerId::new(),
            email,
            key_salt: KeySalt::generate(),
            created_at: Utc::now().trunc_subsecs(6),
            last_login_at: None,
            password_hash: self.hash_password(password)?,
        };

        let inserted = self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, email, password_hash, key_salt, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    user.id.to_string(),
                    user.email,
                    user.password_hash,
                    user.key_salt.as_str(),
                    format_timestamp(user.created_at),
                ],
            )?;
            Ok(())
        });
        match inserted {
            Ok(()) => {}
            // Lost a race with a concurrent registration of the same email.
            Err(NoteVaultError::Database(rusqlite::Error::SqliteFailure(err, _)))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                return Err(NoteVaultError::UserAlreadyExists(user.email));
            }
            Err(e) => return Err(e),
        }
        debug!(user = %user.id, "registered user");

        emit(
            &self.audit,
            AuditEvent::new(user.id, AuditAction::Register, None, ctx),
        );
        Ok(user)
    }

    /// Verify credentials without any side effects.
    ///
    /// Unknown email and wrong password give the same error.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        let email = normalize_email(email).map_err(|_| NoteVaultError::InvalidCredentials)?;
        let user = self
            .find_by_email(&email)?
            .ok_or(NoteVaultError::InvalidCredentials)?;

        let parsed = PasswordHash::new(&user.password_hash)
            .map_err(|e| NoteVaultError::PasswordHashFailed(format!("stored hash unreadable: {e}")))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| NoteVaultError::InvalidCredentials)?;

        Ok(user)
    }

    /// Authenticate, stamp the last-login time and record a login event.
    pub fn login(&self, email: &str, password: &str, ctx: &RequestContext) -> Result<User> {
        let mut user = self.authenticate(email, password)?;

        let now = Utc::now().trunc_subsecs(6);
        self.db.with_conn(|conn| {
            conn.execute(
                "UPDATE users SET last_login_at = ?2 WHERE id = ?1",
                params![user.id.to_string(), format_timestamp(now)],
            )?;
            Ok(())
        })?;
        user.last_login_at = Some(now);

        emit(
            &self.audit,
            AuditEvent::new(user.id, AuditAction::Login, None, ctx),
        );
        Ok(user)
    }

    /// Record a logout for `user`.
    pub fn logout(&self, user: &User, ctx: &RequestContext) {
        emit(
            &self.audit,
            AuditEvent::new(user.id, AuditAction::Logout, None, ctx),
        );
    }

    /// Look a user up by id.
    pub fn profile(&self, id: &OwnerId) -> Result<Option<User>> {
        self.db.with_conn(|conn| {
            Ok(conn
                .query_row(
                    &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                    params![id.to_string()],
                    user_from_row,
                )
                .optional()?)
        })
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.db.with_conn(|conn| {
            Ok(conn
                .query_row(
                    &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
                    params![email],
                    user_from_row,
                )
                .optional()?)
        })
    }

    fn hash_password(&self, password: &str) -> Result<String> {
        let mut salt_bytes = [0u8; 16];
        rand::rng().fill_bytes(&mut salt_bytes);
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| NoteVaultError::PasswordHashFailed(format!("salt encoding: {e}")))?;

        let hash = self
            .params
            .hasher(None)?
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| NoteVaultError::PasswordHashFailed(e.to_string()))?;
        Ok(hash.to_string())
    }
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    fn convert(index: usize, err: NoteVaultError) -> rusqlite::Error {
        rusqlite::Error::FromSqlConversionFailure(index, rusqlite::types::Type::Text, Box::new(err))
    }
    fn timestamp(index: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| convert(index, NoteVaultError::Storage(format!("bad timestamp: {e}"))))
    }

    let id: String = row.get(0)?;
    let key_salt: String = row.get(3)?;
    let created_at: String = row.get(4)?;
    let last_login_at: Option<String> = row.get(5)?;

    Ok(User {
        id: id.parse().map_err(|e| convert(0, e))?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        key_salt: KeySalt::new(key_salt).map_err(|e| convert(3, e))?,
        created_at: timestamp(4, &created_at)?,
        last_login_at: last_login_at
            .as_deref()
            .map(|ts| timestamp(5, ts))
            .transpose()?,
    })
}

/// Trim and lower-case an email, rejecting obviously malformed ones.
fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(NoteVaultError::Validation("email cannot be empty".into()));
    }
    if email.len() > MAX_EMAIL_LEN {
        return Err(NoteVaultError::Validation(format!(
            "email cannot exceed {MAX_EMAIL_LEN} characters"
        )));
    }
    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
        {
            Ok(email)
        }
        _ => Err(NoteVaultError::Validation(format!(
            "'{email}' is not a valid email address"
        ))),
    }
}

fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(NoteVaultError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}
