//! Integration tests for registration and login.

use std::sync::Arc;

use tempfile::TempDir;

use notevault::accounts::Accounts;
use notevault::audit::{AuditAction, AuditLog};
use notevault::crypto::Argon2Params;
use notevault::db::Database;
use notevault::errors::{ErrorKind, NoteVaultError};
use notevault::identity::RequestContext;

fn fast_params() -> Argon2Params {
    Argon2Params {
        memory_kib: 8192,
        iterations: 1,
        parallelism: 1,
    }
}

fn ctx() -> RequestContext {
    RequestContext::new("198.51.100.4", "accounts-tests")
}

/// Accounts over a temp data dir, with a real audit log.
fn setup() -> (TempDir, Accounts<Arc<Option<AuditLog>>>, Arc<Option<AuditLog>>) {
    let dir = TempDir::new().expect("create temp dir");
    let db = Database::open(dir.path()).expect("open db");
    let audit = Arc::new(AuditLog::open(dir.path()));
    let accounts = Accounts::new(db, fast_params(), Arc::clone(&audit)).unwrap();
    (dir, accounts, audit)
}

#[test]
fn register_then_login() {
    let (_dir, accounts, _audit) = setup();

    let user = accounts
        .register("alice@example.com", "correct horse", &ctx())
        .unwrap();
    assert_eq!(user.email, "alice@example.com");
    assert!(user.last_login_at.is_none());

    let logged_in = accounts
        .login("alice@example.com", "correct horse", &ctx())
        .unwrap();
    assert_eq!(logged_in.id, user.id);
    assert!(logged_in.last_login_at.is_some());

    let profile = accounts.profile(&user.id).unwrap().unwrap();
    assert_eq!(profile.last_login_at, logged_in.last_login_at);
    assert_eq!(profile.key_salt, user.key_salt);
}

#[test]
fn email_is_matched_case_insensitively() {
    let (_dir, accounts, _audit) = setup();
    accounts
        .register("Alice@Example.com", "correct horse", &ctx())
        .unwrap();

    let user = accounts
        .authenticate("  ALICE@example.COM", "correct horse")
        .unwrap();
    assert_eq!(user.email, "alice@example.com");
}

#[test]
fn duplicate_email_is_rejected() {
    let (_dir, accounts, _audit) = setup();
    accounts
        .register("alice@example.com", "correct horse", &ctx())
        .unwrap();

    let err = accounts
        .register("ALICE@example.com", "another password", &ctx())
        .unwrap_err();
    assert!(matches!(err, NoteVaultError::UserAlreadyExists(_)));
    assert_eq!(err.kind(), ErrorKind::Auth);
}

#[test]
fn wrong_password_and_unknown_email_look_the_same() {
    let (_dir, accounts, _audit) = setup();
    accounts
        .register("alice@example.com", "correct horse", &ctx())
        .unwrap();

    let wrong = accounts
        .authenticate("alice@example.com", "wrong horse")
        .unwrap_err();
    let unknown = accounts
        .authenticate("nobody@example.com", "correct horse")
        .unwrap_err();

    assert!(matches!(wrong, NoteVaultError::InvalidCredentials));
    assert!(matches!(unknown, NoteVaultError::InvalidCredentials));
    assert_eq!(wrong.to_string(), unknown.to_string());
}

#[test]
fn each_user_gets_a_distinct_key_salt() {
    let (_dir, accounts, _audit) = setup();
    let a = accounts
        .register("a@example.com", "password-a", &ctx())
        .unwrap();
    let b = accounts
        .register("b@example.com", "password-b", &ctx())
        .unwrap();

    assert_ne!(a.key_salt, b.key_salt);
    assert_ne!(a.id, b.id);
}

#[test]
fn weak_input_is_rejected() {
    let (_dir, accounts, _audit) = setup();

    assert!(matches!(
        accounts.register("alice@example.com", "short", &ctx()),
        Err(NoteVaultError::Validation(_))
    ));
    assert!(matches!(
        accounts.register("not-an-email", "long enough", &ctx()),
        Err(NoteVaultError::Validation(_))
    ));
}

#[test]
fn account_events_are_audited() {
    let (_dir, accounts, audit) = setup();
    let log = audit.as_ref().as_ref().expect("audit log available");

    let user = accounts
        .register("alice@example.com", "correct horse", &ctx())
        .unwrap();
    accounts
        .login("alice@example.com", "correct horse", &ctx())
        .unwrap();
    accounts.logout(&user, &ctx());

    // A failed login leaves no trace.
    let _ = accounts.login("alice@example.com", "wrong horse", &ctx());

    let entries = log.query(&user.id, 10, None).unwrap();
    let actions: Vec<&str> = entries.iter().map(|e| e.action.as_str()).collect();
    assert_eq!(
        actions,
        vec![
            AuditAction::Logout.as_str(),
            AuditAction::Login.as_str(),
            AuditAction::Register.as_str(),
        ]
    );
    assert!(entries
        .iter()
        .all(|e| e.origin.as_deref() == Some("198.51.100.4")));
}
