//! Integration tests for entry listing: filters, ordering and pagination.

use notevault::accounts::Accounts;
use notevault::audit::AuditLog;
use notevault::config::ServerSecret;
use notevault::crypto::{Argon2Params, KeyDeriver};
use notevault::db::Database;
use notevault::errors::NoteVaultError;
use notevault::identity::{Identity, RequestContext};
use notevault::vault::{
    Category, EntryId, EntryPatch, EntryQuery, NewEntry, SqliteEntryRepository, VaultEntryStore,
};

type Store = VaultEntryStore<SqliteEntryRepository, Option<AuditLog>>;

fn fast_params() -> Argon2Params {
    Argon2Params {
        memory_kib: 8192,
        iterations: 1,
        parallelism: 1,
    }
}

/// A store with no audit log and one registered user.
fn setup() -> (Store, Identity, Database) {
    let db = Database::open_in_memory().expect("open db");
    let deriver = KeyDeriver::new(
        ServerSecret::new("query-test-server-secret").unwrap(),
        fast_params(),
    )
    .unwrap();
    let store = VaultEntryStore::new(deriver, SqliteEntryRepository::new(db.clone()), None);
    let user = register(&db, "alice@example.com");
    (store, user, db)
}

fn register(db: &Database, email: &str) -> Identity {
    Accounts::new(db.clone(), fast_params(), None::<AuditLog>)
        .unwrap()
        .register(email, "correct horse battery", &RequestContext::default())
        .unwrap()
        .identity()
}

fn add(store: &Store, who: &Identity, title: &str, category: &str) -> EntryId {
    store
        .create(
            who,
            &RequestContext::default(),
            NewEntry::new(title, category, "content").unwrap(),
        )
        .unwrap()
        .id
}

fn titles(store: &Store, who: &Identity, query: &EntryQuery) -> Vec<String> {
    store
        .list(who, query)
        .unwrap()
        .entries
        .into_iter()
        .map(|e| e.title)
        .collect()
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

#[test]
fn favorites_first_then_newest_first() {
    let (store, alice, _db) = setup();
    add(&store, &alice, "Alpha", "note");
    let bravo = add(&store, &alice, "Bravo", "password");
    add(&store, &alice, "Charlie", "secret");
    add(&store, &alice, "Delta", "note");

    store
        .update(
            &alice,
            &RequestContext::default(),
            &bravo,
            EntryPatch::new().favorite(true),
        )
        .unwrap();

    assert_eq!(
        titles(&store, &alice, &EntryQuery::new()),
        vec!["Bravo", "Delta", "Charlie", "Alpha"]
    );
}

#[test]
fn favorites_are_newest_first_among_themselves() {
    let (store, alice, _db) = setup();
    let older = add(&store, &alice, "Older favorite", "note");
    add(&store, &alice, "Plain", "note");
    let newer = add(&store, &alice, "Newer favorite", "secret");
    add(&store, &alice, "Newest plain", "note");

    // Favorite the newer one first so update order can't stand in for creation order.
    for id in [&newer, &older] {
        store
            .update(
                &alice,
                &RequestContext::default(),
                id,
                EntryPatch::new().favorite(true),
            )
            .unwrap();
    }

    assert_eq!(
        titles(&store, &alice, &EntryQuery::new()),
        vec!["Newer favorite", "Older favorite", "Newest plain", "Plain"]
    );
    assert_eq!(
        titles(&store, &alice, &EntryQuery::new().favorites_only(true)),
        vec!["Newer favorite", "Older favorite"]
    );
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

#[test]
fn category_filter() {
    let (store, alice, _db) = setup();
    add(&store, &alice, "Shopping", "note");
    add(&store, &alice, "Email", "password");
    add(&store, &alice, "Ideas", "note");

    let page = store
        .list(&alice, &EntryQuery::new().category(Category::Note))
        .unwrap();
    assert_eq!(page.total_count, 2);
    assert!(page.entries.iter().all(|e| e.category == Category::Note));
}

#[test]
fn favorites_only_filter() {
    let (store, alice, _db) = setup();
    let a = add(&store, &alice, "A", "note");
    add(&store, &alice, "B", "note");
    store
        .update(
            &alice,
            &RequestContext::default(),
            &a,
            EntryPatch::new().favorite(true),
        )
        .unwrap();

    assert_eq!(
        titles(&store, &alice, &EntryQuery::new().favorites_only(true)),
        vec!["A"]
    );
}

#[test]
fn title_search_is_case_insensitive_substring() {
    let (store, alice, _db) = setup();
    add(&store, &alice, "bank login", "password");
    add(&store, &alice, "My Bank PIN", "secret");
    add(&store, &alice, "Groceries", "note");

    let mut found = titles(&store, &alice, &EntryQuery::new().search("BANK"));
    found.sort();
    assert_eq!(found, vec!["My Bank PIN", "bank login"]);
}

#[test]
fn title_search_folds_non_ascii_case() {
    let (store, alice, _db) = setup();
    add(&store, &alice, "Überweisung PIN", "secret");
    add(&store, &alice, "ÉCOLE notes", "note");
    add(&store, &alice, "Groceries", "note");

    assert_eq!(
        titles(&store, &alice, &EntryQuery::new().search("überweisung")),
        vec!["Überweisung PIN"]
    );
    assert_eq!(
        titles(&store, &alice, &EntryQuery::new().search("ÜBERWEISUNG pin")),
        vec!["Überweisung PIN"]
    );
    assert_eq!(
        titles(&store, &alice, &EntryQuery::new().search("école")),
        vec!["ÉCOLE notes"]
    );
}

#[test]
fn renamed_title_is_searchable_case_insensitively() {
    let (store, alice, _db) = setup();
    let id = add(&store, &alice, "Draft", "note");
    store
        .update(
            &alice,
            &RequestContext::default(),
            &id,
            EntryPatch::new().title("Größe Tabelle").unwrap(),
        )
        .unwrap();

    assert_eq!(
        titles(&store, &alice, &EntryQuery::new().search("GRÖßE")),
        vec!["Größe Tabelle"]
    );
    assert!(titles(&store, &alice, &EntryQuery::new().search("draft")).is_empty());
}

#[test]
fn search_keeps_surrounding_spaces() {
    let (store, alice, _db) = setup();
    add(&store, &alice, "Banking app", "password");
    add(&store, &alice, "my bank pin", "secret");

    assert_eq!(
        titles(&store, &alice, &EntryQuery::new().search(" bank ")),
        vec!["my bank pin"]
    );
    assert_eq!(store.list(&alice, &EntryQuery::new().search("   ")).unwrap().total_count, 2);
}

#[test]
fn search_treats_wildcards_literally() {
    let (store, alice, _db) = setup();
    add(&store, &alice, "50% off coupon", "note");
    add(&store, &alice, "500 things", "note");
    add(&store, &alice, "snake_case", "note");
    add(&store, &alice, "snakeXcase", "note");

    assert_eq!(
        titles(&store, &alice, &EntryQuery::new().search("50%")),
        vec!["50% off coupon"]
    );
    assert_eq!(
        titles(&store, &alice, &EntryQuery::new().search("e_c")),
        vec!["snake_case"]
    );
}

#[test]
fn filters_combine() {
    let (store, alice, _db) = setup();
    add(&store, &alice, "Work email", "password");
    add(&store, &alice, "Work notes", "note");
    add(&store, &alice, "Home email", "password");

    let page = store
        .list(
            &alice,
            &EntryQuery::new()
                .search("work")
                .category(Category::Password),
        )
        .unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.entries[0].title, "Work email");
}

#[test]
fn listing_is_scoped_to_the_owner() {
    let (store, alice, db) = setup();
    let bob = register(&db, "bob@example.com");
    add(&store, &alice, "Alice note", "note");
    add(&store, &bob, "Bob note", "note");

    assert_eq!(titles(&store, &alice, &EntryQuery::new()), vec!["Alice note"]);
    assert_eq!(titles(&store, &bob, &EntryQuery::new()), vec!["Bob note"]);
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

#[test]
fn pagination_reports_totals() {
    let (store, alice, _db) = setup();
    for i in 0..25 {
        add(&store, &alice, &format!("Entry {i:02}"), "note");
    }

    let first = store.list(&alice, &EntryQuery::new()).unwrap();
    assert_eq!(first.total_count, 25);
    assert_eq!(first.total_pages, 3);
    assert_eq!(first.current_page, 1);
    assert_eq!(first.entries.len(), 10);
    assert_eq!(first.entries[0].title, "Entry 24");

    let last = store.list(&alice, &EntryQuery::new().page(3)).unwrap();
    assert_eq!(last.entries.len(), 5);
    assert_eq!(last.entries[4].title, "Entry 00");

    let past_end = store.list(&alice, &EntryQuery::new().page(4)).unwrap();
    assert!(past_end.entries.is_empty());
    assert_eq!(past_end.total_count, 25);
    assert_eq!(past_end.total_pages, 3);
}

#[test]
fn pages_do_not_overlap() {
    let (store, alice, _db) = setup();
    for i in 0..7 {
        add(&store, &alice, &format!("E{i}"), "note");
    }

    let mut seen = Vec::new();
    for page in 1..=3 {
        seen.extend(titles(
            &store,
            &alice,
            &EntryQuery::new().page(page).page_size(3),
        ));
    }
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 7);
}

#[test]
fn empty_vault_has_zero_pages() {
    let (store, alice, _db) = setup();
    let page = store.list(&alice, &EntryQuery::new()).unwrap();
    assert_eq!(page.total_count, 0);
    assert_eq!(page.total_pages, 0);
    assert!(page.entries.is_empty());
}

#[test]
fn invalid_paging_is_rejected() {
    let (store, alice, _db) = setup();

    assert!(matches!(
        store.list(&alice, &EntryQuery::new().page(0)),
        Err(NoteVaultError::Validation(_))
    ));
    assert!(matches!(
        store.list(&alice, &EntryQuery::new().page_size(0)),
        Err(NoteVaultError::Validation(_))
    ));
    assert!(matches!(
        store.list(&alice, &EntryQuery::new().page_size(101)),
        Err(NoteVaultError::Validation(_))
    ));
}

#[test]
fn max_page_size_is_configurable() {
    let (store, alice, _db) = setup();
    let store = store.with_max_page_size(20);

    assert!(store.list(&alice, &EntryQuery::new().page_size(20)).is_ok());
    assert!(matches!(
        store.list(&alice, &EntryQuery::new().page_size(21)),
        Err(NoteVaultError::Validation(_))
    ));
}
