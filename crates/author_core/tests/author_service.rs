use author_core::db::open_db_in_memory;
use author_core::{
    validate_password_hash, Argon2iHasher, AuthorField, AuthorService, AuthorStore, HashParams,
    PasswordError, RegisterAuthorRequest, RepoError, ServiceError, SqliteAuthorStore,
};
use uuid::Uuid;

#[test]
fn register_persists_unactivated_author_with_argon2i_hash() {
    let conn = open_db_in_memory().unwrap();
    let service = AuthorService::new(SqliteAuthorStore::try_new(&conn).unwrap(), cheap_hasher());

    let author = service.register(&request("nkortiz92@gmail.com", "nathan-ortiz")).unwrap();

    assert_eq!(author.id().get_version_num(), 4);
    let token = author.activation_token().unwrap();
    assert_eq!(token.len(), 32);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    assert!(author.password_hash().starts_with("$argon2i$"));
    assert!(validate_password_hash(author.password_hash()).is_ok());
    assert!(cheap_hasher()
        .verify_password("my_secret_password", author.password_hash())
        .unwrap());

    let stored = service.get(author.id()).unwrap().unwrap();
    assert_eq!(stored, author);
}

#[test]
fn register_surfaces_validation_and_conflict_errors() {
    let conn = open_db_in_memory().unwrap();
    let service = AuthorService::new(SqliteAuthorStore::try_new(&conn).unwrap(), cheap_hasher());
    service.register(&request("a@example.com", "alpha")).unwrap();

    let err = service.register(&request("a@example.com", "other")).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Repo(RepoError::Conflict(AuthorField::Email))
    ));

    let err = service.register(&request("not-an-email", "beta")).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Repo(RepoError::Validation(ref v)) if v.field() == AuthorField::Email
    ));

    let mut empty_password = request("b@example.com", "beta");
    empty_password.password.clear();
    let err = service.register(&empty_password).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Password(PasswordError::EmptyPassword)
    ));

    assert_eq!(service.list().unwrap().len(), 1);
}

#[test]
fn register_rejects_bad_fields_before_hashing_password() {
    let conn = open_db_in_memory().unwrap();
    let service = AuthorService::new(SqliteAuthorStore::try_new(&conn).unwrap(), cheap_hasher());

    let mut bad_email = request("Name <a@b.com>", "alpha");
    bad_email.password.clear();
    let err = service.register(&bad_email).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Repo(RepoError::Validation(ref v)) if v.field() == AuthorField::Email
    ));

    let mut bad_username = request("a@example.com", "<b></b>");
    bad_username.password.clear();
    let err = service.register(&bad_username).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Repo(RepoError::Validation(ref v)) if v.field() == AuthorField::Username
    ));

    assert!(service.list().unwrap().is_empty());
}

#[test]
fn activate_clears_token_once_it_matches() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteAuthorStore::try_new(&conn).unwrap();
    let service = AuthorService::new(SqliteAuthorStore::try_new(&conn).unwrap(), cheap_hasher());
    let author = service.register(&request("a@example.com", "alpha")).unwrap();
    let token = author.activation_token().unwrap().to_string();

    let wrong = "f".repeat(32);
    let err = service.activate(author.id(), &wrong).unwrap_err();
    assert!(matches!(err, ServiceError::TokenMismatch(id) if id == author.id()));
    assert!(!store.find_by_id(author.id()).unwrap().unwrap().is_activated());

    let activated = service
        .activate(author.id(), &token.to_ascii_uppercase())
        .unwrap();
    assert!(activated.is_activated());
    assert!(store.find_by_id(author.id()).unwrap().unwrap().is_activated());

    let again = service.activate(author.id(), &token).unwrap();
    assert!(again.is_activated());
}

#[test]
fn activate_unknown_author_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = AuthorService::new(SqliteAuthorStore::try_new(&conn).unwrap(), cheap_hasher());
    let id = Uuid::new_v4();

    let err = service.activate(id, &"a".repeat(32)).unwrap_err();
    assert!(matches!(err, ServiceError::Repo(RepoError::NotFound(missing)) if missing == id));
}

#[test]
fn service_wraps_store_queries() {
    let conn = open_db_in_memory().unwrap();
    let service = AuthorService::new(SqliteAuthorStore::try_new(&conn).unwrap(), cheap_hasher());
    let mut author = service.register(&request("a@example.com", "alpha")).unwrap();
    service.register(&request("b@example.com", "alphabet")).unwrap();

    assert_eq!(service.find_by_username("alpha").unwrap().len(), 2);
    let by_email = service.find_by_email("A@example.com").unwrap().unwrap();
    assert_eq!(by_email.id(), author.id());

    author.set_username("zulu").unwrap();
    service.update(&author).unwrap();
    assert_eq!(service.find_by_username("zulu").unwrap()[0].id(), author.id());

    service.delete(author.id()).unwrap();
    assert!(service.get(author.id()).unwrap().is_none());
    assert!(matches!(
        service.delete(author.id()).unwrap_err(),
        ServiceError::Repo(RepoError::NotFound(_))
    ));
    assert_eq!(service.list().unwrap().len(), 1);
}

fn request(email: &str, username: &str) -> RegisterAuthorRequest {
    RegisterAuthorRequest {
        email: email.to_string(),
        password: "my_secret_password".to_string(),
        avatar_url: "https://avatar.com".to_string(),
        username: username.to_string(),
    }
}

fn cheap_hasher() -> Argon2iHasher {
    Argon2iHasher::new(HashParams {
        memory_kib: 1024,
        time_cost: 1,
        parallelism: 1,
    })
    .unwrap()
}
