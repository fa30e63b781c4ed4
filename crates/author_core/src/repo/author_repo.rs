//! Author store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide insert/update/delete/find APIs over the `author` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Every statement is parameterized; user text never reaches SQL verbatim.
//! - Rows are rehydrated through `AuthorRecord::with_id`, so invalid persisted
//!   state is rejected instead of masked.
//! - Unique-constraint violations surface as `RepoError::Conflict`, missing
//!   rows as `RepoError::NotFound`.

use crate::db::schema::ensure_author_table_ready;
use crate::db::DbError;
use crate::model::author::{AuthorId, AuthorRecord};
use crate::model::validation::{
    sanitize_text, validate_email, validate_id_bytes, AuthorField, ValidationError,
};
use log::debug;
use rusqlite::{params, Connection, ErrorCode, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const AUTHOR_SELECT_SQL: &str = "SELECT
    authorId,
    authorActivationToken,
    authorEmail,
    authorHash,
    authorUsername,
    authorAvatarUrl
FROM author";

pub type RepoResult<T> = Result<T, RepoError>;

/// Error returned by author store operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    NotFound(AuthorId),
    /// Another row already holds the unique value of this field.
    Conflict(AuthorField),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "author not found: {id}"),
            Self::Conflict(field) => write!(f, "an author with this {field} already exists"),
            Self::InvalidData(message) => write!(f, "invalid persisted author data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::Conflict(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        match conflict_field(&value) {
            Some(field) => Self::Conflict(field),
            None => Self::Db(DbError::Sqlite(value)),
        }
    }
}

/// Persistence contract for author records.
pub trait AuthorStore {
    fn insert(&self, author: &AuthorRecord) -> RepoResult<()>;
    fn update(&self, author: &AuthorRecord) -> RepoResult<()>;
    fn delete(&self, id: AuthorId) -> RepoResult<()>;
    fn find_by_id(&self, id: AuthorId) -> RepoResult<Option<AuthorRecord>>;
    fn find_by_email(&self, email: &str) -> RepoResult<Option<AuthorRecord>>;
    /// Substring match on username; `%` and `_` in `pattern` match literally.
    fn find_by_username(&self, pattern: &str) -> RepoResult<Vec<AuthorRecord>>;
    fn find_all(&self) -> RepoResult<Vec<AuthorRecord>>;
}

/// SQLite-backed author store.
pub struct SqliteAuthorStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAuthorStore<'conn> {
    /// Constructs a store from a bootstrapped connection.
    ///
    /// Fails when the `author` table or one of its columns is missing.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_author_table_ready(conn)?;
        Ok(Self { conn })
    }

    fn query_authors(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> RepoResult<Vec<AuthorRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut authors = Vec::new();

        while let Some(row) = rows.next()? {
            authors.push(parse_author_row(row)?);
        }

        Ok(authors)
    }
}

impl AuthorStore for SqliteAuthorStore<'_> {
    fn insert(&self, author: &AuthorRecord) -> RepoResult<()> {
        let result = self.conn.execute(
            "INSERT INTO author (
                authorId,
                authorActivationToken,
                authorEmail,
                authorHash,
                authorUsername,
                authorAvatarUrl
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                author.id().as_bytes().as_slice(),
                author.activation_token(),
                author.email(),
                author.password_hash(),
                author.username(),
                author.avatar_url(),
            ],
        );

        match result {
            Ok(_) => {
                debug!("event=author_insert module=repo status=ok author_id={}", author.id());
                Ok(())
            }
            Err(err) => {
                let err = RepoError::from(err);
                debug!(
                    "event=author_insert module=repo status=error author_id={} error={err}",
                    author.id()
                );
                Err(err)
            }
        }
    }

    fn update(&self, author: &AuthorRecord) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE author
             SET
                authorActivationToken = ?2,
                authorEmail = ?3,
                authorHash = ?4,
                authorUsername = ?5,
                authorAvatarUrl = ?6
             WHERE authorId = ?1;",
            params![
                author.id().as_bytes().as_slice(),
                author.activation_token(),
                author.email(),
                author.password_hash(),
                author.username(),
                author.avatar_url(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(author.id()));
        }

        debug!("event=author_update module=repo status=ok author_id={}", author.id());
        Ok(())
    }

    fn delete(&self, id: AuthorId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM author WHERE authorId = ?1;",
            [id.as_bytes().as_slice()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        debug!("event=author_delete module=repo status=ok author_id={id}");
        Ok(())
    }

    fn find_by_id(&self, id: AuthorId) -> RepoResult<Option<AuthorRecord>> {
        let mut authors = self.query_authors(
            &format!("{AUTHOR_SELECT_SQL} WHERE authorId = ?1;"),
            [id.as_bytes().as_slice()],
        )?;
        Ok(authors.pop())
    }

    fn find_by_email(&self, email: &str) -> RepoResult<Option<AuthorRecord>> {
        let email = validate_email(email)?;
        let mut authors = self.query_authors(
            &format!("{AUTHOR_SELECT_SQL} WHERE authorEmail = ?1;"),
            [email.as_str()],
        )?;
        Ok(authors.pop())
    }

    fn find_by_username(&self, pattern: &str) -> RepoResult<Vec<AuthorRecord>> {
        let pattern = sanitize_text(pattern);
        if pattern.is_empty() {
            return Err(RepoError::Validation(ValidationError::InvalidFormat {
                field: AuthorField::Username,
                reason: "search pattern is empty",
            }));
        }

        let like = format!("%{}%", escape_like(&pattern));
        self.query_authors(
            &format!(
                "{AUTHOR_SELECT_SQL}
                 WHERE authorUsername LIKE ?1 ESCAPE '\\'
                 ORDER BY authorUsername ASC, authorId ASC;"
            ),
            [like.as_str()],
        )
    }

    fn find_all(&self) -> RepoResult<Vec<AuthorRecord>> {
        self.query_authors(
            &format!("{AUTHOR_SELECT_SQL} ORDER BY authorUsername ASC, authorId ASC;"),
            [],
        )
    }
}

fn parse_author_row(row: &Row<'_>) -> RepoResult<AuthorRecord> {
    let id_bytes: Vec<u8> = row.get("authorId")?;
    let id = validate_id_bytes(&id_bytes).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid uuid of {} bytes in author.authorId",
            id_bytes.len()
        ))
    })?;

    let activation_token: Option<String> = row.get("authorActivationToken")?;
    let email: String = row.get("authorEmail")?;
    let password_hash: String = row.get("authorHash")?;
    let avatar_url: String = row.get("authorAvatarUrl")?;
    let username: String = row.get("authorUsername")?;

    let author = AuthorRecord::with_id(
        id,
        activation_token.as_deref(),
        &email,
        &password_hash,
        &avatar_url,
        &username,
    )?;
    Ok(author)
}

/// Escapes LIKE wildcards so the pattern matches literally under `ESCAPE '\'`.
pub(crate) fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn conflict_field(err: &rusqlite::Error) -> Option<AuthorField> {
    let rusqlite::Error::SqliteFailure(failure, Some(message)) = err else {
        return None;
    };
    if failure.code != ErrorCode::ConstraintViolation || !message.contains("UNIQUE") {
        return None;
    }

    [AuthorField::Id, AuthorField::Email, AuthorField::Username]
        .into_iter()
        .find(|field| message.contains(&format!("author.{}", field.column())))
}
