//! Field-to-column mapping for the relational store.
//!
//! [`CATALOGUE_MAPPING`] is the single description of how domain fields land
//! in tables. DDL and SELECT column lists are generated from it, so a column
//! rename happens here and nowhere else.

use flix_core::{FlixError, FlixResult};
use parking_lot::Mutex;
use std::fmt::Write as _;
use tracing::{info, warn};

/// SQLite storage class of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Integer,
    Text,
    Boolean,
    Timestamp,
}

impl SqlType {
    const fn as_sql(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Text => "TEXT",
            Self::Boolean => "BOOLEAN",
            Self::Timestamp => "TIMESTAMP",
        }
    }
}

/// One mapped column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Domain field name.
    pub field: &'static str,
    /// Column name in the table.
    pub name: &'static str,
    pub sql_type: SqlType,
    pub primary_key: bool,
    pub nullable: bool,
    pub unique: bool,
    /// Referenced `(table, column)`.
    pub references: Option<(&'static str, &'static str)>,
}

impl Column {
    /// A required column.
    #[must_use]
    pub const fn new(field: &'static str, name: &'static str, sql_type: SqlType) -> Self {
        Self {
            field,
            name,
            sql_type,
            primary_key: false,
            nullable: false,
            unique: false,
            references: None,
        }
    }

    /// A primary-key column.
    #[must_use]
    pub const fn key(field: &'static str, name: &'static str, sql_type: SqlType) -> Self {
        let mut column = Self::new(field, name, sql_type);
        column.primary_key = true;
        column
    }

    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.nullable = true;
        self
    }

    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    #[must_use]
    pub const fn references(mut self, table: &'static str, column: &'static str) -> Self {
        self.references = Some((table, column));
        self
    }
}

/// One mapped table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Table {
    /// Domain entity stored in the table; association tables name the relationship.
    pub entity: &'static str,
    pub name: &'static str,
    pub columns: &'static [Column],
}

impl Table {
    /// Looks up a column by domain field name.
    #[must_use]
    pub fn column(&self, field: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.field == field)
    }

    /// Comma-separated, quoted column list for SELECT statements.
    #[must_use]
    pub fn select_list(&self) -> String {
        self.columns
            .iter()
            .map(|c| format!("{}.{}", quote(self.name), quote(c.name)))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `INSERT` statement binding every column in mapping order.
    ///
    /// With `or_ignore`, rows whose key or unique columns are already present
    /// are skipped instead of failing.
    #[must_use]
    pub fn insert_statement(&self, or_ignore: bool) -> String {
        let names: Vec<String> = self.columns.iter().map(|c| quote(c.name)).collect();
        let params = vec!["?"; self.columns.len()];
        format!(
            "INSERT {}INTO {} ({}) VALUES ({})",
            if or_ignore { "OR IGNORE " } else { "" },
            quote(self.name),
            names.join(", "),
            params.join(", ")
        )
    }

    /// `CREATE TABLE IF NOT EXISTS` statement for this table.
    #[must_use]
    pub fn create_statement(&self) -> String {
        let keys: Vec<&Column> = self.columns.iter().filter(|c| c.primary_key).collect();
        let composite = keys.len() > 1;

        let mut parts: Vec<String> = self
            .columns
            .iter()
            .map(|c| {
                let mut def = format!("{} {}", quote(c.name), c.sql_type.as_sql());
                if c.primary_key && !composite {
                    def.push_str(" PRIMARY KEY");
                }
                if !c.nullable {
                    def.push_str(" NOT NULL");
                }
                if c.unique {
                    def.push_str(" UNIQUE");
                }
                if let Some((table, column)) = c.references {
                    let _ = write!(def, " REFERENCES {} ({})", quote(table), quote(column));
                }
                def
            })
            .collect();

        if composite {
            let names: Vec<String> = keys.iter().map(|c| quote(c.name)).collect();
            parts.push(format!("PRIMARY KEY ({})", names.join(", ")));
        }

        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            quote(self.name),
            parts.join(", ")
        )
    }
}

/// Cardinality of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipKind {
    ManyToOne,
    OneToMany,
    OneToOne,
    ManyToMany,
}

/// A relationship between two mapped tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relationship {
    /// Domain field holding the related entities.
    pub field: &'static str,
    pub kind: RelationshipKind,
    pub from: &'static str,
    pub to: &'static str,
    /// Association table for many-to-many relationships.
    pub through: Option<&'static str>,
}

/// The complete field-to-column table.
#[derive(Debug, PartialEq, Eq)]
pub struct Mapping {
    /// Tables in dependency order: referenced tables come first.
    pub tables: &'static [Table],
    pub relationships: &'static [Relationship],
}

impl Mapping {
    /// Looks up a table by name.
    pub fn table(&self, name: &str) -> FlixResult<&Table> {
        self.tables
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| FlixError::internal(format!("Table '{}' is not mapped", name)))
    }

    /// Table names in dependency order.
    pub fn table_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.tables.iter().map(|t| t.name)
    }

    /// DDL for every table, in dependency order.
    #[must_use]
    pub fn create_statements(&self) -> Vec<String> {
        self.tables.iter().map(Table::create_statement).collect()
    }
}

/// Quotes an SQL identifier.
#[must_use]
pub fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

use SqlType::{Boolean, Integer, Text, Timestamp};

const DIRECTOR: Table = Table {
    entity: "Director",
    name: "director",
    columns: &[
        Column::key("id", "id", Integer),
        Column::new("first_name", "first_name", Text),
        Column::new("last_name", "last_name", Text).optional(),
    ],
};

const ACTOR: Table = Table {
    entity: "Actor",
    name: "actor",
    columns: &[
        Column::key("id", "id", Integer),
        Column::new("first_name", "first_name", Text),
        Column::new("middle_names", "middle_names", Text).optional(),
        Column::new("last_name", "last_name", Text).optional(),
    ],
};

const GENRE: Table = Table {
    entity: "Genre",
    name: "genre",
    columns: &[
        Column::key("id", "id", Integer),
        Column::new("name", "name", Text).unique(),
    ],
};

const MOVIE: Table = Table {
    entity: "Movie",
    name: "movie",
    columns: &[
        Column::key("id", "id", Text),
        Column::new("title", "title", Text),
        Column::new("release_year", "year", Integer),
        Column::new("runtime_minutes", "runtime", Integer),
        Column::new("description", "description", Text).optional(),
        Column::new("rank", "ranking", Integer).optional(),
        Column::new("director", "director_id", Integer)
            .optional()
            .references("director", "id"),
    ],
};

const USER: Table = Table {
    entity: "User",
    name: "user",
    columns: &[
        Column::key("id", "id", Integer),
        Column::new("first_name", "first_name", Text),
        Column::new("last_name", "last_name", Text),
        Column::new("username", "username", Text).unique(),
        Column::new("password_hash", "password", Text),
        Column::new("email", "email", Text),
        Column::new("age", "age", Integer).optional(),
        Column::new("consent", "consent", Boolean),
    ],
};

const REVIEW: Table = Table {
    entity: "Review",
    name: "review",
    columns: &[
        Column::key("id", "id", Integer),
        Column::new("movie_title", "movie_title", Text),
        Column::new("user_id", "user_id", Integer).references("user", "id"),
        Column::new("text", "review_text", Text),
        Column::new("rating", "rating", Integer),
        Column::new("timestamp", "created_at", Timestamp),
    ],
};

const WATCHLIST: Table = Table {
    entity: "Watchlist",
    name: "watchlist",
    columns: &[
        Column::key("id", "id", Integer),
        Column::new("user_id", "user_id", Integer)
            .unique()
            .references("user", "id"),
    ],
};

const MOVIE_GENRE: Table = Table {
    entity: "Movie.genres",
    name: "movie_genre",
    columns: &[
        Column::key("movie", "movie_id", Text).references("movie", "id"),
        Column::key("genre", "genre_id", Integer).references("genre", "id"),
        Column::new("position", "position", Integer),
    ],
};

const MOVIE_ACTOR: Table = Table {
    entity: "Movie.actors",
    name: "movie_actor",
    columns: &[
        Column::key("movie", "movie_id", Text).references("movie", "id"),
        Column::key("actor", "actor_id", Integer).references("actor", "id"),
        Column::new("position", "position", Integer),
    ],
};

const WATCHLIST_MOVIE: Table = Table {
    entity: "Watchlist.movies",
    name: "watchlist_movie",
    columns: &[
        Column::key("watchlist", "watchlist_id", Integer).references("watchlist", "id"),
        Column::key("movie", "movie_id", Text).references("movie", "id"),
        Column::new("position", "position", Integer),
    ],
};

const USER_WATCHED_MOVIE: Table = Table {
    entity: "User.watched_movies",
    name: "user_watched_movie",
    columns: &[
        Column::key("user", "user_id", Integer).references("user", "id"),
        Column::key("movie", "movie_id", Text).references("movie", "id"),
        Column::new("position", "position", Integer),
    ],
};

/// The catalogue's mapping.
pub static CATALOGUE_MAPPING: Mapping = Mapping {
    tables: &[
        DIRECTOR,
        ACTOR,
        GENRE,
        MOVIE,
        USER,
        REVIEW,
        WATCHLIST,
        MOVIE_GENRE,
        MOVIE_ACTOR,
        WATCHLIST_MOVIE,
        USER_WATCHED_MOVIE,
    ],
    relationships: &[
        Relationship {
            field: "director",
            kind: RelationshipKind::ManyToOne,
            from: "movie",
            to: "director",
            through: None,
        },
        Relationship {
            field: "genres",
            kind: RelationshipKind::ManyToMany,
            from: "movie",
            to: "genre",
            through: Some("movie_genre"),
        },
        Relationship {
            field: "actors",
            kind: RelationshipKind::ManyToMany,
            from: "movie",
            to: "actor",
            through: Some("movie_actor"),
        },
        Relationship {
            field: "reviews",
            kind: RelationshipKind::OneToMany,
            from: "user",
            to: "review",
            through: None,
        },
        Relationship {
            field: "watchlist",
            kind: RelationshipKind::OneToOne,
            from: "user",
            to: "watchlist",
            through: None,
        },
        Relationship {
            field: "movies",
            kind: RelationshipKind::ManyToMany,
            from: "watchlist",
            to: "movie",
            through: Some("watchlist_movie"),
        },
        Relationship {
            field: "watched_movies",
            kind: RelationshipKind::ManyToMany,
            from: "user",
            to: "movie",
            through: Some("user_watched_movie"),
        },
    ],
};

/// Guards the one-time registration of the mapping.
///
/// Registering twice without [`clear`](Self::clear) in between is an error;
/// the relational repository can only be built from a registered mapping.
#[derive(Debug, Default)]
pub struct MappingRegistry {
    current: Mutex<Option<&'static Mapping>>,
}

impl MappingRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers [`CATALOGUE_MAPPING`].
    pub fn register(&self) -> FlixResult<&'static Mapping> {
        self.register_mapping(&CATALOGUE_MAPPING)
    }

    /// Registers a mapping.
    pub fn register_mapping(&self, mapping: &'static Mapping) -> FlixResult<&'static Mapping> {
        let mut current = self.current.lock();
        if current.is_some() {
            warn!("Attempted to register the table mapping twice");
            return Err(FlixError::MappingAlreadyRegistered);
        }
        *current = Some(mapping);
        info!("Table mapping registered ({} tables)", mapping.tables.len());
        Ok(mapping)
    }

    /// Drops the current registration.
    pub fn clear(&self) {
        if self.current.lock().take().is_some() {
            info!("Table mapping cleared");
        }
    }

    /// Returns the registered mapping.
    pub fn current(&self) -> FlixResult<&'static Mapping> {
        (*self.current.lock()).ok_or(FlixError::MappingNotRegistered)
    }

    /// Returns true if a mapping is registered.
    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.current.lock().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_reference_earlier_tables() {
        let names: Vec<&str> = CATALOGUE_MAPPING.table_names().collect();
        for (index, table) in CATALOGUE_MAPPING.tables.iter().enumerate() {
            for column in table.columns {
                if let Some((target, _)) = column.references {
                    let position = names.iter().position(|n| *n == target).unwrap();
                    assert!(position < index, "{} references later table {}", table.name, target);
                }
            }
        }
    }

    #[test]
    fn test_create_statement_for_simple_table() {
        let sql = CATALOGUE_MAPPING.table("genre").unwrap().create_statement();
        assert_eq!(
            sql,
            r#"CREATE TABLE IF NOT EXISTS "genre" ("id" INTEGER PRIMARY KEY NOT NULL, "name" TEXT NOT NULL UNIQUE)"#
        );
    }

    #[test]
    fn test_create_statement_for_association_table() {
        let sql = CATALOGUE_MAPPING.table("movie_genre").unwrap().create_statement();
        assert!(sql.contains(r#""movie_id" TEXT NOT NULL REFERENCES "movie" ("id")"#));
        assert!(sql.ends_with(r#"PRIMARY KEY ("movie_id", "genre_id"))"#));
    }

    #[test]
    fn test_insert_statement() {
        let director = CATALOGUE_MAPPING.table("director").unwrap();
        assert_eq!(
            director.insert_statement(false),
            r#"INSERT INTO "director" ("id", "first_name", "last_name") VALUES (?, ?, ?)"#
        );
        assert!(director.insert_statement(true).starts_with("INSERT OR IGNORE INTO"));
    }

    #[test]
    fn test_field_to_column() {
        let movie = CATALOGUE_MAPPING.table("movie").unwrap();
        assert_eq!(movie.column("runtime_minutes").unwrap().name, "runtime");
        assert_eq!(movie.column("release_year").unwrap().name, "year");
        assert!(movie.column("director").unwrap().nullable);

        let user = CATALOGUE_MAPPING.table("user").unwrap();
        assert_eq!(user.column("password_hash").unwrap().name, "password");
        assert!(user.select_list().starts_with(r#""user"."id", "user"."first_name""#));
    }

    #[test]
    fn test_unknown_table() {
        assert!(matches!(
            CATALOGUE_MAPPING.table("studio"),
            Err(FlixError::Internal(_))
        ));
    }

    #[test]
    fn test_relationships_cover_association_tables() {
        for rel in CATALOGUE_MAPPING.relationships {
            if let Some(through) = rel.through {
                assert_eq!(rel.kind, RelationshipKind::ManyToMany);
                assert!(CATALOGUE_MAPPING.table(through).is_ok());
            }
        }
    }

    #[test]
    fn test_register_twice_fails() {
        let registry = MappingRegistry::new();
        registry.register().unwrap();
        assert!(matches!(
            registry.register(),
            Err(FlixError::MappingAlreadyRegistered)
        ));
    }

    #[test]
    fn test_clear_then_register() {
        let registry = MappingRegistry::new();
        assert!(matches!(registry.current(), Err(FlixError::MappingNotRegistered)));

        registry.register().unwrap();
        registry.clear();
        assert!(!registry.is_registered());

        let mapping = registry.register().unwrap();
        assert_eq!(*mapping, CATALOGUE_MAPPING);
        assert!(registry.is_registered());
    }
}
