//! SQLite catalogue repository implementation.

use super::at_most_one;
use super::rows::{
    to_u32, ActorRow, DirectorRow, GenreRow, MovieRow, ReviewRow, UserRow, WatchlistRow,
};
use crate::mapping::{quote, Mapping, MappingRegistry};
use crate::{CatalogRepository, DatabasePool, SessionFactory};
use async_trait::async_trait;
use flix_core::{
    Actor, ActorId, Director, DirectorId, FlixError, FlixResult, Genre, GenreId, Movie, MovieId,
    Review, ReviewId, User, UserId, ValidateExt, Watchlist,
};
use sqlx::SqliteConnection;
use tracing::debug;

/// Pre-rendered statements for one mapped table.
#[derive(Debug)]
struct TableSql {
    select: String,
    insert: String,
    insert_or_ignore: String,
}

impl TableSql {
    fn prepare(mapping: &Mapping, name: &str) -> FlixResult<Self> {
        let table = mapping.table(name)?;
        Ok(Self {
            select: format!("SELECT {} FROM {}", table.select_list(), quote(table.name)),
            insert: table.insert_statement(false),
            insert_or_ignore: table.insert_statement(true),
        })
    }
}

#[derive(Debug)]
struct Statements {
    movie: TableSql,
    actor: TableSql,
    director: TableSql,
    genre: TableSql,
    user: TableSql,
    review: TableSql,
    watchlist: TableSql,
    movie_genre: TableSql,
    movie_actor: TableSql,
    watchlist_movie: TableSql,
}

impl Statements {
    fn prepare(mapping: &Mapping) -> FlixResult<Self> {
        Ok(Self {
            movie: TableSql::prepare(mapping, "movie")?,
            actor: TableSql::prepare(mapping, "actor")?,
            director: TableSql::prepare(mapping, "director")?,
            genre: TableSql::prepare(mapping, "genre")?,
            user: TableSql::prepare(mapping, "user")?,
            review: TableSql::prepare(mapping, "review")?,
            watchlist: TableSql::prepare(mapping, "watchlist")?,
            movie_genre: TableSql::prepare(mapping, "movie_genre")?,
            movie_actor: TableSql::prepare(mapping, "movie_actor")?,
            watchlist_movie: TableSql::prepare(mapping, "watchlist_movie")?,
        })
    }
}

/// Catalogue repository over SQLite.
///
/// Every operation opens its own [`Session`](crate::Session); writes commit
/// before returning, and anything that fails midway is rolled back.
#[derive(Debug)]
pub struct SqlCatalogRepository {
    sessions: SessionFactory,
    mapping: &'static Mapping,
    sql: Statements,
}

impl SqlCatalogRepository {
    /// Creates a repository over the registered mapping.
    ///
    /// Fails with [`FlixError::MappingNotRegistered`] if the registry is empty.
    pub fn new(pool: &DatabasePool, registry: &MappingRegistry) -> FlixResult<Self> {
        let mapping = registry.current()?;
        Ok(Self {
            sessions: SessionFactory::new(pool),
            mapping,
            sql: Statements::prepare(mapping)?,
        })
    }

    // ----- Loading helpers -----

    async fn fetch_director(
        &self,
        conn: &mut SqliteConnection,
        id: i64,
    ) -> FlixResult<Option<Director>> {
        let sql = format!("{} WHERE \"director\".\"id\" = ? LIMIT 2", self.sql.director.select);
        let rows = sqlx::query_as::<_, DirectorRow>(&sql)
            .bind(id)
            .fetch_all(&mut *conn)
            .await?;
        Ok(at_most_one(rows, "director", &id.to_string())?.map(Director::from))
    }

    async fn fetch_genre_by_name(
        &self,
        conn: &mut SqliteConnection,
        name: &str,
    ) -> FlixResult<Option<Genre>> {
        let sql = format!("{} WHERE \"genre\".\"name\" = ? LIMIT 2", self.sql.genre.select);
        let rows = sqlx::query_as::<_, GenreRow>(&sql)
            .bind(name)
            .fetch_all(&mut *conn)
            .await?;
        Ok(at_most_one(rows, "genre", name)?.map(Genre::from))
    }

    async fn fetch_user(
        &self,
        conn: &mut SqliteConnection,
        username: &str,
    ) -> FlixResult<Option<User>> {
        let sql = format!("{} WHERE \"user\".\"username\" = ? LIMIT 2", self.sql.user.select);
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .bind(username)
            .fetch_all(&mut *conn)
            .await?;
        at_most_one(rows, "user", username)?.map(User::try_from).transpose()
    }

    async fn fetch_movie(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
    ) -> FlixResult<Option<Movie>> {
        let sql = format!("{} WHERE \"movie\".\"id\" = ? LIMIT 2", self.sql.movie.select);
        let rows = sqlx::query_as::<_, MovieRow>(&sql)
            .bind(id)
            .fetch_all(&mut *conn)
            .await?;
        match at_most_one(rows, "movie", id)? {
            Some(row) => Ok(Some(self.hydrate_movie(conn, row).await?)),
            None => Ok(None),
        }
    }

    /// Builds a movie from its row, loading director, genres and actors.
    async fn hydrate_movie(&self, conn: &mut SqliteConnection, row: MovieRow) -> FlixResult<Movie> {
        let movie_id = row.id.clone();
        let director_id = row.director_id;
        let mut movie = Movie::try_from(row)?;

        if let Some(director_id) = director_id {
            movie.director = self.fetch_director(conn, director_id).await?;
        }

        let sql = format!(
            "{} JOIN \"movie_genre\" ON \"movie_genre\".\"genre_id\" = \"genre\".\"id\" \
             WHERE \"movie_genre\".\"movie_id\" = ? ORDER BY \"movie_genre\".\"position\"",
            self.sql.genre.select
        );
        movie.genres = sqlx::query_as::<_, GenreRow>(&sql)
            .bind(movie_id.as_str())
            .fetch_all(&mut *conn)
            .await?
            .into_iter()
            .map(Genre::from)
            .collect();

        let sql = format!(
            "{} JOIN \"movie_actor\" ON \"movie_actor\".\"actor_id\" = \"actor\".\"id\" \
             WHERE \"movie_actor\".\"movie_id\" = ? ORDER BY \"movie_actor\".\"position\"",
            self.sql.actor.select
        );
        movie.actors = sqlx::query_as::<_, ActorRow>(&sql)
            .bind(movie_id.as_str())
            .fetch_all(&mut *conn)
            .await?
            .into_iter()
            .map(Actor::from)
            .collect();

        Ok(movie)
    }

    async fn hydrate_movies(
        &self,
        conn: &mut SqliteConnection,
        rows: Vec<MovieRow>,
    ) -> FlixResult<Vec<Movie>> {
        let mut movies = Vec::with_capacity(rows.len());
        for row in rows {
            movies.push(self.hydrate_movie(conn, row).await?);
        }
        Ok(movies)
    }

    async fn fetch_watchlist_movies(
        &self,
        conn: &mut SqliteConnection,
        watchlist_id: i64,
    ) -> FlixResult<Vec<Movie>> {
        let sql = format!(
            "{} JOIN \"watchlist_movie\" ON \"watchlist_movie\".\"movie_id\" = \"movie\".\"id\" \
             WHERE \"watchlist_movie\".\"watchlist_id\" = ? ORDER BY \"watchlist_movie\".\"position\"",
            self.sql.movie.select
        );
        let rows = sqlx::query_as::<_, MovieRow>(&sql)
            .bind(watchlist_id)
            .fetch_all(&mut *conn)
            .await?;
        self.hydrate_movies(conn, rows).await
    }

    async fn hydrate_watchlist(
        &self,
        conn: &mut SqliteConnection,
        row: WatchlistRow,
    ) -> FlixResult<Watchlist> {
        let (id, user_id) = row.ids();
        let mut watchlist = Watchlist::new(id, user_id);
        watchlist.movies = self.fetch_watchlist_movies(conn, row.id).await?;
        Ok(watchlist)
    }

    async fn fetch_watchlist_row(
        &self,
        conn: &mut SqliteConnection,
        user_id: UserId,
    ) -> FlixResult<Option<WatchlistRow>> {
        let sql = format!("{} WHERE \"watchlist\".\"user_id\" = ? LIMIT 2", self.sql.watchlist.select);
        let rows = sqlx::query_as::<_, WatchlistRow>(&sql)
            .bind(user_id.into_inner())
            .fetch_all(&mut *conn)
            .await?;
        at_most_one(rows, "watchlist", &user_id.to_string())
    }

    // ----- Existence checks -----

    fn count_sql(table: &str, column: &str) -> String {
        format!("SELECT COUNT(*) FROM {} WHERE {} = ?", quote(table), quote(column))
    }

    async fn count_by_id(
        conn: &mut SqliteConnection,
        table: &str,
        column: &str,
        key: i64,
    ) -> FlixResult<i64> {
        let (count,): (i64,) = sqlx::query_as(&Self::count_sql(table, column))
            .bind(key)
            .fetch_one(&mut *conn)
            .await?;
        Ok(count)
    }

    async fn count_by_text(
        conn: &mut SqliteConnection,
        table: &str,
        column: &str,
        key: &str,
    ) -> FlixResult<i64> {
        let (count,): (i64,) = sqlx::query_as(&Self::count_sql(table, column))
            .bind(key)
            .fetch_one(&mut *conn)
            .await?;
        Ok(count)
    }

    async fn require_user(conn: &mut SqliteConnection, user_id: UserId) -> FlixResult<()> {
        if Self::count_by_id(conn, "user", "id", user_id.into_inner()).await? == 0 {
            return Err(FlixError::not_found("user", user_id));
        }
        Ok(())
    }

    async fn require_movie(conn: &mut SqliteConnection, movie_id: &MovieId) -> FlixResult<()> {
        if Self::count_by_text(conn, "movie", "id", movie_id.as_str()).await? == 0 {
            return Err(FlixError::not_found("movie", movie_id));
        }
        Ok(())
    }

    // ----- Writing helpers -----

    /// Stores a genre unless one with the same name exists; returns the stored ID.
    async fn resolve_genre(&self, conn: &mut SqliteConnection, genre: &Genre) -> FlixResult<GenreId> {
        if let Some(existing) = self.fetch_genre_by_name(conn, &genre.name).await? {
            debug!("Genre '{}' already stored as {}", genre.name, existing.id);
            return Ok(existing.id);
        }

        sqlx::query(&self.sql.genre.insert)
            .bind(genre.id.into_inner())
            .bind(&genre.name)
            .execute(&mut *conn)
            .await?;
        Ok(genre.id)
    }

    async fn insert_director(
        &self,
        conn: &mut SqliteConnection,
        director: &Director,
        or_ignore: bool,
    ) -> FlixResult<()> {
        let sql = if or_ignore {
            &self.sql.director.insert_or_ignore
        } else {
            &self.sql.director.insert
        };
        sqlx::query(sql)
            .bind(director.id.into_inner())
            .bind(&director.first_name)
            .bind(&director.last_name)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    async fn insert_actor(
        &self,
        conn: &mut SqliteConnection,
        actor: &Actor,
        or_ignore: bool,
    ) -> FlixResult<()> {
        let sql = if or_ignore {
            &self.sql.actor.insert_or_ignore
        } else {
            &self.sql.actor.insert
        };
        sqlx::query(sql)
            .bind(actor.id.into_inner())
            .bind(&actor.first_name)
            .bind(&actor.middle_names)
            .bind(&actor.last_name)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    async fn append_to_watchlist(
        &self,
        conn: &mut SqliteConnection,
        watchlist_id: i64,
        movie_id: &MovieId,
    ) -> FlixResult<()> {
        let sql = "INSERT OR IGNORE INTO \"watchlist_movie\" (\"watchlist_id\", \"movie_id\", \"position\") \
                   VALUES (?, ?, (SELECT COALESCE(MAX(\"position\"), -1) + 1 FROM \"watchlist_movie\" WHERE \"watchlist_id\" = ?))";
        sqlx::query(sql)
            .bind(watchlist_id)
            .bind(movie_id.as_str())
            .bind(watchlist_id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Renders a single-column lookup from mapped field names.
    fn column_query(&self, table: &str, field: &str, key_field: &str) -> FlixResult<String> {
        let mapped = self.mapping.table(table)?;
        let column = |name: &str| {
            mapped.column(name).map(|c| quote(c.name)).ok_or_else(|| {
                FlixError::internal(format!("Field '{}' of '{}' is not mapped", name, table))
            })
        };
        Ok(format!(
            "SELECT {} FROM {} WHERE {} = ? LIMIT 2",
            column(field)?,
            quote(mapped.name),
            column(key_field)?
        ))
    }

    async fn lookup_text(
        &self,
        table: &'static str,
        field: &str,
        key_field: &str,
        key: &str,
    ) -> FlixResult<Option<String>> {
        let sql = self.column_query(table, field, key_field)?;
        let mut session = self.sessions.begin();
        let rows = sqlx::query_as::<_, (String,)>(&sql)
            .bind(key)
            .fetch_all(session.connection().await?)
            .await?;
        session.rollback().await?;
        Ok(at_most_one(rows, table, key)?.map(|(value,)| value))
    }

    async fn lookup_integer(
        &self,
        table: &'static str,
        field: &str,
        key_field: &str,
        key: &str,
    ) -> FlixResult<Option<i64>> {
        let sql = self.column_query(table, field, key_field)?;
        let mut session = self.sessions.begin();
        let rows = sqlx::query_as::<_, (i64,)>(&sql)
            .bind(key)
            .fetch_all(session.connection().await?)
            .await?;
        session.rollback().await?;
        Ok(at_most_one(rows, table, key)?.map(|(value,)| value))
    }
}

#[async_trait]
impl CatalogRepository for SqlCatalogRepository {
    async fn add_movie(&self, movie: &Movie) -> FlixResult<()> {
        debug!("Adding movie: {}", movie.id);
        movie.validate_entity()?;

        let mut session = self.sessions.begin();
        let conn = session.connection().await?;

        if let Some(director) = &movie.director {
            self.insert_director(conn, director, true).await?;
        }

        let mut genre_ids = Vec::with_capacity(movie.genres.len());
        for genre in &movie.genres {
            genre_ids.push(self.resolve_genre(conn, genre).await?);
        }

        for actor in &movie.actors {
            self.insert_actor(conn, actor, true).await?;
        }

        sqlx::query(&self.sql.movie.insert)
            .bind(movie.id.as_str())
            .bind(&movie.title)
            .bind(movie.release_year)
            .bind(i64::from(movie.runtime_minutes))
            .bind(&movie.description)
            .bind(movie.rank.map(i64::from))
            .bind(movie.director.as_ref().map(|d| d.id.into_inner()))
            .execute(&mut *conn)
            .await?;

        for (position, genre_id) in genre_ids.iter().enumerate() {
            sqlx::query(&self.sql.movie_genre.insert_or_ignore)
                .bind(movie.id.as_str())
                .bind(genre_id.into_inner())
                .bind(position as i64)
                .execute(&mut *conn)
                .await?;
        }

        for (position, actor) in movie.actors.iter().enumerate() {
            sqlx::query(&self.sql.movie_actor.insert_or_ignore)
                .bind(movie.id.as_str())
                .bind(actor.id.into_inner())
                .bind(position as i64)
                .execute(&mut *conn)
                .await?;
        }

        session.commit().await
    }

    async fn get_movie(&self, id: &MovieId) -> FlixResult<Option<Movie>> {
        debug!("Finding movie by id: {}", id);

        let mut session = self.sessions.begin();
        let movie = self.fetch_movie(session.connection().await?, id.as_str()).await?;
        session.rollback().await?;
        Ok(movie)
    }

    async fn get_movies(&self) -> FlixResult<Vec<Movie>> {
        debug!("Listing movies");

        let mut session = self.sessions.begin();
        let conn = session.connection().await?;
        let sql = format!("{} ORDER BY \"movie\".rowid", self.sql.movie.select);
        let rows = sqlx::query_as::<_, MovieRow>(&sql).fetch_all(&mut *conn).await?;
        let movies = self.hydrate_movies(conn, rows).await?;
        session.rollback().await?;
        Ok(movies)
    }

    async fn add_actor(&self, actor: &Actor) -> FlixResult<()> {
        debug!("Adding actor: {}", actor.id);

        let mut session = self.sessions.begin();
        self.insert_actor(session.connection().await?, actor, false).await?;
        session.commit().await
    }

    async fn get_actor(&self, id: ActorId) -> FlixResult<Option<Actor>> {
        debug!("Finding actor by id: {}", id);

        let mut session = self.sessions.begin();
        let sql = format!("{} WHERE \"actor\".\"id\" = ? LIMIT 2", self.sql.actor.select);
        let rows = sqlx::query_as::<_, ActorRow>(&sql)
            .bind(id.into_inner())
            .fetch_all(session.connection().await?)
            .await?;
        session.rollback().await?;
        Ok(at_most_one(rows, "actor", &id.to_string())?.map(Actor::from))
    }

    async fn get_actors(&self) -> FlixResult<Vec<Actor>> {
        let mut session = self.sessions.begin();
        let sql = format!("{} ORDER BY \"actor\".\"id\"", self.sql.actor.select);
        let rows = sqlx::query_as::<_, ActorRow>(&sql)
            .fetch_all(session.connection().await?)
            .await?;
        session.rollback().await?;
        Ok(rows.into_iter().map(Actor::from).collect())
    }

    async fn add_director(&self, director: &Director) -> FlixResult<()> {
        debug!("Adding director: {}", director.id);

        let mut session = self.sessions.begin();
        self.insert_director(session.connection().await?, director, false)
            .await?;
        session.commit().await
    }

    async fn get_director(&self, id: DirectorId) -> FlixResult<Option<Director>> {
        debug!("Finding director by id: {}", id);

        let mut session = self.sessions.begin();
        let director = self
            .fetch_director(session.connection().await?, id.into_inner())
            .await?;
        session.rollback().await?;
        Ok(director)
    }

    async fn get_directors(&self) -> FlixResult<Vec<Director>> {
        let mut session = self.sessions.begin();
        let sql = format!("{} ORDER BY \"director\".\"id\"", self.sql.director.select);
        let rows = sqlx::query_as::<_, DirectorRow>(&sql)
            .fetch_all(session.connection().await?)
            .await?;
        session.rollback().await?;
        Ok(rows.into_iter().map(Director::from).collect())
    }

    async fn add_genre(&self, genre: &Genre) -> FlixResult<()> {
        debug!("Adding genre: {}", genre.name);

        let mut session = self.sessions.begin();
        self.resolve_genre(session.connection().await?, genre).await?;
        session.commit().await
    }

    async fn get_genre(&self, id: GenreId) -> FlixResult<Option<Genre>> {
        debug!("Finding genre by id: {}", id);

        let mut session = self.sessions.begin();
        let sql = format!("{} WHERE \"genre\".\"id\" = ? LIMIT 2", self.sql.genre.select);
        let rows = sqlx::query_as::<_, GenreRow>(&sql)
            .bind(id.into_inner())
            .fetch_all(session.connection().await?)
            .await?;
        session.rollback().await?;
        Ok(at_most_one(rows, "genre", &id.to_string())?.map(Genre::from))
    }

    async fn get_genre_by_name(&self, name: &str) -> FlixResult<Option<Genre>> {
        debug!("Finding genre by name: {}", name);

        let mut session = self.sessions.begin();
        let genre = self
            .fetch_genre_by_name(session.connection().await?, name)
            .await?;
        session.rollback().await?;
        Ok(genre)
    }

    async fn get_genres(&self) -> FlixResult<Vec<Genre>> {
        let mut session = self.sessions.begin();
        let sql = format!("{} ORDER BY \"genre\".\"id\"", self.sql.genre.select);
        let rows = sqlx::query_as::<_, GenreRow>(&sql)
            .fetch_all(session.connection().await?)
            .await?;
        session.rollback().await?;
        Ok(rows.into_iter().map(Genre::from).collect())
    }

    async fn add_review(&self, review: &Review) -> FlixResult<()> {
        debug!("Adding review {} for '{}'", review.id, review.movie_title);
        review.validate_entity()?;

        let mut session = self.sessions.begin();
        let conn = session.connection().await?;

        Self::require_user(conn, review.user_id).await?;
        if Self::count_by_text(conn, "movie", "title", &review.movie_title).await? == 0 {
            return Err(FlixError::not_found("movie", &review.movie_title));
        }

        sqlx::query(&self.sql.review.insert)
            .bind(review.id.into_inner())
            .bind(&review.movie_title)
            .bind(review.user_id.into_inner())
            .bind(&review.text)
            .bind(i64::from(review.rating))
            .bind(review.timestamp)
            .execute(&mut *conn)
            .await?;

        session.commit().await
    }

    async fn get_review(&self, id: ReviewId) -> FlixResult<Option<Review>> {
        debug!("Finding review by id: {}", id);

        let mut session = self.sessions.begin();
        let sql = format!("{} WHERE \"review\".\"id\" = ? LIMIT 2", self.sql.review.select);
        let rows = sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(id.into_inner())
            .fetch_all(session.connection().await?)
            .await?;
        session.rollback().await?;
        at_most_one(rows, "review", &id.to_string())?
            .map(Review::try_from)
            .transpose()
    }

    async fn get_reviews(&self) -> FlixResult<Vec<Review>> {
        let mut session = self.sessions.begin();
        let sql = format!("{} ORDER BY \"review\".\"id\"", self.sql.review.select);
        let rows = sqlx::query_as::<_, ReviewRow>(&sql)
            .fetch_all(session.connection().await?)
            .await?;
        session.rollback().await?;
        rows.into_iter().map(Review::try_from).collect()
    }

    async fn add_user(&self, user: &User) -> FlixResult<()> {
        debug!("Adding user: {}", user.username);
        user.validate_entity()?;

        let mut session = self.sessions.begin();
        sqlx::query(&self.sql.user.insert)
            .bind(user.id.into_inner())
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(&user.email)
            .bind(user.age.map(i64::from))
            .bind(user.consent)
            .execute(session.connection().await?)
            .await?;
        session.commit().await
    }

    async fn get_user(&self, username: &str) -> FlixResult<Option<User>> {
        debug!("Finding user by username: {}", username);

        let mut session = self.sessions.begin();
        let user = self.fetch_user(session.connection().await?, username).await?;
        session.rollback().await?;
        Ok(user)
    }

    async fn get_user_by_id(&self, id: UserId) -> FlixResult<Option<User>> {
        debug!("Finding user by id: {}", id);

        let mut session = self.sessions.begin();
        let sql = format!("{} WHERE \"user\".\"id\" = ? LIMIT 2", self.sql.user.select);
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id.into_inner())
            .fetch_all(session.connection().await?)
            .await?;
        session.rollback().await?;
        at_most_one(rows, "user", &id.to_string())?
            .map(User::try_from)
            .transpose()
    }

    async fn get_users(&self) -> FlixResult<Vec<User>> {
        let mut session = self.sessions.begin();
        let sql = format!("{} ORDER BY \"user\".\"id\"", self.sql.user.select);
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .fetch_all(session.connection().await?)
            .await?;
        session.rollback().await?;
        rows.into_iter().map(User::try_from).collect()
    }

    async fn get_user_reviews(&self, username: &str) -> FlixResult<Option<Vec<Review>>> {
        debug!("Listing reviews of user: {}", username);

        let mut session = self.sessions.begin();
        let conn = session.connection().await?;
        let Some(user) = self.fetch_user(conn, username).await? else {
            return Ok(None);
        };

        let sql = format!(
            "{} WHERE \"review\".\"user_id\" = ? ORDER BY \"review\".\"id\"",
            self.sql.review.select
        );
        let rows = sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(user.id.into_inner())
            .fetch_all(&mut *conn)
            .await?;
        session.rollback().await?;

        rows.into_iter()
            .map(Review::try_from)
            .collect::<FlixResult<Vec<_>>>()
            .map(Some)
    }

    async fn get_user_watched_movies(&self, username: &str) -> FlixResult<Option<Vec<Movie>>> {
        debug!("Listing watched movies of user: {}", username);

        let mut session = self.sessions.begin();
        let conn = session.connection().await?;
        let Some(user) = self.fetch_user(conn, username).await? else {
            return Ok(None);
        };

        let sql = format!(
            "{} JOIN \"user_watched_movie\" ON \"user_watched_movie\".\"movie_id\" = \"movie\".\"id\" \
             WHERE \"user_watched_movie\".\"user_id\" = ? ORDER BY \"user_watched_movie\".\"position\"",
            self.sql.movie.select
        );
        let rows = sqlx::query_as::<_, MovieRow>(&sql)
            .bind(user.id.into_inner())
            .fetch_all(&mut *conn)
            .await?;
        let movies = self.hydrate_movies(conn, rows).await?;
        session.rollback().await?;
        Ok(Some(movies))
    }

    async fn add_watched_movie(&self, user_id: UserId, movie_id: &MovieId) -> FlixResult<()> {
        debug!("User {} watched movie {}", user_id, movie_id);

        let mut session = self.sessions.begin();
        let conn = session.connection().await?;
        Self::require_user(conn, user_id).await?;
        Self::require_movie(conn, movie_id).await?;

        let sql = "INSERT OR IGNORE INTO \"user_watched_movie\" (\"user_id\", \"movie_id\", \"position\") \
                   VALUES (?, ?, (SELECT COALESCE(MAX(\"position\"), -1) + 1 FROM \"user_watched_movie\" WHERE \"user_id\" = ?))";
        sqlx::query(sql)
            .bind(user_id.into_inner())
            .bind(movie_id.as_str())
            .bind(user_id.into_inner())
            .execute(&mut *conn)
            .await?;

        session.commit().await
    }

    async fn add_watchlist(&self, watchlist: &Watchlist) -> FlixResult<()> {
        debug!("Adding watchlist {} for user {}", watchlist.id, watchlist.user_id);

        let mut session = self.sessions.begin();
        let conn = session.connection().await?;
        Self::require_user(conn, watchlist.user_id).await?;

        if self.fetch_watchlist_row(conn, watchlist.user_id).await?.is_some() {
            return Err(FlixError::conflict(format!(
                "User {} already owns a watchlist",
                watchlist.user_id
            )));
        }

        sqlx::query(&self.sql.watchlist.insert)
            .bind(watchlist.id.into_inner())
            .bind(watchlist.user_id.into_inner())
            .execute(&mut *conn)
            .await?;

        for (position, movie) in watchlist.movies.iter().enumerate() {
            Self::require_movie(conn, &movie.id).await?;
            sqlx::query(&self.sql.watchlist_movie.insert_or_ignore)
                .bind(watchlist.id.into_inner())
                .bind(movie.id.as_str())
                .bind(position as i64)
                .execute(&mut *conn)
                .await?;
        }

        session.commit().await
    }

    async fn get_watchlist(&self, user_id: UserId) -> FlixResult<Option<Watchlist>> {
        debug!("Finding watchlist of user: {}", user_id);

        let mut session = self.sessions.begin();
        let conn = session.connection().await?;
        let watchlist = match self.fetch_watchlist_row(conn, user_id).await? {
            Some(row) => Some(self.hydrate_watchlist(conn, row).await?),
            None => None,
        };
        session.rollback().await?;
        Ok(watchlist)
    }

    async fn get_watchlists(&self) -> FlixResult<Vec<Watchlist>> {
        let mut session = self.sessions.begin();
        let conn = session.connection().await?;
        let sql = format!("{} ORDER BY \"watchlist\".\"id\"", self.sql.watchlist.select);
        let rows = sqlx::query_as::<_, WatchlistRow>(&sql)
            .fetch_all(&mut *conn)
            .await?;

        let mut watchlists = Vec::with_capacity(rows.len());
        for row in rows {
            watchlists.push(self.hydrate_watchlist(conn, row).await?);
        }
        session.rollback().await?;
        Ok(watchlists)
    }

    async fn add_movie_to_watchlist(&self, user_id: UserId, movie_id: &MovieId) -> FlixResult<()> {
        debug!("Adding movie {} to watchlist of user {}", movie_id, user_id);

        let mut session = self.sessions.begin();
        let conn = session.connection().await?;
        let row = self
            .fetch_watchlist_row(conn, user_id)
            .await?
            .ok_or_else(|| FlixError::not_found("watchlist", user_id))?;
        Self::require_movie(conn, movie_id).await?;

        self.append_to_watchlist(conn, row.id, movie_id).await?;
        session.commit().await
    }

    async fn get_movie_title(&self, id: &MovieId) -> FlixResult<Option<String>> {
        self.lookup_text("movie", "title", "id", id.as_str()).await
    }

    async fn get_movie_runtime(&self, id: &MovieId) -> FlixResult<Option<u32>> {
        self.lookup_integer("movie", "runtime_minutes", "id", id.as_str())
            .await?
            .map(|runtime| to_u32(runtime, "runtime"))
            .transpose()
    }

    async fn get_user_password(&self, username: &str) -> FlixResult<Option<String>> {
        self.lookup_text("user", "password_hash", "username", username)
            .await
    }

    async fn get_user_id(&self, username: &str) -> FlixResult<Option<UserId>> {
        Ok(self
            .lookup_integer("user", "id", "username", username)
            .await?
            .map(UserId::new))
    }
}
