//! Reader for the movie CSV data file.

use flix_core::{Actor, ActorId, Director, DirectorId, FlixError, FlixResult, Genre, GenreId, Movie};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One row of the data file. Columns not listed here are ignored.
#[derive(Debug, Deserialize)]
struct MovieRecord {
    #[serde(rename = "Rank")]
    rank: u32,
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Genre")]
    genre: String,
    #[serde(rename = "Description", default)]
    description: String,
    #[serde(rename = "Director")]
    director: String,
    #[serde(rename = "Actors")]
    actors: String,
    #[serde(rename = "Year")]
    year: i32,
    #[serde(rename = "Runtime (Minutes)")]
    runtime: u32,
}

/// A person's name split into first, middle and last parts.
#[derive(Debug, PartialEq, Eq)]
struct PersonName {
    first: String,
    middle: Option<String>,
    last: Option<String>,
}

impl PersonName {
    /// Splits on whitespace: first token, last token, everything between.
    fn parse(full_name: &str) -> Option<Self> {
        let mut parts: Vec<&str> = full_name.split_whitespace().collect();
        if parts.is_empty() {
            return None;
        }
        let first = parts.remove(0).to_string();
        let last = parts.pop().map(str::to_string);
        let middle = (!parts.is_empty()).then(|| parts.join(" "));
        Some(Self { first, middle, last })
    }

    /// First name followed by any middle names, for records without a
    /// separate middle-name field.
    fn given_names(&self) -> String {
        match &self.middle {
            Some(middle) => format!("{} {}", self.first, middle),
            None => self.first.clone(),
        }
    }
}

/// Splits a comma-separated list, dropping blank entries.
fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// Reads movies from a CSV file and deduplicates the people and genres in it.
///
/// Directors and actors are identified by full name, genres by name. IDs are
/// assigned from 1 in first-seen order; movie IDs are `m{Rank}`.
#[derive(Debug)]
pub struct MovieFileCsvReader {
    path: PathBuf,
    movies: Vec<Movie>,
    actors: Vec<Actor>,
    directors: Vec<Director>,
    genres: Vec<Genre>,
}

impl MovieFileCsvReader {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            movies: Vec::new(),
            actors: Vec::new(),
            directors: Vec::new(),
            genres: Vec::new(),
        }
    }

    /// Path of the data file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole file, replacing anything read before.
    pub fn read_csv_file(&mut self) -> FlixResult<()> {
        info!("Reading movie data from {}", self.path.display());

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| self.import_error(&e))?;

        let mut movies = Vec::new();
        let mut actors: Vec<Actor> = Vec::new();
        let mut directors: Vec<Director> = Vec::new();
        let mut genres: Vec<Genre> = Vec::new();
        let mut actor_ids: HashMap<String, usize> = HashMap::new();
        let mut director_ids: HashMap<String, usize> = HashMap::new();
        let mut genre_ids: HashMap<String, usize> = HashMap::new();

        for result in reader.deserialize::<MovieRecord>() {
            let record = result.map_err(|e| self.import_error(&e))?;
            let mut movie = Movie::new(
                format!("m{}", record.rank),
                record.title,
                record.year,
                record.runtime,
            )
            .with_rank(record.rank);

            if !record.description.is_empty() {
                movie = movie.with_description(record.description);
            }

            if let Some(name) = PersonName::parse(&record.director) {
                let key = record.director.split_whitespace().collect::<Vec<_>>().join(" ");
                let index = *director_ids.entry(key).or_insert_with(|| {
                    directors.push(Director::new(
                        DirectorId::new(next_id(directors.len())),
                        name.given_names(),
                        name.last,
                    ));
                    directors.len() - 1
                });
                movie.director = Some(directors[index].clone());
            }

            for genre_name in split_list(&record.genre) {
                let index = *genre_ids.entry(genre_name.to_string()).or_insert_with(|| {
                    genres.push(Genre::new(GenreId::new(next_id(genres.len())), genre_name));
                    genres.len() - 1
                });
                movie.add_genre(genres[index].clone());
            }

            for actor_name in split_list(&record.actors) {
                let Some(name) = PersonName::parse(actor_name) else {
                    continue;
                };
                let key = actor_name.split_whitespace().collect::<Vec<_>>().join(" ");
                let index = *actor_ids.entry(key).or_insert_with(|| {
                    actors.push(Actor::new(
                        ActorId::new(next_id(actors.len())),
                        name.first,
                        name.middle,
                        name.last,
                    ));
                    actors.len() - 1
                });
                movie.add_actor(actors[index].clone());
            }

            debug!("Read movie {}: {}", movie.id, movie.title);
            movies.push(movie);
        }

        info!(
            "Read {} movies, {} directors, {} actors, {} genres",
            movies.len(),
            directors.len(),
            actors.len(),
            genres.len()
        );

        self.movies = movies;
        self.actors = actors;
        self.directors = directors;
        self.genres = genres;
        Ok(())
    }

    #[must_use]
    pub fn dataset_of_movies(&self) -> &[Movie] {
        &self.movies
    }

    #[must_use]
    pub fn dataset_of_actors(&self) -> &[Actor] {
        &self.actors
    }

    #[must_use]
    pub fn dataset_of_directors(&self) -> &[Director] {
        &self.directors
    }

    #[must_use]
    pub fn dataset_of_genres(&self) -> &[Genre] {
        &self.genres
    }

    fn import_error(&self, err: &csv::Error) -> FlixError {
        FlixError::Import(format!("{}: {}", self.path.display(), err))
    }
}

fn next_id(len: usize) -> i64 {
    i64::try_from(len).map_or(i64::MAX, |n| n + 1)
}
