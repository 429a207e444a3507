//! Loads the CSV data file into a repository.

use crate::{CatalogRepository, MovieFileCsvReader};
use flix_core::FlixResult;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Counts of what a [`populate`] run read from the data file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PopulateSummary {
    pub movies: usize,
    pub directors: usize,
    pub actors: usize,
    pub genres: usize,
}

/// Reads `path` and adds every movie to `repository`, one at a time.
///
/// Directors, genres and actors are stored through the movies that reference
/// them. Each movie is its own unit of work: a failure stops the import but
/// keeps the movies added before it.
pub async fn populate(repository: &dyn CatalogRepository, path: &Path) -> FlixResult<PopulateSummary> {
    let mut reader = MovieFileCsvReader::new(path);
    reader.read_csv_file()?;

    for movie in reader.dataset_of_movies() {
        repository.add_movie(movie).await?;
    }

    let summary = PopulateSummary {
        movies: reader.dataset_of_movies().len(),
        directors: reader.dataset_of_directors().len(),
        actors: reader.dataset_of_actors().len(),
        genres: reader.dataset_of_genres().len(),
    };
    info!(
        movies = summary.movies,
        directors = summary.directors,
        actors = summary.actors,
        genres = summary.genres,
        "Catalogue populated from {}",
        path.display()
    );
    Ok(summary)
}
