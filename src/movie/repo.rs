use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::model::{Movie, MovieFields, MoviePatch};
use super::validate::{validate_full, ValidationError};

/// Seed bundled into the binary, used when no seed file is configured.
pub const BUNDLED_SEED: &str = include_str!("../../data/movies.json");

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
}

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Failed to read seed file {0}: {1}")]
    ReadError(String, std::io::Error),
    #[error("Failed to parse seed {0}: {1}")]
    ParseError(String, serde_json::Error),
    #[error("Seed record {0} has no string id")]
    MissingId(usize),
    #[error("Seed record {0} ({1}) is invalid: {2}")]
    InvalidRecord(usize, String, ValidationError),
    #[error("Invalid seed: {0}")]
    Repo(#[from] RepoError),
}

#[async_trait]
pub trait MovieRepo: Send + Sync {
    /// All movies in stored order, optionally only those carrying `genre`
    /// (compared ignoring case).
    async fn list_movies(&self, genre: Option<&str>) -> Vec<Movie>;
    async fn get_movie(&self, id: &str) -> RepoResult<Movie>;
    /// Store a new movie under a freshly generated id.
    async fn create_movie(&self, fields: MovieFields) -> RepoResult<Movie>;
    async fn update_movie(&self, id: &str, patch: MoviePatch) -> RepoResult<Movie>;
    async fn delete_movie(&self, id: &str) -> RepoResult<()>;
}

/// Process-memory store. One lock covers the whole collection so that
/// find-then-mutate sequences are never interleaved.
pub struct MemoryRepository {
    movies: RwLock<Vec<Movie>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self {
            movies: RwLock::new(Vec::new()),
        }
    }

    pub fn with_movies(movies: Vec<Movie>) -> RepoResult<Self> {
        let mut seen = HashSet::new();
        for movie in &movies {
            if !seen.insert(movie.id.as_str()) {
                return Err(RepoError::AlreadyExists(movie.id.clone()));
            }
        }
        Ok(Self {
            movies: RwLock::new(movies),
        })
    }

    /// Parse a JSON array of movies. Each record must carry an `id` and pass
    /// the same checks as a create request.
    pub fn from_seed_json(name: &str, json: &str) -> Result<Self, SeedError> {
        let records: Vec<Value> = serde_json::from_str(json)
            .map_err(|e| SeedError::ParseError(name.to_string(), e))?;
        let movies = records
            .iter()
            .enumerate()
            .map(|(idx, record)| seed_movie(idx, record))
            .collect::<Result<Vec<_>, _>>()?;
        info!("Loaded {} movies from {}", movies.len(), name);
        Ok(Self::with_movies(movies)?)
    }

    pub fn from_seed_file(path: &Path) -> Result<Self, SeedError> {
        let name = path.to_string_lossy().to_string();
        let content = std::fs::read_to_string(path)
            .map_err(|e| SeedError::ReadError(name.clone(), e))?;
        Self::from_seed_json(&name, &content)
    }

    pub fn bundled() -> Result<Self, SeedError> {
        Self::from_seed_json("bundled seed", BUNDLED_SEED)
    }

    pub async fn len(&self) -> usize {
        self.movies.read().await.len()
    }
}

fn seed_movie(idx: usize, record: &Value) -> Result<Movie, SeedError> {
    let id = record
        .get("id")
        .and_then(Value::as_str)
        .ok_or(SeedError::MissingId(idx))?;
    let fields =
        validate_full(record).map_err(|e| SeedError::InvalidRecord(idx, id.to_string(), e))?;
    Ok(Movie::new(id.to_string(), fields))
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MovieRepo for MemoryRepository {
    async fn list_movies(&self, genre: Option<&str>) -> Vec<Movie> {
        let movies = self.movies.read().await;
        match genre {
            Some(genre) => movies.iter().filter(|m| m.has_genre(genre)).cloned().collect(),
            None => movies.clone(),
        }
    }

    async fn get_movie(&self, id: &str) -> RepoResult<Movie> {
        let movies = self.movies.read().await;
        movies
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or_else(|| RepoError::NotFound(id.to_string()))
    }

    async fn create_movie(&self, fields: MovieFields) -> RepoResult<Movie> {
        let mut movies = self.movies.write().await;
        let id = loop {
            let id = uuid::Uuid::new_v4().to_string();
            if !movies.iter().any(|m| m.id == id) {
                break id;
            }
        };
        let movie = Movie::new(id, fields);
        movies.push(movie.clone());
        debug!("Created movie {} ({})", movie.title, movie.id);
        Ok(movie)
    }

    async fn update_movie(&self, id: &str, patch: MoviePatch) -> RepoResult<Movie> {
        let mut movies = self.movies.write().await;
        let movie = movies
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| RepoError::NotFound(id.to_string()))?;
        movie.apply(patch);
        debug!("Updated movie {}", id);
        Ok(movie.clone())
    }

    async fn delete_movie(&self, id: &str) -> RepoResult<()> {
        let mut movies = self.movies.write().await;
        let idx = movies
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| RepoError::NotFound(id.to_string()))?;
        movies.remove(idx);
        debug!("Deleted movie {}", id);
        Ok(())
    }
}
