//! JSONL (JSON Lines) storage.
//!
//! Each line is one JSON object. Match data is read strictly: a malformed
//! line fails the read with its location instead of silently shrinking the
//! sample the analysis runs on.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::PathBuf;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use super::{StorageConfig, StorageError};
use crate::models::{MatchRecord, Report, TeamInfo};

/// Entity types for JSONL storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityType {
    Team,
    Report,
}

impl EntityType {
    /// Get the filename for this entity type.
    pub fn filename(&self) -> &'static str {
        match self {
            EntityType::Team => "teams.jsonl",
            EntityType::Report => "reports.jsonl",
        }
    }
}

/// JSONL file writer.
pub struct JsonlWriter<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: Serialize> JsonlWriter<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    fn ensure_dir(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Append a single entity to the file.
    pub fn append(&self, entity: &T) -> Result<(), StorageError> {
        self.ensure_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = BufWriter::new(file);
        let json = serde_json::to_string(entity)?;
        writeln!(writer, "{}", json)?;
        writer.flush()?;

        debug!("Appended entity to {:?}", self.path);
        Ok(())
    }

    /// Write entities, replacing the entire file.
    pub fn write_all(&self, entities: &[T]) -> Result<usize, StorageError> {
        self.ensure_dir()?;

        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);

        for entity in entities {
            let json = serde_json::to_string(entity)?;
            writeln!(writer, "{}", json)?;
        }

        writer.flush()?;
        info!("Wrote {} entities to {:?}", entities.len(), self.path);

        Ok(entities.len())
    }
}

/// JSONL file reader.
pub struct JsonlReader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonlReader<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read all entities, skipping lines that fail to parse.
    pub fn read_all(&self) -> Result<Vec<T>, StorageError> {
        self.read_lines(false)
    }

    /// Read all entities; the first malformed line is an error.
    pub fn read_all_strict(&self) -> Result<Vec<T>, StorageError> {
        self.read_lines(true)
    }

    fn read_lines(&self, strict: bool) -> Result<Vec<T>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut entities = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str(&line) {
                Ok(entity) => entities.push(entity),
                Err(source) if strict => {
                    return Err(StorageError::Parse {
                        path: self.path.clone(),
                        line: index + 1,
                        source,
                    });
                }
                Err(e) => {
                    warn!(
                        "Failed to parse line {} in {:?}: {}",
                        index + 1,
                        self.path,
                        e
                    );
                }
            }
        }

        debug!("Read {} entities from {:?}", entities.len(), self.path);
        Ok(entities)
    }

    /// Read entities matching a predicate.
    pub fn read_where<F>(&self, predicate: F) -> Result<Vec<T>, StorageError>
    where
        F: Fn(&T) -> bool,
    {
        let all = self.read_all_strict()?;
        Ok(all.into_iter().filter(predicate).collect())
    }
}

/// All match shard files, sorted by path.
pub fn list_match_shards(config: &StorageConfig) -> Result<Vec<PathBuf>, StorageError> {
    let dir = config.matches_dir();
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let pattern = dir.join("*.jsonl");
    let mut shards = Vec::new();
    for entry in glob::glob(&pattern.to_string_lossy())? {
        match entry {
            Ok(path) => shards.push(path),
            Err(e) => warn!("Skipping unreadable shard: {}", e),
        }
    }

    shards.sort();
    Ok(shards)
}

pub fn read_teams(config: &StorageConfig) -> Result<Vec<TeamInfo>, StorageError> {
    JsonlReader::new(config.teams_path()).read_all_strict()
}

/// Every match record across all shards, in shard order.
pub fn read_matches(config: &StorageConfig) -> Result<Vec<MatchRecord>, StorageError> {
    let mut matches = Vec::new();
    let shards = list_match_shards(config)?;
    for shard in &shards {
        matches.extend(JsonlReader::<MatchRecord>::new(shard.clone()).read_all_strict()?);
    }
    debug!("Read {} matches from {} shards", matches.len(), shards.len());
    Ok(matches)
}

pub fn write_teams(config: &StorageConfig, teams: &[TeamInfo]) -> Result<usize, StorageError> {
    JsonlWriter::new(config.teams_path()).write_all(teams)
}

/// Replace one shard under `matches/`.
pub fn write_match_shard(
    config: &StorageConfig,
    shard: &str,
    matches: &[MatchRecord],
) -> Result<usize, StorageError> {
    let path = config.matches_dir().join(format!("{}.jsonl", shard));
    JsonlWriter::new(path).write_all(matches)
}

pub fn append_report(config: &StorageConfig, report: &Report) -> Result<(), StorageError> {
    JsonlWriter::new(config.reports_path()).append(report)
}

pub fn read_reports(config: &StorageConfig) -> Result<Vec<Report>, StorageError> {
    JsonlReader::new(config.reports_path()).read_all()
}
