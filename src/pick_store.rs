//! Source of the day's predictions.

use crate::event::{Pick, PickOrigin};
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[async_trait]
pub trait PickStore: Send + Sync {
    /// All picks for a date, deduplicated by pick key.
    async fn load_picks(&self, date: NaiveDate) -> Result<Vec<Pick>>;
}

/// Records stay raw so one bad pick cannot sink the whole file.
#[derive(Debug, Deserialize)]
struct PredictionsFile {
    #[serde(default)]
    picks: Vec<serde_json::Value>,
}

/// Reads `predictions-{date}.json` and `predictions-early-{date}.json`.
#[derive(Debug, Clone)]
pub struct FilePickStore {
    dir: PathBuf,
}

impl FilePickStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn regular_path(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("predictions-{}.json", date.format("%Y-%m-%d")))
    }

    pub fn early_path(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("predictions-early-{}.json", date.format("%Y-%m-%d")))
    }

    /// Missing or unreadable files count as empty.
    async fn read_file(path: &Path, origin: PickOrigin) -> Vec<Pick> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) => {
                debug!(path = %path.display(), "No predictions file: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<PredictionsFile>(&raw) {
            Ok(file) => file
                .picks
                .into_iter()
                .enumerate()
                .filter_map(|(i, record)| match serde_json::from_value::<Pick>(record) {
                    Ok(mut p) => {
                        p.source = Some(origin);
                        Some(p)
                    }
                    Err(e) => {
                        warn!(path = %path.display(), index = i, "Skipping malformed pick: {}", e);
                        None
                    }
                })
                .collect(),
            Err(e) => {
                warn!(path = %path.display(), "Ignoring unparseable predictions file: {}", e);
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl PickStore for FilePickStore {
    async fn load_picks(&self, date: NaiveDate) -> Result<Vec<Pick>> {
        let regular = Self::read_file(&self.regular_path(date), PickOrigin::Regular).await;
        let early = Self::read_file(&self.early_path(date), PickOrigin::Early).await;
        Ok(merge_picks(regular.into_iter().chain(early)))
    }
}

/// Deduplicate by pick key. A later record replaces an earlier one only with
/// strictly higher confidence, and takes over its position.
pub fn merge_picks(picks: impl IntoIterator<Item = Pick>) -> Vec<Pick> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut merged: Vec<Pick> = Vec::new();

    for pick in picks {
        let key = pick.key();
        match index.get(&key) {
            Some(&i) => {
                if pick.confidence > merged[i].confidence {
                    merged[i] = pick;
                }
            }
            None => {
                index.insert(key, merged.len());
                merged.push(pick);
            }
        }
    }

    merged
}

/// Confidence floor, highest confidence first, capped.
pub fn select_best_picks(picks: Vec<Pick>, min_confidence: f64, max_picks: usize) -> Vec<Pick> {
    let mut best: Vec<Pick> = picks
        .into_iter()
        .filter(|p| p.confidence >= min_confidence)
        .collect();
    best.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    best.truncate(max_picks);
    best
}
