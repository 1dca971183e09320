//! Course grades

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::GRADES_KEY;
use crate::error::SyncError;
use crate::traits::KeyValueStore;

fn default_weight() -> f64 {
    1.0
}

/// A grade obtained for an assignment or an exam
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GradeEntry {
    id: String,
    course: String,
    title: String,
    score: f64,
    max_score: f64,
    #[serde(default = "default_weight")]
    weight: f64,
    recorded_at: DateTime<Utc>,
}

impl GradeEntry {
    pub fn new<C: ToString, T: ToString>(course: C, title: T, score: f64, max_score: f64) -> Self {
        Self {
            id: Uuid::new_v4().to_hyphenated().to_string(),
            course: course.to_string(),
            title: title.to_string(),
            score,
            max_score,
            weight: default_weight(),
            recorded_at: Utc::now(),
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn id(&self) -> &str          { &self.id       }
    pub fn course(&self) -> &str      { &self.course   }
    pub fn title(&self) -> &str       { &self.title    }
    pub fn score(&self) -> f64        { self.score     }
    pub fn max_score(&self) -> f64    { self.max_score }
    pub fn weight(&self) -> f64       { self.weight    }
    pub fn recorded_at(&self) -> &DateTime<Utc> { &self.recorded_at }

    pub fn set_score(&mut self, score: f64, max_score: f64) {
        self.score = score;
        self.max_score = max_score;
    }

    /// The score, as a percentage of the maximum score
    pub fn percentage(&self) -> Option<f64> {
        if self.max_score <= 0.0 {
            return None;
        }
        Some(self.score / self.max_score * 100.0)
    }
}


/// The persisted list of grades
#[derive(Debug)]
pub struct GradeBook<S: KeyValueStore> {
    settings: Arc<S>,
}

impl<S: KeyValueStore> GradeBook<S> {
    pub fn new(settings: Arc<S>) -> Self {
        Self { settings }
    }

    /// Returns every grade, most recent first.
    /// Grades that cannot be decoded are discarded
    pub fn entries(&self) -> Vec<GradeEntry> {
        let encoded = match self.settings.get(GRADES_KEY) {
            None => return Vec::new(),
            Some(encoded) => encoded,
        };
        let mut entries: Vec<GradeEntry> = match serde_json::from_str(&encoded) {
            Ok(entries) => entries,
            Err(err) => {
                log::warn!("Unable to decode the saved grades ({}). Discarding them", err);
                if let Err(err) = self.settings.remove(GRADES_KEY) {
                    log::error!("Unable to clear the corrupted grades: {}", err);
                }
                return Vec::new();
            },
        };
        entries.sort_by(|left, right| right.recorded_at.cmp(&left.recorded_at));
        entries
    }

    fn save(&self, entries: &[GradeEntry]) -> Result<(), SyncError> {
        let encoded = serde_json::to_string(entries)
            .map_err(|err| SyncError::Storage{ key: GRADES_KEY.to_string(), reason: err.to_string() })?;
        self.settings.set(GRADES_KEY, encoded)
            .map_err(|err| SyncError::Storage{ key: GRADES_KEY.to_string(), reason: err.to_string() })
    }

    pub fn add(&self, entry: GradeEntry) -> Result<(), SyncError> {
        let mut entries = self.entries();
        entries.insert(0, entry);
        self.save(&entries)
    }

    /// Replace the grade that has the same ID. Returns whether it has been found
    pub fn update(&self, entry: GradeEntry) -> Result<bool, SyncError> {
        let mut entries = self.entries();
        match entries.iter_mut().find(|e| e.id == entry.id) {
            None => Ok(false),
            Some(existing) => {
                *existing = entry;
                self.save(&entries).map(|_| true)
            },
        }
    }

    /// Remove a grade. Returns whether it has been found
    pub fn delete(&self, id: &str) -> Result<bool, SyncError> {
        let mut entries = self.entries();
        let count_before = entries.len();
        entries.retain(|e| e.id != id);
        if entries.len() == count_before {
            return Ok(false);
        }
        self.save(&entries).map(|_| true)
    }

    /// The names of the courses that have grades, alphabetically sorted
    pub fn courses(&self) -> Vec<String> {
        self.averages_by_course().into_iter().map(|(course, _)| course).collect()
    }

    /// The weighted average percentage of a course
    pub fn course_average(&self, course: &str) -> Option<f64> {
        weighted_average(self.entries().iter().filter(|e| e.course == course))
    }

    /// The weighted average percentage of every course
    pub fn averages_by_course(&self) -> BTreeMap<String, Option<f64>> {
        let mut by_course: BTreeMap<String, Vec<GradeEntry>> = BTreeMap::new();
        for entry in self.entries() {
            by_course.entry(entry.course.clone()).or_default().push(entry);
        }
        by_course.into_iter()
            .map(|(course, entries)| (course, weighted_average(entries.iter())))
            .collect()
    }
}

fn weighted_average<'a, I: Iterator<Item = &'a GradeEntry>>(entries: I) -> Option<f64> {
    let mut total = 0.0;
    let mut total_weight = 0.0;
    for entry in entries {
        if let Some(percentage) = entry.percentage() {
            total += percentage * entry.weight;
            total_weight += entry.weight;
        }
    }
    if total_weight <= 0.0 {
        return None;
    }
    Some(total / total_weight)
}
