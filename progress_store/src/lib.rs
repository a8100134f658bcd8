//! # Progress store
//!
//! Durable home of the step counter's progression state: a single flat
//! JSON record behind the [`ProgressStore`] trait. The engine loads it
//! once at startup and saves after every mutation; writes are
//! last-write-wins with no transactional guarantees.
//!
//! Decoding is deliberately forgiving: a first run yields `None`, and on a
//! malformed record every field falls back to its default independently
//! instead of failing the whole load.

use std::{cell::RefCell, fs, io, path::PathBuf};

use serde_json::Value;
use time::{Date, OffsetDateTime, format_description::well_known::Iso8601};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to access progress record: {0}")]
    Io(#[from] io::Error),
    #[error("failed to decode progress record: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The persisted record, one per user.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub steps: u64,
    pub calories: u64,
    pub distance: f64,
    pub coins: u64,
    pub completed_achievements: Vec<u32>,
    pub streak: u64,
    pub level: u64,
    pub experience: u64,
    pub lifetime_steps: u64,
    #[serde(serialize_with = "iso_date")]
    pub last_active_date: Option<Date>,
    #[serde(with = "time::serde::iso8601::option")]
    pub last_updated: Option<OffsetDateTime>,
}

const DATE_ONLY: time::format_description::well_known::iso8601::EncodedConfig =
    time::format_description::well_known::iso8601::Config::DEFAULT
        .set_formatted_components(
            time::format_description::well_known::iso8601::FormattedComponents::Date,
        )
        .encode();

fn iso_date<S: serde::Serializer>(
    date: &Option<Date>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match date {
        Some(date) => serializer.serialize_some(
            &date
                .format(&Iso8601::<DATE_ONLY>)
                .map_err(serde::ser::Error::custom)?,
        ),
        None => serializer.serialize_none(),
    }
}

impl Default for ProgressRecord {
    fn default() -> Self {
        Self {
            steps: 0,
            calories: 0,
            distance: 0.0,
            coins: 0,
            completed_achievements: Vec::new(),
            streak: 0,
            level: 1,
            experience: 0,
            lifetime_steps: 0,
            last_active_date: None,
            last_updated: None,
        }
    }
}

impl ProgressRecord {
    /// Decode field by field, defaulting anything missing or mistyped.
    pub fn from_value(value: &Value) -> Self {
        let defaults = Self::default();

        Self {
            steps: u64_field(value, "steps").unwrap_or(defaults.steps),
            calories: u64_field(value, "calories").unwrap_or(defaults.calories),
            distance: f64_field(value, "distance").unwrap_or(defaults.distance),
            coins: u64_field(value, "coins").unwrap_or(defaults.coins),
            completed_achievements: value
                .get("completedAchievements")
                .and_then(Value::as_array)
                .map(|ids| {
                    ids.iter()
                        .filter_map(Value::as_u64)
                        .filter_map(|id| u32::try_from(id).ok())
                        .collect()
                })
                .unwrap_or_default(),
            streak: u64_field(value, "streak").unwrap_or(defaults.streak),
            level: u64_field(value, "level").unwrap_or(defaults.level),
            experience: u64_field(value, "experience").unwrap_or(defaults.experience),
            // Records written before lifetime steps existed carry the
            // session count as the best available lower bound.
            lifetime_steps: u64_field(value, "lifetimeSteps")
                .or_else(|| u64_field(value, "steps"))
                .unwrap_or(defaults.lifetime_steps),
            last_active_date: value
                .get("lastActiveDate")
                .and_then(Value::as_str)
                .and_then(|s| Date::parse(s, &Iso8601::DEFAULT).ok()),
            last_updated: value
                .get("lastUpdated")
                .and_then(Value::as_str)
                .and_then(|s| OffsetDateTime::parse(s, &Iso8601::DEFAULT).ok()),
        }
    }
}

fn u64_field(value: &Value, field: &str) -> Option<u64> {
    value.get(field).and_then(Value::as_u64)
}

fn f64_field(value: &Value, field: &str) -> Option<f64> {
    value.get(field).and_then(Value::as_f64)
}

/// Durable key-value home of one [`ProgressRecord`].
pub trait ProgressStore {
    /// `None` means first run, nothing persisted yet.
    fn load(&self) -> Result<Option<ProgressRecord>, StoreError>;

    /// Overwrite the record. Idempotent, last-write-wins.
    fn save(&self, record: &ProgressRecord) -> Result<(), StoreError>;
}

impl<S: ProgressStore + ?Sized> ProgressStore for Box<S> {
    fn load(&self) -> Result<Option<ProgressRecord>, StoreError> {
        (**self).load()
    }

    fn save(&self, record: &ProgressRecord) -> Result<(), StoreError> {
        (**self).save(record)
    }
}

/// Flat-file JSON implementation.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl ProgressStore for JsonFileStore {
    fn load(&self) -> Result<Option<ProgressRecord>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let value = serde_json::from_str::<Value>(&raw)?;

        Ok(Some(ProgressRecord::from_value(&value)))
    }

    fn save(&self, record: &ProgressRecord) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let raw = serde_json::to_string_pretty(record)?;
        fs::write(&self.path, raw)?;

        Ok(())
    }
}

/// In-memory implementation for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    record: RefCell<Option<ProgressRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressStore for MemoryStore {
    fn load(&self) -> Result<Option<ProgressRecord>, StoreError> {
        Ok(self.record.borrow().clone())
    }

    fn save(&self, record: &ProgressRecord) -> Result<(), StoreError> {
        *self.record.borrow_mut() = Some(record.clone());

        Ok(())
    }
}
