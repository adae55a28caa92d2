//models.rs
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc, Weekday};
use serde::Serialize;

use crate::error::ValidationError;

/// Opaque workout identifier. Plan entries hold these as weak references.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct WorkoutId(String);

impl WorkoutId {
    /// Builds an id from a per-store sequence number and a creation timestamp.
    pub fn generate(seq: u64, created_at: DateTime<Utc>) -> Self {
        let nanos = created_at
            .timestamp_nanos_opt()
            .unwrap_or_else(|| created_at.timestamp_micros());
        Self(format!("{:x}{:x}", seq, nanos))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for WorkoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for WorkoutId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for WorkoutId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum WorkoutType {
    #[default]
    Strength,
    Cardio,
    Mobility,
    Sport,
    Recovery,
}

impl WorkoutType {
    pub const ALL: [WorkoutType; 5] = [
        WorkoutType::Strength,
        WorkoutType::Cardio,
        WorkoutType::Mobility,
        WorkoutType::Sport,
        WorkoutType::Recovery,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutType::Strength => "Strength",
            WorkoutType::Cardio => "Cardio",
            WorkoutType::Mobility => "Mobility",
            WorkoutType::Sport => "Sport",
            WorkoutType::Recovery => "Recovery",
        }
    }
}

impl fmt::Display for WorkoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkoutType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WorkoutType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.trim())
            .ok_or_else(|| format!("unknown workout type: {s}"))
    }
}

/// The seven canonical plan days, in week order (Monday first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
            Day::Sunday => "Sunday",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Day {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Day::ALL
            .into_iter()
            .find(|day| day.as_str() == s)
            .ok_or_else(|| format!("unknown day: {s}"))
    }
}

impl From<Weekday> for Day {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => Day::Monday,
            Weekday::Tue => Day::Tuesday,
            Weekday::Wed => Day::Wednesday,
            Weekday::Thu => Day::Thursday,
            Weekday::Fri => Day::Friday,
            Weekday::Sat => Day::Saturday,
            Weekday::Sun => Day::Sunday,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub id: WorkoutId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: WorkoutType,
    pub duration_minutes: Option<u32>,
    pub sets: Option<u32>,
    pub reps: Option<u32>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl Workout {
    /// One-line summary such as `Strength • 45 min • 4x8 • notes`.
    pub fn meta_summary(&self) -> String {
        let mut parts = vec![self.kind.as_str().to_string()];
        if let Some(minutes) = self.duration_minutes.filter(|m| *m > 0) {
            parts.push(format!("{minutes} min"));
        }
        if let (Some(sets), Some(reps)) = (self.sets, self.reps) {
            if sets > 0 && reps > 0 {
                parts.push(format!("{sets}x{reps}"));
            }
        }
        if !self.notes.is_empty() {
            parts.push("notes".to_string());
        }
        parts.join(" • ")
    }
}

/// Raw create-workout form fields, as typed by the user.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorkoutInput {
    pub name: String,
    pub kind: WorkoutType,
    pub duration_minutes: String,
    pub sets: String,
    pub reps: String,
    pub notes: String,
}

/// Empty text means "not specified", never zero.
pub fn parse_count(field: &'static str, raw: &str) -> Result<Option<u32>, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<u32>()
        .map(Some)
        .map_err(|_| ValidationError::InvalidNumber {
            field,
            value: raw.to_string(),
        })
}
