use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::models::{Workout, WorkoutId, WorkoutType};
use crate::routines::WeeklyPlan;

const UNTITLED: &str = "Untitled workout";

/// The complete persisted planner state, stored as one value under one key.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub workouts: Vec<Workout>,
    pub plan_by_day: WeeklyPlan,
}

impl Snapshot {
    /// Parses persisted text, falling back to the empty snapshot when it is not JSON.
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => Self::from_value(&value),
            Err(e) => {
                tracing::warn!("persisted planner state is not valid JSON, starting fresh: {}", e);
                Self::default()
            }
        }
    }

    /// Normalizes any JSON value into a usable snapshot.
    ///
    /// Non-array `workouts` becomes empty and each entry is repaired by
    /// [`workout_from_value`]; `planByDay` goes through [`WeeklyPlan::from_value`].
    pub fn from_value(value: &Value) -> Self {
        let workouts = match value.get("workouts") {
            Some(Value::Array(entries)) => entries.iter().filter_map(workout_from_value).collect(),
            Some(other) => {
                tracing::warn!(?other, "workouts is not a list, treating as empty");
                Vec::new()
            }
            None => Vec::new(),
        };

        let plan_by_day = value
            .get("planByDay")
            .map(WeeklyPlan::from_value)
            .unwrap_or_default();

        Self {
            workouts,
            plan_by_day,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn find(&self, id: &WorkoutId) -> Option<&Workout> {
        self.workouts.iter().find(|w| &w.id == id)
    }
}

/// Reads one persisted workout field by field, repairing what it can.
///
/// Only entries that are not objects or lack a string `id` are dropped, since
/// plan entries could never point at them.
pub fn workout_from_value(entry: &Value) -> Option<Workout> {
    let Some(fields) = entry.as_object() else {
        tracing::warn!(?entry, "dropping workout that is not an object");
        return None;
    };
    let Some(id) = fields.get("id").and_then(Value::as_str) else {
        tracing::warn!(?entry, "dropping workout without an id");
        return None;
    };

    let name = fields
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| {
            tracing::warn!(id, "workout has no name");
            UNTITLED
        });

    let kind = match fields.get("type") {
        None | Some(Value::Null) => WorkoutType::default(),
        Some(raw) => raw
            .as_str()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| {
                tracing::warn!(id, ?raw, "unknown workout type, using Strength");
                WorkoutType::default()
            }),
    };

    let created_at = fields
        .get("createdAt")
        .and_then(Value::as_str)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|at| at.with_timezone(&Utc))
        .unwrap_or_else(|| {
            tracing::warn!(id, "workout has no readable createdAt");
            DateTime::<Utc>::UNIX_EPOCH
        });

    Some(Workout {
        id: WorkoutId::from(id),
        name: name.to_string(),
        kind,
        duration_minutes: count_field(id, fields.get("durationMinutes")),
        sets: count_field(id, fields.get("sets")),
        reps: count_field(id, fields.get("reps")),
        notes: fields
            .get("notes")
            .and_then(Value::as_str)
            .map(|notes| notes.trim().to_string())
            .unwrap_or_default(),
        created_at,
    })
}

/// Non-negative integers that fit; anything else reads as not specified.
fn count_field(id: &str, raw: Option<&Value>) -> Option<u32> {
    let raw = raw.filter(|v| !v.is_null())?;
    let count = raw.as_u64().and_then(|n| u32::try_from(n).ok());
    if count.is_none() {
        tracing::warn!(id, ?raw, "ignoring unreadable count");
    }
    count
}
