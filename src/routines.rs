use chrono::{Datelike, Local};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::models::{Day, Workout, WorkoutId};

/// Workout references for each of the seven days, always all seven present.
///
/// Entries are weak: an id may point at a workout that has since been deleted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WeeklyPlan {
    days: [Vec<WorkoutId>; 7],
}

/// A plan entry resolved against the workout library.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Assignment<'a> {
    Resolved(&'a Workout),
    Dangling(&'a WorkoutId),
}

impl<'a> Assignment<'a> {
    pub fn resolve(id: &'a WorkoutId, workouts: &'a [Workout]) -> Self {
        match workouts.iter().find(|w| &w.id == id) {
            Some(workout) => Assignment::Resolved(workout),
            None => Assignment::Dangling(id),
        }
    }
}

impl WeeklyPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn day(&self, day: Day) -> &[WorkoutId] {
        &self.days[day.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Day, &[WorkoutId])> + '_ {
        Day::ALL.into_iter().map(move |day| (day, self.day(day)))
    }

    /// Appends to the end of the day; duplicates are kept.
    pub fn push(&mut self, day: Day, id: WorkoutId) {
        self.days[day.index()].push(id);
    }

    /// Removes the entry at `index`, shifting later entries left. Out of range is a no-op.
    pub fn remove_at(&mut self, day: Day, index: usize) -> Option<WorkoutId> {
        let list = &mut self.days[day.index()];
        if index < list.len() {
            Some(list.remove(index))
        } else {
            None
        }
    }

    /// Drops every reference to `id` from every day, returning how many were removed.
    pub fn purge(&mut self, id: &WorkoutId) -> usize {
        let mut removed = 0;
        for list in self.days.iter_mut() {
            let before = list.len();
            list.retain(|entry| entry != id);
            removed += before - list.len();
        }
        removed
    }

    pub fn references(&self, id: &WorkoutId) -> bool {
        self.days.iter().any(|list| list.contains(id))
    }

    /// Builds a plan from arbitrary JSON, keeping whatever is usable.
    ///
    /// A non-object yields the empty plan, missing or non-array days become empty,
    /// unknown keys and non-string entries are dropped.
    pub fn from_value(value: &Value) -> Self {
        let mut plan = WeeklyPlan::new();
        let Some(map) = value.as_object() else {
            if !value.is_null() {
                tracing::warn!("planByDay is not an object, starting with an empty week");
            }
            return plan;
        };

        for day in Day::ALL {
            match map.get(day.as_str()) {
                Some(Value::Array(entries)) => {
                    let list = &mut plan.days[day.index()];
                    for entry in entries {
                        match entry.as_str() {
                            Some(id) => list.push(WorkoutId::from(id)),
                            None => tracing::warn!(%day, ?entry, "dropping non-string plan entry"),
                        }
                    }
                }
                Some(other) => tracing::warn!(%day, ?other, "day is not a list, treating as empty"),
                None => tracing::debug!(%day, "day missing from persisted plan"),
            }
        }

        for key in map.keys().filter(|key| key.parse::<Day>().is_err()) {
            tracing::warn!(%key, "ignoring unknown day in persisted plan");
        }

        plan
    }
}

impl Serialize for WeeklyPlan {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Day::ALL.len()))?;
        for (day, ids) in self.iter() {
            map.serialize_entry(day.as_str(), ids)?;
        }
        map.end()
    }
}

/// The plan day matching the local calendar.
pub fn today() -> Day {
    Day::from(Local::now().weekday())
}
