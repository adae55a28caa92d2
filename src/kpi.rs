//! Plan health indicators derived from the library and weekly plan.
//!
//! Nothing here is stored; values are recomputed from the current state.
//! The typed functions work on a [`WeeklyPlan`], which always carries seven days.
//! The [`raw`] module accepts untyped JSON and treats anything malformed as empty.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{Day, Workout};
use crate::routines::WeeklyPlan;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpis<K: Ord = Day> {
    pub total_workouts_defined: usize,
    pub total_assignments: usize,
    /// Unrounded; display formatting is up to the caller.
    pub avg_assignments_per_day: f64,
    pub assignments_per_day: BTreeMap<K, usize>,
}

pub fn count_assignments_per_day(plan: &WeeklyPlan) -> BTreeMap<Day, usize> {
    plan.iter().map(|(day, ids)| (day, ids.len())).collect()
}

pub fn total_assignments(plan: &WeeklyPlan) -> usize {
    plan.iter().map(|(_, ids)| ids.len()).sum()
}

/// Total divided by the seven canonical days.
pub fn average_assignments_per_day(plan: &WeeklyPlan) -> f64 {
    average(total_assignments(plan), Day::ALL.len())
}

pub fn compute_kpis(workouts: &[Workout], plan: &WeeklyPlan) -> Kpis {
    Kpis {
        total_workouts_defined: workouts.len(),
        total_assignments: total_assignments(plan),
        avg_assignments_per_day: average_assignments_per_day(plan),
        assignments_per_day: count_assignments_per_day(plan),
    }
}

fn average(total: usize, days: usize) -> f64 {
    total as f64 / days.max(1) as f64
}

/// KPI functions over unvalidated JSON.
pub mod raw {
    use std::collections::BTreeMap;

    use serde_json::Value;

    use super::{average, Kpis};

    fn days(plan: &Value) -> impl Iterator<Item = (&String, usize)> {
        plan.as_object()
            .into_iter()
            .flatten()
            .map(|(day, list)| (day, list.as_array().map_or(0, Vec::len)))
    }

    /// Only keys present in `plan` appear; non-list values count as zero.
    pub fn count_assignments_per_day(plan: &Value) -> BTreeMap<String, usize> {
        days(plan).map(|(day, n)| (day.clone(), n)).collect()
    }

    pub fn total_assignments(plan: &Value) -> usize {
        days(plan).map(|(_, n)| n).sum()
    }

    /// Divides by the number of keys present, never less than one.
    pub fn average_assignments_per_day(plan: &Value) -> f64 {
        average(total_assignments(plan), days(plan).count())
    }

    pub fn compute_kpis(workouts: &Value, plan: &Value) -> Kpis<String> {
        Kpis {
            total_workouts_defined: workouts.as_array().map_or(0, Vec::len),
            total_assignments: total_assignments(plan),
            avg_assignments_per_day: average_assignments_per_day(plan),
            assignments_per_day: count_assignments_per_day(plan),
        }
    }
}
