use chrono::Utc;

use crate::error::{StoreError, ValidationError};
use crate::models::{parse_count, Day, Workout, WorkoutId, WorkoutInput};
use crate::routines::{Assignment, WeeklyPlan};
use crate::snapshot::Snapshot;
use crate::storage::KeyValueStorage;

pub const DEFAULT_STORAGE_KEY: &str = "workoutPlanner_v1";

/// Owns the workout library and weekly plan and keeps them in sync with storage.
///
/// Every mutation prepares the next snapshot, persists it, and only then makes it
/// current, so a failed write leaves both memory and storage at the previous state.
pub struct PlannerStore<S: KeyValueStorage> {
    storage: S,
    key: String,
    snapshot: Snapshot,
    next_seq: u64,
}

impl<S: KeyValueStorage> PlannerStore<S> {
    /// Opens the store under the default key, loading whatever is persisted.
    pub fn open(storage: S) -> Self {
        Self::open_with_key(storage, DEFAULT_STORAGE_KEY)
    }

    pub fn open_with_key(storage: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let snapshot = load(&storage, &key);
        tracing::info!(
            workouts = snapshot.workouts.len(),
            key = %key,
            "loaded planner state"
        );
        Self {
            storage,
            key,
            snapshot,
            next_seq: 0,
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn workouts(&self) -> &[Workout] {
        &self.snapshot.workouts
    }

    pub fn plan(&self) -> &WeeklyPlan {
        &self.snapshot.plan_by_day
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn resolve<'a>(&'a self, id: &'a WorkoutId) -> Assignment<'a> {
        Assignment::resolve(id, &self.snapshot.workouts)
    }

    /// A day's entries in order, each resolved or marked dangling.
    pub fn assignments(&self, day: Day) -> Vec<Assignment<'_>> {
        self.plan()
            .day(day)
            .iter()
            .map(|id| self.resolve(id))
            .collect()
    }

    /// Writes the current state to storage.
    pub fn save(&mut self) -> Result<(), StoreError> {
        persist(&mut self.storage, &self.key, &self.snapshot)
    }

    pub fn create_workout(&mut self, input: &WorkoutInput) -> Result<Workout, StoreError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        let duration_minutes = parse_count("Duration", &input.duration_minutes)?;
        let sets = parse_count("Sets", &input.sets)?;
        let reps = parse_count("Reps", &input.reps)?;

        let created_at = Utc::now();
        let id = self.fresh_id(created_at);
        let workout = Workout {
            id,
            name: name.to_string(),
            kind: input.kind,
            duration_minutes,
            sets,
            reps,
            notes: input.notes.trim().to_string(),
            created_at,
        };

        let mut next = self.snapshot.clone();
        next.workouts.insert(0, workout.clone());
        self.commit(next)?;

        tracing::debug!(id = %workout.id, name = %workout.name, "created workout");
        Ok(workout)
    }

    pub fn assign_workout(&mut self, day: Day, workout_id: &WorkoutId) -> Result<(), StoreError> {
        if workout_id.is_empty() {
            return Err(ValidationError::NoWorkoutSelected.into());
        }
        if self.snapshot.find(workout_id).is_none() {
            return Err(ValidationError::UnknownWorkout(workout_id.clone()).into());
        }

        let mut next = self.snapshot.clone();
        next.plan_by_day.push(day, workout_id.clone());
        self.commit(next)?;

        tracing::debug!(%day, id = %workout_id, "assigned workout");
        Ok(())
    }

    /// Removes one entry from a day. Out-of-range indexes change nothing.
    pub fn unassign(&mut self, day: Day, index: usize) -> Result<(), StoreError> {
        let mut next = self.snapshot.clone();
        let Some(removed) = next.plan_by_day.remove_at(day, index) else {
            tracing::debug!(%day, index, "unassign index out of range, ignoring");
            return Ok(());
        };
        self.commit(next)?;

        tracing::debug!(%day, index, id = %removed, "removed assignment");
        Ok(())
    }

    /// Removes the workout and every plan reference to it in one transition.
    pub fn delete_workout(&mut self, workout_id: &WorkoutId) -> Result<(), StoreError> {
        let mut next = self.snapshot.clone();
        next.workouts.retain(|w| &w.id != workout_id);
        let purged = next.plan_by_day.purge(workout_id);
        self.commit(next)?;

        tracing::debug!(id = %workout_id, purged, "deleted workout");
        Ok(())
    }

    /// Empties library and plan and removes the persisted record.
    ///
    /// Confirmation belongs to the caller.
    pub fn reset_all(&mut self) -> Result<(), StoreError> {
        self.storage.delete(&self.key)?;
        self.snapshot = Snapshot::default();
        tracing::info!(key = %self.key, "planner reset");
        Ok(())
    }

    fn commit(&mut self, next: Snapshot) -> Result<(), StoreError> {
        if let Err(e) = persist(&mut self.storage, &self.key, &next) {
            tracing::error!("planner state not saved: {}", e);
            return Err(e);
        }
        self.snapshot = next;
        Ok(())
    }

    fn fresh_id(&mut self, created_at: chrono::DateTime<Utc>) -> WorkoutId {
        loop {
            let id = WorkoutId::generate(self.next_seq, created_at);
            self.next_seq += 1;
            if self.snapshot.find(&id).is_none() {
                return id;
            }
        }
    }
}

/// Reads the snapshot stored under `key`, normalizing whatever is found.
///
/// Absent, unreadable, or malformed data all produce the default snapshot.
pub fn load<S: KeyValueStorage>(storage: &S, key: &str) -> Snapshot {
    match storage.get(key) {
        Ok(Some(raw)) => Snapshot::parse(&raw),
        Ok(None) => Snapshot::default(),
        Err(e) => {
            tracing::warn!(key, "could not read planner state, starting fresh: {}", e);
            Snapshot::default()
        }
    }
}

fn persist<S: KeyValueStorage>(
    storage: &mut S,
    key: &str,
    snapshot: &Snapshot,
) -> Result<(), StoreError> {
    let raw = snapshot.to_json()?;
    storage.set(key, &raw)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::kpi;
    use crate::models::WorkoutType;
    use crate::storage::MemoryStorage;

    fn input(name: &str) -> WorkoutInput {
        WorkoutInput {
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn store() -> PlannerStore<MemoryStorage> {
        PlannerStore::open(MemoryStorage::new())
    }

    fn is_stored(store: &PlannerStore<MemoryStorage>, key: &str) -> bool {
        store.storage().get(key).unwrap().is_some()
    }

    fn persisted(store: &PlannerStore<MemoryStorage>) -> Snapshot {
        load(store.storage(), DEFAULT_STORAGE_KEY)
    }

    #[test]
    fn opens_empty_when_nothing_is_stored() {
        let store = store();
        assert!(store.workouts().is_empty());
        assert_eq!(store.plan(), &WeeklyPlan::new());
    }

    #[test]
    fn opens_empty_on_malformed_json() {
        let mut storage = MemoryStorage::new();
        storage.set(DEFAULT_STORAGE_KEY, "{{{").unwrap();
        let store = PlannerStore::open(storage);
        assert_eq!(store.snapshot(), &Snapshot::default());
    }

    #[test]
    fn blank_name_is_rejected_without_change() {
        let mut store = store();
        let err = store.create_workout(&input("   ")).unwrap_err();
        assert_eq!(err.validation(), Some(&ValidationError::EmptyName));
        assert!(store.workouts().is_empty());
        assert!(!is_stored(&store, DEFAULT_STORAGE_KEY));
    }

    #[test]
    fn create_uses_defaults_and_trims() {
        let mut store = store();
        let workout = store.create_workout(&input("  Legs ")).unwrap();
        assert_eq!(workout.name, "Legs");
        assert_eq!(workout.kind, WorkoutType::Strength);
        assert_eq!(workout.duration_minutes, None);
        assert_eq!(workout.sets, None);
        assert_eq!(workout.reps, None);
        assert_eq!(workout.notes, "");
        assert_eq!(persisted(&store).workouts, vec![workout]);
    }

    #[test]
    fn create_parses_numbers_and_rejects_garbage() {
        let mut store = store();
        let workout = store
            .create_workout(&WorkoutInput {
                name: "Intervals".to_string(),
                kind: WorkoutType::Cardio,
                duration_minutes: "25".to_string(),
                sets: "0".to_string(),
                reps: String::new(),
                notes: "  hills  ".to_string(),
            })
            .unwrap();
        assert_eq!(workout.duration_minutes, Some(25));
        assert_eq!(workout.sets, Some(0));
        assert_eq!(workout.reps, None);
        assert_eq!(workout.notes, "hills");

        let err = store
            .create_workout(&WorkoutInput {
                name: "Bad".to_string(),
                sets: "-1".to_string(),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(
            err.validation(),
            Some(ValidationError::InvalidNumber { field: "Sets", .. })
        ));
        assert_eq!(store.workouts().len(), 1);
    }

    #[test]
    fn newest_workout_comes_first_with_unique_ids() {
        let mut store = store();
        let a = store.create_workout(&input("A")).unwrap();
        let b = store.create_workout(&input("B")).unwrap();
        assert_ne!(a.id, b.id);
        let names: Vec<_> = store.workouts().iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, ["B", "A"]);
    }

    #[test]
    fn assign_requires_existing_workout() {
        let mut store = store();
        let err = store
            .assign_workout(Day::Monday, &WorkoutId::from("nonexistent-id"))
            .unwrap_err();
        assert!(matches!(
            err.validation(),
            Some(ValidationError::UnknownWorkout(_))
        ));
        assert!(store.plan().day(Day::Monday).is_empty());

        let err = store
            .assign_workout(Day::Monday, &WorkoutId::from(""))
            .unwrap_err();
        assert_eq!(err.validation(), Some(&ValidationError::NoWorkoutSelected));
    }

    #[test]
    fn push_day_scenario() {
        let mut store = store();
        let a = store.create_workout(&input("Push Day")).unwrap();
        store.assign_workout(Day::Monday, &a.id).unwrap();
        store.assign_workout(Day::Monday, &a.id).unwrap();

        assert_eq!(store.plan().day(Day::Monday), &[a.id.clone(), a.id.clone()]);
        assert_eq!(kpi::total_assignments(store.plan()), 2);

        store.delete_workout(&a.id).unwrap();
        assert!(store.plan().day(Day::Monday).is_empty());
        assert!(store.workouts().is_empty());
        let kpis = kpi::compute_kpis(store.workouts(), store.plan());
        assert_eq!(kpis.total_workouts_defined, 0);

        let saved = persisted(&store);
        assert!(saved.workouts.is_empty());
        assert!(!saved.plan_by_day.references(&a.id));
    }

    #[test]
    fn delete_only_touches_target_workout() {
        let mut store = store();
        let a = store.create_workout(&input("A")).unwrap();
        let b = store.create_workout(&input("B")).unwrap();
        store.assign_workout(Day::Friday, &a.id).unwrap();
        store.assign_workout(Day::Friday, &b.id).unwrap();
        store.assign_workout(Day::Sunday, &a.id).unwrap();

        store.delete_workout(&a.id).unwrap();
        assert_eq!(store.workouts(), &[b.clone()]);
        assert_eq!(store.plan().day(Day::Friday), &[b.id.clone()]);
        assert!(store.plan().day(Day::Sunday).is_empty());
    }

    #[test]
    fn unassign_out_of_range_is_noop() {
        let mut store = store();
        let a = store.create_workout(&input("A")).unwrap();
        store.assign_workout(Day::Tuesday, &a.id).unwrap();
        store.assign_workout(Day::Tuesday, &a.id).unwrap();

        store.unassign(Day::Tuesday, 5).unwrap();
        assert_eq!(store.plan().day(Day::Tuesday).len(), 2);

        store.unassign(Day::Tuesday, 0).unwrap();
        assert_eq!(store.plan().day(Day::Tuesday), &[a.id.clone()]);
        assert_eq!(persisted(&store).plan_by_day.day(Day::Tuesday).len(), 1);
    }

    #[test]
    fn dangling_entries_resolve_explicitly() {
        let mut storage = MemoryStorage::new();
        storage
            .set(
                DEFAULT_STORAGE_KEY,
                r#"{"workouts": [], "planByDay": {"Monday": ["ghost"]}}"#,
            )
            .unwrap();
        let mut store = PlannerStore::open(storage);

        let ghost = WorkoutId::from("ghost");
        assert_eq!(store.assignments(Day::Monday), vec![Assignment::Dangling(&ghost)]);

        store.unassign(Day::Monday, 0).unwrap();
        assert!(store.assignments(Day::Monday).is_empty());
    }

    #[test]
    fn damaged_saved_workouts_stay_assigned() {
        let mut storage = MemoryStorage::new();
        storage
            .set(
                DEFAULT_STORAGE_KEY,
                r#"{"workouts": [
                    {"id": "w1", "name": "Flow", "type": "Yoga", "createdAt": "2024-01-01T08:00:00Z"},
                    {"id": "w2", "name": "Bench", "sets": "4", "createdAt": "2024-01-01T08:00:00Z"},
                    {"id": "w3", "name": "Run"}
                ], "planByDay": {"Monday": ["w1", "w2", "w3"]}}"#,
            )
            .unwrap();
        let mut store = PlannerStore::open(storage);

        assert_eq!(store.workouts().len(), 3);
        assert!(store
            .assignments(Day::Monday)
            .iter()
            .all(|a| matches!(a, Assignment::Resolved(_))));

        store.assign_workout(Day::Tuesday, &WorkoutId::from("w3")).unwrap();
        assert_eq!(persisted(&store).workouts.len(), 3);
    }

    #[test]
    fn reset_clears_memory_and_storage() {
        let mut store = store();
        let a = store.create_workout(&input("A")).unwrap();
        store.assign_workout(Day::Saturday, &a.id).unwrap();
        assert!(is_stored(&store, DEFAULT_STORAGE_KEY));

        store.reset_all().unwrap();
        assert_eq!(store.snapshot(), &Snapshot::default());
        assert!(!is_stored(&store, DEFAULT_STORAGE_KEY));
    }

    #[test]
    fn failed_write_leaves_state_untouched() {
        let mut store = PlannerStore::open(MemoryStorage::with_quota(400));
        let a = store.create_workout(&input("A")).unwrap();
        let before = store.snapshot().clone();

        let long_name = "x".repeat(500);
        let err = store.create_workout(&input(&long_name)).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Storage(StorageError::QuotaExceeded { .. })
        ));
        assert_eq!(store.snapshot(), &before);
        assert_eq!(persisted(&store).workouts, vec![a]);
    }

    #[test]
    fn save_then_load_round_trips() {
        let mut store = store();
        let a = store
            .create_workout(&WorkoutInput {
                name: "Row".to_string(),
                kind: WorkoutType::Cardio,
                duration_minutes: "20".to_string(),
                ..Default::default()
            })
            .unwrap();
        store.assign_workout(Day::Wednesday, &a.id).unwrap();
        store.save().unwrap();

        assert_eq!(&persisted(&store), store.snapshot());

        let reopened = PlannerStore::open(store.storage().clone());
        assert_eq!(reopened.snapshot(), store.snapshot());
    }

    #[test]
    fn custom_key_is_used() {
        let mut store = PlannerStore::open_with_key(MemoryStorage::new(), "other");
        store.create_workout(&input("A")).unwrap();
        assert!(is_stored(&store, "other"));
        assert!(!is_stored(&store, DEFAULT_STORAGE_KEY));
    }
}
