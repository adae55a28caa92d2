//! Weekly workout planner: a workout library, a seven-day plan that references it,
//! plan KPIs, and persistence of both as a single snapshot.

pub mod config;
pub mod error;
pub mod kpi;
pub mod models;
pub mod notifier;
pub mod routines;
pub mod snapshot;
pub mod storage;
pub mod store;

pub use error::{NotifyError, StorageError, StoreError, ValidationError};
pub use kpi::{compute_kpis, Kpis};
pub use models::{Day, Workout, WorkoutId, WorkoutInput, WorkoutType};
pub use routines::{Assignment, WeeklyPlan};
pub use snapshot::Snapshot;
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use store::PlannerStore;
