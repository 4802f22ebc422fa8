//! Application services for task schedules.

mod scheduling;

pub use scheduling::{GeneratedSchedule, ScheduleError, ScheduleResult, ScheduleService};
