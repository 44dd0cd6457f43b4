//! Selects a [`Scheduler`](crate::Scheduler) implementation from an external
//! configuration string (§4.5).

/// The recognized `scheduler_mode` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerMode {
    OneShot,
    Cron,
}

/// Parses `mode` into a [`SchedulerMode`]. Unknown values are logged as an
/// error and `None` is returned rather than falling back to a default
/// (§4.5: "unknown values ⇒ logged error, scheduler does not start").
pub fn select_mode(mode: &str) -> Option<SchedulerMode> {
    match mode {
        "oneshot" => Some(SchedulerMode::OneShot),
        "cron" => Some(SchedulerMode::Cron),
        other => {
            tracing::error!(mode = other, "unrecognized scheduler mode");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_oneshot_and_cron() {
        assert_eq!(select_mode("oneshot"), Some(SchedulerMode::OneShot));
        assert_eq!(select_mode("cron"), Some(SchedulerMode::Cron));
    }

    #[test]
    fn rejects_unknown_mode() {
        assert_eq!(select_mode("weekly"), None);
        assert_eq!(select_mode(""), None);
    }
}
