//! Request-scoped context

use chrono::{Local, NaiveDate};

/// Values a workflow would otherwise read from ambient state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionContext {
    /// Calendar day the action happens on
    pub today: NaiveDate,
}

impl ActionContext {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Context for an action happening now, in local time
    pub fn now() -> Self {
        Self {
            today: Local::now().date_naive(),
        }
    }
}
