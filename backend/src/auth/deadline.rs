//! Submission window guard
//!
//! Submission writes are allowed up to and including the due instant.
//! There is no grace period and no clock-skew tolerance.

use super::policy::DenyReason;
use chrono::{DateTime, Utc};

/// Deny with `PastDeadline` when `now` is strictly after `due_date`
pub fn check_submission_window(due_date: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), DenyReason> {
    if now > due_date {
        return Err(DenyReason::PastDeadline);
    }
    Ok(())
}
