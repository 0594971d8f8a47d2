use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum LeaveType {
    Sick,
    Casual,
    Annual,
    Other,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

/// Terminal value a reviewer may move a PENDING request to.
/// Parsed from the decision path segment, so anything else is rejected
/// before the engine runs.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Display, EnumString, ToSchema)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LeaveDecision {
    Approve,
    Reject,
}

impl LeaveDecision {
    pub fn status(self) -> LeaveStatus {
        match self {
            LeaveDecision::Approve => LeaveStatus::Approved,
            LeaveDecision::Reject => LeaveStatus::Rejected,
        }
    }
}

/// Inclusive day count of a leave range. `start == end` is one day.
pub fn leave_days(start_date: NaiveDate, end_date: NaiveDate) -> i64 {
    (end_date - start_date).num_days() + 1
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveRequest {
    #[schema(example = 1)]
    pub id: u64,
    /// Owning employee, immutable after creation
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = "SICK", value_type = String)]
    pub leave_type: String,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-03", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "Fever")]
    pub reason: String,
    #[schema(example = "PENDING", value_type = String)]
    pub status: String,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub applied_on: Option<DateTime<Utc>>,
    /// Reviewing employee, null until decided
    #[schema(example = 1, nullable = true)]
    pub reviewed_by: Option<u64>,
    #[schema(example = "2026-01-02T00:00:00Z", format = "date-time", value_type = String, nullable = true)]
    pub reviewed_on: Option<DateTime<Utc>>,
}

impl LeaveRequest {
    /// Review fields are both unset exactly while the request is PENDING,
    /// and both set once it reaches a terminal status.
    pub fn review_state_consistent(&self) -> bool {
        match self.status.parse::<LeaveStatus>() {
            Ok(LeaveStatus::Pending) => self.reviewed_by.is_none() && self.reviewed_on.is_none(),
            Ok(_) => self.reviewed_by.is_some() && self.reviewed_on.is_some(),
            Err(_) => false,
        }
    }

    pub fn leave_days(&self) -> i64 {
        leave_days(self.start_date, self.end_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn pending_request() -> LeaveRequest {
        LeaveRequest {
            id: 1,
            employee_id: 1000,
            leave_type: LeaveType::Sick.to_string(),
            start_date: date("2025-04-01"),
            end_date: date("2025-04-03"),
            reason: "Fever".into(),
            status: LeaveStatus::Pending.to_string(),
            applied_on: Some(Utc::now()),
            reviewed_by: None,
            reviewed_on: None,
        }
    }

    #[test]
    fn leave_days_counts_both_endpoints() {
        assert_eq!(leave_days(date("2025-04-01"), date("2025-04-03")), 3);
        assert_eq!(leave_days(date("2025-04-01"), date("2025-04-01")), 1);
    }

    #[test]
    fn decision_parses_from_path_segment() {
        assert_eq!("approve".parse(), Ok(LeaveDecision::Approve));
        assert_eq!("reject".parse(), Ok(LeaveDecision::Reject));
        assert!("cancel".parse::<LeaveDecision>().is_err());
        assert_eq!(LeaveDecision::Approve.status(), LeaveStatus::Approved);
        assert_eq!(LeaveDecision::Reject.status(), LeaveStatus::Rejected);
    }

    #[test]
    fn status_round_trips_through_strings() {
        assert_eq!(LeaveStatus::Pending.to_string(), "PENDING");
        assert_eq!("APPROVED".parse(), Ok(LeaveStatus::Approved));
        assert_eq!("SICK".parse(), Ok(LeaveType::Sick));
    }

    #[test]
    fn pending_request_has_no_review_fields() {
        let req = pending_request();
        assert!(req.review_state_consistent());

        let mut half_decided = pending_request();
        half_decided.status = LeaveStatus::Approved.to_string();
        assert!(!half_decided.review_state_consistent());

        half_decided.reviewed_by = Some(2);
        half_decided.reviewed_on = Some(Utc::now());
        assert!(half_decided.review_state_consistent());
    }
}
