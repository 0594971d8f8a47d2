use crate::leave::error::ValidationError;
use crate::model::leave_request::{LeaveStatus, leave_days};
use chrono::NaiveDate;

/// Candidate request as submitted, before anything is persisted.
#[derive(Debug, Copy, Clone)]
pub struct Candidate {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Projection of one prior request of the same employee, enough for the
/// duplicate/overlap/pending checks.
#[derive(Debug, Clone)]
pub struct PriorRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: LeaveStatus,
}

/// Two inclusive ranges share at least one calendar day.
fn overlaps(a_start: NaiveDate, a_end: NaiveDate, b_start: NaiveDate, b_end: NaiveDate) -> bool {
    a_start <= b_end && a_end >= b_start
}

/// Admissibility of a new leave request, evaluated against the
/// employee's full request history and remaining balance.
///
/// Returns the inclusive day count the request would consume. The checks
/// run in a fixed order so each refusal carries its specific reason;
/// creation either persists a PENDING row or nothing at all.
pub fn validate(
    candidate: Candidate,
    history: &[PriorRequest],
    remaining_leaves: i32,
    today: NaiveDate,
) -> Result<i64, ValidationError> {
    if candidate.start_date > candidate.end_date {
        return Err(ValidationError::InvalidRange);
    }

    if candidate.start_date < today {
        return Err(ValidationError::PastDate);
    }

    if history
        .iter()
        .any(|prior| prior.start_date == candidate.start_date && prior.end_date == candidate.end_date)
    {
        return Err(ValidationError::Duplicate);
    }

    if history.iter().any(|prior| {
        overlaps(
            prior.start_date,
            prior.end_date,
            candidate.start_date,
            candidate.end_date,
        )
    }) {
        return Err(ValidationError::Overlap);
    }

    // One outstanding request per employee, regardless of dates
    if history
        .iter()
        .any(|prior| prior.status == LeaveStatus::Pending)
    {
        return Err(ValidationError::PendingLock);
    }

    let days = leave_days(candidate.start_date, candidate.end_date);
    if days > remaining_leaves as i64 {
        return Err(ValidationError::InsufficientBalance);
    }

    Ok(days)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn candidate(start: &str, end: &str) -> Candidate {
        Candidate {
            start_date: date(start),
            end_date: date(end),
        }
    }

    fn prior(start: &str, end: &str, status: LeaveStatus) -> PriorRequest {
        PriorRequest {
            start_date: date(start),
            end_date: date(end),
            status,
        }
    }

    const TODAY: &str = "2025-03-01";

    #[test]
    fn fresh_request_is_admitted_with_day_count() {
        let days = validate(candidate("2025-04-01", "2025-04-03"), &[], 20, date(TODAY));
        assert_eq!(days, Ok(3));
    }

    #[test]
    fn inverted_range_is_refused() {
        let res = validate(candidate("2025-04-05", "2025-04-01"), &[], 20, date(TODAY));
        assert_eq!(res, Err(ValidationError::InvalidRange));
    }

    #[test]
    fn past_start_date_is_refused() {
        let res = validate(candidate("2025-02-20", "2025-03-05"), &[], 20, date(TODAY));
        assert_eq!(res, Err(ValidationError::PastDate));
    }

    #[test]
    fn today_is_not_a_past_date() {
        let res = validate(candidate(TODAY, TODAY), &[], 20, date(TODAY));
        assert_eq!(res, Ok(1));
    }

    #[test]
    fn identical_dates_are_a_duplicate() {
        let history = [prior("2025-03-10", "2025-03-15", LeaveStatus::Rejected)];
        let res = validate(candidate("2025-03-10", "2025-03-15"), &history, 20, date(TODAY));
        assert_eq!(res, Err(ValidationError::Duplicate));
    }

    #[test]
    fn overlapping_range_is_refused() {
        let history = [prior("2025-03-10", "2025-03-15", LeaveStatus::Approved)];
        let res = validate(candidate("2025-03-12", "2025-03-20"), &history, 20, date(TODAY));
        assert_eq!(res, Err(ValidationError::Overlap));
    }

    #[test]
    fn adjacent_range_is_admitted() {
        // ends the day before the new one starts: shares no calendar day
        let history = [prior("2025-03-10", "2025-03-15", LeaveStatus::Approved)];
        let res = validate(candidate("2025-03-16", "2025-03-20"), &history, 20, date(TODAY));
        assert_eq!(res, Ok(5));
    }

    #[test]
    fn single_day_containment_is_an_overlap() {
        let history = [prior("2025-03-10", "2025-03-15", LeaveStatus::Approved)];
        let res = validate(candidate("2025-03-15", "2025-03-15"), &history, 20, date(TODAY));
        assert_eq!(res, Err(ValidationError::Overlap));
    }

    #[test]
    fn any_pending_request_locks_out_new_ones() {
        // non-overlapping dates, still refused while one request is outstanding
        let history = [prior("2025-06-01", "2025-06-05", LeaveStatus::Pending)];
        let res = validate(candidate("2025-07-01", "2025-07-02"), &history, 20, date(TODAY));
        assert_eq!(res, Err(ValidationError::PendingLock));
    }

    #[test]
    fn decided_history_does_not_lock() {
        let history = [
            prior("2025-01-10", "2025-01-12", LeaveStatus::Approved),
            prior("2025-02-01", "2025-02-02", LeaveStatus::Rejected),
        ];
        let res = validate(candidate("2025-07-01", "2025-07-02"), &history, 20, date(TODAY));
        assert_eq!(res, Ok(2));
    }

    #[test]
    fn insufficient_balance_is_refused() {
        let res = validate(candidate("2025-04-01", "2025-04-05"), &[], 2, date(TODAY));
        assert_eq!(res, Err(ValidationError::InsufficientBalance));
    }

    #[test]
    fn request_may_consume_the_exact_balance() {
        let res = validate(candidate("2025-04-01", "2025-04-02"), &[], 2, date(TODAY));
        assert_eq!(res, Ok(2));
    }
}
