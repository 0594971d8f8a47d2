use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// `remaining_leaves = max(total_leaves - leaves_taken, 0)`
///
/// Every mutator of the (total, taken) pair must go through this so the
/// stored derived column can never drift from the pair.
pub fn remaining_leaves(total_leaves: i32, leaves_taken: i32) -> i32 {
    (total_leaves - leaves_taken).max(0)
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "email": "john.doe@company.com",
        "first_name": "John",
        "last_name": "Doe",
        "phone": "+8801712345678",
        "designation": "Software Engineer",
        "department": "Engineering",
        "role_id": 2,
        "is_active": true,
        "total_leaves": 20,
        "leaves_taken": 3,
        "remaining_leaves": 17
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "john.doe@company.com")]
    pub email: String,

    #[schema(example = "John")]
    pub first_name: String,

    #[schema(example = "Doe", nullable = true)]
    pub last_name: Option<String>,

    #[schema(example = "+8801712345678", nullable = true)]
    pub phone: Option<String>,

    #[schema(example = "Software Engineer", nullable = true)]
    pub designation: Option<String>,

    #[schema(example = "Engineering", nullable = true)]
    pub department: Option<String>,

    /// 1 = HR/Admin, 2 = Employee
    #[schema(example = 2)]
    pub role_id: u8,

    #[schema(example = true)]
    pub is_active: bool,

    #[schema(example = 20)]
    pub total_leaves: i32,

    #[schema(example = 0)]
    pub leaves_taken: i32,

    #[schema(example = 20)]
    pub remaining_leaves: i32,

    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,

    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub modified_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_is_total_minus_taken() {
        assert_eq!(remaining_leaves(20, 0), 20);
        assert_eq!(remaining_leaves(20, 3), 17);
        assert_eq!(remaining_leaves(20, 20), 0);
    }

    #[test]
    fn remaining_is_floored_at_zero() {
        // HR corrections can push taken past total; the balance never goes negative
        assert_eq!(remaining_leaves(10, 15), 0);
        assert_eq!(remaining_leaves(0, 1), 0);
    }
}
