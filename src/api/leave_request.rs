use crate::auth::auth::AuthUser;
use crate::leave::engine::{self, Reviewer};
use crate::leave::error::LeaveError;
use crate::leave::policy::{self, Candidate, PriorRequest};
use crate::model::leave_request::{LeaveDecision, LeaveRequest, LeaveStatus, LeaveType};
use crate::model::role::Action;
use actix_web::{HttpResponse, web};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{error, info};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = "SICK")]
    pub leave_type: LeaveType,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-03", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "Fever")]
    pub reason: String,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveRequest>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    /// Filter by employee ID
    #[schema(example = 123)]
    pub employee_id: Option<u64>,
    /// Filter by leave status
    #[schema(example = "PENDING")]
    pub status: Option<String>,
    /// Pagination page number (start with 1)
    #[schema(example = 1)]
    pub page: Option<u64>, // 1-based
    /// Pagination per page number
    #[schema(example = 10)]
    pub per_page: Option<u64>, // items per page
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    U64(u64),
    Str(&'a str),
}

const LEAVE_COLUMNS: &str = "id, employee_id, leave_type, start_date, end_date, reason, \
                             status, applied_on, reviewed_by, reviewed_on";

async fn fetch_history(
    conn: &mut sqlx::MySqlConnection,
    employee_id: u64,
) -> Result<Vec<PriorRequest>, LeaveError> {
    let rows = sqlx::query_as::<_, (NaiveDate, NaiveDate, String)>(
        "SELECT start_date, end_date, status FROM leave_requests WHERE employee_id = ?",
    )
    .bind(employee_id)
    .fetch_all(conn)
    .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(start_date, end_date, status)| {
            status.parse::<LeaveStatus>().ok().map(|status| PriorRequest {
                start_date,
                end_date,
                status,
            })
        })
        .collect())
}

/* =========================
Create leave request
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/leave",
    request_body(
        content = CreateLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request created (PENDING)", body = LeaveRequest),
        (status = 400, description = "Validation failure with reason code", body = Object, example = json!({
            "message": "pending lock"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateLeave>,
) -> Result<HttpResponse, LeaveError> {
    auth.require(Action::CreateLeave)?;

    // Lock the employee row for the whole check-then-insert so two
    // simultaneous creates by the same employee serialize and the
    // second one sees the first as pending history.
    let mut tx = pool.begin().await?;

    let (remaining, is_active) = sqlx::query_as::<_, (i32, bool)>(
        "SELECT remaining_leaves, is_active FROM users WHERE id = ? FOR UPDATE",
    )
    .bind(auth.user_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(LeaveError::NotFound)?;

    if !is_active {
        return Ok(HttpResponse::Forbidden().json(json!({
            "message": "Inactive accounts cannot submit leave requests"
        })));
    }

    let history = fetch_history(&mut tx, auth.user_id).await?;

    let candidate = Candidate {
        start_date: payload.start_date,
        end_date: payload.end_date,
    };
    let today = Utc::now().date_naive();
    let days = policy::validate(candidate, &history, remaining, today)?;

    let result = sqlx::query(
        r#"
        INSERT INTO leave_requests
            (employee_id, leave_type, start_date, end_date, reason, status, applied_on)
        VALUES (?, ?, ?, ?, ?, 'PENDING', NOW())
        "#,
    )
    .bind(auth.user_id)
    .bind(payload.leave_type.to_string())
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(&payload.reason)
    .execute(&mut *tx)
    .await?;

    let request_id = result.last_insert_id();

    let created = sqlx::query_as::<_, LeaveRequest>(&format!(
        "SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE id = ?"
    ))
    .bind(request_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(request_id, employee_id = auth.user_id, days, "Leave request created");

    Ok(HttpResponse::Created().json(created))
}

/* =========================
Decide leave (HR/Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/{decision}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request"),
        ("decision" = String, Path, description = "approve or reject")
    ),
    responses(
        (status = 200, description = "Leave request decided", body = LeaveRequest),
        (status = 400, description = "Invalid decision value"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden (not a reviewer, or self-approval)"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Leave request already decided")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn decide_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<(u64, String)>,
) -> Result<HttpResponse, LeaveError> {
    // no capability gate here: the engine owns the reviewer check so the
    // failure surfaces as "forbidden: not a reviewer"
    let (leave_id, decision) = path.into_inner();
    let decision = decision
        .parse::<LeaveDecision>()
        .map_err(|_| LeaveError::InvalidDecision)?;

    let reviewer = Reviewer {
        employee_id: auth.user_id,
        role: auth.role,
    };

    let decided = engine::decide(pool.get_ref(), leave_id, reviewer, decision).await?;

    Ok(HttpResponse::Ok().json(decided))
}

/* =========================
Own requests (any role)
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/leave/mine",
    responses(
        (status = 200, description = "Caller's leave requests, newest first", body = [LeaveRequest]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn my_leaves(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, LeaveError> {
    auth.require(Action::ViewOwnLeaves)?;

    let leaves = sqlx::query_as::<_, LeaveRequest>(&format!(
        "SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE employee_id = ? ORDER BY applied_on DESC"
    ))
    .bind(auth.user_id)
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(leaves))
}

/* =========================
Pending queue (HR/Admin)
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/leave/pending",
    responses(
        (status = 200, description = "All PENDING requests, newest first", body = [LeaveRequest]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn pending_leaves(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, LeaveError> {
    auth.require(Action::ViewPendingQueue)?;

    let leaves = sqlx::query_as::<_, LeaveRequest>(&format!(
        "SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE status = 'PENDING' ORDER BY applied_on DESC"
    ))
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(leaves))
}

/* =========================
Approved history (role-scoped)
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/leave/history",
    responses(
        (status = 200, description = "Approved requests: all for HR, own for employees", body = [LeaveRequest]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_history(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, LeaveError> {
    // HR sees every approved request; employees only their own
    let leaves = if auth.role.allows(Action::ViewAllLeaves) {
        sqlx::query_as::<_, LeaveRequest>(&format!(
            "SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE status = 'APPROVED' ORDER BY applied_on DESC"
        ))
        .fetch_all(pool.get_ref())
        .await?
    } else {
        auth.require(Action::ViewOwnLeaves)?;
        sqlx::query_as::<_, LeaveRequest>(&format!(
            "SELECT {LEAVE_COLUMNS} FROM leave_requests \
             WHERE status = 'APPROVED' AND employee_id = ? ORDER BY applied_on DESC"
        ))
        .bind(auth.user_id)
        .fetch_all(pool.get_ref())
        .await?
    };

    Ok(HttpResponse::Ok().json(leaves))
}

/* =========================
Single request (owner or HR)
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, LeaveError> {
    let leave_id = path.into_inner();

    let leave = sqlx::query_as::<_, LeaveRequest>(&format!(
        "SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE id = ?"
    ))
    .bind(leave_id)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or(LeaveError::NotFound)?;

    // a request outside the caller's scope is simply not addressable
    if !auth.role.may_view(auth.user_id, leave.employee_id) {
        return Err(LeaveError::NotFound);
    }

    Ok(HttpResponse::Ok().json(leave))
}

/* =========================
All requests (HR/Admin)
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<LeaveFilter>,
) -> Result<HttpResponse, LeaveError> {
    auth.require(Action::ViewAllLeaves)?;

    // -------------------------
    // Pagination
    // -------------------------
    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    // -------------------------
    // WHERE clause
    // -------------------------
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(emp_id) = query.employee_id {
        where_sql.push_str(" AND employee_id = ?");
        args.push(FilterValue::U64(emp_id));
    }

    if let Some(status) = query.status.as_deref() {
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Str(status));
    }

    // -------------------------
    // COUNT query
    // -------------------------
    let count_sql = format!("SELECT COUNT(*) FROM leave_requests{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(*s),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to count leave requests");
        LeaveError::Database(e)
    })?;

    // -------------------------
    // DATA query
    // -------------------------
    let data_sql = format!(
        "SELECT {LEAVE_COLUMNS} FROM leave_requests{} ORDER BY applied_on DESC LIMIT ? OFFSET ?",
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, LeaveRequest>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Str(s) => data_q.bind(s),
        };
    }

    let leaves = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch leave list");
            LeaveError::Database(e)
        })?;

    // -------------------------
    // Response
    // -------------------------
    let response = LeaveListResponse {
        data: leaves,
        page: page as u32,
        per_page: per_page as u32,
        total,
    };

    Ok(HttpResponse::Ok().json(response))
}
