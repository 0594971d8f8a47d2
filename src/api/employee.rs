use crate::auth::auth::AuthUser;
use crate::leave::error::LeaveError;
use crate::model::employee::{Employee, remaining_leaves};
use crate::model::role::{Action, Role};
use crate::utils::db_utils::{build_update_sql, execute_update};
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::{error, info};
use utoipa::ToSchema;

const EMPLOYEE_COLUMNS: &str = "id, email, first_name, last_name, phone, designation, department, \
                                role_id, is_active, total_leaves, leaves_taken, remaining_leaves, \
                                created_at, modified_at";

/// Columns an account holder may change about themselves.
/// Role, active flag, balance counters and audit columns are off limits.
const PROFILE_COLUMNS: &[&str] = &[
    "first_name",
    "last_name",
    "phone",
    "designation",
    "department",
];

#[derive(Debug, Deserialize, ToSchema)]
pub struct EmployeeQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub department: Option<String>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<Employee>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 10)]
    pub total: i64,
}

#[derive(Deserialize, ToSchema)]
pub struct BalanceUpdate {
    /// New allotment; unchanged when omitted
    #[schema(example = 24)]
    pub total_leaves: Option<i32>,
    /// Correction of days taken; unchanged when omitted
    #[schema(example = 0)]
    pub leaves_taken: Option<i32>,
}

#[derive(Deserialize, ToSchema)]
pub struct RoleUpdate {
    /// 1 = HR/Admin, 2 = Employee
    #[schema(example = 1)]
    pub role_id: u8,
}

async fn fetch_employee(pool: &MySqlPool, id: u64) -> Result<Option<Employee>, sqlx::Error> {
    sqlx::query_as::<_, Employee>(&format!(
        "SELECT {EMPLOYEE_COLUMNS} FROM users WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Current account
#[utoipa::path(
    get,
    path = "/api/v1/employees/current",
    responses(
        (status = 200, description = "Caller's own record", body = Employee),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn current_user(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, LeaveError> {
    let employee = fetch_employee(pool.get_ref(), auth.user_id)
        .await?
        .ok_or(LeaveError::NotFound)?;

    Ok(HttpResponse::Ok().json(employee))
}

/// Get Employee by ID (employees may only fetch themselves)
#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, LeaveError> {
    let employee_id = path.into_inner();

    if !auth.role.may_view(auth.user_id, employee_id) {
        return Err(LeaveError::RoleScope);
    }

    match fetch_employee(pool.get_ref(), employee_id).await? {
        Some(emp) => Ok(HttpResponse::Ok().json(emp)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        }))),
    }
}

/// Update own profile (whitelisted fields only)
#[utoipa::path(
    put,
    path = "/api/v1/employees/profile",
    request_body = Object,
    responses(
        (status = 200, description = "Profile updated", body = Object, example = json!({
            "message": "Profile updated successfully"
        })),
        (status = 400, description = "Restricted or unknown field in payload"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_profile(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    let update = build_update_sql("users", &body, PROFILE_COLUMNS, "id", auth.user_id)?;

    let affected = execute_update(pool.get_ref(), update)
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().json(json!({"message": "Employee not found"})));
    }

    Ok(HttpResponse::Ok().json(json!({"message": "Profile updated successfully"})))
}

/// Employee list (HR/Admin)
#[utoipa::path(
    get,
    path = "/api/v1/employees",
    params(
        ("page",  Query, description = "Page number"),
        ("per_page", Query, description = "Items per page"),
        ("department", Query, description = "Filter by department"),
        ("is_active", Query, description = "Filter by active flag"),
        ("search", Query, description = "Search by name or email")
    ),
    responses(
        (status = 200, description = "Paginated employee list", body = EmployeeListResponse),
        (status = 403, description = "Forbidden")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_employees(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<EmployeeQuery>,
) -> Result<HttpResponse, LeaveError> {
    auth.require(Action::ManageEmployees)?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    // ---------- build WHERE clause dynamically ----------
    enum FilterValue {
        Str(String),
        Bool(bool),
    }

    let mut conditions = Vec::new();
    let mut bindings: Vec<FilterValue> = Vec::new();

    if let Some(department) = &query.department {
        conditions.push("department = ?");
        bindings.push(FilterValue::Str(department.clone()));
    }

    if let Some(is_active) = query.is_active {
        conditions.push("is_active = ?");
        bindings.push(FilterValue::Bool(is_active));
    }

    if let Some(search) = &query.search {
        conditions.push("(first_name LIKE ? OR last_name LIKE ? OR email LIKE ?)");
        let like = format!("%{}%", search);
        bindings.push(FilterValue::Str(like.clone()));
        bindings.push(FilterValue::Str(like.clone()));
        bindings.push(FilterValue::Str(like));
    }

    let where_clause = if conditions.is_empty() {
        "".to_string()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    // ---------- total count ----------
    let count_sql = format!("SELECT COUNT(*) as total FROM users {}", where_clause);

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for b in &bindings {
        count_query = match b {
            FilterValue::Str(s) => count_query.bind(s.clone()),
            FilterValue::Bool(v) => count_query.bind(*v),
        };
    }

    let total = count_query.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %count_sql, "Failed to count employees");
        LeaveError::Database(e)
    })?;

    // ---------- data query ----------
    let data_sql = format!(
        "SELECT {EMPLOYEE_COLUMNS} FROM users {} ORDER BY id DESC LIMIT ? OFFSET ?",
        where_clause
    );

    let mut data_query = sqlx::query_as::<_, Employee>(&data_sql);
    for b in bindings {
        data_query = match b {
            FilterValue::Str(s) => data_query.bind(s),
            FilterValue::Bool(v) => data_query.bind(v),
        };
    }
    data_query = data_query.bind(per_page as i64).bind(offset as i64);

    let employees = data_query.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %data_sql, "Failed to fetch employees");
        LeaveError::Database(e)
    })?;

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        data: employees,
        page,
        per_page,
        total,
    }))
}

async fn set_active_flag(
    auth: &AuthUser,
    pool: &MySqlPool,
    employee_id: u64,
    active: bool,
) -> Result<HttpResponse, LeaveError> {
    auth.require(Action::ManageEmployees)?;

    let result = sqlx::query("UPDATE users SET is_active = ?, modified_at = NOW() WHERE id = ?")
        .bind(active)
        .bind(employee_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({"message": "Employee not found"})));
    }

    info!(employee_id, active, "Employee active flag changed");

    let message = if active {
        "User activated successfully"
    } else {
        "User deactivated successfully"
    };
    Ok(HttpResponse::Ok().json(json!({ "message": message })))
}

/// Soft delete (deactivate) an account (HR/Admin)
#[utoipa::path(
    delete,
    path = "/api/v1/employees/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "User deactivated successfully"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn deactivate_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, LeaveError> {
    set_active_flag(&auth, pool.get_ref(), path.into_inner(), false).await
}

/// Re-activate a previously deactivated account (HR/Admin)
#[utoipa::path(
    put,
    path = "/api/v1/employees/{employee_id}/activate",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "User activated successfully"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn activate_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, LeaveError> {
    set_active_flag(&auth, pool.get_ref(), path.into_inner(), true).await
}

/// Correct an employee's leave balance (HR/Admin)
#[utoipa::path(
    put,
    path = "/api/v1/employees/{employee_id}/balance",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    request_body = BalanceUpdate,
    responses(
        (status = 200, description = "Balance updated, remaining recomputed", body = Employee),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_balance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<BalanceUpdate>,
) -> Result<HttpResponse, LeaveError> {
    auth.require(Action::ManageEmployees)?;

    let employee_id = path.into_inner();

    // Same lock discipline as the approval debit so concurrent
    // corrections and approvals serialize on the employee row.
    let mut tx = pool.begin().await?;

    let (total, taken) = sqlx::query_as::<_, (i32, i32)>(
        "SELECT total_leaves, leaves_taken FROM users WHERE id = ? FOR UPDATE",
    )
    .bind(employee_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(LeaveError::NotFound)?;

    let new_total = payload.total_leaves.unwrap_or(total).max(0);
    let new_taken = payload.leaves_taken.unwrap_or(taken).max(0);
    let new_remaining = remaining_leaves(new_total, new_taken);

    sqlx::query(
        r#"
        UPDATE users
        SET total_leaves = ?, leaves_taken = ?, remaining_leaves = ?, modified_at = NOW()
        WHERE id = ?
        "#,
    )
    .bind(new_total)
    .bind(new_taken)
    .bind(new_remaining)
    .bind(employee_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(employee_id, new_total, new_taken, new_remaining, "Leave balance corrected");

    let employee = fetch_employee(pool.get_ref(), employee_id)
        .await?
        .ok_or(LeaveError::NotFound)?;

    Ok(HttpResponse::Ok().json(employee))
}

/// Change an account's role (HR/Admin)
#[utoipa::path(
    put,
    path = "/api/v1/employees/{employee_id}/role",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    request_body = RoleUpdate,
    responses(
        (status = 200, description = "Role updated"),
        (status = 400, description = "Invalid role id"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_role(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<RoleUpdate>,
) -> Result<HttpResponse, LeaveError> {
    auth.require(Action::ManageEmployees)?;

    let employee_id = path.into_inner();

    if Role::from_id(payload.role_id).is_none() {
        return Ok(HttpResponse::BadRequest().json(json!({"message": "Invalid role id"})));
    }

    let result = sqlx::query("UPDATE users SET role_id = ?, modified_at = NOW() WHERE id = ?")
        .bind(payload.role_id)
        .bind(employee_id)
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({"message": "Employee not found"})));
    }

    info!(employee_id, role_id = payload.role_id, "Employee role changed");

    Ok(HttpResponse::Ok().json(json!({"message": "Role updated successfully"})))
}
