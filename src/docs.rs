use crate::api::employee::{BalanceUpdate, EmployeeListResponse, EmployeeQuery, RoleUpdate};
use crate::api::leave_request::{CreateLeave, LeaveFilter, LeaveListResponse};
use crate::model::employee::Employee;
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType};
use crate::models::{LoginReqDto, RegisterReq};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "PaySphere API",
        version = "1.0.0",
        description = r#"
## PaySphere — HR & Leave Management

Backend for employee accounts and the leave-request workflow.

### Key Features
- **Account Management**
  - Register, login, view and update profiles; HR-managed activation, role and balance
- **Leave Management**
  - Apply for leave, approve/reject requests, pending queue, approved history
- **Balance Accounting**
  - Per-employee leave balance, debited when a request is approved

### Security
Most endpoints are protected using **JWT Bearer authentication**.
Reviewing leave requests and managing accounts requires the **HR/Admin** role.

### Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::leave_request::create_leave,
        crate::api::leave_request::decide_leave,
        crate::api::leave_request::my_leaves,
        crate::api::leave_request::pending_leaves,
        crate::api::leave_request::leave_history,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::leave_list,

        crate::api::employee::current_user,
        crate::api::employee::get_employee,
        crate::api::employee::update_profile,
        crate::api::employee::list_employees,
        crate::api::employee::deactivate_employee,
        crate::api::employee::activate_employee,
        crate::api::employee::update_balance,
        crate::api::employee::update_role
    ),
    components(
        schemas(
            CreateLeave,
            LeaveFilter,
            LeaveRequest,
            LeaveListResponse,
            LeaveType,
            LeaveStatus,
            Employee,
            EmployeeListResponse,
            EmployeeQuery,
            BalanceUpdate,
            RoleUpdate,
            RegisterReq,
            LoginReqDto
        )
    ),
    tags(
        (name = "Leave", description = "Leave request and approval APIs"),
        (name = "Employee", description = "Employee account APIs"),
    )
)]
pub struct ApiDoc;
