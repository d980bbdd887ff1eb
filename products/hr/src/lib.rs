//! HR module: the employee record service.

mod request;
mod service;

pub use request::{NewEmployee, changes_from_json, parse_id};
pub use service::EmployeeService;
