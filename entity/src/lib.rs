//! sea-orm entities for the employee service.

pub mod employees;
