pub mod employee;

pub use employee::{CreateEmployee, Employee, UpdateEmployee};
