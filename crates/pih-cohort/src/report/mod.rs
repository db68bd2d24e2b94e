//! Report rendering

pub mod hcc_register;
pub mod row;
pub mod visits;

pub use hcc_register::HccRegisterRenderer;
pub use row::{CellValue, FieldError, FieldResult, Row};
pub use visits::VisitsDataset;
