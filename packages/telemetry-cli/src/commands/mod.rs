pub mod analyze;
pub mod replay;
pub mod tasks;
