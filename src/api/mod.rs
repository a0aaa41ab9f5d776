pub mod forms;
pub mod headers;
