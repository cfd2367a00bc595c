pub mod budget;
pub mod entry;
pub mod status;
