pub mod history;
pub mod overview;
pub mod tracking;
