pub mod budget_service;
pub mod dto;
pub mod entry_service;
pub mod pace;
