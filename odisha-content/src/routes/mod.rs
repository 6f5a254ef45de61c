pub mod catalog;
pub mod health;
pub mod reviews;
pub mod saved;
