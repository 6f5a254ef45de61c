pub mod admin;
pub mod health;
pub mod hosts;
pub mod messages;
pub mod notifications;
pub mod photos;
pub mod profiles;
pub mod stay_requests;
