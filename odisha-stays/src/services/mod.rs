pub mod host_service;
pub mod message_service;
pub mod profile_service;
pub mod stay_service;
