pub mod events;
pub mod service;
