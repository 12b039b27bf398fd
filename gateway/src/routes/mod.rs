pub mod chat;
pub mod compare;
pub mod health;
pub mod models;
