// src/handlers/mod.rs

pub mod auth;
pub mod modules;
pub mod progress;
pub mod user;
