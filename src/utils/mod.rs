// src/utils/mod.rs

pub mod google;
pub mod hash;
pub mod jwt;
