// src/handlers/mod.rs

pub mod auth;
pub mod catalog;
pub mod parent;
pub mod quiz;
pub mod student;
