// src/models/mod.rs

pub mod catalog;
pub mod personality;
pub mod quiz;
pub mod result;
pub mod share;
pub mod user;
