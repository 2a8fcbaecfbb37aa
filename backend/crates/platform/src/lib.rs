//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Password hashing (Argon2id, PHC string format)
//! - Zeroization of sensitive in-memory data

pub mod password;
