//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Environment configuration helpers
//! - Cookie management
//! - Hashing and random token generation
//! - A thin HTTP client for the hosted backend service

pub mod config;
pub mod cookie;
pub mod crypto;
pub mod http;
