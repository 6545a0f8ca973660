//! HTTP handlers
//!
//! One generic set of handlers serves every configured guard domain; the
//! route context decides which guard and which templates apply. Business
//! CRUD lives outside this crate.

pub mod debug;
pub mod fallback;
pub mod health;
pub mod login;
pub mod logout;
pub mod pages;
