//! Database entities for the console schema.
//!
//! `request` is the core record; `package`, `user` and `review` are the
//! tables it references or is referenced by.

pub mod package;
pub mod request;
pub mod review;
pub mod user;
