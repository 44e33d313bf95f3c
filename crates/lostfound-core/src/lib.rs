//! # Lost & Found Core
//!
//! Shared, I/O-free logic for Lost & Found: report models, the
//! bag-of-words similarity score, the lost/found matcher, and the store
//! abstraction.
//!
//! This crate contains no tokio, filesystem, or network dependencies. The
//! matcher is a pure function over an already-fetched candidate list; the
//! calling application is responsible for querying its store and acting on
//! the returned matches.

pub mod matcher;
pub mod models;
pub mod similarity;
pub mod store;
