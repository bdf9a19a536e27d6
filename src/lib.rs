//! Hybrid anime recommendations over trained user and item embeddings.
//!
//! Similar users are found by cosine similarity in the user embedding space,
//! their preferences are aggregated into collaborative candidates, and those
//! are blended with a content-similarity signal seeded from the user's own
//! favourites.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
