//! College admission chance predictions over a historical cutoff dataset.
//!
//! The crate loads the dataset once ([`dataset`]), scores queries with either
//! the distance heuristic or the classifier-backed variant ([`scoring`]), and
//! exposes both over axum ([`predictions`]). [`upload`] pushes a flat file into
//! the relational store the model variant reads from.

pub mod config;
pub mod dataset;
pub mod error;
pub mod predictions;
pub mod scoring;
pub mod telemetry;
pub mod upload;
