//! Voting-behavior clustering.
//!
//! This crate provides:
//! - [`matrix`]: senator-by-vote pivot, fill policy, participation filter
//! - [`pca`]: principal component projection
//! - [`kmeans`]: seeded k-means++ partitioning
//! - [`engine`]: the end-to-end [`cluster`] entry point

pub mod engine;
pub mod kmeans;
pub mod matrix;
pub mod pca;

pub use engine::{ClusterReport, cluster, cluster_report};
pub use matrix::SenatorVoteMatrix;
pub use pca::Projection;
