//! Stridemark Core Types and Definitions
//!
//! This crate provides the foundational types shared by the stridemark
//! engine and CLI. It includes:
//!
//! - **Findings**: Threat records and their enumerated attributes ([`finding`] module)
//! - **Documents**: Order-preserving access to Threat Dragon models ([`document`] module)
//! - **Stroke markers**: Shape-aware has-findings highlighting ([`stroke`] module)

pub mod document;
pub mod finding;
pub mod stroke;
