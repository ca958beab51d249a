//! Innovation-maturity certification: indicator normalization, pillar aggregation,
//! certification tiering, and the audit-trail service wrapped around them.

pub mod assessment;
pub mod config;
pub mod error;
pub mod telemetry;
