//! DiagnoseAI backend library.
//!
//! Hexagonal layout: [`domain`] holds entities, services, and ports;
//! [`inbound`] adapts HTTP requests onto the driving ports; [`outbound`]
//! implements the driven ports (PostgreSQL, filesystem, OpenAI, PDF).

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
