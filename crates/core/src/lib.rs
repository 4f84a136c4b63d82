// Core of the Smartlead MCP gateway: capability catalog, license gating,
// enablement and dispatch. Transport- and HTTP-agnostic.

pub mod catalog;
pub mod config;
pub mod dispatch;
pub mod enablement;
pub mod error;
pub mod license;
pub mod types;

pub use catalog::Catalog;
pub use config::{ConfigError, GatewayConfig};
pub use dispatch::{Adapter, AdapterError, DispatchEnvelope, DispatchRouter, GatewayContext};
pub use enablement::{operation_enabled, EnablementFilter};
pub use error::{ErrorKind, GateError, GateResult};
pub use license::{LicenseDecision, LicenseEvaluator, Tier};
pub use types::*;
