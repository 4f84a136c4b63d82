//! # Smartlead client
//!
//! HTTP plumbing for the gateway: the Smartlead REST services, the remote
//! license server and the workflow-automation engine.
//!
//! ```rust,no_run
//! use smartlead_client::{ApiBase, ClientResult, Method, SmartleadClient};
//!
//! # async fn example() -> ClientResult<()> {
//! let client = SmartleadClient::builder().api_key("sk-your-key").build()?;
//! let campaigns = client
//!     .request(ApiBase::Core, Method::GET, "campaigns", &[], None)
//!     .await?;
//! println!("{}", campaigns);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod license;
pub mod transport;
pub mod workflow;

pub use client::{ApiBase, SmartleadClient, SmartleadClientBuilder};
pub use config::{ClientConfig, RetryConfig};
pub use error::{ClientError, ClientResult};
pub use license::HttpLicenseServer;
pub use workflow::WorkflowClient;

// Re-exported so callers can build requests without a direct dependency
pub use reqwest::Method;
