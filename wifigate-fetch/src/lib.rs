// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # wifigate Fetch
//!
//! The outbound request layer of the wifigate client.
//!
//! Inside a hotspot's walled garden a plain request to the API is often
//! blocked, redirected to the portal's login page, or answered by the
//! gateway itself. This crate tries several network paths ("bridges") and
//! reports which ones failed and why.
//!
//! ## Building Blocks
//!
//! - [`registry::BridgeRegistry`] - Ordered list of bridges
//! - [`transform::transform`] - Rewrites a logical request for one bridge
//! - [`intercept::InterceptionDetector`] - Spots the gateway answering
//! - [`host::http`] - The HTTP transport and its trait seam
//!
//! ## Dispatch
//!
//! - [`dispatcher::Dispatcher`] - Races or iterates bridges
//! - [`dispatcher::DispatchOutcome`] - The result plus the diagnostic log
//! - [`settings::DispatchSettings`] - Mode, timeouts, encoding
//!
//! ## Example
//!
//! ```ignore
//! use wifigate_core::LogicalRequest;
//! use wifigate_fetch::Dispatcher;
//!
//! let dispatcher = Dispatcher::builder().build()?;
//! let outcome = dispatcher
//!     .dispatch(&LogicalRequest::get("https://api.hotspot.example/api/v1/usage/"))
//!     .await;
//!
//! for failure in &outcome.log {
//!     eprintln!("{failure}");
//! }
//! ```

pub mod dispatcher;
pub mod error;
pub mod host;
pub mod intercept;
pub mod registry;
pub mod settings;
pub mod transform;

// Errors
pub use error::{DispatchError, TransportError};

// Host APIs
pub use host::http::{HttpClient, Transport};

// Building blocks
pub use intercept::{InterceptionDetector, Verdict, accept_status};
pub use registry::BridgeRegistry;
pub use transform::{OutboundRequest, ResponseUnwrap, transform, unwrap_envelope};

// Dispatch
pub use dispatcher::{DispatchOutcome, Dispatcher, DispatcherBuilder};
pub use settings::DispatchSettings;
