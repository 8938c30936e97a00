//! Host APIs for the dispatcher.
//!
//! - [`http`] - The [`Transport`](http::Transport) seam and its reqwest
//!   implementation

pub mod http;

pub use http::{HttpClient, Transport};
