// hgscrape-api: Async client for the HG8247X6 router web management interface

pub mod auth;
pub mod client;
pub mod error;
pub mod escape;
pub mod transport;

pub use client::{RouterClient, RouterPage};
pub use error::Error;
pub use escape::unescape_js;
pub use transport::TransportConfig;
