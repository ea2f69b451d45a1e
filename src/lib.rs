//! Client library for the eGUIDE energy consumption prediction API.
//!
//! The [`Client`] holds an API key and a reusable blocking HTTP session.
//! Queries are issued for a geographic area of interest and return the
//! decoded JSON body on success, or a typed [`ApiError`] otherwise.
//!
//! ```no_run
//! use consumption_client::Client;
//!
//! # fn main() -> Result<(), consumption_client::ApiError> {
//! let client = Client::new("USE YOUR API KEY HERE")?;
//! let prediction = client.latlong(0.3476, 32.5825)?;
//! println!("{prediction}");
//! # Ok(())
//! # }
//! ```

pub mod aoi;
pub mod client;
pub mod config;
pub mod error;

pub use aoi::{Point, Polygon};
pub use client::{CallOptions, Client, ClientBuilder, DEFAULT_BASE_URL};
pub use config::FileConfig;
pub use error::ApiError;
