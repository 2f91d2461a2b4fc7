//! `vyra` - A minimal panic-button service for drivers
//!
//! This library provides the trusted-contact list, the bounded alert history,
//! their JSON-file persistence, and the HTTP API the driver page and the
//! operator dashboard talk to.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod alert;
pub mod cli;
pub mod config;
pub mod contact;
pub mod error;
pub mod http;
pub mod logging;
pub mod server;
pub mod storage;

pub use alert::{Alert, AlertLog, AlertRequest, AlertStatus, Occurrence};
pub use config::Config;
pub use contact::{Contact, ContactBook};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use storage::{DocumentStore, JsonFileStore, MemoryStore};

/// Product name reported by the health check.
pub const APP_NAME: &str = "VYRA";
