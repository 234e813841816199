//! Harness error taxonomy: minimal enum, one variant per failure class the
//! mount surface can report. Component-level failures stay `anyhow` payloads.
use std::{error::Error as StdError, fmt};

#[derive(Debug)]
pub enum TestkitError {
    NoApplication,                // no application installed for the environment key
    MissingService(&'static str), // inject target absent from the service container
    Navigation(anyhow::Error),    // route replace rejected before child setup
    Setup(anyhow::Error),         // component setup failed, sync or async
}

impl fmt::Display for TestkitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestkitError::NoApplication => {
                write!(f, "no application instance installed for this test environment")
            }
            TestkitError::MissingService(name) => write!(f, "missing injected service: {name}"),
            TestkitError::Navigation(e) => write!(f, "navigation replace failed: {e}"),
            TestkitError::Setup(e) => write!(f, "component setup failed: {e}"),
        }
    }
}
impl StdError for TestkitError {}

pub type Result<T = ()> = std::result::Result<T, TestkitError>;

// Non-termination is deliberately absent from the taxonomy: a setup that never
// settles keeps the mount future pending; deadlines are the caller's to enforce.
