//! Helper functions shared by the HTTP clients

mod url;

pub use url::*;
