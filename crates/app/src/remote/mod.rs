//! Remote authority

mod authority;
pub mod errors;
mod http;

pub use authority::*;
pub use errors::RemoteError;
pub use http::{HttpRemoteAuthority, RemoteConfig};
