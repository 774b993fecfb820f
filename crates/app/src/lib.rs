//! Client side of the tenant configuration engine: the remote authority
//! client, the session, the local cache and the config repository tying
//! them together.

pub mod cache;
pub mod notifications;
pub mod remote;
pub mod repository;
pub mod session;

#[cfg(test)]
mod test;
