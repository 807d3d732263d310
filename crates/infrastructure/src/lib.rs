//! HTTP implementations of the scheduler's external collaborator
//! traits: the master registry, device control, and state broadcast.

pub mod http;

pub use http::{HttpDeviceClient, HttpRegistryClient, HttpStateBroadcaster};
