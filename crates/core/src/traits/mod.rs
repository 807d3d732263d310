pub mod device;
pub mod registry;

pub use device::DeviceClient;
pub use registry::{RegistryClient, StateBroadcaster};
