pub mod block_map;
pub mod distributor;
pub mod queue;
pub mod retry;
pub mod state_listener;
pub mod state_publisher;
pub mod workflow;

#[cfg(test)]
pub mod test_utils;

pub use block_map::BlockRobotMap;
pub use distributor::BlockDistributor;
pub use queue::ProtocolQueue;
pub use state_listener::StateListener;
pub use state_publisher::StatePublisher;
