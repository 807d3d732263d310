pub mod blocks;
pub mod health;
pub mod state_updates;
pub mod work;
