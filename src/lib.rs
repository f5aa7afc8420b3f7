pub mod codec;
pub mod config;
pub mod limbs;
pub mod pose;
pub mod registry;
pub mod session;
pub mod store;
