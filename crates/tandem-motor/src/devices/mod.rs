pub mod mock;
pub mod sim;
