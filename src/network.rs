pub mod config;
pub mod error;
pub mod hal;
pub mod logger;
pub mod messages;
pub mod protocols;
pub mod stack;
pub mod utils;

pub use config::{Config, NetworkIdentity};
pub use error::NetError;
pub use stack::NetworkStack;
pub use utils::MacAddress;
