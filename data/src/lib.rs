pub use self::config::Config;
pub use self::helper::Helper;
pub use self::host::{ConnectionId, Host};
pub use self::message::{Decision, Inbound, Outgoing, Rewrite};
pub use self::network::Network;
pub use self::state::Phase;

mod auth;
pub mod command;
pub mod config;
pub mod environment;
pub mod filter;
pub mod formatting;
mod ghost;
pub mod helper;
pub mod host;
pub mod marker;
pub mod message;
pub mod network;
pub mod rewrite;
pub mod state;
pub mod suppress;
mod timer;
