pub mod client;
pub mod runtime;
pub mod server;

pub const SOCKET_PATH: &str = "/tmp/ringd.sock";
