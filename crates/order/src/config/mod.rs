mod gateway;
pub mod myconfig;

pub use self::gateway::GatewayConfig;
pub use self::myconfig::Config;
