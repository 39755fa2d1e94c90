// Network layer: REST gateway and the realtime WebSocket channel actor.

pub mod backoff;
pub mod channel;
pub mod error;
pub mod gateway;

pub use backoff::ReconnectPolicy;
pub use channel::{spawn_channel, ChannelCommand, ChannelConfig, ChannelNotification};
pub use error::NetError;
pub use gateway::{Gateway, MessageDto};
