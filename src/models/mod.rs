//! Data models for YouTube Data API resources

mod broadcast;
mod channel;
mod page;
mod playlist;
mod subscription;
mod video;

pub use broadcast::*;
pub use channel::*;
pub use page::*;
pub use playlist::*;
pub use subscription::*;
pub use video::*;
