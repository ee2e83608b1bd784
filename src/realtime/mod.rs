pub mod event;
pub mod feed;
pub mod listener;

pub use event::WallEvent;
pub use feed::BoardFeed;
pub use listener::WallListener;
