mod heart;
mod post;
mod report;

pub use heart::Heart;
pub use post::{InsertPost, Post};
pub use report::PostReport;
