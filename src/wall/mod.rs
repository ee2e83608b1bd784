pub mod content;
pub mod engagement;
pub mod fingerprint;
pub mod guard;
pub mod posts;
