pub mod id;
pub mod song;
