pub mod chat;
pub mod dispatch;
mod render;
