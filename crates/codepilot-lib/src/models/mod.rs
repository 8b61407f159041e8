// Data models shared by services and the HTTP layer

pub mod ai;
pub mod editor;

pub use ai::*;
pub use editor::*;
