pub mod ai;
pub mod editor;
