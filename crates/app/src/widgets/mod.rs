pub mod drag_drop;
pub mod file_picker;
