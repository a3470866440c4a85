pub mod screen;
pub mod voice;
