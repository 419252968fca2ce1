//! Browser glue shared by components.

pub mod canvas_input;
pub mod canvas_viewport;
pub mod image_loader;
