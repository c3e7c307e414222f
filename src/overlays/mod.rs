mod confirm;
mod error;
mod help;
mod prompt;
mod task_form;
mod text_input;
mod util;

pub use confirm::{ConfirmAction, ConfirmOverlay};
pub use error::render_error_overlay;
pub use help::render_help_overlay;
pub use prompt::{PromptAction, PromptKind, PromptOverlay};
pub use task_form::{quadrant_color, TaskFormAction, TaskFormOverlay};
