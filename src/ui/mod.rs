//! Terminal output helpers
//!
//! Uses `cliclack` for framed output and prompts in interactive terminals,
//! with plain output in CI and when piped.

mod context;
mod output;
mod prompts;

pub use context::UiContext;
pub use output::{
    intro, key_value, key_value_status, outro_success, step_error_detail, step_info, step_ok,
    step_ok_detail, step_warn, step_warn_hint,
};
pub use prompts::confirm;
