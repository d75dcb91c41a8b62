pub mod printer;

pub use printer::{emit_function_text, emit_ir_text};
