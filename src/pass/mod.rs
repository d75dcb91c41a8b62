pub mod validate;

pub use validate::{validate_function, ValidatePass};

use tracing::{debug, info_span, warn};

use crate::codegen::printer::emit_ir_text;
use crate::config::LowerConfig;
use crate::error::PassError;
use crate::ir::module::IrModule;

/// A whole-module step run after lowering.
pub trait Pass {
    /// Name used in spans and by `set_dump_after`.
    fn name(&self) -> &'static str;

    fn run(&mut self, module: &mut IrModule) -> Result<(), PassError>;
}

/// Runs passes over a module in registration order, stopping at the first
/// failure.
#[derive(Default)]
pub struct PassManager {
    passes: Vec<Box<dyn Pass>>,
    dump_after: Option<String>,
}

impl PassManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// The pipeline a lowering run with `config` expects: validation when
    /// `verify` is set, nothing otherwise.
    pub fn from_config(config: &LowerConfig) -> Self {
        let mut pm = Self::new();
        if config.verify {
            pm.add_pass(ValidatePass);
        }
        pm
    }

    pub fn add_pass(&mut self, pass: impl Pass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Logs the module text at debug level once the named pass succeeds.
    pub fn set_dump_after(&mut self, pass_name: impl Into<String>) {
        self.dump_after = Some(pass_name.into());
    }

    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    pub fn run(&mut self, module: &mut IrModule) -> Result<(), PassError> {
        for pass in &mut self.passes {
            let name = pass.name();
            let _span = info_span!("pass", name, module = %module.name).entered();
            pass.run(module)?;

            if self.dump_after.as_deref() != Some(name) {
                continue;
            }
            match emit_ir_text(module) {
                Ok(text) => debug!("IR after {}:\n{}", name, text),
                Err(err) => warn!(%err, "could not print IR after {}", name),
            }
        }
        Ok(())
    }
}
