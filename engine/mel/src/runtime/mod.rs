//! Shared compile cache and per-run engine construction.
//!
//! A [`Runtime`] is the long-lived half of an embedding: it owns the
//! interner and a cache of parsed programs keyed by `(mode, source)`.
//! Evaluation state is the short-lived half. Every call builds a fresh
//! [`Evaluator`] over the caller's host accessor, so concurrent runs and
//! repeated runs never see each other's frames or function tables.

use std::sync::Arc;

use mel_eval::{Evaluator, HostAccessor, Value};
use mel_ir::{Interner, Mode, Program};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::error::EngineError;

/// One parsed program. Immutable after compilation, so cached units can be
/// shared across threads and runs as plain `Arc` clones.
#[derive(Debug)]
pub struct CodeUnit {
    mode: Mode,
    source: Box<str>,
    program: Program,
}

impl CodeUnit {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn program(&self) -> &Program {
        &self.program
    }
}

/// The long-lived embedding root: interner plus compile cache.
pub struct Runtime {
    interner: Interner,
    cache: Mutex<FxHashMap<(Mode, Box<str>), Arc<CodeUnit>>>,
}

impl Runtime {
    pub fn new() -> Self {
        Self {
            interner: Interner::new(),
            cache: Mutex::new(FxHashMap::default()),
        }
    }

    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    /// Parse `source` under `mode`, or return the cached unit.
    ///
    /// The cache key is the mode and the exact source text; the same text
    /// compiled under a different mode is a different unit. Compilation
    /// runs outside the cache lock, so a race between two threads over the
    /// same key can parse twice, but both end up holding the unit that
    /// landed first.
    pub fn compile(&self, mode: Mode, source: &str) -> Result<Arc<CodeUnit>, EngineError> {
        let key = (mode, Box::<str>::from(source));
        if let Some(unit) = self.cache.lock().get(&key) {
            trace!(?mode, "compile cache hit");
            return Ok(Arc::clone(unit));
        }

        trace!(?mode, len = source.len(), "compile");
        let tokens = mel_lexer::tokenize(source, &self.interner)?;
        let program = mel_parse::parse(&tokens, mode, &self.interner)?;
        let unit = Arc::new(CodeUnit {
            mode,
            source: key.1.clone(),
            program,
        });
        Ok(Arc::clone(self.cache.lock().entry(key).or_insert(unit)))
    }

    /// Run a compiled unit on a fresh engine.
    pub fn evaluate(&self, unit: &CodeUnit, host: &dyn HostAccessor) -> Result<Value, EngineError> {
        let mut engine = Evaluator::new(host, &self.interner);
        Ok(engine.run(unit.program())?)
    }

    /// Run an event-handler unit with `$sender` and `$args` pre-bound.
    pub fn dispatch_event(
        &self,
        unit: &CodeUnit,
        host: &dyn HostAccessor,
        sender: Value,
        args: Value,
    ) -> Result<Value, EngineError> {
        let mut engine = Evaluator::new(host, &self.interner);
        engine.bind(self.interner.intern("sender"), sender);
        engine.bind(self.interner.intern("args"), args);
        Ok(engine.run(unit.program())?)
    }

    /// Compile-and-run convenience for one-off expressions.
    pub fn eval_expression(
        &self,
        source: &str,
        host: &dyn HostAccessor,
    ) -> Result<Value, EngineError> {
        let unit = self.compile(Mode::Expression, source)?;
        self.evaluate(&unit, host)
    }

    /// Compile-and-run convenience for one-off scripts.
    pub fn run_script(&self, source: &str, host: &dyn HostAccessor) -> Result<Value, EngineError> {
        let unit = self.compile(Mode::Script, source)?;
        self.evaluate(&unit, host)
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests;
