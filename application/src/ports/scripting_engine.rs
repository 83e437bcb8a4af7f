//! Scripting engine port: interface for loaded bot programs.
//!
//! This port abstracts the Lua runtime so that the mode controller can be
//! driven (and tested) without mlua. The infrastructure layer provides the
//! real `ScriptModule` / `ScriptEngine` implementations.

use luabot_domain::{CallStyle, LifecycleHook};
use tracing::warn;

/// Outcome of a hook invocation that did not propagate an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvokeOutcome {
    /// The hook is not defined, or the module failed to load. Nothing ran.
    Skipped,
    /// The hook ran to completion.
    Completed,
    /// Fire-and-forget only: the hook raised. The error is recorded on the
    /// module.
    Failed,
}

/// Where a script failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptErrorKind {
    /// The program file was not found on disk.
    FileNotFound,
    /// The program file exists but could not be read.
    Io,
    /// The program failed to compile.
    Syntax,
    /// The chunk did not return a factory function.
    NotAFactory,
    /// The factory did not return a descriptor table.
    NotADescriptor,
    /// A script raised an error while running.
    Runtime,
    /// A native capability called from the script failed.
    Native,
}

impl ScriptErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptErrorKind::FileNotFound => "file not found",
            ScriptErrorKind::Io => "io",
            ScriptErrorKind::Syntax => "syntax",
            ScriptErrorKind::NotAFactory => "not a factory",
            ScriptErrorKind::NotADescriptor => "not a descriptor",
            ScriptErrorKind::Runtime => "runtime",
            ScriptErrorKind::Native => "native",
        }
    }

    /// Whether this kind is produced while loading, as opposed to invoking.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            ScriptErrorKind::FileNotFound
                | ScriptErrorKind::Io
                | ScriptErrorKind::Syntax
                | ScriptErrorKind::NotAFactory
                | ScriptErrorKind::NotADescriptor
        )
    }
}

/// Error from a script load or hook invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptError {
    pub kind: ScriptErrorKind,
    pub message: String,
}

impl ScriptError {
    pub fn new(kind: ScriptErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ScriptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "script error ({}): {}", self.kind.as_str(), self.message)
    }
}

impl std::error::Error for ScriptError {}

/// A loaded bot program.
///
/// A module that failed to load is still a module: it reports its error and
/// every invocation is skipped.
pub trait ScriptModulePort {
    /// Program name (file stem or path it was loaded from).
    fn name(&self) -> &str;

    /// Last error message, empty when clear.
    fn error(&self) -> &str;

    fn error_kind(&self) -> Option<ScriptErrorKind>;

    fn have_error(&self) -> bool {
        !self.error().is_empty()
    }

    /// Whether the descriptor defines `hook`.
    fn has_hook(&self, hook: LifecycleHook) -> bool;

    /// Protected call of `hook`. Clears the error first, so an absent hook
    /// leaves the module error-free; on failure the error is recorded and
    /// returned. A module that failed to load keeps its load error and
    /// skips every hook.
    fn invoke(&mut self, hook: LifecycleHook) -> Result<InvokeOutcome, ScriptError>;

    /// Fire-and-forget call of `hook`. Failures are logged and recorded but
    /// not returned.
    fn fire(&mut self, hook: LifecycleHook) -> InvokeOutcome {
        match self.invoke(hook) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(target: "lua", "{}.{}: {}", self.name(), hook, e.message);
                InvokeOutcome::Failed
            }
        }
    }

    /// Call `hook` in the given style. Fire-and-forget never returns an
    /// error; a failure shows up as [`InvokeOutcome::Failed`].
    fn call(
        &mut self,
        hook: LifecycleHook,
        style: CallStyle,
    ) -> Result<InvokeOutcome, ScriptError> {
        match style {
            CallStyle::MustSucceed => self.invoke(hook),
            CallStyle::FireAndForget => Ok(self.fire(hook)),
        }
    }
}

/// Port for loading bot programs into the engine.
pub trait ScriptLoaderPort {
    /// Load `program` (a name resolved against the search path, or a path).
    /// Never fails: load errors are carried by the returned module.
    fn load_program(&self, program: &str) -> Box<dyn ScriptModulePort>;

    /// Bot programs available in the script directories, sorted.
    fn list_programs(&self) -> Vec<String>;

    /// Run a full garbage collection cycle.
    fn collect_garbage(&self);
}
