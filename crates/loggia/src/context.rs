//! crates/loggia/src/context.rs
//! Explicit layered context supplying values for capture directives.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::format::CAPTURE_MARKER;
use crate::record::CallSite;

/// Named values a caller supplies alongside a log call.
///
/// The context replaces implicit call-stack inspection with an explicit
/// contract: three layers mirror the lexical scopes a capture directive used
/// to be resolved against. From least to most specific they are the module
/// scope ("globals"), the call scope ("locals"), and contextual-object
/// attributes ("self"). When several layers bind the same name, the most
/// specific binding wins.
///
/// Resolution never fails: a name bound in no layer leaves the directive's
/// sentinel default in place.
///
/// # Examples
///
/// ```
/// use loggia::LogContext;
///
/// let ctx = LogContext::new()
///     .global("request_id", "r-17")
///     .local("attempt", 3)
///     .attr("worker", "w-2");
///
/// assert_eq!(ctx.lookup("attempt"), Some("3"));
/// assert_eq!(ctx.lookup("nope"), None);
/// ```
#[derive(Clone, Debug, Default)]
pub struct LogContext {
    module_scope: HashMap<String, String>,
    call_scope: HashMap<String, String>,
    attrs: HashMap<String, String>,
    function: Option<String>,
}

impl LogContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a name in the module scope, the least specific layer.
    #[must_use]
    pub fn global(mut self, name: impl Into<String>, value: impl fmt::Display) -> Self {
        self.module_scope.insert(name.into(), value.to_string());
        self
    }

    /// Binds a name in the call scope, overriding the module scope.
    #[must_use]
    pub fn local(mut self, name: impl Into<String>, value: impl fmt::Display) -> Self {
        self.call_scope.insert(name.into(), value.to_string());
        self
    }

    /// Binds a contextual-object attribute, the most specific layer.
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl fmt::Display) -> Self {
        self.attrs.insert(name.into(), value.to_string());
        self
    }

    /// Records the enclosing function's name for the `funcName` field.
    ///
    /// Rust offers no portable function-name introspection, so this is the
    /// only source for that field; without it the sentinel is emitted.
    #[must_use]
    pub fn function(mut self, name: impl Into<String>) -> Self {
        self.function = Some(name.into());
        self
    }

    /// Returns the most specific binding for `name`, if any.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.attrs
            .get(name)
            .or_else(|| self.call_scope.get(name))
            .or_else(|| self.module_scope.get(name))
            .map(String::as_str)
    }

    /// Returns the recorded function name, if any.
    #[must_use]
    pub fn function_name(&self) -> Option<&str> {
        self.function.as_deref()
    }

    /// Reports whether no layer binds any name.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.module_scope.is_empty()
            && self.call_scope.is_empty()
            && self.attrs.is_empty()
            && self.function.is_none()
    }

    /// Resolves a directive table against this context and a call site.
    ///
    /// The result starts from the table's sentinel defaults; resolution only
    /// overwrites keys, never removes them, so every directive the compiled
    /// format expects is present afterwards. Invoked once per emitted record
    /// and never fails.
    #[must_use]
    pub fn resolve(
        &self,
        directives: &BTreeMap<String, String>,
        call_site: CallSite,
    ) -> BTreeMap<String, String> {
        let mut resolved = directives.clone();
        for (key, value) in &mut resolved {
            if let Some(name) = key.strip_prefix(CAPTURE_MARKER) {
                if let Some(bound) = self.lookup(name) {
                    *value = bound.to_owned();
                }
            } else {
                match key.as_str() {
                    "mod" => *value = call_site.module().to_owned(),
                    "fl_name" => *value = call_site.file_name().to_owned(),
                    "func" => {
                        if let Some(function) = self.function_name() {
                            *value = function.to_owned();
                        }
                    }
                    _ => {}
                }
            }
        }
        resolved
    }
}
