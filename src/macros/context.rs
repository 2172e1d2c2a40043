use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative stop flag for a macro run
///
/// Cheap to clone; every clone observes the same flag, so a hook callback or
/// another thread can end a run that is blocked in this one.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Per-run state: user variables plus the stop flag
#[derive(Debug, Default)]
pub struct MacroContext {
    macro_name: String,
    variables: HashMap<String, Value>,
    stop: StopHandle,
}

impl MacroContext {
    pub fn new(macro_name: impl Into<String>) -> Self {
        Self {
            macro_name: macro_name.into(),
            ..Self::default()
        }
    }

    pub fn with_variables(
        macro_name: impl Into<String>,
        variables: HashMap<String, Value>,
        stop: StopHandle,
    ) -> Self {
        Self {
            macro_name: macro_name.into(),
            variables,
            stop,
        }
    }

    /// Name of the macro this context belongs to
    pub fn macro_name(&self) -> &str {
        &self.macro_name
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.variables.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.variables.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Add `by` to an integer variable (missing or non-integer counts as 0)
    /// and return the new value. Saturates at the `i64` bounds.
    pub fn increment(&mut self, name: &str, by: i64) -> i64 {
        let value = self.get_i64(name).unwrap_or(0).saturating_add(by);
        self.set(name, value);
        value
    }

    pub fn variables(&self) -> &HashMap<String, Value> {
        &self.variables
    }

    pub fn into_variables(self) -> HashMap<String, Value> {
        self.variables
    }

    /// Request that the run end at its next check point
    pub fn stop(&self) {
        self.stop.stop();
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_stopped()
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }
}
