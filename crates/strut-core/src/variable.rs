//! Solver variables.
//!
//! A [`Variable`] is a cheap, cloneable handle. Clones denote the same
//! logical variable: equality, hashing and ordering follow the shared
//! allocation, never the name.

use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, PoisonError, RwLock};

/// Opaque caller data attached to a variable.
pub type Context = Arc<dyn Any + Send + Sync>;

static NEXT_VARIABLE_ID: AtomicU64 = AtomicU64::new(1);

struct VariableData {
    id: u64,
    name: RwLock<String>,
    /// `f64` bit pattern of the last solved value.
    value: AtomicU64,
    context: RwLock<Option<Context>>,
}

/// A real-valued unknown whose value is written back by the solver.
#[derive(Clone)]
pub struct Variable(Arc<VariableData>);

impl Variable {
    /// Create a new variable with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self::build(name.into(), None)
    }

    /// Create a new variable carrying caller context.
    pub fn with_context(name: impl Into<String>, context: Context) -> Self {
        Self::build(name.into(), Some(context))
    }

    fn build(name: String, context: Option<Context>) -> Self {
        Self(Arc::new(VariableData {
            id: NEXT_VARIABLE_ID.fetch_add(1, AtomicOrdering::Relaxed),
            name: RwLock::new(name),
            value: AtomicU64::new(0f64.to_bits()),
            context: RwLock::new(context),
        }))
    }

    /// Process-unique identity of this variable.
    pub fn id(&self) -> u64 {
        self.0.id
    }

    pub fn name(&self) -> String {
        self.0
            .name
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        *self.0.name.write().unwrap_or_else(PoisonError::into_inner) = name.into();
    }

    /// The value computed by the most recent solve.
    ///
    /// Stale after any solver mutation until the next `solve`.
    pub fn value(&self) -> f64 {
        f64::from_bits(self.0.value.load(AtomicOrdering::Relaxed))
    }

    pub fn set_value(&self, value: f64) {
        self.0.value.store(value.to_bits(), AtomicOrdering::Relaxed);
    }

    pub fn context(&self) -> Option<Context> {
        self.0
            .context
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_context(&self, context: Option<Context>) {
        *self.0.context.write().unwrap_or_else(PoisonError::into_inner) = context;
    }
}

impl Default for Variable {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Variable {}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl PartialOrd for Variable {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Variable {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.id.cmp(&other.0.id)
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variable")
            .field("name", &self.name())
            .field("value", &self.value())
            .finish()
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
