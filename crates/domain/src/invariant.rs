//! Ordered business-rule evaluation.
//!
//! Each command method builds an ordered list of invariants and checks them
//! against the loaded aggregate state before emitting any events. Evaluation
//! short-circuits on the first failure, and the failing rule's description is
//! returned verbatim to the caller.

/// A single business rule: a description and a predicate over the state.
pub struct Invariant<'a, S> {
    description: String,
    check: Box<dyn Fn(&S) -> bool + Send + Sync + 'a>,
}

impl<'a, S> Invariant<'a, S> {
    pub fn new(
        description: impl Into<String>,
        check: impl Fn(&S) -> bool + Send + Sync + 'a,
    ) -> Self {
        Self {
            description: description.into(),
            check: Box::new(check),
        }
    }

    /// The human-readable rule description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Evaluates the rule against a state.
    pub fn holds(&self, state: &S) -> bool {
        (self.check)(state)
    }
}

impl<S> std::fmt::Debug for Invariant<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invariant")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Checks invariants in order, returning the description of the first rule
/// that does not hold. Rules after the first failure are not evaluated.
pub fn check_invariants<S>(state: &S, invariants: &[Invariant<'_, S>]) -> Result<(), String> {
    for invariant in invariants {
        if !invariant.holds(state) {
            return Err(invariant.description().to_string());
        }
    }
    Ok(())
}
