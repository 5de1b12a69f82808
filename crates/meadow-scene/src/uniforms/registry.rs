use std::rc::{Rc, Weak};

use super::{SharedValue, UniformSet};

/// Per-scene list of uniform sets that follow the clock and the viewport.
///
/// The registry holds non-owning references: it never creates or destroys a
/// set, and a set whose owner is gone is skipped.
///
/// Registration performs no de-duplication. Registering the same set twice
/// makes every broadcast write it twice; because each write overwrites the
/// cell with the same value, the final state is identical to a single write.
/// This double-write idempotence is part of the contract.
///
/// `register` needs `&mut self` while `for_each` works on `&self`, so a
/// registration from inside a `for_each` callback does not compile.
#[derive(Default)]
pub struct UniformRegistry {
    sets: Vec<Weak<UniformSet>>,
}

impl UniformRegistry {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a non-owning reference to `set`.
    pub fn register(&mut self, set: &Rc<UniformSet>) {
        log::debug!("uniform set '{}' registered", set.label());
        self.sets.push(Rc::downgrade(set));
    }

    /// Number of registrations (including duplicates and dropped sets).
    #[inline]
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Applies `f` to every live registered set, in registration order.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&UniformSet),
    {
        for weak in &self.sets {
            if let Some(set) = weak.upgrade() {
                f(&set);
            }
        }
    }

    /// Writes `value` into every registered set declaring that parameter.
    ///
    /// Sets without it are skipped silently. Returns the number of writes.
    pub fn broadcast(&self, value: SharedValue) -> usize {
        let mut writes = 0;
        self.for_each(|set| {
            if set.apply(value) {
                writes += 1;
            }
        });
        writes
    }
}

impl std::fmt::Debug for UniformRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UniformRegistry")
            .field("registrations", &self.sets.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uniforms::{SharedUniform, UniformValue};

    fn full(label: &str) -> Rc<UniformSet> {
        Rc::new(UniformSet::builder(label).with_shared().build())
    }

    #[test]
    fn broadcast_reaches_declaring_sets_in_order() {
        let a = full("a");
        let b = Rc::new(
            UniformSet::builder("b")
                .shared(SharedUniform::Resolution)
                .param("diffuseTexture", UniformValue::Float(0.0))
                .build(),
        );
        let c = full("c");

        let mut registry = UniformRegistry::new();
        registry.register(&a);
        registry.register(&b);
        registry.register(&c);

        let mut order = Vec::new();
        registry.for_each(|set| order.push(set.label().to_string()));
        assert_eq!(order, ["a", "b", "c"]);

        assert_eq!(registry.broadcast(SharedValue::Time(4.0)), 2);
        assert_eq!(a.time(), Some(4.0));
        assert_eq!(b.time(), None);
        assert_eq!(c.time(), Some(4.0));
    }

    #[test]
    fn duplicate_registration_double_writes_with_same_final_value() {
        let a = full("a");
        let mut registry = UniformRegistry::new();
        registry.register(&a);
        registry.register(&a);
        assert_eq!(registry.len(), 2);

        registry.broadcast(SharedValue::Time(1.25));
        assert_eq!(a.time(), Some(1.25));

        registry.broadcast(SharedValue::Resolution([1600.0, 1200.0]));
        assert_eq!(a.resolution(), Some([1600.0, 1200.0]));
    }

    #[test]
    fn dropped_sets_are_skipped() {
        let a = full("a");
        let mut registry = UniformRegistry::new();
        registry.register(&a);
        {
            let gone = full("gone");
            registry.register(&gone);
        }

        assert_eq!(registry.broadcast(SharedValue::Time(3.0)), 1);
        assert_eq!(a.time(), Some(3.0));
    }

    #[test]
    fn registries_are_independent() {
        let a = full("a");
        let b = full("b");
        let mut first = UniformRegistry::new();
        let mut second = UniformRegistry::new();
        first.register(&a);
        second.register(&b);

        first.broadcast(SharedValue::Time(7.0));
        assert_eq!(a.time(), Some(7.0));
        assert_eq!(b.time(), Some(0.0));
    }
}
