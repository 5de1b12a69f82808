use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::assets::Texture;

/// Parameters with registry-driven updates.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SharedUniform {
    /// Seconds since the frame loop started (scalar).
    Time,
    /// Output size in device pixels (2-component).
    Resolution,
}

impl SharedUniform {
    pub const ALL: [SharedUniform; 2] = [SharedUniform::Time, SharedUniform::Resolution];

    /// Name the parameter carries in shader programs.
    pub const fn name(self) -> &'static str {
        match self {
            SharedUniform::Time => "time",
            SharedUniform::Resolution => "resolution",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|u| u.name() == name)
    }
}

impl fmt::Display for SharedUniform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value for one of the shared parameters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SharedValue {
    Time(f32),
    Resolution([f32; 2]),
}

impl SharedValue {
    pub fn uniform(self) -> SharedUniform {
        match self {
            SharedValue::Time(_) => SharedUniform::Time,
            SharedValue::Resolution(_) => SharedUniform::Resolution,
        }
    }
}

/// Value of an element-specific parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Texture(Rc<Texture>),
}

/// Named parameters of one shader program.
///
/// Every entry is a mutable cell: writers go through `&self`, so the set can be
/// shared between its owning material and the [`UniformRegistry`](super::UniformRegistry)
/// without exclusive borrows. Single-threaded by construction (`Rc`/`Cell`).
pub struct UniformSet {
    label: String,
    time: Option<Cell<f32>>,
    resolution: Option<Cell<[f32; 2]>>,
    params: Vec<(String, RefCell<UniformValue>)>,
}

impl UniformSet {
    pub fn builder(label: impl Into<String>) -> UniformSetBuilder {
        UniformSetBuilder {
            set: UniformSet {
                label: label.into(),
                time: None,
                resolution: None,
                params: Vec::new(),
            },
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Capability check: does this set carry `uniform`?
    pub fn declares(&self, uniform: SharedUniform) -> bool {
        match uniform {
            SharedUniform::Time => self.time.is_some(),
            SharedUniform::Resolution => self.resolution.is_some(),
        }
    }

    /// Overwrites the shared parameter if declared. Returns whether a write happened.
    pub fn apply(&self, value: SharedValue) -> bool {
        match (value, &self.time, &self.resolution) {
            (SharedValue::Time(t), Some(cell), _) => {
                cell.set(t);
                true
            }
            (SharedValue::Resolution(r), _, Some(cell)) => {
                cell.set(r);
                true
            }
            _ => false,
        }
    }

    pub fn time(&self) -> Option<f32> {
        self.time.as_ref().map(Cell::get)
    }

    pub fn resolution(&self) -> Option<[f32; 2]> {
        self.resolution.as_ref().map(Cell::get)
    }

    /// Returns a copy of an element-specific parameter.
    pub fn param(&self, name: &str) -> Option<UniformValue> {
        self.find(name).map(|cell| cell.borrow().clone())
    }

    /// Returns the texture bound under `name`, if that parameter is a texture.
    pub fn texture(&self, name: &str) -> Option<Rc<Texture>> {
        match &*self.find(name)?.borrow() {
            UniformValue::Texture(t) => Some(Rc::clone(t)),
            _ => None,
        }
    }

    /// Overwrites an existing element-specific parameter.
    ///
    /// Unknown names are ignored (returns `false`); parameters are declared at
    /// construction time only.
    pub fn set_param(&self, name: &str, value: UniformValue) -> bool {
        match self.find(name) {
            Some(cell) => {
                *cell.borrow_mut() = value;
                true
            }
            None => false,
        }
    }

    /// Names of every parameter, shared ones first.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        SharedUniform::ALL
            .into_iter()
            .filter(|u| self.declares(*u))
            .map(|u| -> &str { u.name() })
            .chain(self.params.iter().map(|(name, _)| name.as_str()))
    }

    fn find(&self, name: &str) -> Option<&RefCell<UniformValue>> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, cell)| cell)
    }
}

impl fmt::Debug for UniformSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UniformSet")
            .field("label", &self.label)
            .field("time", &self.time())
            .field("resolution", &self.resolution())
            .field("params", &self.params.iter().map(|(n, _)| n).collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for [`UniformSet`].
pub struct UniformSetBuilder {
    set: UniformSet,
}

impl UniformSetBuilder {
    /// Declares a shared parameter with its neutral initial value
    /// (`time = 0`, `resolution = (1, 1)`).
    pub fn shared(mut self, uniform: SharedUniform) -> Self {
        match uniform {
            SharedUniform::Time => self.set.time = Some(Cell::new(0.0)),
            SharedUniform::Resolution => self.set.resolution = Some(Cell::new([1.0, 1.0])),
        }
        self
    }

    /// Declares both `time` and `resolution`.
    pub fn with_shared(self) -> Self {
        SharedUniform::ALL.into_iter().fold(self, Self::shared)
    }

    /// Declares an element-specific parameter.
    ///
    /// Shared names are reserved for [`shared`](Self::shared); passing one here
    /// is ignored with a warning. A repeated name overwrites the earlier value.
    pub fn param(mut self, name: impl Into<String>, value: UniformValue) -> Self {
        let name = name.into();
        if let Some(shared) = SharedUniform::from_name(&name) {
            log::warn!(
                "uniform set '{}': '{shared}' is a shared parameter, declare it with `shared()`",
                self.set.label
            );
            return self;
        }

        match self.set.params.iter_mut().find(|(n, _)| *n == name) {
            Some((_, cell)) => *cell.get_mut() = value,
            None => self.set.params.push((name, RefCell::new(value))),
        }
        self
    }

    pub fn build(self) -> UniformSet {
        self.set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grass_like() -> UniformSet {
        UniformSet::builder("grass")
            .with_shared()
            .param("grassParams", UniformValue::Vec4([6.0, 25.0, 0.25, 2.0]))
            .build()
    }

    // ── shared parameters ─────────────────────────────────────────────────

    #[test]
    fn shared_parameters_start_neutral() {
        let set = grass_like();
        assert_eq!(set.time(), Some(0.0));
        assert_eq!(set.resolution(), Some([1.0, 1.0]));
    }

    #[test]
    fn apply_writes_declared_parameters_only() {
        let set = UniformSet::builder("sky-ish").shared(SharedUniform::Time).build();

        assert!(set.apply(SharedValue::Time(2.5)));
        assert!(!set.apply(SharedValue::Resolution([10.0, 10.0])));
        assert_eq!(set.time(), Some(2.5));
        assert_eq!(set.resolution(), None);
        assert!(!set.declares(SharedUniform::Resolution));
    }

    #[test]
    fn shared_names_round_trip() {
        for u in SharedUniform::ALL {
            assert_eq!(SharedUniform::from_name(u.name()), Some(u));
        }
        assert_eq!(SharedUniform::from_name("grassParams"), None);
    }

    // ── element parameters ────────────────────────────────────────────────

    #[test]
    fn reserved_names_are_not_element_params() {
        let set = UniformSet::builder("x")
            .param("time", UniformValue::Float(9.0))
            .build();
        assert!(!set.declares(SharedUniform::Time));
        assert_eq!(set.param("time"), None);
    }

    #[test]
    fn set_param_updates_existing_and_ignores_unknown() {
        let set = grass_like();
        assert!(set.set_param("grassParams", UniformValue::Vec4([1.0; 4])));
        assert_eq!(set.param("grassParams"), Some(UniformValue::Vec4([1.0; 4])));
        assert!(!set.set_param("wind", UniformValue::Float(1.0)));
    }

    #[test]
    fn names_lists_shared_then_element() {
        let set = grass_like();
        let names: Vec<&str> = set.names().collect();
        assert_eq!(names, ["time", "resolution", "grassParams"]);
    }
}
