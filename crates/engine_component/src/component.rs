//! The [`Component`] trait.
//!
//! A component is one unit of per-object behavior. It is owned by exactly one
//! [`Object`](crate::Object) for its whole life and talks to other components
//! only through ports it creates at construction time.
//!
//! ## Lifecycle
//!
//! 1. Built through [`ObjectBuilder::add_component`](crate::ObjectBuilder::add_component),
//!    which registers its ports.
//! 2. [`Component::initialize`] at the next frame boundary.
//! 3. [`Component::update`] once per frame after that.
//! 4. Its ports are released, then [`Component::destroy`] runs exactly once,
//!    then it is dropped.

use std::any::Any;

use crate::context::FrameContext;

/// Upcast helper so trait objects can be downcast to their concrete type.
///
/// Implemented for every `'static` type; component authors never implement
/// it by hand.
pub trait AsAny: Any {
    /// `self` as [`Any`].
    fn as_any(&self) -> &dyn Any;
    /// `self` as mutable [`Any`].
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Per-object behavior with lifecycle hooks.
///
/// Every hook has a no-op default, so a component implements only the ones it
/// needs.
///
/// # Examples
///
/// ```rust
/// use engine_component::{Component, FrameContext};
/// use engine_connect::{PortRegistrar, PropertyOut};
///
/// struct Counter {
///     ticks: PropertyOut<u64>,
/// }
///
/// impl Counter {
///     fn new(ports: &mut PortRegistrar<'_>) -> Self {
///         Self { ticks: PropertyOut::new(ports, 0) }
///     }
/// }
///
/// impl Component for Counter {
///     fn update(&mut self, _ctx: &mut FrameContext<'_>) {
///         self.ticks.update(|t| *t += 1);
///     }
/// }
/// ```
pub trait Component: AsAny {
    /// Human-readable name, used in logs.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Called once, at the first frame boundary after the owning object was
    /// created.
    fn initialize(&mut self, _ctx: &mut FrameContext<'_>) {}

    /// Called once per frame while the owning object is live.
    fn update(&mut self, _ctx: &mut FrameContext<'_>) {}

    /// Called once when the owning object is torn down. The component's ports
    /// are already unlinked.
    fn destroy(&mut self, _ctx: &mut FrameContext<'_>) {}
}

impl dyn Component {
    /// Downcast to a concrete component type.
    #[must_use]
    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        AsAny::as_any(self).downcast_ref::<T>()
    }

    /// Mutably downcast to a concrete component type.
    #[must_use]
    pub fn downcast_mut<T: Component>(&mut self) -> Option<&mut T> {
        AsAny::as_any_mut(self).downcast_mut::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker;
    impl Component for Marker {}

    struct Named;
    impl Component for Named {
        fn name(&self) -> &'static str {
            "named"
        }
    }

    #[test]
    fn test_downcast_to_concrete_type() {
        let mut boxed: Box<dyn Component> = Box::new(Marker);
        assert!(boxed.downcast_ref::<Marker>().is_some());
        assert!(boxed.downcast_ref::<Named>().is_none());
        assert!(boxed.downcast_mut::<Marker>().is_some());
    }

    #[test]
    fn test_default_name_is_type_name() {
        let marker: Box<dyn Component> = Box::new(Marker);
        assert!(marker.name().ends_with("Marker"));
        let named: Box<dyn Component> = Box::new(Named);
        assert_eq!(named.name(), "named");
    }
}
