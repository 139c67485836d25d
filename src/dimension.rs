//! Scrollable range tracking.
//!
//! Each axis of a pane has a [`PaneDimension`] that computes how far the content can be moved
//! given the container size and the content size. Offsets are negative: `max` is the resting
//! position (normally `0`) and `min` is the offset at which the far edge of the content lines up
//! with the far edge of the container.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::event::{EventSource, Subscription};
use crate::movable::Axis;

/// Source of the container and content extents.
pub trait Geometry {
    /// Extent of the visible container along the axis.
    fn container_size(&self, axis: Axis) -> f64;

    /// Full extent of the content along the axis.
    fn content_size(&self, axis: Axis) -> f64;
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Size {
    pub w: f64,
    pub h: f64,
}

/// Container and content sizes set directly by the host.
#[derive(Debug, Default)]
pub struct Extents {
    container: Cell<Size>,
    content: Cell<Size>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportChange {
    Resize,
    OrientationChange,
}

/// Process-wide viewport notifications, fired by the host on window resize and on orientation
/// change.
pub type ViewportEvents = EventSource<ViewportChange>;

pub struct PaneDimension {
    axis: Axis,
    geometry: Rc<dyn Geometry>,
    /// Container extent as of the last update.
    size: Cell<f64>,
    /// Content extent as of the last update.
    total: Cell<f64>,
    min: Cell<f64>,
    max: Cell<f64>,
    changed: EventSource<PaneDimension>,
}

/// Both axes of a pane, kept up to date with the viewport.
pub struct PaneDimensions {
    x: Rc<RefCell<PaneDimension>>,
    y: Rc<RefCell<PaneDimension>>,
    _viewport: Subscription,
}

impl Size {
    pub fn new(w: f64, h: f64) -> Self {
        Self { w, h }
    }

    pub fn along(self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.w,
            Axis::Y => self.h,
        }
    }
}

impl Extents {
    pub fn new(container: Size, content: Size) -> Self {
        Self {
            container: Cell::new(container),
            content: Cell::new(content),
        }
    }

    pub fn set_container(&self, size: Size) {
        self.container.set(size);
    }

    pub fn set_content(&self, size: Size) {
        self.content.set(size);
    }
}

impl Geometry for Extents {
    fn container_size(&self, axis: Axis) -> f64 {
        self.container.get().along(axis)
    }

    fn content_size(&self, axis: Axis) -> f64 {
        self.content.get().along(axis)
    }
}

impl PaneDimension {
    /// Creates a tracker for one axis.
    ///
    /// The range stays empty until the first [`PaneDimension::update`].
    pub fn new(axis: Axis, geometry: Rc<dyn Geometry>) -> Self {
        Self {
            axis,
            geometry,
            size: Cell::new(0.),
            total: Cell::new(0.),
            min: Cell::new(0.),
            max: Cell::new(0.),
            changed: EventSource::new(),
        }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn size(&self) -> f64 {
        self.size.get()
    }

    pub fn total(&self) -> f64 {
        self.total.get()
    }

    pub fn min(&self) -> f64 {
        self.min.get()
    }

    pub fn max(&self) -> f64 {
        self.max.get()
    }

    /// Returns the scrollable span.
    ///
    /// Zero or less means the content fits into the container and does not scroll.
    pub fn present(&self) -> f64 {
        self.max() - self.min()
    }

    pub fn out_of_bounds(&self, offset: f64) -> bool {
        offset > self.max() || offset < self.min()
    }

    /// Re-reads the geometry, recomputes the range and notifies the change listeners.
    ///
    /// Listeners may read this tracker, or drag a pane bounded by it, while being notified.
    pub fn update(&self) {
        let _span = tracy_client::span!("PaneDimension::update");

        let size = self.geometry.container_size(self.axis);
        let total = self.geometry.content_size(self.axis);
        self.size.set(size);
        self.total.set(total);
        self.min.set(f64::min(self.max(), size - total));

        trace!(
            "{} dimension: size={} total={} range={}..={}",
            self.axis,
            size,
            total,
            self.min(),
            self.max()
        );

        self.changed.emit(self);
    }

    /// Subscribes to range updates; the listener receives the updated tracker.
    pub fn on_change(&self, listener: impl Fn(&PaneDimension) + 'static) -> Subscription {
        self.changed.subscribe(listener)
    }
}

impl fmt::Debug for PaneDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaneDimension")
            .field("axis", &self.axis)
            .field("size", &self.size())
            .field("total", &self.total())
            .field("min", &self.min())
            .field("max", &self.max())
            .finish_non_exhaustive()
    }
}

impl PaneDimensions {
    /// Creates the trackers for both axes and refreshes them on every viewport change.
    ///
    /// The viewport listener is removed when this is dropped.
    pub fn new(geometry: Rc<dyn Geometry>, viewport: &ViewportEvents) -> Self {
        let x = Rc::new(RefCell::new(PaneDimension::new(Axis::X, geometry.clone())));
        let y = Rc::new(RefCell::new(PaneDimension::new(Axis::Y, geometry)));

        let viewport = viewport.subscribe({
            let x = Rc::downgrade(&x);
            let y = Rc::downgrade(&y);
            move |change| {
                debug!("refreshing pane dimensions after {change:?}");
                for dimension in [&x, &y] {
                    if let Some(dimension) = dimension.upgrade() {
                        dimension.borrow().update();
                    }
                }
            }
        });

        Self {
            x,
            y,
            _viewport: viewport,
        }
    }

    pub fn refresh(&self) {
        self.x.borrow().update();
        self.y.borrow().update();
    }

    pub fn x(&self) -> &Rc<RefCell<PaneDimension>> {
        &self.x
    }

    pub fn y(&self) -> &Rc<RefCell<PaneDimension>> {
        &self.y
    }

    pub fn get(&self, axis: Axis) -> &Rc<RefCell<PaneDimension>> {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
        }
    }
}

impl fmt::Debug for PaneDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaneDimensions")
            .field("x", &*self.x.borrow())
            .field("y", &*self.y.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn extents(container: (f64, f64), content: (f64, f64)) -> Rc<Extents> {
        Rc::new(Extents::new(
            Size::new(container.0, container.1),
            Size::new(content.0, content.1),
        ))
    }

    #[test]
    fn horizontal_scroll_range() {
        let dim = PaneDimension::new(Axis::X, extents((100., 50.), (300., 50.)));
        dim.update();

        assert_eq!(dim.size(), 100.);
        assert_eq!(dim.total(), 300.);
        assert_eq!(dim.min(), -200.);
        assert_eq!(dim.max(), 0.);
        assert_eq!(dim.present(), 200.);
    }

    #[test]
    fn content_smaller_than_container_does_not_scroll() {
        let dim = PaneDimension::new(Axis::Y, extents((100., 400.), (100., 150.)));
        dim.update();

        assert_eq!(dim.min(), 0.);
        assert_eq!(dim.present(), 0.);
    }

    #[test]
    fn empty_geometry() {
        let dim = PaneDimension::new(Axis::X, Rc::new(Extents::default()));
        assert_eq!(dim.present(), 0.);

        dim.update();
        assert_eq!(dim.min(), 0.);
        assert_eq!(dim.max(), 0.);
        assert_eq!(dim.present(), 0.);
    }

    #[test]
    fn out_of_bounds_edges() {
        let dim = PaneDimension::new(Axis::X, extents((100., 0.), (300., 0.)));
        dim.update();

        assert!(!dim.out_of_bounds(0.));
        assert!(!dim.out_of_bounds(-200.));
        assert!(dim.out_of_bounds(0.5));
        assert!(dim.out_of_bounds(-200.5));
    }

    #[test]
    fn update_notifies_with_tracker() {
        let dim = PaneDimension::new(Axis::X, extents((100., 0.), (300., 0.)));
        let seen = Rc::new(Cell::new(None));
        let _sub = dim.on_change({
            let seen = seen.clone();
            move |dim| seen.set(Some((dim.axis(), dim.min())))
        });

        dim.update();
        assert_eq!(seen.get(), Some((Axis::X, -200.)));
    }

    #[test]
    fn listener_can_read_other_trackers_during_refresh() {
        let geometry = extents((100., 100.), (300., 250.));
        let viewport = ViewportEvents::new();
        let dims = Rc::new(PaneDimensions::new(geometry, &viewport));

        let seen = Rc::new(Cell::new(None));
        let _sub = dims.y().borrow().on_change({
            let dims = Rc::downgrade(&dims);
            let seen = seen.clone();
            move |_| {
                let dims = dims.upgrade().unwrap();
                let x = dims.x().borrow();
                let y = dims.y().borrow();
                seen.set(Some((x.min(), y.min(), y.present())));
            }
        });

        viewport.emit(&ViewportChange::Resize);
        assert_eq!(seen.get(), Some((-200., -150., 150.)));
    }

    #[test]
    fn viewport_change_refreshes_both_axes() {
        let geometry = extents((100., 100.), (100., 100.));
        let viewport = ViewportEvents::new();
        let dims = PaneDimensions::new(geometry.clone(), &viewport);
        assert_eq!(dims.x().borrow().present(), 0.);

        geometry.set_content(Size::new(250., 400.));
        viewport.emit(&ViewportChange::Resize);
        assert_eq!(dims.x().borrow().min(), -150.);
        assert_eq!(dims.y().borrow().min(), -300.);

        geometry.set_container(Size::new(400., 100.));
        viewport.emit(&ViewportChange::OrientationChange);
        assert_eq!(dims.get(Axis::X).borrow().present(), 0.);
        assert_eq!(dims.get(Axis::Y).borrow().present(), 300.);
    }

    #[test]
    fn dropping_dimensions_unsubscribes_from_viewport() {
        let viewport = ViewportEvents::new();
        let dims = PaneDimensions::new(Rc::new(Extents::default()), &viewport);
        assert_eq!(viewport.listener_count(), 1);

        drop(dims);
        assert_eq!(viewport.listener_count(), 0);
        viewport.emit(&ViewportChange::Resize);
    }

    proptest! {
        #[test]
        fn range_invariants(
            container in (0f64..5000., 0f64..5000.),
            content in (0f64..5000., 0f64..5000.),
        ) {
            let dims = PaneDimensions::new(extents(container, content), &ViewportEvents::new());
            dims.refresh();

            for axis in Axis::ALL {
                let dim = dims.get(axis).borrow();
                prop_assert_eq!(dim.min(), f64::min(dim.max(), dim.size() - dim.total()));
                prop_assert_eq!(dim.max() - dim.min(), dim.present());
                prop_assert!(dim.min() <= dim.max());
            }
        }

        #[test]
        fn out_of_bounds_matches_range(
            container in 0f64..5000.,
            content in 0f64..5000.,
            offset in -10_000f64..10_000.,
        ) {
            let dim = PaneDimension::new(Axis::X, extents((container, 0.), (content, 0.)));
            dim.update();
            prop_assert_eq!(
                dim.out_of_bounds(offset),
                offset > dim.max() || offset < dim.min()
            );
        }
    }
}
