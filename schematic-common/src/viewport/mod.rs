//! Overlay canvas state for the schematic viewer
//!
//! Holds everything the viewer needs between input events: the page transform,
//! an in-progress pan, which component is hovered or selected, and which overlay
//! layers are visible. Rendering is left to the UI layer; this module only answers
//! "where is it" and "what is under the pointer".

mod navigator;
mod transform;

pub use navigator::{confidence_level, ConfidenceLevel, PageNavigator};
pub use transform::{MouseButton, PanGesture, Point, Size, Transform, MAX_SCALE, MIN_SCALE};

use serde::{Deserialize, Serialize};

use crate::models::Component;

/// Which overlay layers are drawn
///
/// The connection layer starts hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayVisibility {
    pub components: bool,
    pub text: bool,
    pub connections: bool,
}

impl Default for OverlayVisibility {
    fn default() -> Self {
        Self {
            components: true,
            text: true,
            connections: false,
        }
    }
}

/// Topmost component under a page-space point
///
/// Components are drawn in slice order, so the last match is on top.
pub fn hit_test<'a>(components: &'a [Component], page_point: Point) -> Option<&'a Component> {
    components
        .iter()
        .rev()
        .find(|c| c.bbox.contains(page_point.x, page_point.y))
}

/// Viewer state for one page
#[derive(Debug, Clone)]
pub struct Viewport {
    container: Size,
    page: Size,
    transform: Transform,
    pan: PanGesture,
    hovered: Option<String>,
    selected: Option<String>,
    pub visibility: OverlayVisibility,
}

impl Viewport {
    /// Start fitted to the container
    pub fn new(container: Size, page: Size) -> Self {
        Self {
            container,
            page,
            transform: Transform::fit(container, page),
            pan: PanGesture::default(),
            hovered: None,
            selected: None,
            visibility: OverlayVisibility::default(),
        }
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_panning(&self) -> bool {
        self.pan.is_panning()
    }

    /// Re-fit after a page change or container resize
    pub fn set_page(&mut self, container: Size, page: Size) {
        self.container = container;
        self.page = page;
        self.fit();
        self.hovered = None;
    }

    /// "Reset view" button
    pub fn fit(&mut self) {
        self.transform = Transform::fit(self.container, self.page);
    }

    pub fn zoom_in(&mut self) {
        self.transform = self.transform.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.transform = self.transform.zoom_out();
    }

    /// Wheel event at a container-relative cursor position
    pub fn wheel(&mut self, delta_y: f64, cursor: Point) {
        self.transform = self.transform.wheel(delta_y, cursor);
    }

    pub fn mouse_down(&mut self, button: MouseButton, pointer: Point) {
        self.pan.press(button, pointer, &self.transform);
    }

    /// Pointer move: pans while dragging, otherwise tracks the hovered component
    pub fn mouse_move(&mut self, pointer: Point, components: &[Component]) {
        if self.pan.is_panning() {
            self.transform = self.pan.drag(pointer, &self.transform);
            return;
        }
        self.hovered = self.component_at(pointer, components).map(|c| c.id.clone());
    }

    pub fn mouse_up(&mut self) {
        self.pan.release();
    }

    /// Visible component under a screen point
    pub fn component_at<'a>(
        &self,
        pointer: Point,
        components: &'a [Component],
    ) -> Option<&'a Component> {
        if !self.visibility.components {
            return None;
        }
        hit_test(components, self.transform.screen_to_page(pointer))
    }

    /// Click selects the component under the pointer
    ///
    /// Clicking the selected component again, or empty canvas, clears the selection.
    pub fn click(&mut self, pointer: Point, components: &[Component]) -> Option<&str> {
        let hit = self.component_at(pointer, components).map(|c| c.id.clone());
        self.selected = match hit {
            Some(id) if self.selected.as_deref() == Some(id.as_str()) => None,
            other => other,
        };
        self.selected.as_deref()
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BoundingBox;

    fn component(id: &str, x: f64, y: f64, w: f64, h: f64) -> Component {
        Component {
            id: id.to_string(),
            schematic_id: "s".into(),
            page_id: "p".into(),
            component_type: "resistor".into(),
            ref_designator: None,
            value: None,
            confidence: 0.9,
            bbox: BoundingBox::new(x, y, w, h),
            attributes: None,
        }
    }

    fn identity_viewport() -> Viewport {
        // Container 1000x1000 with a 900x900 page fits at scale 0.9 * (1000/900) = 1.0
        Viewport::new(Size::new(1000.0, 1000.0), Size::new(900.0, 900.0))
    }

    #[test]
    fn test_hit_test_prefers_topmost() {
        let comps = vec![
            component("under", 0.0, 0.0, 100.0, 100.0),
            component("over", 50.0, 50.0, 100.0, 100.0),
        ];
        assert_eq!(hit_test(&comps, Point::new(75.0, 75.0)).unwrap().id, "over");
        assert_eq!(hit_test(&comps, Point::new(10.0, 10.0)).unwrap().id, "under");
        assert!(hit_test(&comps, Point::new(500.0, 500.0)).is_none());
    }

    #[test]
    fn test_click_uses_page_coordinates() {
        let mut vp = identity_viewport();
        let t = vp.transform();
        assert!((t.scale - 1.0).abs() < 1e-9);
        assert!((t.x - 50.0).abs() < 1e-9);

        let comps = vec![component("r1", 100.0, 100.0, 50.0, 50.0)];
        // Page (120, 120) is screen (170, 170)
        assert_eq!(vp.click(Point::new(170.0, 170.0), &comps), Some("r1"));
        assert_eq!(vp.selected(), Some("r1"));

        assert_eq!(vp.click(Point::new(10.0, 10.0), &comps), None);
        assert_eq!(vp.selected(), None);
    }

    #[test]
    fn test_click_on_selected_component_toggles_off() {
        let mut vp = identity_viewport();
        let comps = vec![
            component("r1", 100.0, 100.0, 50.0, 50.0),
            component("c2", 300.0, 300.0, 50.0, 50.0),
        ];

        assert_eq!(vp.click(Point::new(170.0, 170.0), &comps), Some("r1"));
        assert_eq!(vp.click(Point::new(170.0, 170.0), &comps), None);
        assert_eq!(vp.selected(), None);

        // Switching straight to another component keeps a selection
        vp.click(Point::new(170.0, 170.0), &comps);
        assert_eq!(vp.click(Point::new(370.0, 370.0), &comps), Some("c2"));
        assert_eq!(vp.selected(), Some("c2"));
    }

    #[test]
    fn test_connection_layer_starts_hidden() {
        let vp = identity_viewport();
        assert!(vp.visibility.components);
        assert!(vp.visibility.text);
        assert!(!vp.visibility.connections);
    }

    #[test]
    fn test_hidden_components_never_hit() {
        let mut vp = identity_viewport();
        vp.visibility.components = false;
        let comps = vec![component("r1", 0.0, 0.0, 900.0, 900.0)];
        assert_eq!(vp.click(Point::new(500.0, 500.0), &comps), None);
    }

    #[test]
    fn test_hover_tracks_pointer_when_not_panning() {
        let mut vp = identity_viewport();
        let comps = vec![component("c1", 0.0, 0.0, 100.0, 100.0)];

        vp.mouse_move(Point::new(60.0, 60.0), &comps);
        assert_eq!(vp.hovered(), Some("c1"));

        vp.mouse_move(Point::new(900.0, 900.0), &comps);
        assert_eq!(vp.hovered(), None);
    }

    #[test]
    fn test_drag_pans_and_release_stops() {
        let mut vp = identity_viewport();
        let before = vp.transform();

        vp.mouse_down(MouseButton::Primary, Point::new(200.0, 200.0));
        vp.mouse_move(Point::new(260.0, 180.0), &[]);
        let after = vp.transform();
        assert!((after.x - (before.x + 60.0)).abs() < 1e-9);
        assert!((after.y - (before.y - 20.0)).abs() < 1e-9);

        vp.mouse_up();
        vp.mouse_move(Point::new(0.0, 0.0), &[]);
        assert_eq!(vp.transform(), after);
    }

    #[test]
    fn test_fit_resets_zoom() {
        let mut vp = identity_viewport();
        vp.zoom_in();
        vp.wheel(-1.0, Point::new(10.0, 10.0));
        vp.fit();
        assert_eq!(vp.transform(), identity_viewport().transform());
    }
}
