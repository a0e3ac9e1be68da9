//! Screen/page coordinate transform with pan and zoom

use serde::{Deserialize, Serialize};

/// Smallest allowed zoom factor
pub const MIN_SCALE: f64 = 0.1;
/// Largest allowed zoom factor
pub const MAX_SCALE: f64 = 10.0;
/// Fraction of the container a fitted page occupies
pub const FIT_MARGIN: f64 = 0.9;

const WHEEL_ZOOM_OUT: f64 = 0.9;
const WHEEL_ZOOM_IN: f64 = 1.1;
const BUTTON_ZOOM_IN: f64 = 1.25;
const BUTTON_ZOOM_OUT: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// `screen = page * scale + (x, y)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
        }
    }
}

fn clamp_scale(scale: f64) -> f64 {
    scale.clamp(MIN_SCALE, MAX_SCALE)
}

impl Transform {
    /// Fit the page inside the container at 90% and centre it
    ///
    /// A page with a zero dimension cannot be fitted; the identity transform is returned.
    pub fn fit(container: Size, page: Size) -> Self {
        if page.width <= 0.0 || page.height <= 0.0 {
            return Self::default();
        }

        let scale_x = container.width / page.width;
        let scale_y = container.height / page.height;
        let scale = scale_x.min(scale_y) * FIT_MARGIN;

        Self {
            x: (container.width - page.width * scale) / 2.0,
            y: (container.height - page.height * scale) / 2.0,
            scale,
        }
    }

    /// Zoom by one wheel notch, keeping the page point under the cursor fixed
    pub fn wheel(&self, delta_y: f64, cursor: Point) -> Self {
        let factor = if delta_y > 0.0 {
            WHEEL_ZOOM_OUT
        } else {
            WHEEL_ZOOM_IN
        };
        self.zoom_at(self.scale * factor, cursor)
    }

    /// Set a new scale anchored at `anchor` (screen coordinates)
    pub fn zoom_at(&self, new_scale: f64, anchor: Point) -> Self {
        let new_scale = clamp_scale(new_scale);
        let ratio = new_scale / self.scale;
        Self {
            x: anchor.x - (anchor.x - self.x) * ratio,
            y: anchor.y - (anchor.y - self.y) * ratio,
            scale: new_scale,
        }
    }

    /// Toolbar zoom-in; offset is unchanged
    pub fn zoom_in(&self) -> Self {
        Self {
            scale: (self.scale * BUTTON_ZOOM_IN).min(MAX_SCALE),
            ..*self
        }
    }

    /// Toolbar zoom-out; offset is unchanged
    pub fn zoom_out(&self) -> Self {
        Self {
            scale: (self.scale * BUTTON_ZOOM_OUT).max(MIN_SCALE),
            ..*self
        }
    }

    /// Zoom level shown in the corner badge
    pub fn zoom_percent(&self) -> i64 {
        (self.scale * 100.0).round() as i64
    }

    pub fn screen_to_page(&self, p: Point) -> Point {
        Point::new((p.x - self.x) / self.scale, (p.y - self.y) / self.scale)
    }

    pub fn page_to_screen(&self, p: Point) -> Point {
        Point::new(p.x * self.scale + self.x, p.y * self.scale + self.y)
    }
}

/// Mouse button that started a gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Primary,
    Middle,
    Secondary,
}

/// Drag-to-pan state
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PanGesture {
    /// Pointer minus offset at press time; `None` when not panning
    start: Option<Point>,
}

impl PanGesture {
    pub fn is_panning(&self) -> bool {
        self.start.is_some()
    }

    /// Begin panning; only the primary button pans
    pub fn press(&mut self, button: MouseButton, pointer: Point, transform: &Transform) {
        if button != MouseButton::Primary {
            return;
        }
        self.start = Some(Point::new(pointer.x - transform.x, pointer.y - transform.y));
    }

    /// Move the page with the pointer; no-op unless panning
    pub fn drag(&self, pointer: Point, transform: &Transform) -> Transform {
        match self.start {
            Some(start) => Transform {
                x: pointer.x - start.x,
                y: pointer.y - start.y,
                scale: transform.scale,
            },
            None => *transform,
        }
    }

    pub fn release(&mut self) {
        self.start = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_fit_a4_page_in_landscape_container() {
        let t = Transform::fit(Size::new(1000.0, 800.0), Size::new(2480.0, 3508.0));
        let expected_scale = (800.0 / 3508.0) * 0.9;
        assert!(approx(t.scale, expected_scale));
        assert!(approx(t.x, (1000.0 - 2480.0 * expected_scale) / 2.0));
        assert!(approx(t.y, (800.0 - 3508.0 * expected_scale) / 2.0));
    }

    #[test]
    fn test_fit_zero_page_is_identity() {
        let t = Transform::fit(Size::new(1000.0, 800.0), Size::new(0.0, 100.0));
        assert_eq!(t, Transform::default());
    }

    #[test]
    fn test_wheel_keeps_cursor_point_fixed() {
        let t = Transform { x: 40.0, y: 25.0, scale: 0.5 };
        let cursor = Point::new(300.0, 200.0);
        let before = t.screen_to_page(cursor);

        let zoomed = t.wheel(-120.0, cursor);
        assert!(approx(zoomed.scale, 0.55));
        let after = zoomed.screen_to_page(cursor);
        assert!(approx(before.x, after.x));
        assert!(approx(before.y, after.y));
    }

    #[test]
    fn test_wheel_down_zooms_out() {
        let t = Transform::default().wheel(100.0, Point::new(0.0, 0.0));
        assert!(approx(t.scale, 0.9));
    }

    #[test]
    fn test_wheel_clamps_scale() {
        let t = Transform { x: 0.0, y: 0.0, scale: 9.95 };
        assert!(approx(t.wheel(-1.0, Point::new(0.0, 0.0)).scale, MAX_SCALE));

        let t = Transform { x: 0.0, y: 0.0, scale: 0.105 };
        assert!(approx(t.wheel(1.0, Point::new(0.0, 0.0)).scale, MIN_SCALE));
    }

    #[test]
    fn test_button_zoom_limits() {
        let t = Transform { x: 5.0, y: 6.0, scale: 9.0 };
        let z = t.zoom_in();
        assert!(approx(z.scale, MAX_SCALE));
        assert_eq!((z.x, z.y), (5.0, 6.0));

        let t = Transform { x: 0.0, y: 0.0, scale: 0.11 };
        assert!(approx(t.zoom_out().scale, MIN_SCALE));
        assert!(approx(Transform::default().zoom_out().scale, 0.8));
    }

    #[test]
    fn test_zoom_percent() {
        let t = Transform { x: 0.0, y: 0.0, scale: 0.2052 };
        assert_eq!(t.zoom_percent(), 21);
    }

    #[test]
    fn test_coordinate_round_trip() {
        let t = Transform { x: 12.0, y: -8.0, scale: 2.5 };
        let p = Point::new(100.0, 40.0);
        let back = t.screen_to_page(t.page_to_screen(p));
        assert!(approx(back.x, p.x) && approx(back.y, p.y));
    }

    #[test]
    fn test_pan_with_primary_button() {
        let t = Transform { x: 10.0, y: 20.0, scale: 1.5 };
        let mut pan = PanGesture::default();
        pan.press(MouseButton::Primary, Point::new(100.0, 100.0), &t);
        assert!(pan.is_panning());

        let moved = pan.drag(Point::new(130.0, 90.0), &t);
        assert_eq!(moved, Transform { x: 40.0, y: 10.0, scale: 1.5 });

        pan.release();
        assert_eq!(pan.drag(Point::new(500.0, 500.0), &moved), moved);
    }

    #[test]
    fn test_secondary_button_does_not_pan() {
        let t = Transform::default();
        let mut pan = PanGesture::default();
        pan.press(MouseButton::Secondary, Point::new(1.0, 1.0), &t);
        assert!(!pan.is_panning());
    }
}
