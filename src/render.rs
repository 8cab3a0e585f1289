use reflex_core::LightColor;
use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, Rect, Transform};

const BACKGROUND: [u8; 4] = [18, 18, 22, 255];
const LIGHT_OFF: [u8; 4] = [60, 60, 66, 255];
const BUTTON: [u8; 4] = [84, 84, 104, 255];
const START: [u8; 4] = [46, 160, 80, 255];
const GLYPH: [u8; 4] = [240, 240, 240, 255];

/// What the player can click
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Left,
    Right,
    Start,
}

/// Everything the frame depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scene {
    pub lit: Option<LightColor>,
    pub start_enabled: bool,
}

/// Screen geometry, derived from the surface size
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    pub light_center: (f32, f32),
    pub light_radius: f32,
    pub left: Rect,
    pub right: Rect,
    pub start: Rect,
}

impl Layout {
    pub fn new(width: u32, height: u32) -> Option<Self> {
        let (w, h) = (width as f32, height as f32);
        let button_w = w * 0.3;
        let button_h = h * 0.16;
        let button_y = h * 0.74;
        Some(Self {
            light_center: (w * 0.5, h * 0.36),
            light_radius: w.min(h) * 0.18,
            left: Rect::from_xywh(w * 0.12, button_y, button_w, button_h)?,
            right: Rect::from_xywh(w * 0.58, button_y, button_w, button_h)?,
            start: Rect::from_xywh(w * 0.4, h * 0.58, w * 0.2, h * 0.1)?,
        })
    }

    /// Start is only offered while `start_enabled`
    pub fn hit(&self, x: f32, y: f32, start_enabled: bool) -> Option<Target> {
        let inside = |r: &Rect| x >= r.left() && x < r.right() && y >= r.top() && y < r.bottom();
        if inside(&self.left) {
            Some(Target::Left)
        } else if inside(&self.right) {
            Some(Target::Right)
        } else if start_enabled && inside(&self.start) {
            Some(Target::Start)
        } else {
            None
        }
    }
}

/// Software renderer drawing into an offscreen pixmap
pub struct Renderer {
    canvas: Pixmap,
    layout: Layout,
}

impl Renderer {
    /// `None` for a zero-sized surface
    pub fn new(width: u32, height: u32) -> Option<Self> {
        Some(Self {
            canvas: Pixmap::new(width, height)?,
            layout: Layout::new(width, height)?,
        })
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// RGBA bytes, same layout as the `pixels` frame buffer
    pub fn data(&self) -> &[u8] {
        self.canvas.data()
    }

    pub fn draw(&mut self, scene: &Scene) {
        self.canvas.fill(color(BACKGROUND));

        let light = scene.lit.map_or(LIGHT_OFF, |c| c.rgba());
        let (cx, cy) = self.layout.light_center;
        if let Some(circle) = PathBuilder::from_circle(cx, cy, self.layout.light_radius) {
            self.canvas.fill_path(
                &circle,
                &paint(light),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }

        let (left, right) = (self.layout.left, self.layout.right);
        self.button(left, BUTTON, Arrow::Left);
        self.button(right, BUTTON, Arrow::Right);
        if scene.start_enabled {
            self.button(self.layout.start, START, Arrow::Right);
        }
    }

    fn button(&mut self, rect: Rect, fill: [u8; 4], arrow: Arrow) {
        self.canvas
            .fill_rect(rect, &paint(fill), Transform::identity(), None);

        let size = rect.height().min(rect.width()) * 0.3;
        let (cx, cy) = (rect.left() + rect.width() * 0.5, rect.top() + rect.height() * 0.5);
        let mut pb = PathBuilder::new();
        match arrow {
            Arrow::Left => {
                pb.move_to(cx - size, cy);
                pb.line_to(cx + size * 0.6, cy - size);
                pb.line_to(cx + size * 0.6, cy + size);
            }
            Arrow::Right => {
                pb.move_to(cx + size, cy);
                pb.line_to(cx - size * 0.6, cy - size);
                pb.line_to(cx - size * 0.6, cy + size);
            }
        }
        pb.close();
        if let Some(path) = pb.finish() {
            self.canvas.fill_path(
                &path,
                &paint(GLYPH),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }
}

#[derive(Clone, Copy)]
enum Arrow {
    Left,
    Right,
}

fn color(rgba: [u8; 4]) -> Color {
    Color::from_rgba8(rgba[0], rgba[1], rgba[2], rgba[3])
}

fn paint(rgba: [u8; 4]) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color(rgba));
    paint
}
