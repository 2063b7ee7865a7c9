//! Pointer and touch tracking, turned into camera gestures.
//!
//! Left drag orbits, right/middle drag or shift+left pans, the wheel dollies.
//! One finger orbits; two fingers pinch to dolly and move together to pan.

use winit::event::{MouseButton, MouseScrollDelta, TouchPhase};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CameraGesture {
    Orbit { dx: f32, dy: f32 },
    Pan { dx: f32, dy: f32 },
    /// Positive steps zoom in.
    Dolly { steps: f32 },
    /// Finger spread now divided by spread before.
    Pinch { ratio: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DragKind {
    Orbit,
    Pan,
}

/// Pixels of touchpad scroll that count as one wheel notch.
const PIXELS_PER_STEP: f32 = 50.0;

#[derive(Debug, Default)]
pub struct PointerInput {
    cursor: Option<(f32, f32)>,
    drag: Option<(DragKind, MouseButton)>,
    shift: bool,
    touches: Vec<(u64, (f32, f32))>,
}

impl PointerInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_shift(&mut self, held: bool) {
        self.shift = held;
    }

    #[inline]
    pub fn cursor(&self) -> Option<(f32, f32)> {
        self.cursor
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some() || !self.touches.is_empty()
    }

    pub fn cursor_left(&mut self) {
        self.cursor = None;
    }

    pub fn cursor_moved(&mut self, x: f32, y: f32) -> Option<CameraGesture> {
        let (px, py) = self.cursor.replace((x, y))?;
        let (dx, dy) = (x - px, y - py);
        match self.drag?.0 {
            DragKind::Orbit => Some(CameraGesture::Orbit { dx, dy }),
            DragKind::Pan => Some(CameraGesture::Pan { dx, dy }),
        }
    }

    /// `may_start` is false when the press landed on the UI or outside the canvas.
    pub fn button(&mut self, button: MouseButton, pressed: bool, may_start: bool) {
        if !pressed {
            if self.drag.is_some_and(|(_, b)| b == button) {
                self.drag = None;
            }
            return;
        }
        if !may_start || self.drag.is_some() {
            return;
        }
        let kind = match button {
            MouseButton::Left if self.shift => DragKind::Pan,
            MouseButton::Left => DragKind::Orbit,
            MouseButton::Right | MouseButton::Middle => DragKind::Pan,
            _ => return,
        };
        self.drag = Some((kind, button));
    }

    pub fn wheel(&mut self, delta: MouseScrollDelta) -> CameraGesture {
        let steps = match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_STEP,
        };
        CameraGesture::Dolly { steps }
    }

    pub fn touch(
        &mut self,
        id: u64,
        phase: TouchPhase,
        x: f32,
        y: f32,
        may_start: bool,
    ) -> Vec<CameraGesture> {
        match phase {
            TouchPhase::Started => {
                if may_start && self.touches.len() < 2 {
                    self.touches.push((id, (x, y)));
                }
                Vec::new()
            }
            TouchPhase::Moved => self.touch_moved(id, (x, y)),
            TouchPhase::Ended | TouchPhase::Cancelled => {
                self.touches.retain(|(t, _)| *t != id);
                Vec::new()
            }
        }
    }

    fn touch_moved(&mut self, id: u64, pos: (f32, f32)) -> Vec<CameraGesture> {
        let Some(slot) = self.touches.iter().position(|(t, _)| *t == id) else {
            return Vec::new();
        };
        let before: Vec<(f32, f32)> = self.touches.iter().map(|(_, p)| *p).collect();
        self.touches[slot].1 = pos;

        match before.as_slice() {
            [old] => vec![CameraGesture::Orbit {
                dx: pos.0 - old.0,
                dy: pos.1 - old.1,
            }],
            [a0, b0] => {
                let (a1, b1) = (self.touches[0].1, self.touches[1].1);
                let (c0, d0) = centroid_and_spread(*a0, *b0);
                let (c1, d1) = centroid_and_spread(a1, b1);
                let mut out = Vec::with_capacity(2);
                if d0 > f32::EPSILON {
                    out.push(CameraGesture::Pinch { ratio: d1 / d0 });
                }
                out.push(CameraGesture::Pan {
                    dx: c1.0 - c0.0,
                    dy: c1.1 - c0.1,
                });
                out
            }
            _ => Vec::new(),
        }
    }
}

fn centroid_and_spread(a: (f32, f32), b: (f32, f32)) -> ((f32, f32), f32) {
    let c = ((a.0 + b.0) * 0.5, (a.1 + b.1) * 0.5);
    let d = ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt();
    (c, d)
}
