//! The only UI: a line of instructions on top and the color swatch bar below.

use corelib::color::ColorCode;
use corelib::palette::{Palette, Swatch};
use corelib::selection::SelectionController;
use egui::epaint::Mesh;
use egui::{
    Align2, Color32, Context, CursorIcon, Frame, Margin, Painter, Rect, RichText, Sense, Shape,
    Stroke, TopBottomPanel, pos2, vec2,
};

const BAR_MAX_WIDTH: f32 = 384.0;
const BAR_HEIGHT: f32 = 64.0;
const BAR_PADDING: f32 = 12.0;
const BAR_RADIUS: f32 = 12.0;
const SWATCH_GAP: f32 = 12.0;
const SWATCH_RADIUS: f32 = 6.0;
const RING_WIDTH: f32 = 2.0;

/// Fallback when a palette entry cannot be parsed.
const UNKNOWN_SWATCH: Color32 = Color32::GRAY;

/// Lay out the overlay for one frame. A swatch click updates `selection`
/// before the highlight is painted, so ring and model agree in the same frame.
///
/// Returns the canvas rect in points, the area not covered by panels.
pub fn draw(
    ctx: &Context,
    palette: &Palette,
    selection: &mut SelectionController,
    fps: Option<f32>,
    dragging: bool,
) -> Rect {
    TopBottomPanel::top("instructions")
        .frame(Frame::none().inner_margin(Margin::symmetric(16.0, 12.0)))
        .show_separator_line(false)
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.label(
                    RichText::new("Swipe or click and drag object to rotate")
                        .color(Color32::WHITE)
                        .strong(),
                );
                ui.label(RichText::new("Scroll to zoom in or out.").color(Color32::WHITE));
                if let Some(fps) = fps {
                    ui.label(
                        RichText::new(format!("{fps:.0} fps"))
                            .color(Color32::from_white_alpha(180))
                            .small(),
                    );
                }
            });
        });

    TopBottomPanel::bottom("swatches")
        .frame(Frame::none().inner_margin(Margin::same(16.0)))
        .show_separator_line(false)
        .show(ctx, |ui| swatch_bar(ui, palette, selection));

    let canvas = ctx.available_rect();
    if dragging {
        ctx.set_cursor_icon(CursorIcon::Grabbing);
    } else if hovering_canvas(ctx, canvas) {
        ctx.set_cursor_icon(CursorIcon::Grab);
    }
    canvas
}

fn hovering_canvas(ctx: &Context, canvas: Rect) -> bool {
    let over = ctx
        .input(|i| i.pointer.hover_pos())
        .is_some_and(|p| canvas.contains(p));
    over && !ctx.is_pointer_over_area()
}

fn swatch_bar(ui: &mut egui::Ui, palette: &Palette, selection: &mut SelectionController) {
    let avail = ui.available_rect_before_wrap();
    let width = avail.width().min(BAR_MAX_WIDTH);
    let bar = Rect::from_min_size(
        pos2(avail.center().x - width * 0.5, avail.top()),
        vec2(width, BAR_HEIGHT),
    );
    ui.allocate_rect(bar, Sense::hover());
    ui.painter()
        .rect_filled(bar, BAR_RADIUS, Color32::from_black_alpha(230));

    let rects = swatch_rects(bar.shrink(BAR_PADDING), palette.len());
    let responses: Vec<egui::Response> = rects
        .iter()
        .zip(palette.swatches())
        .enumerate()
        .map(|(i, (rect, swatch))| {
            ui.interact(*rect, ui.id().with(("swatch", i)), Sense::click())
                .on_hover_text(swatch.name)
        })
        .collect();

    for (swatch, resp) in palette.swatches().iter().zip(&responses) {
        if resp.clicked() {
            selection.select(swatch.code.clone());
        }
        if resp.hovered() {
            ui.ctx().set_cursor_icon(CursorIcon::PointingHand);
        }
    }

    let painter = ui.painter();
    let current = selection.color();
    for ((swatch, rect), resp) in palette.swatches().iter().zip(&rects).zip(&responses) {
        paint_swatch(painter, *rect, swatch, resp.hovered());
        if swatch.matches(current) {
            painter.rect_stroke(
                rect.expand(RING_WIDTH),
                SWATCH_RADIUS,
                Stroke::new(RING_WIDTH, Color32::WHITE),
            );
        }
    }

    if palette.is_empty() {
        painter.text(
            bar.center(),
            Align2::CENTER_CENTER,
            "no colors",
            egui::FontId::proportional(14.0),
            Color32::from_white_alpha(160),
        );
    }
}

/// Equal-width cells with a fixed gap, filling `inner` left to right.
fn swatch_rects(inner: Rect, count: usize) -> Vec<Rect> {
    if count == 0 {
        return Vec::new();
    }
    let n = count as f32;
    let w = ((inner.width() - SWATCH_GAP * (n - 1.0)) / n).max(0.0);
    (0..count)
        .map(|i| {
            let x = inner.left() + i as f32 * (w + SWATCH_GAP);
            Rect::from_min_size(pos2(x, inner.top()), vec2(w, inner.height()))
        })
        .collect()
}

fn paint_swatch(painter: &Painter, rect: Rect, swatch: &Swatch, hovered: bool) {
    let stops = if hovered {
        &swatch.hover_gradient
    } else {
        &swatch.gradient
    };
    painter.add(Shape::mesh(horizontal_gradient(rect, stops.each_ref().map(to_color32))));
}

fn to_color32(code: &ColorCode) -> Color32 {
    match code.to_rgb8() {
        Ok([r, g, b]) => Color32::from_rgb(r, g, b),
        Err(_) => UNKNOWN_SWATCH,
    }
}

/// Left, middle, right stops across `rect`.
fn horizontal_gradient(rect: Rect, stops: [Color32; 3]) -> Mesh {
    let mut mesh = Mesh::default();
    let xs = [rect.left(), rect.center().x, rect.right()];
    for (x, color) in xs.into_iter().zip(stops) {
        mesh.colored_vertex(pos2(x, rect.top()), color);
        mesh.colored_vertex(pos2(x, rect.bottom()), color);
    }
    // Vertices come in top/bottom pairs: 0-1, 2-3, 4-5.
    for col in 0..2u32 {
        let i = col * 2;
        mesh.add_triangle(i, i + 1, i + 2);
        mesh.add_triangle(i + 2, i + 1, i + 3);
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_cells_fill_the_bar() {
        let inner = Rect::from_min_size(pos2(12.0, 0.0), vec2(360.0, 40.0));
        let rects = swatch_rects(inner, 5);
        assert_eq!(rects.len(), 5);
        assert!((rects[0].width() - 62.4).abs() < 1e-3);
        assert!((rects[4].right() - inner.right()).abs() < 1e-3);
        assert!(rects.windows(2).all(|p| (p[1].left() - p[0].right() - SWATCH_GAP).abs() < 1e-3));
    }

    #[test]
    fn no_cells_for_empty_palette() {
        assert!(swatch_rects(Rect::from_min_size(pos2(0.0, 0.0), vec2(100.0, 40.0)), 0).is_empty());
    }

    #[test]
    fn gradient_mesh_uses_all_stops() {
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(10.0, 4.0));
        let mesh = horizontal_gradient(rect, [Color32::RED, Color32::GREEN, Color32::BLUE]);
        assert_eq!(mesh.vertices.len(), 6);
        assert_eq!(mesh.indices.len(), 12);
        assert_eq!(mesh.vertices[2].color, Color32::GREEN);
        assert_eq!(mesh.vertices[5].pos, pos2(10.0, 4.0));
    }

    #[test]
    fn swatch_colors_parse() {
        let palette = Palette::default();
        for swatch in palette.swatches() {
            assert_ne!(to_color32(&swatch.code), UNKNOWN_SWATCH, "{}", swatch.name);
        }
        assert_eq!(to_color32(&ColorCode::from("#991b1b")), Color32::from_rgb(0x99, 0x1b, 0x1b));
    }
}
