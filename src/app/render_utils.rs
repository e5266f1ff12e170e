use std::f32::consts::TAU;

use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, pos2};

use crate::engine::Category;

pub(super) const PERSON_BORDER: Color32 = Color32::from_rgb(222, 64, 64);
pub(super) const DEFAULT_BORDER: Color32 = Color32::from_rgb(74, 134, 232);

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

pub(super) fn category_border(category: &Category) -> Color32 {
    match category {
        Category::Person => PERSON_BORDER,
        Category::Unspecified | Category::Idea | Category::Other(_) => DEFAULT_BORDER,
    }
}

/// Dark backdrop with a faint horizon line through the view center.
pub(super) fn draw_background(painter: &Painter, rect: Rect, horizon_y: Option<f32>) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(10, 12, 20));

    if let Some(y) = horizon_y.filter(|y| rect.y_range().contains(*y)) {
        painter.line_segment(
            [pos2(rect.left(), y), pos2(rect.right(), y)],
            Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 50)),
        );
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

/// Outline of an axis-aligned ellipse, suitable for a convex polygon.
pub(super) fn ellipse_points(center: Pos2, radius_x: f32, radius_y: f32, segments: usize) -> Vec<Pos2> {
    let segments = segments.max(3);
    (0..segments)
        .map(|index| {
            let angle = index as f32 / segments as f32 * TAU;
            pos2(
                center.x + radius_x * angle.cos(),
                center.y + radius_y * angle.sin(),
            )
        })
        .collect()
}

/// Fewer segments for small discs.
pub(super) fn ellipse_segments(radius: f32) -> usize {
    ((radius * 0.6) as usize).clamp(12, 64)
}

pub(super) fn to_pos2(point: glam::Vec2) -> Pos2 {
    pos2(point.x, point.y)
}

pub(super) fn to_glam(point: Pos2) -> glam::Vec2 {
    glam::Vec2::new(point.x, point.y)
}
