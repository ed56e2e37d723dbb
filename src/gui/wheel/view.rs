use super::model::{slice_width, WheelState};
use super::{
    HUB_RADIUS, LABEL_FONT_SIZE, LABEL_RIM_INSET, POINTER_HALF_WIDTH, POINTER_LENGTH,
    SLICE_STROKE_WIDTH, WHEEL_RADIUS,
};
use crate::gui::theme::ThemeColors;
use cairo::Context;
use palette::Srgba;
use std::f64::consts::PI;

struct SliceRenderer<'a> {
    label: &'a str,
    start_angle: f64,
    sweep: f64,
    color: Srgba<f64>,
}

impl<'a> SliceRenderer<'a> {
    fn draw(&self, cr: &Context, cx: f64, cy: f64, colors: &ThemeColors) -> Result<(), cairo::Error> {
        self.draw_wedge(cr, cx, cy, colors)?;
        self.draw_label(cr, cx, cy, colors)
    }

    fn draw_wedge(
        &self,
        cr: &Context,
        cx: f64,
        cy: f64,
        colors: &ThemeColors,
    ) -> Result<(), cairo::Error> {
        set_source(cr, self.color);
        cr.move_to(cx, cy);
        cr.arc(cx, cy, WHEEL_RADIUS, self.start_angle, self.start_angle + self.sweep);
        cr.close_path();
        cr.fill_preserve()?;

        set_source(cr, colors.slice_stroke);
        cr.set_line_width(SLICE_STROKE_WIDTH);
        cr.stroke()
    }

    /// Label along the slice bisector, rotated radially, right-aligned
    /// towards the rim.
    fn draw_label(
        &self,
        cr: &Context,
        cx: f64,
        cy: f64,
        colors: &ThemeColors,
    ) -> Result<(), cairo::Error> {
        cr.save()?;
        cr.translate(cx, cy);
        cr.rotate(self.start_angle + self.sweep / 2.0);

        set_source(cr, colors.label);
        cr.select_font_face("Sans", cairo::FontSlant::Normal, cairo::FontWeight::Bold);
        cr.set_font_size(LABEL_FONT_SIZE);
        if let Ok(ext) = cr.text_extents(self.label) {
            cr.move_to(WHEEL_RADIUS - LABEL_RIM_INSET - ext.width(), ext.height() / 2.0);
            cr.show_text(self.label)?;
        }

        cr.restore()
    }
}

pub fn draw(
    cr: &Context,
    state: &WheelState,
    width: i32,
    height: i32,
    colors: &ThemeColors,
) -> Result<(), cairo::Error> {
    let cx = f64::from(width) / 2.0;
    let cy = f64::from(height) / 2.0;

    set_source(cr, colors.background);
    cr.paint()?;

    if state.registry.is_empty() {
        return draw_placeholder(cr, cx, cy, colors);
    }

    let sweep = slice_width(state.registry.len());
    for (i, option) in state.registry.iter().enumerate() {
        SliceRenderer {
            label: option.as_str(),
            start_angle: i as f64 * sweep + state.rotation,
            sweep,
            color: state.palette[i % state.palette.len()],
        }
        .draw(cr, cx, cy, colors)?;
    }

    draw_hub(cr, cx, cy, colors)?;
    draw_pointer(cr, cx, cy, state.pointer.angle(), colors)
}

/// Neutral disc shown while the wheel has no options. Does not depend on the
/// rotation.
fn draw_placeholder(cr: &Context, cx: f64, cy: f64, colors: &ThemeColors) -> Result<(), cairo::Error> {
    set_source(cr, colors.placeholder_fill);
    cr.arc(cx, cy, WHEEL_RADIUS, 0.0, 2.0 * PI);
    cr.fill_preserve()?;

    set_source(cr, colors.placeholder_outline);
    cr.set_line_width(SLICE_STROKE_WIDTH);
    cr.stroke()
}

fn draw_hub(cr: &Context, cx: f64, cy: f64, colors: &ThemeColors) -> Result<(), cairo::Error> {
    set_source(cr, colors.hub_fill);
    cr.arc(cx, cy, HUB_RADIUS, 0.0, 2.0 * PI);
    cr.fill_preserve()?;

    set_source(cr, colors.hub_stroke);
    cr.set_line_width(SLICE_STROKE_WIDTH);
    cr.stroke()
}

/// Fixed wedge just outside the rim, tip towards the center.
fn draw_pointer(
    cr: &Context,
    cx: f64,
    cy: f64,
    angle: f64,
    colors: &ThemeColors,
) -> Result<(), cairo::Error> {
    cr.save()?;
    cr.translate(cx, cy);
    cr.rotate(angle);

    set_source(cr, colors.pointer);
    cr.move_to(WHEEL_RADIUS - 4.0, 0.0);
    cr.line_to(WHEEL_RADIUS + POINTER_LENGTH, -POINTER_HALF_WIDTH);
    cr.line_to(WHEEL_RADIUS + POINTER_LENGTH, POINTER_HALF_WIDTH);
    cr.close_path();
    cr.fill()?;

    cr.restore()
}

fn set_source(cr: &Context, color: Srgba<f64>) {
    let (r, g, b, a) = color.into_components();
    cr.set_source_rgba(r, g, b, a);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gui::wheel::CANVAS_SIZE;

    fn render(state: &WheelState) -> Vec<u8> {
        let surface =
            cairo::ImageSurface::create(cairo::Format::ARgb32, CANVAS_SIZE, CANVAS_SIZE).unwrap();
        {
            let cr = Context::new(&surface).unwrap();
            draw(&cr, state, CANVAS_SIZE, CANVAS_SIZE, &ThemeColors::fallback()).unwrap();
        }
        let mut surface = surface;
        surface.data().unwrap().to_vec()
    }

    #[test]
    fn empty_wheel_draws_the_placeholder_for_any_rotation() {
        let mut state = WheelState::default();
        let reference = render(&state);

        for rotation in [1.0, -12.3, 4000.0] {
            state.rotation = rotation;
            assert_eq!(render(&state), reference);
        }
    }

    #[test]
    fn rendering_is_deterministic() {
        let mut state = WheelState::default();
        for label in ["tea", "coffee", "mate", "water"] {
            state.registry.add(label);
        }
        state.rotation = 1.234;

        assert_eq!(render(&state), render(&state));
    }

    #[test]
    fn rotation_changes_the_rendering() {
        let mut state = WheelState::default();
        for label in ["tea", "coffee", "mate"] {
            state.registry.add(label);
        }

        let before = render(&state);
        state.rotation = 0.5;
        assert_ne!(render(&state), before);
    }
}
