use gtk::prelude::*;
use gtk4 as gtk;
use palette::Srgba;

pub struct ThemeColors {
    pub background: Srgba<f64>,
    pub placeholder_fill: Srgba<f64>,
    pub placeholder_outline: Srgba<f64>,
    pub slice_stroke: Srgba<f64>,
    pub label: Srgba<f64>,
    pub hub_fill: Srgba<f64>,
    pub hub_stroke: Srgba<f64>,
    pub pointer: Srgba<f64>,
}

impl ThemeColors {
    /// The fixed defaults, used directly by headless rendering and as
    /// fallbacks when a theme color cannot be looked up.
    pub fn fallback() -> Self {
        Self {
            background: Srgba::new(1.0, 1.0, 1.0, 1.0),
            placeholder_fill: Srgba::new(0.94, 0.94, 0.94, 1.0),
            placeholder_outline: Srgba::new(0.8, 0.8, 0.8, 1.0),
            slice_stroke: Srgba::new(1.0, 1.0, 1.0, 1.0),
            label: Srgba::new(1.0, 1.0, 1.0, 1.0),
            hub_fill: Srgba::new(1.0, 1.0, 1.0, 1.0),
            hub_stroke: Srgba::new(0.2, 0.2, 0.2, 1.0),
            pointer: Srgba::new(0.2, 0.2, 0.2, 1.0),
        }
    }

    pub fn from_context(context: &gtk::StyleContext) -> Self {
        let fallback = Self::fallback();
        Self {
            background: Self::lookup_color(context, "theme_base_color", fallback.background, None),
            placeholder_fill: Self::lookup_color(
                context,
                "insensitive_bg_color",
                fallback.placeholder_fill,
                None,
            ),
            placeholder_outline: Self::lookup_color(
                context,
                "borders",
                fallback.placeholder_outline,
                None,
            ),
            hub_stroke: Self::lookup_color(context, "theme_fg_color", fallback.hub_stroke, None),
            pointer: Self::lookup_color(context, "theme_fg_color", fallback.pointer, None),
            // These sit on top of the palette colors; fixed for contrast.
            slice_stroke: fallback.slice_stroke,
            label: fallback.label,
            hub_fill: fallback.hub_fill,
        }
    }

    fn lookup_color(
        context: &gtk::StyleContext,
        name: &str,
        fallback: Srgba<f64>,
        alpha_override: Option<f64>,
    ) -> Srgba<f64> {
        context
            .lookup_color(name)
            .map(|c| {
                let (r, g, b, a) = (
                    c.red() as f64,
                    c.green() as f64,
                    c.blue() as f64,
                    c.alpha() as f64,
                );
                Srgba::new(r, g, b, alpha_override.unwrap_or(a))
            })
            .unwrap_or(fallback)
    }
}

pub fn load_css() {
    let provider = gtk::CssProvider::new();
    let css_data = "
.wheel-canvas {
    background: none;
    background-color: transparent;
}
.options-list {
    background: none;
}
.options-list row {
    padding: 2px 4px;
}
";
    provider.load_from_data(css_data);

    if let Some(display) = gtk::gdk::Display::default() {
        gtk::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    }
}
