//! Minimal SVG scatter/line canvas

use std::fmt::Write;

const MARGIN_LEFT: f64 = 56.0;
const MARGIN_RIGHT: f64 = 12.0;
const MARGIN_TOP: f64 = 28.0;
const MARGIN_BOTTOM: f64 = 40.0;
const TITLE_HEIGHT: f64 = 28.0;

pub(crate) const BLUE: &str = "#1f77b4";
pub(crate) const RED: &str = "#d62728";
pub(crate) const GREY: &str = "#7f7f7f";

/// One drawn series in a panel
#[derive(Debug, Clone)]
pub(crate) enum Layer {
    Points { xs: Vec<f64>, ys: Vec<f64>, color: &'static str },
    Line { xs: Vec<f64>, ys: Vec<f64>, color: &'static str },
}

impl Layer {
    pub(crate) fn points(xs: &[f64], ys: &[f64], color: &'static str) -> Self {
        Layer::Points { xs: xs.to_vec(), ys: ys.to_vec(), color }
    }

    /// Straight line `y = intercept + slope·x` across the given x values
    pub(crate) fn fit_line(xs: &[f64], intercept: f64, slope: f64, color: &'static str) -> Self {
        let (lo, hi) = finite_range(xs.iter().copied()).unwrap_or((0.0, 1.0));
        Layer::Line {
            xs: vec![lo, hi],
            ys: vec![intercept + slope * lo, intercept + slope * hi],
            color,
        }
    }

    fn coords(&self) -> (&[f64], &[f64]) {
        match self {
            Layer::Points { xs, ys, .. } | Layer::Line { xs, ys, .. } => (xs, ys),
        }
    }
}

/// A titled pair of axes
#[derive(Debug, Clone)]
pub(crate) struct Panel {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub layers: Vec<Layer>,
}

impl Panel {
    pub(crate) fn new(title: impl Into<String>, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            layers: Vec::new(),
        }
    }

    pub(crate) fn layer(mut self, layer: Layer) -> Self {
        self.layers.push(layer);
        self
    }

    fn bounds(&self) -> ((f64, f64), (f64, f64)) {
        let xs = self.layers.iter().flat_map(|l| l.coords().0.iter().copied());
        let ys = self.layers.iter().flat_map(|l| l.coords().1.iter().copied());
        (
            padded(finite_range(xs).unwrap_or((0.0, 1.0))),
            padded(finite_range(ys).unwrap_or((0.0, 1.0))),
        )
    }

    fn render(&self, out: &mut String, left: f64, top: f64, width: f64, height: f64) {
        let plot_left = left + MARGIN_LEFT;
        let plot_top = top + MARGIN_TOP;
        let plot_w = (width - MARGIN_LEFT - MARGIN_RIGHT).max(1.0);
        let plot_h = (height - MARGIN_TOP - MARGIN_BOTTOM).max(1.0);
        let ((x_lo, x_hi), (y_lo, y_hi)) = self.bounds();

        let px = |x: f64| plot_left + (x - x_lo) / (x_hi - x_lo) * plot_w;
        let py = |y: f64| plot_top + plot_h - (y - y_lo) / (y_hi - y_lo) * plot_h;

        let _ = writeln!(
            out,
            r#"<g><rect x="{plot_left:.2}" y="{plot_top:.2}" width="{plot_w:.2}" height="{plot_h:.2}" fill="none" stroke="black"/>"#
        );
        let _ = writeln!(
            out,
            r#"<text x="{:.2}" y="{:.2}" text-anchor="middle" font-size="13">{}</text>"#,
            plot_left + plot_w / 2.0,
            top + MARGIN_TOP - 8.0,
            escape(&self.title)
        );
        let _ = writeln!(
            out,
            r#"<text x="{:.2}" y="{:.2}" text-anchor="middle" font-size="11">{}</text>"#,
            plot_left + plot_w / 2.0,
            plot_top + plot_h + 32.0,
            escape(&self.x_label)
        );
        let _ = writeln!(
            out,
            r#"<text transform="translate({:.2},{:.2}) rotate(-90)" text-anchor="middle" font-size="11">{}</text>"#,
            left + 14.0,
            plot_top + plot_h / 2.0,
            escape(&self.y_label)
        );

        // Axis extremes as tick labels
        for (value, x, anchor) in [(x_lo, plot_left, "start"), (x_hi, plot_left + plot_w, "end")] {
            let _ = writeln!(
                out,
                r#"<text x="{x:.2}" y="{:.2}" text-anchor="{anchor}" font-size="9">{}</text>"#,
                plot_top + plot_h + 14.0,
                format_tick(value)
            );
        }
        for (value, y) in [(y_lo, plot_top + plot_h), (y_hi, plot_top + 9.0)] {
            let _ = writeln!(
                out,
                r#"<text x="{:.2}" y="{y:.2}" text-anchor="end" font-size="9">{}</text>"#,
                plot_left - 4.0,
                format_tick(value)
            );
        }

        for layer in &self.layers {
            match layer {
                Layer::Points { xs, ys, color } => {
                    for (&x, &y) in xs.iter().zip(ys) {
                        if x.is_finite() && y.is_finite() {
                            let _ = writeln!(
                                out,
                                r#"<circle cx="{:.2}" cy="{:.2}" r="2.5" fill="{color}" fill-opacity="0.8"/>"#,
                                px(x),
                                py(y)
                            );
                        }
                    }
                }
                Layer::Line { xs, ys, color } => {
                    let points: Vec<String> = xs
                        .iter()
                        .zip(ys)
                        .filter(|(x, y)| x.is_finite() && y.is_finite())
                        .map(|(&x, &y)| format!("{:.2},{:.2}", px(x), py(y)))
                        .collect();
                    if points.len() >= 2 {
                        let _ = writeln!(
                            out,
                            r#"<polyline points="{}" fill="none" stroke="{color}" stroke-width="1.5"/>"#,
                            points.join(" ")
                        );
                    }
                }
            }
        }
        out.push_str("</g>\n");
    }
}

/// Panels laid out on a grid under an optional title
#[derive(Debug, Clone)]
pub(crate) struct Canvas {
    pub width: u32,
    pub height: u32,
    pub title: Option<String>,
    pub columns: usize,
    pub panels: Vec<Panel>,
}

impl Canvas {
    pub(crate) fn render(&self) -> String {
        let mut out = String::new();
        let width = f64::from(self.width);
        let height = f64::from(self.height);

        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}" font-family="sans-serif">"#,
            self.width, self.height, self.width, self.height
        );
        out.push_str(r#"<rect width="100%" height="100%" fill="white"/>"#);
        out.push('\n');

        let mut top = 0.0;
        if let Some(title) = &self.title {
            let _ = writeln!(
                out,
                r#"<text x="{:.2}" y="20" text-anchor="middle" font-size="15" font-weight="bold">{}</text>"#,
                width / 2.0,
                escape(title)
            );
            top = TITLE_HEIGHT;
        }

        let columns = self.columns.max(1);
        let rows = self.panels.len().div_ceil(columns).max(1);
        let cell_w = width / columns as f64;
        let cell_h = (height - top) / rows as f64;

        for (i, panel) in self.panels.iter().enumerate() {
            let left = (i % columns) as f64 * cell_w;
            let panel_top = top + (i / columns) as f64 * cell_h;
            panel.render(&mut out, left, panel_top, cell_w, cell_h);
        }

        out.push_str("</svg>\n");
        out
    }
}

fn finite_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

fn padded((lo, hi): (f64, f64)) -> (f64, f64) {
    if hi - lo <= f64::EPSILON * hi.abs().max(1.0) {
        return (lo - 0.5, hi + 0.5);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}

fn format_tick(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-3..1e4).contains(&magnitude) {
        format!("{value:.2e}")
    } else {
        format!("{value:.3}")
    }
}

pub(crate) fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
