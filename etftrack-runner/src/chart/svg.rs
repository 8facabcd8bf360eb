//! Minimal SVG canvas and panel coordinate mapping.
//!
//! A `Panel` maps (bar index, value) to pixel positions inside a rectangle of
//! the canvas. Bar `i` of `slots` sits at the centre of its slot; values map
//! linearly with `max` at the top edge.

use std::fmt::Write as _;

pub const UP_COLOR: &str = "#F23645";
pub const DOWN_COLOR: &str = "#089981";
pub const GRID_COLOR: &str = "#e0e3eb";
pub const TEXT_COLOR: &str = "#131722";

/// Escape text for use inside SVG/HTML element content and attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Min/max over the finite values, or `None` if there are none.
pub fn value_range(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Panel {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub min: f64,
    pub max: f64,
    pub slots: usize,
}

impl Panel {
    pub fn new(left: f64, top: f64, width: f64, height: f64, slots: usize) -> Self {
        Self {
            left,
            top,
            width,
            height,
            min: 0.0,
            max: 1.0,
            slots: slots.max(1),
        }
    }

    /// Set the value range, padding it by `pad` of its span on each side.
    /// A zero-width range is widened so the mapping stays defined.
    pub fn with_range(mut self, min: f64, max: f64, pad: f64) -> Self {
        let (mut min, mut max) = (min, max);
        if (max - min).abs() < f64::EPSILON {
            let half = if min.abs() > 1.0 { min.abs() * 0.01 } else { 1.0 };
            min -= half;
            max += half;
        }
        let span = max - min;
        self.min = min - span * pad;
        self.max = max + span * pad;
        self
    }

    pub fn slot_width(&self) -> f64 {
        self.width / self.slots as f64
    }

    pub fn x(&self, index: usize) -> f64 {
        self.left + (index as f64 + 0.5) * self.slot_width()
    }

    pub fn y(&self, value: f64) -> f64 {
        let t = (value - self.min) / (self.max - self.min);
        self.top + self.height * (1.0 - t)
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }
}

/// SVG document built up as a string.
pub struct SvgCanvas {
    width: f64,
    height: f64,
    body: String,
}

impl SvgCanvas {
    pub fn new(width: f64, height: f64) -> Self {
        let mut canvas = Self {
            width,
            height,
            body: String::new(),
        };
        canvas.rect(0.0, 0.0, width, height, "#ffffff");
        canvas
    }

    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: &str) {
        let _ = writeln!(
            self.body,
            r#"<rect x="{x:.2}" y="{y:.2}" width="{:.2}" height="{:.2}" fill="{fill}"/>"#,
            w.max(0.0),
            h.max(0.0)
        );
    }

    pub fn frame(&mut self, panel: &Panel) {
        let _ = writeln!(
            self.body,
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="none" stroke="{GRID_COLOR}"/>"#,
            panel.left, panel.top, panel.width, panel.height
        );
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: &str, width: f64) {
        let _ = writeln!(
            self.body,
            r#"<line x1="{x1:.2}" y1="{y1:.2}" x2="{x2:.2}" y2="{y2:.2}" stroke="{stroke}" stroke-width="{width}"/>"#
        );
    }

    pub fn dashed_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: &str) {
        let _ = writeln!(
            self.body,
            r#"<line x1="{x1:.2}" y1="{y1:.2}" x2="{x2:.2}" y2="{y2:.2}" stroke="{stroke}" stroke-width="1" stroke-dasharray="4 3" opacity="0.6"/>"#
        );
    }

    /// Horizontal guide across a panel at `value`.
    pub fn guide(&mut self, panel: &Panel, value: f64, stroke: &str) {
        let y = panel.y(value);
        self.dashed_line(panel.left, y, panel.right(), y, stroke);
    }

    /// Plot a series as a polyline, breaking it wherever a value is not finite.
    pub fn series(&mut self, panel: &Panel, values: &[f64], stroke: &str, width: f64) {
        let mut segment: Vec<(f64, f64)> = Vec::new();
        for (i, v) in values.iter().enumerate() {
            if v.is_finite() {
                segment.push((panel.x(i), panel.y(*v)));
            } else {
                self.polyline(&segment, stroke, width);
                segment.clear();
            }
        }
        self.polyline(&segment, stroke, width);
    }

    fn polyline(&mut self, points: &[(f64, f64)], stroke: &str, width: f64) {
        if points.len() < 2 {
            return;
        }
        let coords: Vec<String> = points.iter().map(|(x, y)| format!("{x:.2},{y:.2}")).collect();
        let _ = writeln!(
            self.body,
            r#"<polyline points="{}" fill="none" stroke="{stroke}" stroke-width="{width}"/>"#,
            coords.join(" ")
        );
    }

    /// Marker triangle centred on (x, y), pointing up or down.
    pub fn triangle(&mut self, x: f64, y: f64, size: f64, up: bool, fill: &str) {
        let (tip, base) = if up { (y - size, y + size) } else { (y + size, y - size) };
        let _ = writeln!(
            self.body,
            r#"<polygon points="{x:.2},{tip:.2} {:.2},{base:.2} {:.2},{base:.2}" fill="{fill}"/>"#,
            x - size,
            x + size
        );
    }

    pub fn text(&mut self, x: f64, y: f64, size: f64, anchor: &str, content: &str) {
        let _ = writeln!(
            self.body,
            r#"<text x="{x:.2}" y="{y:.2}" font-size="{size}" text-anchor="{anchor}" fill="{TEXT_COLOR}" font-family="sans-serif">{}</text>"#,
            escape(content)
        );
    }

    /// Min / max labels on the left edge of a panel.
    pub fn axis_labels(&mut self, panel: &Panel, decimals: usize) {
        let top = format!("{:.*}", decimals, panel.max);
        let bottom = format!("{:.*}", decimals, panel.min);
        self.text(panel.left - 6.0, panel.top + 10.0, 11.0, "end", &top);
        self.text(panel.left - 6.0, panel.bottom(), 11.0, "end", &bottom);
    }

    /// Legend entries drawn left to right at the top of a panel.
    pub fn legend(&mut self, panel: &Panel, entries: &[(&str, &str)]) {
        let mut x = panel.left + 8.0;
        let y = panel.top + 14.0;
        for (label, color) in entries {
            self.line(x, y - 4.0, x + 16.0, y - 4.0, color, 2.0);
            self.text(x + 20.0, y, 11.0, "start", label);
            x += 28.0 + 7.0 * label.chars().count() as f64;
        }
    }

    pub fn finish(self) -> String {
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n{body}</svg>\n",
            w = self.width,
            h = self.height,
            body = self.body
        )
    }
}
