//! Trend sparkline widget for inline visualization

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Block characters for different values (8 levels)
const BLOCKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// A one-line sparkline of a metric series, scaled between its min and max
pub struct TrendSparkline<'a> {
    values: &'a [f64],
    min: f64,
    max: f64,
    /// Highlighted index (the peak, by default)
    marker: Option<usize>,
    style: Style,
    marker_style: Style,
}

impl<'a> TrendSparkline<'a> {
    pub fn new(values: &'a [f64]) -> Self {
        let finite = values.iter().copied().filter(|v| v.is_finite());
        let min = finite.clone().fold(f64::INFINITY, f64::min);
        let max = finite.fold(f64::NEG_INFINITY, f64::max);
        let marker = values
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_finite())
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i);
        Self {
            values,
            min,
            max,
            marker,
            style: Style::default().fg(Color::Cyan),
            marker_style: Style::default().fg(Color::Yellow),
        }
    }

    pub fn marker(mut self, index: Option<usize>) -> Self {
        self.marker = index;
        self
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    fn value_to_block(&self, value: f64) -> char {
        if !value.is_finite() || self.max <= self.min {
            return BLOCKS[0];
        }
        let normalized = ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0);
        let index = ((normalized * 7.0).round() as usize).min(7);
        BLOCKS[index]
    }
}

impl<'a> Widget for TrendSparkline<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let width = area.width as usize;

        // Keep the most recent values when the series is wider than the area
        let skip = self.values.len().saturating_sub(width);
        for (i, value) in self.values.iter().enumerate().skip(skip) {
            let block = self.value_to_block(*value);
            let x = area.x + (i - skip) as u16;
            let y = area.y;

            let style = if self.marker == Some(i) {
                self.marker_style
            } else {
                self.style
            };

            if let Some(cell) = buf.cell_mut((x, y)) {
                cell.set_char(block).set_style(style);
            }
        }
    }
}
