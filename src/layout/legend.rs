use crate::api::ChartConfig;
use crate::layout::TextMeasurer;
use crate::render::{Color, DrawCommand, RectPrimitive, TextHAlign, TextPrimitive, TextVAlign};

/// One legend item: a color swatch followed by its text.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub text: String,
    pub fill: Color,
    pub stroke: Color,
}

/// Legend entries wrapped into a grid that fits the available width.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendLayout {
    pub entries: Vec<LegendEntry>,
    pub columns: usize,
    pub rows: usize,
    pub column_width: f64,
    pub row_height: f64,
    /// Outer size including the optional border box.
    pub width: f64,
    pub height: f64,
    padding: f64,
}

impl LegendLayout {
    /// Wraps `entries` into rows. Returns `None` when there is nothing to show.
    #[must_use]
    pub fn compute(
        entries: Vec<LegendEntry>,
        available_width: f64,
        config: &ChartConfig,
        measurer: &dyn TextMeasurer,
    ) -> Option<Self> {
        let entries: Vec<LegendEntry> = entries
            .into_iter()
            .filter(|entry| !entry.text.is_empty())
            .collect();
        if entries.is_empty() {
            return None;
        }

        let padding = if config.legend_border {
            config.legend_border_padding + config.legend_border_width
        } else {
            0.0
        };
        let widest_text = entries
            .iter()
            .map(|entry| {
                measurer.text_width(&entry.text, config.legend_font_size, &config.font_family)
            })
            .fold(0.0, f64::max);
        let column_width = config.legend_block_size
            + config.legend_spacing_block_text
            + widest_text
            + config.legend_spacing_horizontal;
        let usable = available_width - 2.0 * padding + config.legend_spacing_horizontal;
        let fitting = if column_width > 0.0 {
            (usable / column_width).floor().max(1.0) as usize
        } else {
            entries.len()
        };
        let columns = fitting.min(entries.len());
        let rows = entries.len().div_ceil(columns);
        let row_height =
            config.legend_font_size.max(config.legend_block_size) + config.legend_spacing_vertical;

        Some(Self {
            width: columns as f64 * column_width - config.legend_spacing_horizontal + 2.0 * padding,
            height: rows as f64 * row_height - config.legend_spacing_vertical + 2.0 * padding,
            entries,
            columns,
            rows,
            column_width,
            row_height,
            padding,
        })
    }

    /// Emits swatches and texts with the block horizontally centered on
    /// `center_x` and its top edge at `top`.
    pub fn draw(&self, center_x: f64, top: f64, config: &ChartConfig, out: &mut Vec<DrawCommand>) {
        let left = center_x - self.width / 2.0;
        if config.legend_border {
            out.push(DrawCommand::Rect(
                RectPrimitive::new(left, top, self.width, self.height, Color::TRANSPARENT)
                    .with_border(config.legend_border_color, config.legend_border_width),
            ));
        }

        let block = config.legend_block_size;
        for (index, entry) in self.entries.iter().enumerate() {
            let column = index % self.columns;
            let row = index / self.columns;
            let x = left + self.padding + column as f64 * self.column_width;
            let row_top = top + self.padding + row as f64 * self.row_height;
            let row_middle = row_top + (self.row_height - config.legend_spacing_vertical) / 2.0;

            out.push(DrawCommand::Rect(
                RectPrimitive::new(x, row_middle - block / 2.0, block, block, entry.fill)
                    .with_border(entry.stroke, 1.0),
            ));
            out.push(DrawCommand::Text(
                TextPrimitive::new(
                    entry.text.clone(),
                    x + block + config.legend_spacing_block_text,
                    row_middle,
                    config.legend_font_size,
                    config.legend_font_color,
                    TextHAlign::Left,
                )
                .with_font_family(config.font_family.clone())
                .with_v_align(TextVAlign::Middle),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{LegendEntry, LegendLayout};
    use crate::api::ChartConfig;
    use crate::layout::HeuristicTextMeasurer;
    use crate::render::Color;

    fn entries(count: usize) -> Vec<LegendEntry> {
        (0..count)
            .map(|index| LegendEntry {
                text: format!("Series {index}"),
                fill: Color::BLACK,
                stroke: Color::BLACK,
            })
            .collect()
    }

    #[test]
    fn wraps_entries_into_rows() {
        let config = ChartConfig::default();
        let wide = LegendLayout::compute(entries(4), 2_000.0, &config, &HeuristicTextMeasurer)
            .expect("layout");
        assert_eq!((wide.columns, wide.rows), (4, 1));

        let narrow = LegendLayout::compute(entries(4), 250.0, &config, &HeuristicTextMeasurer)
            .expect("layout");
        assert!(narrow.columns < 4);
        assert_eq!(narrow.rows, 4usize.div_ceil(narrow.columns));
        assert!(narrow.width <= 250.0);
    }

    #[test]
    fn draws_one_swatch_and_text_per_entry() {
        let config = ChartConfig {
            legend_border: true,
            ..ChartConfig::default()
        };
        let layout = LegendLayout::compute(entries(3), 800.0, &config, &HeuristicTextMeasurer)
            .expect("layout");
        let mut out = Vec::new();
        layout.draw(400.0, 10.0, &config, &mut out);
        assert_eq!(out.len(), 1 + 3 * 2);
    }

    #[test]
    fn untitled_entries_are_skipped() {
        let mut list = entries(1);
        list[0].text.clear();
        assert!(
            LegendLayout::compute(list, 800.0, &ChartConfig::default(), &HeuristicTextMeasurer)
                .is_none()
        );
    }
}
