//! Terminal renderer for chart specs.
//!
//! Charts are drawn with ratatui widgets into an off-screen [`Buffer`] and
//! the buffer is flattened to text. With `colorize` off every series gets
//! its own glyph so charts stay readable in logs and tests; with it on,
//! every bar cell is a full block painted in the series color.

use colored::Colorize;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Bar, BarChart, BarGroup, Widget};

use super::{ChartKind, ChartSpec, Series, SeriesColor};

/// Narrowest bar area a chart will shrink to.
pub const MIN_WIDTH: u16 = 10;

/// Longest category label before truncation.
const MAX_LABEL: usize = 20;

const FULL: &str = "█";

pub fn render(spec: &ChartSpec, width: u16, colorize: bool) -> String {
    let width = width.max(MIN_WIDTH);
    let body = match spec.kind {
        ChartKind::Doughnut => draw_doughnut(spec, width),
        ChartKind::StackedBar => draw_stacked(spec, width),
        ChartKind::GroupedBar => draw_grouped(spec, width),
    };

    let mut out = String::new();
    out.push_str(&spec.title);
    out.push('\n');
    match body {
        Some(buf) => out.push_str(&flatten(&buf, colorize)),
        None => out.push_str("  (no data)\n"),
    }
    out
}

// ---------------------------------------------------------------------------
// Drawing
// ---------------------------------------------------------------------------

/// Share strip across the full width, then one bar per segment scaled to
/// the grand total.
fn draw_doughnut(spec: &ChartSpec, width: u16) -> Option<Buffer> {
    let total = spec.total();
    if total == 0 {
        return None;
    }

    let values: Vec<u64> = spec.series.iter().map(first_value).collect();
    let labels: Vec<String> = spec
        .series
        .iter()
        .zip(&values)
        .map(|(series, value)| {
            let pct = (*value as f64 / total as f64) * 100.0;
            format!("{} {value} ({pct:.1}%)", series.label)
        })
        .collect();
    let label_width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0) as u16;

    let rows = height(spec.series.len()) + 2;
    let chart_width = label_width + 1 + width;
    let mut buf = Buffer::empty(Rect::new(0, 0, 2 + chart_width, rows));

    let strip = Rect::new(2, 0, width, 1);
    fill_segments(&mut buf, strip, &spec.series, &values, total);

    let bars: Vec<Bar> = spec
        .series
        .iter()
        .zip(values.iter().zip(labels))
        .map(|(series, (value, label))| {
            Bar::default()
                .value(*value)
                .label(Line::from(label))
                .text_value(String::new())
                .style(Style::default().fg(color(series.color)))
        })
        .collect();

    BarChart::default()
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .max(total)
        .data(BarGroup::default().bars(&bars))
        .render(Rect::new(2, 2, chart_width, rows - 2), &mut buf);

    Some(buf)
}

/// Legend row, then one row per category with its series laid end to end.
/// Rows scale to the largest category total.
fn draw_stacked(spec: &ChartSpec, width: u16) -> Option<Buffer> {
    if spec.labels.is_empty() {
        return None;
    }

    let label_width = label_column_width(&spec.labels);
    let counts: Vec<String> = (0..spec.labels.len())
        .map(|i| {
            spec.series
                .iter()
                .map(|s| value_at(&s.values, i).to_string())
                .collect::<Vec<_>>()
                .join(" / ")
        })
        .collect();
    let counts_width = counts.iter().map(|c| c.chars().count()).max().unwrap_or(0) as u16;

    let legend_width: u16 = spec
        .series
        .iter()
        .map(|s| 2 + s.label.chars().count() as u16 + 2)
        .sum();
    let rows = height(spec.labels.len()) + 1;
    let row_width = 2 + label_width + 1 + width + 1 + counts_width;
    let area = Rect::new(0, 0, row_width.max(2 + legend_width), rows);
    let mut buf = Buffer::empty(area);

    let mut x = 2;
    for series in &spec.series {
        let style = Style::default().fg(color(series.color));
        buf.set_string(x, 0, FULL, style);
        buf.set_string(x + 2, 0, &series.label, Style::default());
        x += 2 + series.label.chars().count() as u16 + 2;
    }

    let max = (0..spec.labels.len())
        .map(|i| spec.series.iter().map(|s| value_at(&s.values, i)).sum::<u64>())
        .max()
        .unwrap_or(0);

    for (i, label) in spec.labels.iter().enumerate() {
        let y = i as u16 + 1;
        let [label_area, bar_area, count_area] = Layout::horizontal([
            Constraint::Length(2 + label_width + 1),
            Constraint::Length(width + 1),
            Constraint::Length(counts_width),
        ])
        .areas(Rect::new(0, y, row_width, 1));

        buf.set_string(label_area.x + 2, y, truncate(label, MAX_LABEL), Style::default());
        let values: Vec<u64> = spec.series.iter().map(|s| value_at(&s.values, i)).collect();
        let bar = Rect {
            width: bar_area.width - 1,
            ..bar_area
        };
        fill_segments(&mut buf, bar, &spec.series, &values, max);
        buf.set_string(count_area.x, y, &counts[i], Style::default());
    }

    Some(buf)
}

/// One bar group per category, one bar per series.
fn draw_grouped(spec: &ChartSpec, width: u16) -> Option<Buffer> {
    if spec.labels.is_empty() {
        return None;
    }

    let label_width = usize::from(label_column_width(&spec.labels));
    let series_width = spec
        .series
        .iter()
        .map(|s| s.label.chars().count())
        .max()
        .unwrap_or(0);
    let number_width = spec
        .series
        .iter()
        .flat_map(|s| s.values.iter())
        .map(|v| v.to_string().len())
        .max()
        .unwrap_or(1);

    // Every bar label has the same width so the bars share one left edge.
    let groups: Vec<BarGroup> = spec
        .labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let bars: Vec<Bar> = spec
                .series
                .iter()
                .enumerate()
                .map(|(j, series)| {
                    let value = value_at(&series.values, i);
                    let shown = if j == 0 {
                        truncate(label, MAX_LABEL)
                    } else {
                        String::new()
                    };
                    Bar::default()
                        .value(value)
                        .label(Line::from(format!(
                            "{shown:<label_width$} {:<series_width$} {value:>number_width$}",
                            series.label
                        )))
                        .text_value(String::new())
                        .style(Style::default().fg(color(series.color)))
                })
                .collect();
            BarGroup::default().bars(&bars)
        })
        .collect();

    let per_group = spec.series.len().max(1);
    let rows = (height(per_group) + 1) * height(spec.labels.len()) - 1;
    let label_column = (label_width + 1 + series_width + 1 + number_width) as u16;
    let chart_width = label_column + 1 + width;

    let mut buf = Buffer::empty(Rect::new(0, 0, 2 + chart_width, rows));
    let mut chart = BarChart::default()
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .group_gap(1);
    for group in groups {
        chart = chart.data(group);
    }
    chart.render(Rect::new(2, 0, chart_width, rows), &mut buf);

    Some(buf)
}

/// Split `area` between `values` in proportion to `scale`, one colored run
/// per series. Trailing space is left blank.
fn fill_segments(buf: &mut Buffer, area: Rect, series: &[Series], values: &[u64], scale: u64) {
    if scale == 0 {
        return;
    }
    let scale = u32::try_from(scale).unwrap_or(u32::MAX);
    let mut constraints: Vec<Constraint> = values
        .iter()
        .map(|&v| Constraint::Ratio(u32::try_from(v).unwrap_or(u32::MAX).min(scale), scale))
        .collect();
    constraints.push(Constraint::Fill(1));

    let segments = Layout::horizontal(constraints).split(area);
    for (series, segment) in series.iter().zip(segments.iter()) {
        let style = Style::default().fg(color(series.color));
        buf.set_string(
            segment.x,
            segment.y,
            FULL.repeat(usize::from(segment.width)),
            style,
        );
    }
}

// ---------------------------------------------------------------------------
// Buffer to text
// ---------------------------------------------------------------------------

fn flatten(buf: &Buffer, colorize: bool) -> String {
    let area = buf.area;
    let mut out = String::new();
    for y in area.top()..area.bottom() {
        let mut line = String::new();
        for x in area.left()..area.right() {
            let cell = &buf[(x, y)];
            line.push_str(&paint_cell(cell.symbol(), cell.fg, colorize));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

fn paint_cell(symbol: &str, fg: Color, colorize: bool) -> String {
    if symbol != FULL {
        return symbol.to_string();
    }
    if !colorize {
        let glyph = match fg {
            Color::Green => "░",
            Color::Blue => "▓",
            _ => FULL,
        };
        return glyph.to_string();
    }
    match fg {
        Color::Red => symbol.red().to_string(),
        Color::Green => symbol.green().to_string(),
        Color::Blue => symbol.blue().to_string(),
        _ => symbol.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn color(color: SeriesColor) -> Color {
    match color {
        SeriesColor::Red => Color::Red,
        SeriesColor::Green => Color::Green,
        SeriesColor::Blue => Color::Blue,
    }
}

/// Rows taken by `bars` single-line bars with no gaps.
fn height(bars: usize) -> u16 {
    u16::try_from(bars).unwrap_or(u16::MAX)
}

fn first_value(series: &Series) -> u64 {
    series.values.first().copied().unwrap_or(0)
}

fn value_at(values: &[u64], i: usize) -> u64 {
    values.get(i).copied().unwrap_or(0)
}

fn label_column_width(labels: &[String]) -> u16 {
    labels
        .iter()
        .map(|l| l.chars().count().min(MAX_LABEL))
        .max()
        .unwrap_or(0) as u16
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{head}…")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn glyphs(line: &str, glyph: char) -> usize {
        line.chars().filter(|c| *c == glyph).count()
    }

    #[test]
    fn doughnut_strip_is_split_by_share() {
        let spec = ChartSpec::doughnut(
            "Detection Result",
            &[
                ("Fraud", 1, SeriesColor::Red),
                ("Non-Fraud", 3, SeriesColor::Green),
            ],
        );
        let text = render(&spec, 20, false);
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Detection Result"));
        let strip = lines.next().unwrap();
        assert_eq!(strip.trim(), format!("{}{}", "█".repeat(5), "░".repeat(15)));
        assert!(text.contains("Fraud 1 (25.0%)"));
        assert!(text.contains("Non-Fraud 3 (75.0%)"));
    }

    #[test]
    fn doughnut_segment_bars_scale_to_total() {
        let spec = ChartSpec::doughnut(
            "Split",
            &[("Fraud", 1, SeriesColor::Red), ("Legit", 3, SeriesColor::Green)],
        );
        let text = render(&spec, 20, false);
        let fraud = text.lines().find(|l| l.contains("Fraud 1")).unwrap();
        let legit = text.lines().find(|l| l.contains("Legit 3")).unwrap();
        assert!(glyphs(legit, '░') > glyphs(fraud, '█'));
        assert!(glyphs(fraud, '█') > 0);
    }

    #[test]
    fn empty_doughnut_says_no_data() {
        let spec = ChartSpec::doughnut("Empty", &[("Fraud", 0, SeriesColor::Red)]);
        assert_eq!(render(&spec, 10, false), "Empty\n  (no data)\n");
    }

    #[test]
    fn stacked_rows_scale_to_largest_total() {
        let spec = ChartSpec::stacked_bar(
            "By category",
            vec!["Books".into(), "Toys".into()],
            vec![
                Series::new("Fraud", SeriesColor::Red, vec![5, 1]),
                Series::new("Non-Fraud", SeriesColor::Green, vec![5, 4]),
            ],
        );
        let text = render(&spec, 10, false);
        let legend = text.lines().nth(1).unwrap();
        assert!(legend.contains("█ Fraud"));
        assert!(legend.contains("░ Non-Fraud"));

        let books = text.lines().find(|l| l.contains("Books")).unwrap();
        let toys = text.lines().find(|l| l.contains("Toys")).unwrap();
        assert!(books.contains(&format!("{}{}", "█".repeat(5), "░".repeat(5))));
        assert!(books.ends_with("5 / 5"));
        assert!(toys.contains(&format!("{}{}", "█".repeat(1), "░".repeat(4))));
        assert!(toys.ends_with("1 / 4"));
    }

    #[test]
    fn grouped_bars_list_every_series() {
        let spec = ChartSpec::grouped_bar(
            "Merchants",
            vec!["Retail".into(), "Books".into()],
            vec![
                Series::new("Total", SeriesColor::Blue, vec![10, 4]),
                Series::new("Fraudulent", SeriesColor::Red, vec![5, 0]),
            ],
        );
        let text = render(&spec, 10, false);
        let retail_total = text
            .lines()
            .find(|l| l.contains("Retail") && l.contains("Total"))
            .unwrap();
        let fraud_rows: Vec<&str> = text.lines().filter(|l| l.contains("Fraudulent")).collect();
        let books_total = text
            .lines()
            .find(|l| l.contains("Books") && l.contains("Total"))
            .unwrap();

        assert_eq!(fraud_rows.len(), 2);
        assert!(retail_total.contains("Total      10"));
        assert_eq!(glyphs(retail_total, '▓'), 10);
        assert_eq!(glyphs(fraud_rows[0], '█'), 5);
        assert_eq!(glyphs(books_total, '▓'), 4);
        assert_eq!(glyphs(fraud_rows[1], '█'), 0);
    }

    #[test]
    fn empty_bar_chart_says_no_data() {
        let spec = ChartSpec::grouped_bar("Merchants", vec![], vec![]);
        assert!(render(&spec, 10, false).contains("(no data)"));
    }

    #[test]
    fn colorize_keeps_labels_plain() {
        assert_eq!(paint_cell("F", Color::Red, true), "F");
        assert_eq!(paint_cell(FULL, Color::Green, false), "░");
        assert_eq!(paint_cell(FULL, Color::Red, false), FULL);
    }

    #[test]
    fn long_labels_are_truncated() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 5), "abcd…");
    }
}
