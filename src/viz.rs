//! Charts for the dashboard: the yearly Gini line and per-country indicator lines,
//! rendered to **SVG** or **PNG** (chosen by file extension).

use crate::catalog::title_label;
use crate::stats::GiniSeries;
use crate::table::ObservationTable;
use anyhow::{Result, anyhow};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Microsoft Office (2013+) chart series palette.
const OFFICE10: [RGBColor; 10] = [
    RGBColor(68, 114, 196),  // blue
    RGBColor(237, 125, 49),  // orange
    RGBColor(165, 165, 165), // gray
    RGBColor(255, 192, 0),   // gold
    RGBColor(91, 155, 213),  // light blue
    RGBColor(112, 173, 71),  // green
    RGBColor(38, 68, 120),   // dark blue
    RGBColor(158, 72, 14),   // dark orange
    RGBColor(99, 99, 99),    // dark gray
    RGBColor(153, 115, 0),   // brownish gold
];

fn office_color(idx: usize) -> RGBAColor {
    OFFICE10[idx % OFFICE10.len()].to_rgba()
}

/// Fonts tried when no font path is configured.
const FONT_CANDIDATES: [&str; 4] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/Library/Fonts/Arial.ttf",
];

static FONT_READY: OnceLock<bool> = OnceLock::new();

/// Register a "sans-serif" font for the `ab_glyph` text path, which does not discover
/// OS fonts. Runs once per process; returns whether text can be drawn.
pub fn ensure_fonts_registered(font_path: Option<&Path>) -> bool {
    *FONT_READY.get_or_init(|| {
        let mut candidates: Vec<PathBuf> = font_path.map(Path::to_path_buf).into_iter().collect();
        candidates.extend(FONT_CANDIDATES.iter().map(PathBuf::from));
        for path in candidates {
            let Ok(bytes) = std::fs::read(&path) else {
                continue;
            };
            let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
            let style = plotters::style::FontStyle::Normal;
            if plotters::style::register_font("sans-serif", style, bytes).is_ok() {
                log::debug!("registered chart font {}", path.display());
                return true;
            }
        }
        log::warn!("no usable font found; charts are drawn without text");
        false
    })
}

/// A named line in a chart.
struct Line {
    label: String,
    points: Vec<(i32, f64)>,
}

/// Yearly Gini coefficients as a line with markers. Undefined years are skipped.
pub fn plot_gini<P: AsRef<Path>>(
    series: &GiniSeries,
    out_path: P,
    width: u32,
    height: u32,
    title: &str,
) -> Result<()> {
    let points: Vec<(i32, f64)> = series.defined().collect();
    if points.is_empty() {
        return Err(anyhow!("no gini values to plot"));
    }
    let lines = vec![Line {
        label: "Gini".to_string(),
        points,
    }];
    render(&lines, out_path.as_ref(), width, height, title, "Gini index")
}

/// One line per country for `column`.
pub fn plot_indicator<P: AsRef<Path>>(
    table: &ObservationTable,
    column: &str,
    out_path: P,
    width: u32,
    height: u32,
    title: &str,
) -> Result<()> {
    let idx = table.column_index(column)?;
    let mut groups: BTreeMap<&str, Vec<(i32, f64)>> = BTreeMap::new();
    for row in table.rows() {
        if let Some(v) = row.values[idx] {
            groups.entry(row.country.as_str()).or_default().push((row.year, v));
        }
    }
    if groups.is_empty() {
        return Err(anyhow!("no data to plot"));
    }
    let lines: Vec<Line> = groups
        .into_iter()
        .map(|(country, mut points)| {
            points.sort_by_key(|(y, _)| *y);
            Line {
                label: country.to_string(),
                points,
            }
        })
        .collect();
    render(&lines, out_path.as_ref(), width, height, title, &title_label(column))
}

fn render(
    lines: &[Line],
    out_path: &Path,
    width: u32,
    height: u32,
    title: &str,
    y_desc: &str,
) -> Result<()> {
    let with_text = ensure_fonts_registered(None);
    let path_string = out_path.to_string_lossy().into_owned();

    let years = lines.iter().flat_map(|l| l.points.iter().map(|(y, _)| *y));
    let (mut min_year, mut max_year) =
        years.fold((i32::MAX, i32::MIN), |(lo, hi), y| (lo.min(y), hi.max(y)));
    if min_year == max_year {
        min_year -= 1;
        max_year += 1;
    }
    let values = lines.iter().flat_map(|l| l.points.iter().map(|(_, v)| *v));
    let (mut min_val, mut max_val) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if (max_val - min_val).abs() < f64::EPSILON {
        min_val -= 1.0;
        max_val += 1.0;
    }
    let pad = (max_val - min_val) * 0.05;
    let range = ChartRange {
        years: (min_year, max_year),
        values: (min_val - pad, max_val + pad),
    };

    if out_path.extension().and_then(|s| s.to_str()) == Some("svg") {
        let root = SVGBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_chart(root, lines, range, title, y_desc, with_text)
    } else {
        let root = BitMapBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_chart(root, lines, range, title, y_desc, with_text)
    }
}

#[derive(Clone, Copy)]
struct ChartRange {
    years: (i32, i32),
    values: (f64, f64),
}

/// Helper that draws to any Plotters backend.
fn draw_chart<DB>(
    root: DrawingArea<DB, Shift>,
    lines: &[Line],
    range: ChartRange,
    title: &str,
    y_desc: &str,
    with_text: bool,
) -> Result<()>
where
    DB: DrawingBackend,
{
    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;

    let mut builder = ChartBuilder::on(&root);
    builder.margin(20);
    if with_text {
        builder
            .caption(title, ("sans-serif", 24))
            .set_label_area_size(LabelAreaPosition::Left, 70)
            .set_label_area_size(LabelAreaPosition::Bottom, 44);
    }
    let mut chart = builder
        .build_cartesian_2d(range.years.0..range.years.1, range.values.0..range.values.1)
        .map_err(|e| anyhow!("{:?}", e))?;

    if with_text {
        let x_label_count = ((range.years.1 - range.years.0 + 1) as usize).min(12);
        chart
            .configure_mesh()
            .x_desc("Year")
            .y_desc(y_desc)
            .x_labels(x_label_count)
            .y_labels(10)
            .x_label_formatter(&|y: &i32| y.to_string())
            .y_label_formatter(&|v: &f64| format!("{:.2}", v))
            .label_style(("sans-serif", 14))
            .axis_desc_style(("sans-serif", 16))
            .draw()
            .map_err(|e| anyhow!("{:?}", e))?;
    }

    for (idx, line) in lines.iter().enumerate() {
        let color = office_color(idx);
        let style = ShapeStyle {
            color,
            filled: false,
            stroke_width: 2,
        };
        chart
            .draw_series(LineSeries::new(line.points.clone(), style))
            .map_err(|e| anyhow!("{:?}", e))?
            .label(line.label.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 24, y)], color));
        chart
            .draw_series(
                line.points
                    .iter()
                    .map(|&(x, y)| Circle::new((x, y), 3, color.filled())),
            )
            .map_err(|e| anyhow!("{:?}", e))?;
    }

    if with_text && lines.len() > 1 {
        chart
            .configure_series_labels()
            .border_style(&BLACK)
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(&WHITE.mix(0.85))
            .label_font(("sans-serif", 14))
            .draw()
            .map_err(|e| anyhow!("{:?}", e))?;
    }

    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}
