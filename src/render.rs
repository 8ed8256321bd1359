// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::f64::consts::TAU;
use std::ops::Range;

use crate::chart::{
    category_domain, category_value, ChartSpec, ColorEncoding, Datum, FieldDef, Mark,
    CHART_DATE_FORMAT, PALETTE,
};

type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;

/// Draw a chart spec to an SVG document of `spec.width` x `spec.height`.
///
/// An empty data set still yields a chart frame with axes.
pub fn render_svg(spec: &ChartSpec) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (spec.width, spec.height)).into_drawing_area();
        root.fill(&WHITE)?;

        match spec.mark {
            Mark::Line => draw_line(&root, spec)?,
            Mark::Circle => draw_scatter(&root, spec)?,
            Mark::Arc => draw_arc(&root, spec)?,
            Mark::Bar => draw_bars(&root, spec)?,
        }

        root.present()?;
    }
    Ok(svg)
}

fn draw_line(root: &Area, spec: &ChartSpec) -> Result<()> {
    let x = encoded_field(&spec.encoding.x, "x")?;
    let y = encoded_field(&spec.encoding.y, "y")?;

    let mut points: Vec<(f64, f64)> = spec
        .data
        .values
        .iter()
        .filter_map(|d| Some((date_ordinal(d, x)?, number(d, y)?)))
        .collect();
    points.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut chart = ChartBuilder::on(root)
        .caption(&spec.title, ("sans-serif", 16))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(
            padded_range(points.iter().map(|p| p.0)),
            padded_range(points.iter().map(|p| p.1)),
        )?;

    chart
        .configure_mesh()
        .x_desc(x)
        .y_desc(y)
        .x_label_formatter(&|v| day_label(*v))
        .draw()?;

    chart.draw_series(LineSeries::new(points, constant_color(spec).stroke_width(2)))?;
    Ok(())
}

fn draw_scatter(root: &Area, spec: &ChartSpec) -> Result<()> {
    let x = encoded_field(&spec.encoding.x, "x")?;
    let y = encoded_field(&spec.encoding.y, "y")?;
    let point = |d: &Datum| Some((number(d, x)?, number(d, y)?));

    let points: Vec<(f64, f64)> = spec.data.values.iter().filter_map(point).collect();

    let mut chart = ChartBuilder::on(root)
        .caption(&spec.title, ("sans-serif", 16))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(
            padded_range(points.iter().map(|p| p.0)),
            padded_range(points.iter().map(|p| p.1)),
        )?;

    chart.configure_mesh().x_desc(x).y_desc(y).draw()?;

    match &spec.encoding.color {
        Some(ColorEncoding::Field(def)) => {
            for (category, hex) in spec.color_domain() {
                let color = rgb(hex);
                let group: Vec<(f64, f64)> = spec
                    .data
                    .values
                    .iter()
                    .filter(|d| category_value(d, &def.field).as_deref() == Some(category.as_str()))
                    .filter_map(point)
                    .collect();

                chart
                    .draw_series(group.into_iter().map(|p| Circle::new(p, 3, color.filled())))?
                    .label(category)
                    .legend(move |(lx, ly)| {
                        Rectangle::new([(lx, ly - 4), (lx + 8, ly + 4)], color.filled())
                    });
            }
            draw_legend(&mut chart)?;
        }
        _ => {
            let color = constant_color(spec);
            chart.draw_series(points.into_iter().map(|p| Circle::new(p, 3, color.filled())))?;
        }
    }

    Ok(())
}

fn draw_arc(root: &Area, spec: &ChartSpec) -> Result<()> {
    let theta = encoded_field(&spec.encoding.theta, "theta")?;
    let label_field = match &spec.encoding.color {
        Some(ColorEncoding::Field(def)) => Some(def.field.as_str()),
        _ => None,
    };
    let domain = spec.color_domain();

    root.draw_text(
        &spec.title,
        &TextStyle::from(("sans-serif", 16).into_font()).color(&BLACK),
        (10, 10),
    )?;

    let slices: Vec<(String, f64, RGBColor)> = spec
        .data
        .values
        .iter()
        .filter_map(|d| {
            let value = number(d, theta).filter(|v| *v > 0.0)?;
            let label = label_field
                .and_then(|f| category_value(d, f))
                .unwrap_or_default();
            let hex = domain
                .iter()
                .find(|(category, _)| *category == label)
                .map(|(_, hex)| *hex)
                .unwrap_or(PALETTE[0]);
            Some((label, value, rgb(hex)))
        })
        .collect();

    let total: f64 = slices.iter().map(|(_, v, _)| v).sum();
    if total <= 0.0 {
        return Ok(());
    }

    let center = (spec.width as i32 / 3, spec.height as i32 / 2 + 10);
    let radius = f64::from(spec.height) * 0.36;

    let mut covered = 0.0;
    for (_, value, color) in &slices {
        let start = covered / total * TAU;
        covered += value;
        let end = covered / total * TAU;
        root.draw(&Polygon::new(wedge(center, radius, start, end), color.filled()))?;
    }

    let legend_x = center.0 + radius as i32 + 60;
    for (i, (label, value, color)) in slices.iter().enumerate() {
        let y = 50 + i as i32 * 22;
        root.draw(&Rectangle::new(
            [(legend_x, y), (legend_x + 14, y + 14)],
            color.filled(),
        ))?;
        root.draw_text(
            &format!("{} ({:.1}%)", label, value / total * 100.0),
            &TextStyle::from(("sans-serif", 13).into_font()),
            (legend_x + 22, y),
        )?;
    }

    Ok(())
}

/// Bars per category of `x`. When the color field differs from `x` the
/// values for one category are stacked in color-domain order.
fn draw_bars(root: &Area, spec: &ChartSpec) -> Result<()> {
    let x = encoded_field(&spec.encoding.x, "x")?;
    let y = encoded_field(&spec.encoding.y, "y")?;
    let color_field = match &spec.encoding.color {
        Some(ColorEncoding::Field(def)) => Some(def.field.as_str()),
        _ => None,
    };

    let categories = category_domain(&spec.data.values, x);
    let domain = spec.color_domain();
    let layers = domain.len().max(1);

    let mut stacks = vec![vec![0.0; layers]; categories.len()];
    for d in &spec.data.values {
        let (Some(category), Some(value)) = (category_value(d, x), number(d, y)) else {
            continue;
        };
        let Some(xi) = categories.iter().position(|c| *c == category) else {
            continue;
        };
        let layer = color_field
            .and_then(|f| category_value(d, f))
            .and_then(|c| domain.iter().position(|(category, _)| *category == c))
            .unwrap_or(0);
        stacks[xi][layer] += value;
    }

    let tops = stacks.iter().map(|s| s.iter().sum::<f64>());
    let y_max = tops.fold(0.0_f64, f64::max);
    let y_top = if y_max > 0.0 { y_max * 1.1 } else { 1.0 };
    let slots = categories.len().max(1) as i32;

    let mut chart = ChartBuilder::on(root)
        .caption(&spec.title, ("sans-serif", 16))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(60)
        .build_cartesian_2d((0..slots).into_segmented(), 0.0..y_top)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(slots as usize + 1)
        .x_desc(x)
        .y_desc(y)
        .x_label_formatter(&|v| match v {
            SegmentValue::CenterOf(i) => categories.get(*i as usize).cloned().unwrap_or_default(),
            _ => String::new(),
        })
        .draw()?;

    for layer in 0..layers {
        let color = domain
            .get(layer)
            .map(|(_, hex)| rgb(hex))
            .unwrap_or_else(|| constant_color(spec));

        let bars: Vec<_> = stacks
            .iter()
            .enumerate()
            .filter(|(_, stack)| stack[layer] != 0.0)
            .map(|(xi, stack)| {
                let base: f64 = stack[..layer].iter().sum();
                let xi = xi as i32;
                let mut bar = Rectangle::new(
                    [
                        (SegmentValue::Exact(xi), base),
                        (SegmentValue::Exact(xi + 1), base + stack[layer]),
                    ],
                    color.filled(),
                );
                bar.set_margin(0, 0, 5, 5);
                bar
            })
            .collect();

        let series = chart.draw_series(bars)?;
        if let Some((label, _)) = domain.get(layer) {
            if color_field != Some(x) {
                series.label(label.clone()).legend(move |(lx, ly)| {
                    Rectangle::new([(lx, ly - 4), (lx + 8, ly + 4)], color.filled())
                });
            }
        }
    }

    if color_field.is_some() && color_field != Some(x) {
        draw_legend(&mut chart)?;
    }

    Ok(())
}

fn draw_legend<'a, 'b: 'a, X, Y>(
    chart: &mut ChartContext<'a, SVGBackend<'b>, Cartesian2d<X, Y>>,
) -> Result<()>
where
    X: Ranged,
    Y: Ranged,
{
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(("sans-serif", 11))
        .draw()?;
    Ok(())
}

/// Outline of a pie wedge. Angles are radians measured clockwise from
/// 12 o'clock, with roughly one vertex per degree of arc.
fn wedge(center: (i32, i32), radius: f64, start: f64, end: f64) -> Vec<(i32, i32)> {
    let steps = ((end - start).abs().to_degrees().round() as usize).max(1);
    std::iter::once(center)
        .chain((0..=steps).map(|i| {
            let angle = start + (end - start) * i as f64 / steps as f64;
            (
                center.0 + (radius * angle.sin()).round() as i32,
                center.1 - (radius * angle.cos()).round() as i32,
            )
        }))
        .collect()
}

fn encoded_field<'s>(def: &'s Option<FieldDef>, channel: &str) -> Result<&'s str> {
    def.as_ref()
        .map(|d| d.field.as_str())
        .with_context(|| format!("chart has no {} encoding", channel))
}

fn constant_color(spec: &ChartSpec) -> RGBColor {
    match &spec.encoding.color {
        Some(ColorEncoding::Value { value }) => rgb(value),
        _ => rgb(PALETTE[0]),
    }
}

/// `#rrggbb` to an RGB color; malformed channels read as 0.
fn rgb(hex: &str) -> RGBColor {
    let hex = hex.trim_start_matches('#');
    let channel = |i: usize| {
        hex.get(i..i + 2)
            .and_then(|c| u8::from_str_radix(c, 16).ok())
            .unwrap_or(0)
    };
    RGBColor(channel(0), channel(2), channel(4))
}

fn number(datum: &Datum, field: &str) -> Option<f64> {
    datum.get(field)?.as_f64()
}

/// Temporal values are plotted as days since the common era.
fn date_ordinal(datum: &Datum, field: &str) -> Option<f64> {
    let raw = datum.get(field)?.as_str()?;
    let date = NaiveDate::parse_from_str(raw, CHART_DATE_FORMAT).ok()?;
    Some(f64::from(date.num_days_from_ce()))
}

fn day_label(days: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(days.round() as i32)
        .map(|d| d.format("%Y-%m").to_string())
        .unwrap_or_default()
}

fn padded_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }
    if (max - min).abs() < f64::EPSILON {
        return (min - 1.0)..(max + 1.0);
    }
    let pad = (max - min) * 0.05;
    (min - pad)..(max + pad)
}
