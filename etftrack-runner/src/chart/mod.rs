//! Chart rendering (SVG).
//!
//! Two charts per ticker:
//! - technical: candlesticks with moving averages, volume, KD, MACD
//! - summary: close with moving averages and past signal markers
//!
//! Candle colours follow the Taiwan convention: red up, green down.

pub mod svg;

use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use thiserror::Error;

use etftrack_core::domain::PriceSeries;
use etftrack_core::indicators::IndicatorFrame;
use etftrack_core::signal::{Decision, Signal, Thresholds};

use crate::config::ChartConfig;
use svg::{value_range, Panel, SvgCanvas, DOWN_COLOR, UP_COLOR};

const K_COLOR: &str = "#2962ff";
const D_COLOR: &str = "#ff9800";
const CLOSE_COLOR: &str = "#1E88E5";
const MA_SHORT_COLOR: &str = "#FFC107";
const MA_LONG_COLOR: &str = "#D81B60";

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("need at least 2 bars to chart, have {bars}")]
    NotEnoughData { bars: usize },

    #[error("price series and indicator frame differ in length ({series} vs {frame})")]
    Misaligned { series: usize, frame: usize },

    #[error("write chart {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

/// Everything a chart needs about one ticker.
pub struct ChartInput<'a> {
    pub code: &'a str,
    pub series: &'a PriceSeries,
    pub frame: &'a IndicatorFrame,
    pub decision: &'a Decision,
    /// Past non-Hold decisions by bar index.
    pub history: &'a [(usize, Decision)],
    pub thresholds: &'a Thresholds,
}

/// Paths of the written chart files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartPaths {
    pub technical: PathBuf,
    pub summary: PathBuf,
}

pub fn technical_file_name(code: &str, date: NaiveDate) -> String {
    format!("{code}_technical_{date}.svg")
}

pub fn summary_file_name(code: &str, date: NaiveDate) -> String {
    format!("{code}_summary_{date}.svg")
}

/// The last `n` bars as an index range into the full series.
fn window(input: &ChartInput<'_>, n: usize) -> Result<std::ops::Range<usize>, ChartError> {
    let len = input.series.len();
    if input.frame.len() != len {
        return Err(ChartError::Misaligned {
            series: len,
            frame: input.frame.len(),
        });
    }
    let start = len.saturating_sub(n);
    if len - start < 2 {
        return Err(ChartError::NotEnoughData { bars: len - start });
    }
    Ok(start..len)
}

fn title(input: &ChartInput<'_>, kind: &str) -> String {
    let last = input.series.latest();
    let change_pct = match input.series.previous() {
        Some(prev) if prev.close != 0.0 => (last.close - prev.close) / prev.close * 100.0,
        _ => 0.0,
    };
    format!(
        "{} {kind} | {} | Close: {:.2} ({change_pct:+.2}%) | Signal: {}",
        input.code,
        last.date,
        last.close,
        input.decision.label()
    )
}

/// Signal markers inside the window, re-indexed from the window start.
fn markers(input: &ChartInput<'_>, range: &std::ops::Range<usize>) -> Vec<(usize, Signal)> {
    input
        .history
        .iter()
        .filter(|(i, _)| range.contains(i))
        .map(|(i, d)| (i - range.start, d.signal))
        .collect()
}

fn date_axis(canvas: &mut SvgCanvas, panel: &Panel, dates: &[NaiveDate]) {
    let Some(last) = dates.len().checked_sub(1) else {
        return;
    };
    for (i, anchor) in [(0, "start"), (last / 2, "middle"), (last, "end")] {
        canvas.text(panel.x(i), panel.bottom() + 16.0, 11.0, anchor, &dates[i].to_string());
    }
}

/// Candles, volume, KD and MACD stacked with height ratios 3:1:1:1.
pub fn technical_chart(input: &ChartInput<'_>, last_n: usize) -> Result<String, ChartError> {
    const WIDTH: f64 = 1200.0;
    const HEIGHT: f64 = 900.0;
    const LEFT: f64 = 70.0;
    const RIGHT: f64 = 20.0;
    const TOP: f64 = 50.0;
    const BOTTOM: f64 = 40.0;
    const GAP: f64 = 15.0;

    let range = window(input, last_n)?;
    let bars = &input.series.bars()[range.clone()];
    let frame = input.frame;
    let n = bars.len();

    let plot_w = WIDTH - LEFT - RIGHT;
    let unit = (HEIGHT - TOP - BOTTOM - 3.0 * GAP) / 6.0;

    let mut canvas = SvgCanvas::new(WIDTH, HEIGHT);
    canvas.text(WIDTH / 2.0, 28.0, 18.0, "middle", &title(input, "Technical Analysis"));

    // Price
    let ma_short = &frame.ma_short[range.clone()];
    let ma_long = &frame.ma_long[range.clone()];
    let (lo, hi) = value_range(
        bars.iter()
            .flat_map(|b| [b.low, b.high])
            .chain(ma_short.iter().copied())
            .chain(ma_long.iter().copied()),
    )
    .unwrap_or((0.0, 1.0));
    let price = Panel::new(LEFT, TOP, plot_w, unit * 3.0, n).with_range(lo, hi, 0.05);
    canvas.frame(&price);
    let body_w = (price.slot_width() * 0.6).max(1.0);
    for (i, bar) in bars.iter().enumerate() {
        let color = if bar.close >= bar.open { UP_COLOR } else { DOWN_COLOR };
        let x = price.x(i);
        canvas.line(x, price.y(bar.high), x, price.y(bar.low), color, 1.0);
        let top = price.y(bar.open.max(bar.close));
        let h = (price.y(bar.open.min(bar.close)) - top).max(1.0);
        canvas.rect(x - body_w / 2.0, top, body_w, h, color);
    }
    canvas.series(&price, ma_short, MA_SHORT_COLOR, 1.5);
    canvas.series(&price, ma_long, MA_LONG_COLOR, 1.5);
    for (i, signal) in markers(input, &range) {
        match signal {
            Signal::Buy => {
                canvas.triangle(price.x(i), price.y(bars[i].low) + 10.0, 6.0, true, UP_COLOR)
            }
            Signal::Sell => {
                canvas.triangle(price.x(i), price.y(bars[i].high) - 10.0, 6.0, false, DOWN_COLOR)
            }
            Signal::Hold => {}
        }
    }
    canvas.axis_labels(&price, 2);
    let short_label = format!("MA{}", frame.params.ma_short);
    let long_label = format!("MA{}", frame.params.ma_long);
    canvas.legend(
        &price,
        &[
            (short_label.as_str(), MA_SHORT_COLOR),
            (long_label.as_str(), MA_LONG_COLOR),
        ],
    );

    // Volume
    let max_volume = bars.iter().map(|b| b.volume).max().unwrap_or(0) as f64;
    let volume =
        Panel::new(LEFT, price.bottom() + GAP, plot_w, unit, n).with_range(0.0, max_volume, 0.0);
    canvas.frame(&volume);
    let vol_w = (volume.slot_width() * 0.8).max(1.0);
    for (i, bar) in bars.iter().enumerate() {
        let color = if bar.close >= bar.open { UP_COLOR } else { DOWN_COLOR };
        let top = volume.y(bar.volume as f64);
        canvas.rect(volume.x(i) - vol_w / 2.0, top, vol_w, volume.bottom() - top, color);
    }
    canvas.axis_labels(&volume, 0);

    // KD
    let kd = Panel::new(LEFT, volume.bottom() + GAP, plot_w, unit, n).with_range(0.0, 100.0, 0.0);
    canvas.frame(&kd);
    canvas.guide(&kd, input.thresholds.kd_high, UP_COLOR);
    canvas.guide(&kd, input.thresholds.kd_low, DOWN_COLOR);
    canvas.series(&kd, &frame.k[range.clone()], K_COLOR, 1.5);
    canvas.series(&kd, &frame.d[range.clone()], D_COLOR, 1.5);
    canvas.axis_labels(&kd, 0);
    canvas.legend(&kd, &[("K", K_COLOR), ("D", D_COLOR)]);

    // MACD
    let macd_line = &frame.macd[range.clone()];
    let macd_signal = &frame.macd_signal[range.clone()];
    let macd_hist = &frame.macd_hist[range.clone()];
    let (lo, hi) = value_range(
        macd_line
            .iter()
            .chain(macd_signal)
            .chain(macd_hist)
            .copied()
            .chain([0.0]),
    )
    .unwrap_or((-1.0, 1.0));
    let macd = Panel::new(LEFT, kd.bottom() + GAP, plot_w, unit, n).with_range(lo, hi, 0.1);
    canvas.frame(&macd);
    let zero = macd.y(0.0);
    canvas.line(macd.left, zero, macd.right(), zero, "#9598a1", 1.0);
    for (i, h) in macd_hist.iter().enumerate().filter(|(_, h)| h.is_finite()) {
        let color = if *h >= 0.0 { UP_COLOR } else { DOWN_COLOR };
        let y = macd.y(*h);
        canvas.rect(macd.x(i) - vol_w / 2.0, y.min(zero), vol_w, (y - zero).abs(), color);
    }
    canvas.series(&macd, macd_line, K_COLOR, 1.5);
    canvas.series(&macd, macd_signal, D_COLOR, 1.5);
    canvas.axis_labels(&macd, 3);
    canvas.legend(&macd, &[("MACD", K_COLOR), ("Signal", D_COLOR)]);

    date_axis(&mut canvas, &macd, &frame.dates[range]);
    Ok(canvas.finish())
}

/// Close price with moving averages and signal markers over the last `last_n` bars.
pub fn summary_chart(input: &ChartInput<'_>, last_n: usize) -> Result<String, ChartError> {
    const WIDTH: f64 = 1000.0;
    const HEIGHT: f64 = 600.0;

    let range = window(input, last_n)?;
    let frame = input.frame;
    let closes = &frame.closes[range.clone()];
    let ma_short = &frame.ma_short[range.clone()];
    let ma_long = &frame.ma_long[range.clone()];

    let mut canvas = SvgCanvas::new(WIDTH, HEIGHT);
    canvas.text(WIDTH / 2.0, 28.0, 16.0, "middle", &title(input, "Signal Summary"));

    let (lo, hi) = value_range(closes.iter().chain(ma_short).chain(ma_long).copied())
        .unwrap_or((0.0, 1.0));
    let panel = Panel::new(70.0, 50.0, WIDTH - 90.0, HEIGHT - 100.0, closes.len())
        .with_range(lo, hi, 0.08);
    canvas.frame(&panel);
    canvas.series(&panel, closes, CLOSE_COLOR, 2.0);
    canvas.series(&panel, ma_short, MA_SHORT_COLOR, 1.5);
    canvas.series(&panel, ma_long, MA_LONG_COLOR, 1.5);
    for (i, signal) in markers(input, &range) {
        let (x, y) = (panel.x(i), panel.y(closes[i]));
        match signal {
            Signal::Buy => canvas.triangle(x, y + 12.0, 7.0, true, UP_COLOR),
            Signal::Sell => canvas.triangle(x, y - 12.0, 7.0, false, DOWN_COLOR),
            Signal::Hold => {}
        }
    }
    canvas.axis_labels(&panel, 2);
    let short_label = format!("{}-day MA", frame.params.ma_short);
    let long_label = format!("{}-day MA", frame.params.ma_long);
    canvas.legend(
        &panel,
        &[
            ("Close", CLOSE_COLOR),
            (short_label.as_str(), MA_SHORT_COLOR),
            (long_label.as_str(), MA_LONG_COLOR),
        ],
    );

    if let Ok(latest) = frame.snapshot(frame.len() - 1) {
        let detail = format!(
            "K {:.1}  D {:.1}  MACD {:.3}  RSI {:.1}",
            latest.k, latest.d, latest.macd, latest.rsi
        );
        canvas.text(panel.right() - 8.0, panel.top + 16.0, 12.0, "end", &input.decision.label());
        canvas.text(panel.right() - 8.0, panel.top + 32.0, 11.0, "end", &detail);
    }

    date_axis(&mut canvas, &panel, &frame.dates[range]);
    Ok(canvas.finish())
}

fn write_svg(path: &Path, content: &str) -> Result<(), ChartError> {
    std::fs::write(path, content).map_err(|source| ChartError::Write {
        path: path.display().to_string(),
        source,
    })
}

/// Render both charts into `dir`, named by code and run date.
pub fn write_charts(
    input: &ChartInput<'_>,
    config: &ChartConfig,
    dir: &Path,
    date: NaiveDate,
) -> Result<ChartPaths, ChartError> {
    let technical = dir.join(technical_file_name(input.code, date));
    let summary = dir.join(summary_file_name(input.code, date));

    write_svg(&technical, &technical_chart(input, config.last_n_days)?)?;
    write_svg(&summary, &summary_chart(input, config.summary_days)?)?;

    Ok(ChartPaths { technical, summary })
}
