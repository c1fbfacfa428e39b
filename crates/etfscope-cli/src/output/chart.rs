//! Horizontal bar chart for the 1/5/10-year returns.

use etfscope_core::HistoricalReturns;

/// Width of the longest bar in characters.
pub const BAR_WIDTH: usize = 30;

const POSITIVE: char = '█';
const NEGATIVE: char = '░';

/// One line per period, scaled so the largest absolute return fills
/// [`BAR_WIDTH`]. Negative returns use a lighter glyph. A period the payload
/// does not report draws an empty bar labelled `n/a`.
pub fn render_bars(returns: &HistoricalReturns) -> Vec<String> {
    let series = returns.chart_series();
    let max = series
        .iter()
        .map(|(_, value)| value.abs())
        .fold(0.0_f64, f64::max);

    series
        .iter()
        .map(|(period, value)| {
            let glyph = if *value < 0.0 { NEGATIVE } else { POSITIVE };
            let bar: String = std::iter::repeat(glyph).take(bar_len(*value, max)).collect();
            let text = returns
                .get(*period)
                .map_or_else(|| String::from("n/a"), |reported| format!("{reported:+.2}%"));
            format!(
                "{:<7} | {bar:<width$} {text}",
                period.label(),
                width = BAR_WIDTH
            )
        })
        .collect()
}

fn bar_len(value: f64, max: f64) -> usize {
    if max == 0.0 || !value.is_finite() {
        return 0;
    }

    let scaled = (value.abs() / max * BAR_WIDTH as f64).round();
    (scaled as usize).min(BAR_WIDTH)
}
