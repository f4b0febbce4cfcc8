//! Frame geometry for the spectrum and loudness meter
//!
//! Pure layout: callers hand in analyser bins and an RMS level, these
//! functions decide which cells of the terminal grid light up. Actual
//! painting lives in `ui`.

// ===== Spectrum Geometry =====

/// Full-scale bar height in the analyser's byte domain
const MAX_BAR: f32 = 127.5;

/// Map analyser bins onto terminal columns
///
/// Returns one bin value per column, 0 where no bar is drawn. Bars are
/// laid out left to right, each 2.5 cells per bin of available width
/// with a one-cell gap after it. Bars that land past the right edge
/// are dropped.
pub fn spectrum_columns(bins: &[u8], width: usize) -> Vec<u8> {
    let mut columns = vec![0u8; width];
    if bins.is_empty() || width == 0 {
        return columns;
    }

    let bar_width = (width as f32 / bins.len() as f32) * 2.5;
    let mut x = 0.0_f32;
    for &bin in bins {
        let col_start = x.round() as usize;
        if col_start >= width {
            break;
        }
        let col_end = ((x + bar_width).round() as usize).clamp(col_start + 1, width);
        for column in &mut columns[col_start..col_end] {
            *column = bin;
        }
        x += bar_width + 1.0;
    }
    columns
}

/// Lit cells of one column, anchored at the bottom row
///
/// A bin draws at half its byte value, so only a full-scale bin of 255
/// reaches the top of the column.
pub fn column_cells(bin: u8, height: usize) -> usize {
    let bar = f32::from(bin) / 2.0;
    (((bar / MAX_BAR) * height as f32).round() as usize).min(height)
}

/// Bar color for a bin value, green brightening with level
pub fn bar_rgb(bin: u8) -> (u8, u8, u8) {
    (50, 100 + bin / 2, 50)
}

// ===== Meter Geometry =====

/// Loudness as a meter percentage, capped at 100
pub fn meter_percent(rms: f32) -> f32 {
    (rms * 100.0).min(100.0)
}

/// Filled cells of a meter `width` cells wide
pub fn meter_cells(percent: f32, width: usize) -> usize {
    ((percent / 100.0) * width as f32).round() as usize
}

// ===== Render Tasks =====

/// Per-frame spectrum layout with an explicit start/stop contract
///
/// The task renders nothing until started, and again nothing once
/// stopped. The frame loop owns when that happens; the task itself
/// carries no timer.
#[derive(Debug)]
pub struct SpectrumTask {
    running: bool,
}

impl SpectrumTask {
    pub fn new() -> Self {
        Self { running: false }
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Column layout for one frame, `None` while stopped
    pub fn render(&self, bins: &[u8], width: usize) -> Option<Vec<u8>> {
        self.running.then(|| spectrum_columns(bins, width))
    }
}

impl Default for SpectrumTask {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-frame loudness meter with the same start/stop contract
#[derive(Debug)]
pub struct MeterTask {
    running: bool,
}

impl MeterTask {
    pub fn new() -> Self {
        Self { running: false }
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Filled meter cells for one frame, `None` while stopped
    pub fn render(&self, rms: f32, width: usize) -> Option<usize> {
        self.running.then(|| meter_cells(meter_percent(rms), width))
    }
}

impl Default for MeterTask {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meter_percent_scales_and_caps() {
        assert!((meter_percent(0.26) - 26.0).abs() < 1e-4);
        assert!((meter_percent(1.7) - 100.0).abs() < f32::EPSILON);
        assert!(meter_percent(0.0).abs() < f32::EPSILON);
    }

    #[test]
    fn meter_cells_quantize_to_width() {
        assert_eq!(meter_cells(0.0, 40), 0);
        assert_eq!(meter_cells(100.0, 40), 40);
        assert_eq!(meter_cells(50.0, 40), 20);
        // 10.4 cells rounds down
        assert_eq!(meter_cells(26.0, 40), 10);
    }

    #[test]
    fn bar_color_brightens_with_level() {
        assert_eq!(bar_rgb(0), (50, 100, 50));
        assert_eq!(bar_rgb(128), (50, 164, 50));
        assert_eq!(bar_rgb(255), (50, 227, 50));
    }

    #[test]
    fn silent_bins_draw_no_columns() {
        let columns = spectrum_columns(&[0u8; 16], 40);
        assert_eq!(columns.len(), 40);
        assert!(columns.iter().all(|&c| c == 0));
        assert_eq!(column_cells(0, 10), 0);
    }

    #[test]
    fn saturated_bins_fill_their_columns() {
        // Four bins across eight columns: bars land at 0..5 and 6..8,
        // the inter-bar gap on column 5.
        let columns = spectrum_columns(&[255u8; 4], 8);
        assert_eq!(columns, vec![255, 255, 255, 255, 255, 0, 255, 255]);
    }

    #[test]
    fn bars_past_the_right_edge_are_dropped() {
        let columns = spectrum_columns(&[200u8; 64], 10);
        assert_eq!(columns.len(), 10);
        assert!(columns.iter().any(|&c| c == 200));
    }

    #[test]
    fn column_height_follows_half_the_bin_value() {
        assert_eq!(column_cells(255, 4), 4);
        assert_eq!(column_cells(128, 4), 2);
        assert_eq!(column_cells(255, 12), 12);
        assert_eq!(column_cells(4, 12), 0);
    }

    #[test]
    fn stopped_tasks_paint_nothing() {
        let mut spectrum = SpectrumTask::new();
        let mut meter = MeterTask::new();
        assert!(spectrum.render(&[10; 4], 16).is_none());
        assert!(meter.render(0.5, 16).is_none());

        spectrum.start();
        meter.start();
        assert!(spectrum.is_running());
        assert!(spectrum.render(&[10; 4], 16).is_some());
        assert_eq!(meter.render(0.5, 16), Some(8));

        spectrum.stop();
        meter.stop();
        assert!(!spectrum.is_running());
        assert!(spectrum.render(&[10; 4], 16).is_none());
        assert!(meter.render(0.5, 16).is_none());

        // Restarting paints again
        spectrum.start();
        assert!(spectrum.render(&[10; 4], 16).is_some());
    }
}
