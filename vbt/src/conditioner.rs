use heapless::HistoryBuffer;

use crate::config::SMOOTHING_WINDOW;

/// Moving average plus deadband on the vertical acceleration.
#[derive(Debug, Clone)]
pub struct Conditioner {
    window: HistoryBuffer<f32, SMOOTHING_WINDOW>,
    deadband: f32,
}

impl Conditioner {
    pub fn new(deadband: f32) -> Self {
        Self {
            window: HistoryBuffer::new(),
            deadband,
        }
    }

    /// Averages over the samples seen so far, up to the window length.
    pub fn process(&mut self, vertical_accel: f32) -> f32 {
        self.window.write(vertical_accel);

        let filled = self.window.as_slice();
        let mean = filled.iter().sum::<f32>() / filled.len() as f32;

        if mean.abs() < self.deadband {
            0.0
        } else {
            mean
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_moving_average() {
        let mut conditioner = Conditioner::new(0.12);

        assert_abs_diff_eq!(conditioner.process(1.0), 1.0);
        assert_abs_diff_eq!(conditioner.process(3.0), 2.0);
        for _ in 0..3 {
            conditioner.process(3.0);
        }
        // Window is full of 3.0, the first 1.0 has rolled out.
        assert_abs_diff_eq!(conditioner.process(3.0), 3.0);
        assert_abs_diff_eq!(conditioner.process(-2.0), 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_clone_keeps_window() {
        let mut conditioner = Conditioner::new(0.12);
        conditioner.process(4.0);

        let mut copy = conditioner.clone();
        assert_abs_diff_eq!(copy.process(2.0), 3.0);
        assert_abs_diff_eq!(conditioner.process(0.0), 2.0);
    }

    #[test]
    fn test_deadband_zeroes_noise() {
        let mut conditioner = Conditioner::new(0.12);

        for value in [0.1, -0.1, 0.11, 0.05, -0.02] {
            assert_eq!(conditioner.process(value), 0.0);
        }
        assert_eq!(conditioner.process(0.5), 0.0);
        assert!(conditioner.process(0.5) > 0.12);
    }
}
