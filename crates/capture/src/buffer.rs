//! Telemetry buffer for the lap in progress

use contracts::Sample;

/// Ordered samples of the current lap
///
/// Distances are non-decreasing; the buffer is only emptied on a lap
/// transition.
#[derive(Debug, Clone, Default)]
pub struct TelemetryBuffer {
    samples: Vec<Sample>,
}

impl TelemetryBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sample: Sample) {
        debug_assert!(
            self.last_distance() <= sample.distance,
            "distance went backwards within a lap"
        );
        self.samples.push(sample);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn to_vec(&self) -> Vec<Sample> {
        self.samples.clone()
    }

    /// Distance of the newest sample, 0 when empty
    pub fn last_distance(&self) -> f64 {
        self.samples.last().map(|s| s.distance).unwrap_or(0.0)
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::GearLabel;

    fn sample(distance: f64) -> Sample {
        Sample {
            distance,
            speed: 90.0,
            gear: GearLabel::Forward(3),
            throttle: 1.0,
            brake: 0.0,
        }
    }

    #[test]
    fn test_push_and_clear() {
        let mut buffer = TelemetryBuffer::new();
        assert_eq!(buffer.last_distance(), 0.0);

        buffer.push(sample(5.0));
        buffer.push(sample(5.0));
        buffer.push(sample(11.25));

        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.last_distance(), 11.25);
        assert_eq!(buffer.to_vec(), buffer.samples());

        buffer.clear();
        assert!(buffer.is_empty());
    }
}
