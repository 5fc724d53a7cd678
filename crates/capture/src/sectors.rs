//! Sector statistics of a completed lap

use contracts::{Sample, SectorStat, SECTOR_COUNT};

/// Split `total` into equal-distance thirds and average the speed per third
///
/// Ranges are `[0, d/3]`, `(d/3, 2d/3]` and `(2d/3, d]`. A third without
/// samples averages to 0.
pub fn compute_sectors(samples: &[Sample], total: f64) -> Vec<SectorStat> {
    let bounds: [f64; SECTOR_COUNT + 1] = [0.0, total / 3.0, total * 2.0 / 3.0, total];

    let mut sums = [0.0_f64; SECTOR_COUNT];
    let mut counts = [0_usize; SECTOR_COUNT];

    for sample in samples {
        let index = sector_index(sample.distance, &bounds);
        sums[index] += sample.speed;
        counts[index] += 1;
    }

    (0..SECTOR_COUNT)
        .map(|i| SectorStat {
            sector: i as u8 + 1,
            start: bounds[i],
            end: bounds[i + 1],
            avg_speed: if counts[i] == 0 {
                0.0
            } else {
                sums[i] / counts[i] as f64
            },
        })
        .collect()
}

fn sector_index(distance: f64, bounds: &[f64; SECTOR_COUNT + 1]) -> usize {
    if distance <= bounds[1] {
        0
    } else if distance <= bounds[2] {
        1
    } else {
        2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::GearLabel;
    use rand::Rng;

    fn sample(distance: f64, speed: f64) -> Sample {
        Sample {
            distance,
            speed,
            gear: GearLabel::Forward(2),
            throttle: 0.5,
            brake: 0.0,
        }
    }

    #[test]
    fn test_band_means() {
        let samples = vec![
            sample(0.0, 100.0),
            sample(150.0, 120.0),
            sample(300.0, 140.0),
            sample(300.5, 80.0),
            sample(600.0, 60.0),
            sample(750.0, 200.0),
            sample(900.0, 100.0),
        ];

        let sectors = compute_sectors(&samples, 900.0);

        assert_eq!(sectors.len(), 3);
        assert_eq!((sectors[0].start, sectors[0].end), (0.0, 300.0));
        assert_eq!((sectors[1].start, sectors[1].end), (300.0, 600.0));
        assert_eq!((sectors[2].start, sectors[2].end), (600.0, 900.0));
        assert_eq!(sectors[0].avg_speed, 120.0);
        assert_eq!(sectors[1].avg_speed, 70.0);
        assert_eq!(sectors[2].avg_speed, 150.0);
    }

    #[test]
    fn test_empty_sector_is_zero() {
        let samples = vec![sample(10.0, 50.0), sample(880.0, 150.0)];
        let sectors = compute_sectors(&samples, 900.0);

        assert_eq!(sectors[1].avg_speed, 0.0);
        assert_eq!(sectors[0].avg_speed, 50.0);
    }

    #[test]
    fn test_no_samples() {
        let sectors = compute_sectors(&[], 0.0);
        assert!(sectors.iter().all(|s| s.avg_speed == 0.0));
        assert_eq!(sectors.iter().map(|s| s.sector).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_sectors_contiguous_for_random_laps() {
        let mut rng = rand::rng();

        for _ in 0..50 {
            let total: f64 = rng.random_range(100.0..7000.0);
            let mut distance = 0.0;
            let mut samples = Vec::new();
            while distance < total {
                distance = (distance + rng.random_range(0.0..40.0)).min(total);
                samples.push(sample(distance, rng.random_range(0.0..300.0)));
            }

            let sectors = compute_sectors(&samples, total);

            assert_eq!(sectors[0].start, 0.0);
            assert_eq!(sectors[2].end, total);
            for pair in sectors.windows(2) {
                assert_eq!(pair[0].end, pair[1].start);
            }
            assert!(sectors.iter().all(|s| s.avg_speed >= 0.0 && s.avg_speed < 300.0));
        }
    }
}
