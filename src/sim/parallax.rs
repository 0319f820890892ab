use bevy::math::Vec2;

use crate::config::ParallaxConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cloud {
    pub position: Vec2,
}

#[derive(Debug, Clone)]
pub struct CloudField {
    clouds: Vec<Cloud>,
    last_vehicle_x: Option<f32>,
    seed: u64,
    factor: f32,
    min_delta_x: f32,
    wrap_limit: f32,
    band: (f32, f32),
}

impl CloudField {
    pub fn new(config: &ParallaxConfig, half_width: f32, band: (f32, f32)) -> Self {
        let mut seed = config.seed;
        let clouds = (0..config.cloud_count)
            .map(|_| {
                let x = next_signed_unit_random(&mut seed) * half_width;
                let y = lerp(band.0, band.1, next_unit_random(&mut seed));
                Cloud {
                    position: Vec2::new(x, y),
                }
            })
            .collect();

        Self {
            clouds,
            last_vehicle_x: None,
            seed,
            factor: config.factor,
            min_delta_x: config.min_delta_x,
            wrap_limit: half_width + config.wrap_margin,
            band,
        }
    }

    pub fn update(&mut self, vehicle_x: f32) -> usize {
        let Some(last_x) = self.last_vehicle_x.replace(vehicle_x) else {
            return 0;
        };

        let dx = vehicle_x - last_x;
        if dx.abs() < self.min_delta_x {
            return 0;
        }

        let mut wrapped = 0;
        for index in 0..self.clouds.len() {
            let mut position = self.clouds[index].position;
            position.x -= dx * self.factor;

            let respawn_x = if position.x < -self.wrap_limit {
                Some(self.wrap_limit)
            } else if position.x > self.wrap_limit {
                Some(-self.wrap_limit)
            } else {
                None
            };
            if let Some(x) = respawn_x {
                position = Vec2::new(x, lerp(self.band.0, self.band.1, next_unit_random(&mut self.seed)));
                wrapped += 1;
            }
            self.clouds[index].position = position;
        }
        wrapped
    }

    // Keeps the reference position current without moving anything.
    pub fn track(&mut self, vehicle_x: f32) {
        self.last_vehicle_x = Some(vehicle_x);
    }

    pub fn clouds(&self) -> &[Cloud] {
        &self.clouds
    }

    pub fn set_factor(&mut self, factor: f32) {
        self.factor = factor;
    }
}

fn next_signed_unit_random(seed: &mut u64) -> f32 {
    (next_unit_random(seed) * 2.0) - 1.0
}

fn next_unit_random(seed: &mut u64) -> f32 {
    *seed = seed
        .wrapping_mul(6_364_136_223_846_793_005)
        .wrapping_add(1_442_695_040_888_963_407);
    ((*seed >> 32) as u32) as f32 / u32::MAX as f32
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + ((b - a) * t.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;

    const HALF_WIDTH: f32 = 1365.0;
    const BAND: (f32, f32) = (192.0, 728.0);

    fn field() -> CloudField {
        CloudField::new(&test_config().parallax, HALF_WIDTH, BAND)
    }

    #[test]
    fn clouds_start_inside_screen_and_band() {
        let field = field();
        assert_eq!(field.clouds().len(), 5);
        for cloud in field.clouds() {
            assert!(cloud.position.x.abs() <= HALF_WIDTH);
            assert!(cloud.position.y >= BAND.0 && cloud.position.y <= BAND.1);
        }
    }

    #[test]
    fn first_update_only_records_position() {
        let mut field = field();
        let before: Vec<_> = field.clouds().to_vec();
        assert_eq!(field.update(500.0), 0);
        assert_eq!(field.clouds(), before.as_slice());
    }

    #[test]
    fn clouds_drift_against_travel() {
        let mut field = field();
        field.update(0.0);
        let before = field.clouds()[0].position.x;
        field.update(10.0);
        assert!((field.clouds()[0].position.x - (before - 4.0)).abs() < 1e-3);
    }

    #[test]
    fn tiny_moves_are_ignored() {
        let mut field = field();
        field.update(0.0);
        let before: Vec<_> = field.clouds().to_vec();
        for tick in 1..=100 {
            assert_eq!(field.update(tick as f32 * 0.005), 0);
        }
        assert_eq!(field.clouds(), before.as_slice());
    }

    #[test]
    fn tracking_resets_the_reference_position() {
        let mut field = field();
        field.update(0.0);
        let before: Vec<_> = field.clouds().to_vec();
        field.track(20_000.0);
        assert_eq!(field.update(20_000.0), 0);
        assert_eq!(field.clouds(), before.as_slice());

        field.update(20_010.0);
        assert!((field.clouds()[0].position.x - (before[0].position.x - 4.0)).abs() < 1e-3);
    }

    #[test]
    fn cloud_past_left_margin_reappears_at_right_margin() {
        let mut field = field();
        field.update(0.0);
        // Far enough to push every cloud past the left limit.
        let wrapped = field.update(20_000.0);
        assert_eq!(wrapped, 5);
        let limit = HALF_WIDTH + 200.0;
        for cloud in field.clouds() {
            assert_eq!(cloud.position.x, limit);
            assert!(cloud.position.y >= BAND.0 && cloud.position.y <= BAND.1);
        }
    }

    #[test]
    fn reversing_wraps_to_left_margin() {
        let mut field = field();
        field.update(0.0);
        field.update(-20_000.0);
        let limit = HALF_WIDTH + 200.0;
        assert!(field.clouds().iter().all(|cloud| cloud.position.x == -limit));
    }
}
