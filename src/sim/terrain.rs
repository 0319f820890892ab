use std::collections::VecDeque;
use std::f32::consts::PI;

use bevy::log::debug;
use bevy::math::Vec2;

use super::backend::{BodyDesc, PhysicsBackend};
use crate::config::TerrainConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct TerrainSegment {
    pub start_x: f32,
    pub width: f32,
    pub points: Vec<Vec2>,
}

impl TerrainSegment {
    pub fn end_x(&self) -> f32 {
        self.start_x + self.width
    }

    pub fn first_height(&self) -> Option<f32> {
        self.points.first().map(|point| point.y)
    }

    pub fn last_height(&self) -> Option<f32> {
        self.points.last().map(|point| point.y)
    }
}

pub fn ground_height(config: &TerrainConfig, x: f32) -> f32 {
    config.baseline + config.amplitude * (x / config.period * PI).sin()
}

pub fn generate_segment(
    config: &TerrainConfig,
    start_x: f32,
    width: f32,
    previous_end_height: f32,
) -> (TerrainSegment, f32) {
    let steps = (width / config.sample_step).ceil().max(1.0) as usize;
    let end_x = start_x + width;

    let mut points = Vec::with_capacity(steps + 2);
    points.push(Vec2::new(start_x, previous_end_height));
    for index in 0..=steps {
        let x = (start_x + index as f32 * config.sample_step).min(end_x);
        let sample = Vec2::new(x, ground_height(config, x));
        if points.last() != Some(&sample) {
            points.push(sample);
        }
    }

    let new_end_height = points.last().map_or(previous_end_height, |point| point.y);
    (
        TerrainSegment {
            start_x,
            width,
            points,
        },
        new_end_height,
    )
}

#[derive(Debug)]
pub struct LiveSegment<H> {
    pub segment: TerrainSegment,
    pub body: H,
}

#[derive(Debug)]
pub struct TerrainGenerator<H> {
    config: TerrainConfig,
    segments: VecDeque<LiveSegment<H>>,
    next_x: f32,
    last_height: f32,
    generated: u64,
}

impl<H: Copy + Eq + std::fmt::Debug> TerrainGenerator<H> {
    pub fn new<B: PhysicsBackend<Body = H>>(config: &TerrainConfig, backend: &mut B) -> Self {
        let mut generator = Self {
            config: config.clone(),
            segments: VecDeque::with_capacity(config.max_live_segments + 1),
            next_x: config.start_x,
            last_height: config.baseline,
            generated: 0,
        };
        for _ in 0..config.initial_segments {
            generator.append_segment(backend);
        }
        generator
    }

    // Appends at most one segment per call, then evicts the oldest past the window.
    pub fn ensure_coverage<B: PhysicsBackend<Body = H>>(
        &mut self,
        backend: &mut B,
        vehicle_x: f32,
    ) -> bool {
        if vehicle_x + self.config.lookahead <= self.next_x {
            return false;
        }

        self.append_segment(backend);
        while self.segments.len() > self.config.max_live_segments {
            let Some(evicted) = self.segments.pop_front() else {
                break;
            };
            backend.despawn_body(evicted.body);
            debug!(
                "Evicted terrain segment [{:.0}, {:.0}).",
                evicted.segment.start_x,
                evicted.segment.end_x()
            );
        }
        true
    }

    fn append_segment<B: PhysicsBackend<Body = H>>(&mut self, backend: &mut B) {
        let (segment, end_height) = generate_segment(
            &self.config,
            self.next_x,
            self.config.segment_width,
            self.last_height,
        );
        debug_assert_eq!(segment.first_height(), Some(self.last_height));
        let body = backend.spawn_body(&BodyDesc::ground(
            segment.points.clone(),
            self.config.friction,
        ));
        debug!(
            "Generated terrain segment #{} [{:.0}, {:.0}) with {} points.",
            self.generated,
            segment.start_x,
            segment.end_x(),
            segment.points.len()
        );

        self.next_x = segment.end_x();
        self.last_height = end_height;
        self.generated += 1;
        self.segments.push_back(LiveSegment { segment, body });
    }

    pub fn right_edge(&self) -> f32 {
        self.next_x
    }

    pub fn live_count(&self) -> usize {
        self.segments.len()
    }

    pub fn generated_count(&self) -> u64 {
        self.generated
    }

    pub fn segments(&self) -> impl Iterator<Item = &LiveSegment<H>> {
        self.segments.iter()
    }

    pub fn despawn_all<B: PhysicsBackend<Body = H>>(&mut self, backend: &mut B) {
        for live in self.segments.drain(..) {
            backend.despawn_body(live.body);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::sim::backend::ShapeDesc;
    use crate::sim::testing::RecordingBackend;

    fn terrain_config() -> TerrainConfig {
        test_config().terrain
    }

    #[test]
    fn height_follows_sine_profile() {
        let config = terrain_config();
        assert!((ground_height(&config, 0.0) - 100.0).abs() < 1e-4);
        assert!((ground_height(&config, 400.0) - 150.0).abs() < 1e-3);
        assert!((ground_height(&config, 1200.0) - 50.0).abs() < 1e-3);
    }

    #[test]
    fn segment_opens_at_previous_end_height() {
        let config = terrain_config();
        let (segment, end) = generate_segment(&config, 0.0, 4000.0, 137.0);
        assert_eq!(segment.points[0], Vec2::new(0.0, 137.0));
        assert_eq!(segment.points.last().map(|p| p.x), Some(4000.0));
        assert_eq!(Some(end), segment.last_height());
    }

    #[test]
    fn segment_skips_duplicate_start_vertex() {
        let config = terrain_config();
        let start_height = ground_height(&config, 0.0);
        let (segment, _) = generate_segment(&config, 0.0, 4000.0, start_height);
        // 41 samples from 0 to 4000 inclusive, no doubled first vertex.
        assert_eq!(segment.points.len(), 41);
    }

    #[test]
    fn consecutive_segments_are_continuous() {
        let mut backend = RecordingBackend::default();
        let mut terrain = TerrainGenerator::new(&terrain_config(), &mut backend);
        for step in 0..8 {
            terrain.ensure_coverage(&mut backend, step as f32 * 4000.0);
        }

        let segments: Vec<_> = terrain.segments().collect();
        for pair in segments.windows(2) {
            assert_eq!(pair[0].segment.last_height(), pair[1].segment.first_height());
            assert_eq!(pair[0].segment.end_x(), pair[1].segment.start_x);
        }
    }

    #[test]
    fn initial_terrain_spans_three_segments_from_start() {
        let mut backend = RecordingBackend::default();
        let terrain = TerrainGenerator::new(&terrain_config(), &mut backend);
        assert_eq!(terrain.live_count(), 3);
        assert_eq!(terrain.right_edge(), -1500.0 + 3.0 * 4000.0);
        assert_eq!(backend.live_bodies(), 3);
        assert!(backend
            .bodies
            .iter()
            .all(|body| !body.desc.dynamic && matches!(body.desc.shape, ShapeDesc::Polyline(_))));
    }

    #[test]
    fn coverage_extends_only_past_lookahead() {
        let mut backend = RecordingBackend::default();
        let mut terrain = TerrainGenerator::new(&terrain_config(), &mut backend);

        assert!(!terrain.ensure_coverage(&mut backend, 0.0));
        assert_eq!(terrain.live_count(), 3);

        // 7500 + 3000 == 10500 is not past the edge.
        assert!(!terrain.ensure_coverage(&mut backend, 7500.0));

        assert!(terrain.ensure_coverage(&mut backend, 9000.0));
        assert_eq!(terrain.live_count(), 4);
        assert_eq!(terrain.right_edge(), 14500.0);

        // One segment per call even when far behind.
        assert!(terrain.ensure_coverage(&mut backend, 50_000.0));
        assert_eq!(terrain.right_edge(), 18500.0);
    }

    #[test]
    fn window_caps_at_five_evicting_oldest() {
        let mut backend = RecordingBackend::default();
        let mut terrain = TerrainGenerator::new(&terrain_config(), &mut backend);

        for call in 0..6 {
            let edge = terrain.right_edge();
            assert!(terrain.ensure_coverage(&mut backend, edge));
            assert!(terrain.live_count() <= 5, "call {call}");
        }

        assert_eq!(terrain.live_count(), 5);
        assert_eq!(terrain.generated_count(), 9);
        assert_eq!(backend.live_bodies(), 5);
        // Bodies 0..4 were the oldest four and are gone.
        assert!((0..4).all(|body| !backend.bodies[body].alive));
        let oldest = terrain.segments().next().map(|live| live.segment.start_x);
        assert_eq!(oldest, Some(-1500.0 + 4.0 * 4000.0));
    }

    #[test]
    fn despawn_all_clears_backend_bodies() {
        let mut backend = RecordingBackend::default();
        let mut terrain = TerrainGenerator::new(&terrain_config(), &mut backend);
        terrain.despawn_all(&mut backend);
        assert_eq!(terrain.live_count(), 0);
        assert_eq!(backend.live_bodies(), 0);
    }
}
