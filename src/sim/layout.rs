use bevy::math::{Rect, Vec2};

use super::controls::{ControlId, PauseState};
use crate::config::FeatureToggles;

// Camera-space placements, origin at the viewport centre, +y up.
const GAS_SIZE: Vec2 = Vec2::new(190.0, 260.0);
const GAS_INSET: Vec2 = Vec2::new(220.0, 200.0);
const GAS_TILT_DEGREES: f32 = -10.0;
const BRAKE_SIZE: Vec2 = Vec2::new(260.0, 170.0);
const BRAKE_INSET: Vec2 = Vec2::new(260.0, 200.0);
const PAUSE_SIZE: Vec2 = Vec2::new(120.0, 120.0);
const PAUSE_INSET: Vec2 = Vec2::new(120.0, 120.0);

const PANEL_SIZE: Vec2 = Vec2::new(700.0, 600.0);
const PANEL_TITLE_Y: f32 = 210.0;
const MENU_BUTTON_SIZE: Vec2 = Vec2::new(520.0, 80.0);
const MENU_FIRST_Y: f32 = 130.0;
const MENU_SPACING: f32 = 26.0;

const RPM_BAR_SIZE: Vec2 = Vec2::new(800.0, 40.0);
const RPM_BAR_Y: f32 = -650.0;
const RPM_LABEL_Y: f32 = -600.0;
const SPEED_LABEL_Y: f32 = -550.0;

const SUN_SIZE: Vec2 = Vec2::new(220.0, 220.0);
const SUN_MARGIN: f32 = 40.0;
const CLOUD_BAND_LOW_FRACTION: f32 = 0.25;
const CLOUD_BAND_TOP_MARGIN: f32 = 40.0;

const MENU_ORDER: [ControlId; 4] = [
    ControlId::Resume,
    ControlId::Restart,
    ControlId::MusicToggle,
    ControlId::SoundToggle,
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HitTable {
    running: Vec<HitRegion>,
    paused: Vec<HitRegion>,
}

// Rectangle rotated by `tilt` radians about its centre.
#[derive(Debug, Clone, Copy, PartialEq)]
struct HitRegion {
    id: ControlId,
    rect: Rect,
    tilt: f32,
}

impl HitRegion {
    fn upright(id: ControlId, rect: Rect) -> Self {
        Self { id, rect, tilt: 0.0 }
    }

    fn contains(&self, point: Vec2) -> bool {
        let center = self.rect.center();
        let local = Vec2::from_angle(-self.tilt).rotate(point - center);
        self.rect.contains(center + local)
    }
}

impl HitTable {
    pub fn resolve(&self, point: Vec2, pause: PauseState) -> Option<ControlId> {
        let regions = match pause {
            PauseState::Running => &self.running,
            PauseState::Paused => &self.paused,
        };
        regions
            .iter()
            .find(|region| region.contains(point))
            .map(|region| region.id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HudLayout {
    pub half_extents: Vec2,
    pub gas: Rect,
    pub gas_tilt: f32,
    pub brake: Rect,
    pub pause_button: Option<Rect>,
    pub panel: Rect,
    pub panel_title: Vec2,
    pub menu_buttons: [(ControlId, Rect); 4],
    pub rpm_bar: Rect,
    pub rpm_label: Vec2,
    pub speed_label: Vec2,
    pub sun: Rect,
    pub cloud_band: (f32, f32),
    hit_table: HitTable,
}

impl HudLayout {
    pub fn new(half_extents: Vec2, features: &FeatureToggles) -> Self {
        let (hw, hh) = (half_extents.x, half_extents.y);

        let gas = Rect::from_center_size(Vec2::new(hw - GAS_INSET.x, -hh + GAS_INSET.y), GAS_SIZE);
        let brake = Rect::from_center_size(
            Vec2::new(-hw + BRAKE_INSET.x, -hh + BRAKE_INSET.y),
            BRAKE_SIZE,
        );
        let pause_button = features.pause_menu_enabled.then(|| {
            Rect::from_center_size(Vec2::new(hw - PAUSE_INSET.x, hh - PAUSE_INSET.y), PAUSE_SIZE)
        });

        let menu_buttons: [(ControlId, Rect); 4] = std::array::from_fn(|row| {
            let y = MENU_FIRST_Y - row as f32 * (MENU_BUTTON_SIZE.y + MENU_SPACING);
            (
                MENU_ORDER[row],
                Rect::from_center_size(Vec2::new(0.0, y), MENU_BUTTON_SIZE),
            )
        });

        let sun = Rect::from_center_size(
            Vec2::new(
                -hw + SUN_SIZE.x * 0.5 + SUN_MARGIN,
                hh - SUN_SIZE.y * 0.5 - SUN_MARGIN,
            ),
            SUN_SIZE,
        );

        let gas_tilt = GAS_TILT_DEGREES.to_radians();
        let mut running = vec![
            HitRegion {
                id: ControlId::Gas,
                rect: gas,
                tilt: gas_tilt,
            },
            HitRegion::upright(ControlId::Brake, brake),
        ];
        if let Some(rect) = pause_button {
            running.push(HitRegion::upright(ControlId::Pause, rect));
        }
        let paused = if features.pause_menu_enabled {
            menu_buttons
                .iter()
                .map(|(id, rect)| HitRegion::upright(*id, *rect))
                .collect()
        } else {
            Vec::new()
        };

        Self {
            half_extents,
            gas,
            gas_tilt,
            brake,
            pause_button,
            panel: Rect::from_center_size(Vec2::ZERO, PANEL_SIZE),
            panel_title: Vec2::new(0.0, PANEL_TITLE_Y),
            menu_buttons,
            rpm_bar: Rect::from_center_size(Vec2::new(0.0, RPM_BAR_Y), RPM_BAR_SIZE),
            rpm_label: Vec2::new(0.0, RPM_LABEL_Y),
            speed_label: Vec2::new(0.0, SPEED_LABEL_Y),
            sun,
            cloud_band: (hh * CLOUD_BAND_LOW_FRACTION, hh - CLOUD_BAND_TOP_MARGIN),
            hit_table: HitTable { running, paused },
        }
    }

    pub fn hit_table(&self) -> &HitTable {
        &self.hit_table
    }

    pub fn menu_button(&self, id: ControlId) -> Option<Rect> {
        self.menu_buttons
            .iter()
            .find(|(button, _)| *button == id)
            .map(|(_, rect)| *rect)
    }
}
