#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlId {
    Gas,
    Brake,
    Pause,
    Resume,
    Restart,
    MusicToggle,
    SoundToggle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Pressed(ControlId),
    Released(ControlId),
    // Touch end or cancel; drops both pedals regardless of where it happened.
    ReleasedAll,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlState {
    pub gas: bool,
    pub brake: bool,
}

impl ControlState {
    pub fn press(&mut self, control: ControlId) {
        self.set(control, true);
    }

    pub fn release(&mut self, control: ControlId) {
        self.set(control, false);
    }

    pub fn release_all(&mut self) {
        *self = Self::default();
    }

    pub fn is_pressed(&self, control: ControlId) -> bool {
        match control {
            ControlId::Gas => self.gas,
            ControlId::Brake => self.brake,
            _ => false,
        }
    }

    fn set(&mut self, control: ControlId, pressed: bool) {
        match control {
            ControlId::Gas => self.gas = pressed,
            ControlId::Brake => self.brake = pressed,
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PauseState {
    #[default]
    Running,
    Paused,
}

impl PauseState {
    pub fn is_paused(self) -> bool {
        self == PauseState::Paused
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioToggles {
    pub music: bool,
    pub sound: bool,
}

impl Default for AudioToggles {
    fn default() -> Self {
        Self {
            music: true,
            sound: true,
        }
    }
}

impl AudioToggles {
    pub fn music_label(&self) -> &'static str {
        if self.music {
            "MUSIC: ON"
        } else {
            "MUSIC: OFF"
        }
    }

    pub fn sound_label(&self) -> &'static str {
        if self.sound {
            "SOUND: ON"
        } else {
            "SOUND: OFF"
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneRequest {
    Restart,
}
