//! Virtual light: holds an observed state and applies commands to it.

use sceneguard_domain::observed::ObservedState;
use sceneguard_domain::scene::EntityCommand;

/// How far a slow light lands from the requested colour temperature.
pub const COLOR_TEMP_LAG_MIREK: f64 = 120.0;

/// Misbehaviour a virtual light can simulate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LightFaults {
    /// Ignores scene recalls; only direct commands reach it.
    pub stuck: bool,
    /// Every other colour-temperature change lands off target.
    pub slow_color_temp: bool,
}

#[derive(Debug)]
pub(crate) struct VirtualLight {
    state: ObservedState,
    faults: LightFaults,
    lag_next: bool,
}

impl VirtualLight {
    pub(crate) fn new(faults: LightFaults) -> Self {
        Self {
            state: ObservedState::off(),
            faults,
            lag_next: true,
        }
    }

    pub(crate) fn state(&self) -> &ObservedState {
        &self.state
    }

    pub(crate) fn set_unavailable(&mut self, unavailable: bool) {
        self.state.unavailable = unavailable;
    }

    pub(crate) fn overwrite(&mut self, state: ObservedState) {
        self.state = state;
    }

    /// Apply a command coming from a scene recall. Returns `false` when the
    /// light ignored it.
    pub(crate) fn recall(&mut self, command: &EntityCommand) -> bool {
        if self.faults.stuck {
            return false;
        }
        self.apply(command)
    }

    /// Apply a direct command. Returns `false` when the light is unreachable.
    pub(crate) fn apply(&mut self, command: &EntityCommand) -> bool {
        if self.state.unavailable {
            return false;
        }
        match command {
            EntityCommand::TurnOff => self.state.on = false,
            EntityCommand::TurnOn {
                brightness_pct,
                color_xy,
                color_mirek,
                effect,
            } => {
                self.state.on = true;
                if let Some(pct) = brightness_pct {
                    self.state.brightness_pct = Some(*pct);
                }
                if let Some(xy) = color_xy {
                    self.state.color_xy = Some(*xy);
                    self.state.color_mirek = None;
                }
                if let Some(mirek) = color_mirek {
                    self.state.color_mirek = Some(self.landed_mirek(*mirek));
                    self.state.color_xy = None;
                }
                if let Some(effect) = effect {
                    self.state.effect = Some(effect.clone());
                }
            }
        }
        true
    }

    fn landed_mirek(&mut self, target: f64) -> f64 {
        if !self.faults.slow_color_temp {
            return target;
        }
        let lagging = self.lag_next;
        self.lag_next = !self.lag_next;
        if lagging {
            target + COLOR_TEMP_LAG_MIREK
        } else {
            target
        }
    }
}
