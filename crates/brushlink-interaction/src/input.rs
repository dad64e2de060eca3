//! Controller input → brushing commands.
//!
//! The adapter reads one controller (chosen by handedness) per frame and
//! turns trigger presses into brush commands. The index trigger brushes
//! additively, the hand trigger subtractively; additive wins when both are
//! held.

use brushlink_core::{Handedness, Ray, Raycaster, SurfaceTag};
use brushlink_settings::InputSettings;
use nalgebra::Point3;
use tracing::debug;

use crate::brushing::SelectionMode;

/// One controller's state for a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControllerState {
    /// Pointing ray, if tracked.
    pub ray: Option<Ray>,
    /// Index trigger axis, 0..1.
    pub index_trigger: f32,
    /// Hand (grip) trigger axis, 0..1.
    pub hand_trigger: f32,
}

/// Both controllers for a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputFrame {
    pub left: ControllerState,
    pub right: ControllerState,
}

impl InputFrame {
    pub fn controller(&self, handedness: Handedness) -> &ControllerState {
        match handedness {
            Handedness::Left => &self.left,
            Handedness::Right => &self.right,
        }
    }
}

/// What the brushing engine should do this frame, in order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BrushCommand {
    MoveBrushPoint(Point3<f32>),
    Start(SelectionMode),
    Stop,
}

/// Trigger state machine in front of the brushing engine.
#[derive(Debug, Clone)]
pub struct BrushInputAdapter {
    handedness: Handedness,
    threshold: f32,
    max_ray_distance: f32,
    active: Option<SelectionMode>,
    locked: bool,
}

impl BrushInputAdapter {
    pub fn new(settings: &InputSettings) -> Self {
        Self {
            handedness: settings.handedness,
            threshold: settings.press_threshold,
            max_ray_distance: settings.max_ray_distance,
            active: None,
            locked: false,
        }
    }

    pub fn handedness(&self) -> Handedness {
        self.handedness
    }

    pub fn set_handedness(&mut self, handedness: Handedness) {
        self.handedness = handedness;
    }

    /// Mode of the brushing this adapter started, if still running.
    pub fn active(&self) -> Option<SelectionMode> {
        self.active
    }

    /// Input is ignored until both triggers are released.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Forgets the brushing started here after something else stopped it.
    ///
    /// Held triggers must be released before a new brush can start.
    pub fn interrupt(&mut self) {
        if self.active.take().is_some() {
            debug!("Brushing stopped externally; waiting for trigger release");
        }
        self.locked = true;
    }

    /// Processes one frame of input.
    pub fn update(&mut self, frame: &InputFrame, raycaster: &dyn Raycaster) -> Vec<BrushCommand> {
        let controller = frame.controller(self.handedness);
        let add = controller.index_trigger > self.threshold;
        let subtract = controller.hand_trigger > self.threshold;
        let target = controller
            .ray
            .and_then(|ray| raycaster.raycast(&ray, self.max_ray_distance))
            .filter(|hit| hit.tag == SurfaceTag::Brushable)
            .map(|hit| hit.point);

        let mut commands = Vec::new();

        // A press that starts off-target locks brushing out.
        if self.active.is_none() && !self.locked && (add || subtract) && target.is_none() {
            debug!("Trigger pressed off the brushable surface; brushing locked");
            self.locked = true;
        }
        if self.locked {
            if !add && !subtract {
                debug!("Brushing unlocked");
                self.locked = false;
            }
            return commands;
        }

        let mut moved = false;
        if add {
            if self.active == Some(SelectionMode::Subtract) {
                commands.push(BrushCommand::Stop);
                self.active = None;
            }
            if let Some(point) = target {
                commands.push(BrushCommand::MoveBrushPoint(point));
                moved = true;
                if self.active.is_none() {
                    commands.push(BrushCommand::Start(SelectionMode::Add));
                    self.active = Some(SelectionMode::Add);
                }
            }
        } else if self.active == Some(SelectionMode::Add) {
            commands.push(BrushCommand::Stop);
            self.active = None;
        }

        if subtract {
            if let Some(point) = target {
                if !moved {
                    commands.push(BrushCommand::MoveBrushPoint(point));
                }
                if self.active.is_none() {
                    commands.push(BrushCommand::Start(SelectionMode::Subtract));
                    self.active = Some(SelectionMode::Subtract);
                }
            }
        } else if self.active == Some(SelectionMode::Subtract) {
            commands.push(BrushCommand::Stop);
            self.active = None;
        }

        commands
    }
}
