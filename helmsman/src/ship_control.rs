//! The supervisor: one aggregate owning the filter block, every controller
//! and all cross-tick state. Runs exactly once per 100 ms tick.
//!
//! A meta state (Braking / Docking / Normal / Idle) set by remote control
//! overrides everything; within Normal, the Initial controller holds the
//! boat until the filters, the wind and the route planner are all ready,
//! then the Normal controller sails. Any homing loss or give-up falls back
//! to Initial.

use tracing::{info, warn};

use bus_types::{RemoteCommand, RemoteRecord};

use crate::angles::{meter_per_second_to_knots, normalize_deg};
use crate::config::HelmsmanConfig;
use crate::controller::{Controller, ControllerInput, ControllerOutput};
use crate::filter_block::{FilterBlock, FilteredMeasurements};
use crate::initial_controller::InitialController;
use crate::normal_controller::NormalController;
use crate::rudder_controller::RudderController;
use crate::sail_controller::SailController;
use crate::simple_controllers::{BrakeController, DockingController, IdleController, TestController};
use crate::wind::{wind_strength, WindStrength};

/// Remote silence tolerated in the remote-driven modes; the shore client
/// sends a heartbeat every 2 s and may miss one.
const REMOTE_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaState {
    Braking,
    Docking,
    Normal,
    Idle,
}

/// Which controller is at the helm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Active {
    Initial,
    Brake,
    Docking,
    Idle,
    Normal,
    Test,
}

pub struct ShipControl {
    filter_block: FilterBlock,
    filtered: FilteredMeasurements,
    meta: MetaState,
    active: Active,
    initial: InitialController,
    brake: BrakeController,
    docking: DockingController,
    idle: IdleController,
    normal: NormalController,
    test: TestController,
    wind_strength_true: WindStrength,
    wind_strength_apparent: WindStrength,
    sail_locked_for_storm: bool,
    control_mode: RemoteCommand,
    last_remote_ms: u64,
    out: ControllerOutput,
    config: HelmsmanConfig,
}

impl ShipControl {
    pub fn new(config: &HelmsmanConfig) -> Self {
        let rudder = RudderController::with_feedback(
            config.rudder.k_omega,
            config.rudder.k_phi,
            config.rudder.k_integral,
            true,
        );
        let mut sail = SailController::new();
        sail.set_optimal_angle_of_attack(config.sail.optimal_aoa_deg.to_radians());
        Self {
            filter_block: FilterBlock::new(config.filter.true_wind_warmup_s),
            filtered: FilteredMeasurements::default(),
            meta: MetaState::Normal,
            active: if config.supervisor.start_in_test {
                Active::Test
            } else {
                Active::Initial
            },
            initial: InitialController::new(),
            brake: BrakeController,
            docking: DockingController,
            idle: IdleController,
            normal: NormalController::new(rudder, sail, config.supervisor.give_up_s),
            test: TestController::new(),
            wind_strength_true: WindStrength::Calm,
            wind_strength_apparent: WindStrength::Calm,
            sail_locked_for_storm: false,
            control_mode: RemoteCommand::Normal,
            last_remote_ms: 0,
            out: ControllerOutput::default(),
            config: config.clone(),
        }
    }

    /// Fresh filters and controllers; counters and meta state survive.
    /// Test fixtures construct a new aggregate instead.
    pub fn reset(&mut self) {
        self.filter_block = FilterBlock::new(self.config.filter.true_wind_warmup_s);
        self.filtered = FilteredMeasurements::default();
        let rudder = RudderController::with_feedback(
            self.config.rudder.k_omega,
            self.config.rudder.k_phi,
            self.config.rudder.k_integral,
            true,
        );
        let mut sail = SailController::new();
        sail.set_optimal_angle_of_attack(self.config.sail.optimal_aoa_deg.to_radians());
        self.normal = NormalController::new(rudder, sail, self.config.supervisor.give_up_s);
        self.initial = InitialController::new();
        self.wind_strength_true = WindStrength::Calm;
        self.wind_strength_apparent = WindStrength::Calm;
        self.sail_locked_for_storm = false;
        self.active = Active::Initial;
    }

    pub fn idling(&self) -> bool {
        self.active == Active::Idle
    }

    pub fn meta_state(&self) -> MetaState {
        self.meta
    }

    pub fn active_controller_name(&self) -> &'static str {
        match self.active {
            Active::Initial => self.initial.name(),
            Active::Brake => self.brake.name(),
            Active::Docking => self.docking.name(),
            Active::Idle => self.idle.name(),
            Active::Normal => self.normal.name(),
            Active::Test => self.test.name(),
        }
    }

    /// The route planner's α* is ignored while the shore station overrides.
    pub fn accepts_helm_alpha(&self) -> bool {
        self.control_mode != RemoteCommand::Override
    }

    pub fn control_mode(&self) -> RemoteCommand {
        self.control_mode
    }

    pub fn filtered(&self) -> &FilteredMeasurements {
        &self.filtered
    }

    /// Apply a remote-control record. Returns the α* override to install,
    /// if the record carries one that applies.
    pub fn handle_remote(&mut self, record: &RemoteRecord, now_ms: u64) -> Option<f64> {
        self.last_remote_ms = now_ms;
        let Some(command) = record.command() else {
            warn!("illegal remote command {}", record.command);
            return None;
        };
        if command != self.control_mode {
            info!("remote control: mode {:?} -> {:?}", self.control_mode, command);
        }
        self.control_mode = command;
        self.meta = match command {
            RemoteCommand::Normal | RemoteCommand::Override => MetaState::Normal,
            RemoteCommand::Docking => MetaState::Docking,
            // A power cycle drops the drives; stop the boat first.
            RemoteCommand::Brake | RemoteCommand::PowerCycle => MetaState::Braking,
            RemoteCommand::Idle => MetaState::Idle,
        };
        (command == RemoteCommand::Override && record.alpha_star_deg.is_finite())
            .then(|| record.alpha_star_deg.to_radians())
    }

    /// One 100 ms tick: filter, wind bookkeeping, state machine, active
    /// controller.
    pub fn run(&mut self, input: &ControllerInput, now_ms: u64) -> &ControllerOutput {
        self.out.reset_tick();

        self.filter_block.filter(input, &mut self.filtered);

        // Skipper input and status follow the slow true-wind estimate.
        if self.filter_block.valid_true_wind() {
            self.wind_strength_true =
                wind_strength(self.wind_strength_true, self.filtered.mag_true);
            self.out.skipper_input.latitude_deg = self.filtered.latitude_deg;
            self.out.skipper_input.longitude_deg = self.filtered.longitude_deg;
            self.out.skipper_input.angle_true_deg =
                normalize_deg(self.filtered.alpha_true.to_degrees());
            self.out.skipper_input.mag_true_kn =
                meter_per_second_to_knots(self.filtered.mag_true);
            self.out.status.direction_true_deg =
                normalize_deg(self.filtered.alpha_true.to_degrees());
            self.out.status.mag_true_m_s = self.filtered.mag_true;
        }
        self.wind_strength_apparent =
            wind_strength(self.wind_strength_apparent, self.filtered.mag_app);

        // Storm wind pins the sail to wing trim.
        let storm = self.wind_strength_apparent == WindStrength::Storm
            || self.wind_strength_true == WindStrength::Storm;
        if storm != self.sail_locked_for_storm {
            info!(
                "{} storm sail lock",
                if storm { "engaging" } else { "releasing" }
            );
            self.normal.lock_sail_in_wing_mode(storm);
            self.sail_locked_for_storm = storm;
        }

        self.remote_failsafe(now_ms);
        self.state_machine(input);

        match self.active {
            Active::Initial => self.initial.run(input, &self.filtered, &mut self.out),
            Active::Brake => self.brake.run(input, &self.filtered, &mut self.out),
            Active::Docking => self.docking.run(input, &self.filtered, &mut self.out),
            Active::Idle => self.idle.run(input, &self.filtered, &mut self.out),
            Active::Normal => self.normal.run(input, &self.filtered, &mut self.out),
            Active::Test => self.test.run(input, &self.filtered, &mut self.out),
        }

        &self.out
    }

    /// The remote-driven modes depend on a live shore link; losing it means
    /// stopping the boat.
    fn remote_failsafe(&mut self, now_ms: u64) {
        if matches!(self.control_mode, RemoteCommand::Idle | RemoteCommand::Override)
            && now_ms > self.last_remote_ms + REMOTE_TIMEOUT_MS
        {
            warn!("remote control timeout, braking");
            self.control_mode = RemoteCommand::Brake;
            self.meta = MetaState::Braking;
        }
    }

    fn transition(&mut self, next: Active, input: &ControllerInput) {
        if next == self.active {
            return;
        }
        info!(
            "transition {} -> {}",
            self.active_controller_name(),
            match next {
                Active::Initial => "Initial",
                Active::Brake => "Brake",
                Active::Docking => "Docking",
                Active::Idle => "Idle",
                Active::Normal => "Normal",
                Active::Test => "Test",
            }
        );
        match self.active {
            Active::Initial => self.initial.exit(),
            Active::Brake => self.brake.exit(),
            Active::Docking => self.docking.exit(),
            Active::Idle => self.idle.exit(),
            Active::Normal => self.normal.exit(),
            Active::Test => self.test.exit(),
        }
        self.active = next;
        if next == Active::Initial {
            self.out.status.inits += 1;
        }
        match self.active {
            Active::Initial => self.initial.entry(input, &self.filtered),
            Active::Brake => self.brake.entry(input, &self.filtered),
            Active::Docking => self.docking.entry(input, &self.filtered),
            Active::Idle => self.idle.entry(input, &self.filtered),
            Active::Normal => self.normal.entry(input, &self.filtered),
            Active::Test => self.test.entry(input, &self.filtered),
        }
    }

    fn state_machine(&mut self, input: &ControllerInput) {
        match self.meta {
            MetaState::Braking => {
                self.transition(Active::Brake, input);
                return;
            }
            MetaState::Docking => {
                self.transition(Active::Docking, input);
                return;
            }
            MetaState::Idle => {
                self.transition(Active::Idle, input);
                return;
            }
            MetaState::Normal => {
                if !matches!(self.active, Active::Initial | Active::Normal | Active::Test) {
                    self.transition(Active::Initial, input);
                }
            }
        }

        // A drive that lost its homing makes commands meaningless anywhere
        // but in the states that don't command it.
        if !matches!(self.active, Active::Initial | Active::Test)
            && !(input.drives.homed_sail
                && input.drives.homed_rudder_left
                && input.drives.homed_rudder_right)
        {
            warn!("drive homing lost, back to Initial");
            self.transition(Active::Initial, input);
            return;
        }

        if self.active == Active::Test && self.test.done() {
            self.transition(Active::Initial, input);
            return;
        }

        if self.active == Active::Initial {
            if self.initial.done()
                && self.wind_strength_apparent != WindStrength::Calm
                && self.filter_block.valid_true_wind()
                && input.alpha_star_rad.is_some()
            {
                self.transition(Active::Normal, input);
            }
            return;
        }

        if self.active == Active::Normal && self.normal.give_up(input, &self.filtered) {
            warn!("normal controller gave up, back to Initial");
            self.transition(Active::Initial, input);
        }
    }
}
