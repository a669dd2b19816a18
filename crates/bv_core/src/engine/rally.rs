//! Rally coordinator: owns the world for one match and arbitrates hits.
//!
//! The coordinator is the only writer of the ball and both characters. Per
//! tick it drains deferred tasks, applies input, integrates characters then
//! the ball, evaluates hit and settle rules on the post-motion state, and
//! only then lets the NPC brains look at the world. Events queue up for the
//! embedder; sound cues go straight to the injected sink.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::config::MatchConfig;
use crate::error::{CoreError, Result};

use super::ball::{Ball, HitKind};
use super::character::{Character, ControlKind, MoveIntent};
use super::events::{GameEvent, SoundCue};
use super::input::{Control, InputAction, InputSource, PlayerSlot, PointerClick};
use super::net::{NetSession, Transport};
use super::npc::NpcBrain;
use super::physics_constants::{ball as ball_consts, character as char_consts, hit, rally as rally_consts};
use super::scheduler::{clamp_delta, DeferredQueue};
use super::services::AudioSink;
use super::{GameMode, Side};

/// Match flow phase. `Settling` covers the window between the ball touching
/// sand (rally lost) and the ball actually coming to rest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RallyPhase {
    Ready,
    InProgress,
    Settling,
}

/// Actions that used to be wall-clock timeouts; now queued in simulation
/// time and drained at the top of the tick.
#[derive(Clone, Copy, Debug)]
enum DeferredAction {
    EnableInteraction(Side),
    /// Autopilot only: place the ball at the left server and swing.
    Serve,
}

/// Running totals for the headless summary.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct MatchStats {
    pub rallies: u32,
    pub total_passes: u32,
    pub longest_rally: u32,
}

pub struct MatchCoordinator {
    mode: GameMode,
    autopilot: bool,
    court_width: f32,
    ground_y: f32,
    cue_min_passes: u32,

    pub ball: Ball,
    pub left: Character,
    pub right: Character,
    left_brain: Option<NpcBrain>,
    right_brain: Option<NpcBrain>,

    phase: RallyPhase,
    pass_count: u32,
    last_hit_by: Option<Side>,
    clock_ms: f64,
    deferred: DeferredQueue<DeferredAction>,
    serve_pending: bool,

    rng: ChaCha8Rng,
    events: Vec<GameEvent>,
    audio: Box<dyn AudioSink>,
    input: Box<dyn InputSource>,
    net: Option<NetSession>,
    stats: MatchStats,
}

impl MatchCoordinator {
    pub fn new(
        config: MatchConfig,
        input: Box<dyn InputSource>,
        audio: Box<dyn AudioSink>,
    ) -> Result<Self> {
        Self::build(config, input, audio, None)
    }

    /// Online match: same world, plus a snapshot session over `transport`.
    pub fn new_online(
        config: MatchConfig,
        input: Box<dyn InputSource>,
        audio: Box<dyn AudioSink>,
        transport: Box<dyn Transport>,
    ) -> Result<Self> {
        let mut config = config;
        config.mode = GameMode::Online;
        Self::build(config, input, audio, Some(NetSession::new(transport)))
    }

    fn build(
        config: MatchConfig,
        input: Box<dyn InputSource>,
        audio: Box<dyn AudioSink>,
        net: Option<NetSession>,
    ) -> Result<Self> {
        config.validate()?;
        if config.mode == GameMode::Online && net.is_none() {
            return Err(CoreError::InvalidConfig("online mode needs a transport".into()));
        }

        let court_width = config.court.width;
        let ground_y = config.court.ground_y();
        let rng = ChaCha8Rng::seed_from_u64(config.seed);

        let left_control =
            if config.autopilot { ControlKind::Npc } else { ControlKind::Human };
        let right_control = match config.mode {
            GameMode::VsNpc => ControlKind::Npc,
            GameMode::LocalTwoPlayer => ControlKind::Human,
            GameMode::Online => ControlKind::Remote,
        };

        let mut left = Character::new(
            120.0,
            ground_y - char_consts::SIZE,
            config.left_character,
            left_control,
        );
        let mut right = Character::new(
            court_width - 260.0,
            ground_y - char_consts::SIZE,
            config.right_character,
            right_control,
        );
        for character in [&mut left, &mut right] {
            character.set_ground_level(ground_y);
            character.set_court_bounds(court_width);
            character.body.on_ground = true;
        }

        let mut ball =
            Ball::new(left.body.center_x() + 50.0, ground_y - 100.0 - ball_consts::SIZE, court_width);
        ball.set_ground_level(ground_y);

        let right_brain = (config.mode == GameMode::VsNpc)
            .then(|| NpcBrain::new(Side::Right, right.body.center_x(), court_width));
        let left_brain = config
            .autopilot
            .then(|| NpcBrain::new(Side::Left, left.body.center_x(), court_width));

        log::info!(
            "match ready: mode {:?}, court {}x{} ground {}",
            config.mode,
            court_width,
            config.court.height,
            ground_y
        );

        Ok(Self {
            mode: config.mode,
            autopilot: config.autopilot,
            court_width,
            ground_y,
            cue_min_passes: config.cue_min_passes,
            ball,
            left,
            right,
            left_brain,
            right_brain,
            phase: RallyPhase::Ready,
            pass_count: 0,
            last_hit_by: None,
            clock_ms: 0.0,
            deferred: DeferredQueue::new(),
            serve_pending: false,
            rng,
            events: Vec::new(),
            audio,
            input,
            net,
            stats: MatchStats::default(),
        })
    }

    // ============================================================
    // Accessors
    // ============================================================

    pub fn phase(&self) -> RallyPhase {
        self.phase
    }

    pub fn pass_count(&self) -> u32 {
        self.pass_count
    }

    pub fn last_hit_by(&self) -> Option<Side> {
        self.last_hit_by
    }

    pub fn stats(&self) -> MatchStats {
        self.stats
    }

    pub fn now_ms(&self) -> u64 {
        self.clock_ms as u64
    }

    /// Drain queued events in emission order.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn character(&self, side: Side) -> &Character {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    // ============================================================
    // Tick
    // ============================================================

    /// Advance the match by one frame. `delta_ms` is clamped before physics
    /// sees it, so a resumed background tab cannot teleport bodies.
    pub fn tick(&mut self, delta_ms: f64) {
        let dt = clamp_delta(delta_ms);
        let dt_f32 = dt as f32;
        self.clock_ms += dt;
        let now = self.clock_ms as u64;

        // 1. Deferred tasks fire before anything moves.
        for action in self.deferred.drain_due(now) {
            self.apply_deferred(action, now);
        }

        // 2. Input.
        let mut hit_requests: Vec<Side> = Vec::new();
        self.poll_movement();
        for (slot, action) in self.input.drain_actions() {
            match action {
                InputAction::Hit => {
                    if let Some(side) = self.side_for_slot(slot) {
                        hit_requests.push(side);
                    }
                }
                InputAction::Reset => self.reset_match(),
            }
        }
        for click in self.input.drain_clicks() {
            self.handle_click(click, now);
        }

        // 3. Characters, then the ball.
        if self.left.control != ControlKind::Remote {
            self.left.update(dt_f32);
        }
        if self.right.control != ControlKind::Remote {
            self.right.update(dt_f32);
        }
        self.ball.step(dt_f32, now);

        // 4. Rally rules on the post-motion state.
        for side in hit_requests {
            self.try_hit(side, now);
        }
        self.check_rally_state();

        // 5. Brains observe the updated world.
        let mut brain_hits: Vec<Side> = Vec::new();
        if let Some(brain) = self.left_brain.as_mut() {
            if brain.update(dt_f32, &mut self.left, &mut self.ball, now, &mut self.rng) {
                brain_hits.push(Side::Left);
            }
        }
        if let Some(brain) = self.right_brain.as_mut() {
            if brain.update(dt_f32, &mut self.right, &mut self.ball, now, &mut self.rng) {
                brain_hits.push(Side::Right);
            }
        }
        for side in brain_hits {
            let kind = self.ball.last_launch.map_or(HitKind::Bump, |l| l.kind);
            self.register_hit(side, kind, now);
        }

        // 6. Online blend + send.
        if let Some(mut net) = self.net.take() {
            let events = net.service(now, &mut self.ball, &mut self.right);
            self.events.extend(events);
            if let Some(event) = net.maybe_send(now, &self.ball, &self.left) {
                self.events.push(event);
            }
            self.net = Some(net);
        }

        // 7. Autopilot keeps the demo rally going.
        if self.autopilot
            && self.phase == RallyPhase::Ready
            && !self.ball.is_moving
            && !self.serve_pending
        {
            self.deferred
                .schedule(now + rally_consts::AI_PASS_DELAY_MS as u64, DeferredAction::Serve);
            self.serve_pending = true;
        }
    }

    // ============================================================
    // Internals
    // ============================================================

    fn apply_deferred(&mut self, action: DeferredAction, now: u64) {
        match action {
            DeferredAction::EnableInteraction(side) => match side {
                Side::Left => self.left.set_interactable(true),
                Side::Right => self.right.set_interactable(true),
            },
            DeferredAction::Serve => {
                self.serve_pending = false;
                if self.ball.is_moving {
                    return;
                }
                // Park the ball at the server's hands and swing.
                let x = self.left.body.center_x() + 50.0 - self.ball.body.width / 2.0;
                let y = self.ground_y - 150.0;
                self.ball.reset(x, y);
                self.try_hit(Side::Left, now);
            }
        }
    }

    fn poll_movement(&mut self) {
        if self.left.control == ControlKind::Human {
            let intent = self.intent_for(PlayerSlot::One);
            self.left.apply_intent(intent);
        }
        if self.mode == GameMode::LocalTwoPlayer && self.right.control == ControlKind::Human {
            let intent = self.intent_for(PlayerSlot::Two);
            self.right.apply_intent(intent);
        }
    }

    fn intent_for(&self, slot: PlayerSlot) -> MoveIntent {
        MoveIntent {
            left: self.input.is_pressed(slot, Control::Left),
            right: self.input.is_pressed(slot, Control::Right),
            jump: self.input.is_pressed(slot, Control::Jump),
        }
    }

    fn side_for_slot(&self, slot: PlayerSlot) -> Option<Side> {
        match slot {
            PlayerSlot::One => {
                (self.left.control == ControlKind::Human).then_some(Side::Left)
            }
            PlayerSlot::Two => (self.mode == GameMode::LocalTwoPlayer
                && self.right.control == ControlKind::Human)
                .then_some(Side::Right),
        }
    }

    /// Click on an idle human character tosses the ball over the net,
    /// the click-to-pass serve.
    fn handle_click(&mut self, click: PointerClick, now: u64) {
        for side in [Side::Left, Side::Right] {
            let character = self.character(side);
            if character.control != ControlKind::Human
                || !character.can_interact
                || !character.contains_point(click.x, click.y)
                || self.ball.is_moving
            {
                continue;
            }

            let (opp_cx, opp_cy) = {
                let opponent = self.character(side.opposite());
                (opponent.body.center_x(), opponent.body.center_y())
            };
            let tx = opp_cx + (self.rng.gen::<f32>() - 0.5) * 40.0;
            let ty = opp_cy - 50.0;
            self.ball.pass_to_target(tx, ty, 0.8, &mut self.rng);

            match side {
                Side::Left => self.left.set_interactable(false),
                Side::Right => self.right.set_interactable(false),
            }
            self.deferred.schedule(
                now + rally_consts::REENABLE_INPUT_MS as u64,
                DeferredAction::EnableInteraction(side),
            );
            self.register_hit(side, HitKind::Set, now);
            return;
        }
    }

    /// Human hit path: coordinator eligibility gate, then the ball's own.
    fn try_hit(&mut self, side: Side, now: u64) {
        let character = self.character(side);
        if !character.can_interact || !self.eligible_to_hit(side) {
            return;
        }

        let hit = match side {
            Side::Left => self.ball.hit_from_character(&self.left, now, &mut self.rng),
            Side::Right => self.ball.hit_from_character(&self.right, now, &mut self.rng),
        };
        if hit {
            let kind = self.ball.last_launch.map_or(HitKind::Bump, |l| l.kind);
            self.register_hit(side, kind, now);
        }
    }

    /// The distance-only pre-gate: close enough, not screaming past, not
    /// over everyone's head.
    fn eligible_to_hit(&self, side: Side) -> bool {
        let character = self.character(side);
        self.ball.is_near(character.body.center_x(), character.body.center_y(), hit::REACH)
            && self.ball.body.vy.abs() < hit::MAX_INCOMING_VY
            && self.ball.body.y > self.ground_y - hit::MAX_HEIGHT_ABOVE_GROUND
    }

    /// Bookkeeping shared by every accepted hit regardless of its origin.
    fn register_hit(&mut self, side: Side, kind: HitKind, now: u64) {
        self.pass_count += 1;
        self.last_hit_by = Some(side);
        self.phase = RallyPhase::InProgress;

        match side {
            Side::Left => self.left.play_hit_animation(&mut self.rng),
            Side::Right => self.right.play_hit_animation(&mut self.rng),
        }
        self.audio.play(SoundCue::Hit);
        self.audio.play(SoundCue::Voice);
        self.events.push(GameEvent::BallHit { side, kind, pass_count: self.pass_count });
        log::debug!("{side:?} {kind:?} hit, rally at {} passes", self.pass_count);

        // Wake the other side's brain, if it has one.
        let cue_rng = &mut self.rng;
        match side.opposite() {
            Side::Left => {
                if let Some(brain) = self.left_brain.as_mut() {
                    brain.cue(cue_rng);
                }
            }
            Side::Right => {
                if let Some(brain) = self.right_brain.as_mut() {
                    brain.cue(cue_rng);
                }
            }
        }

        if side == Side::Left {
            if let Some(net) = self.net.as_mut() {
                net.note_local_hit(now);
            }
        }
    }

    fn check_rally_state(&mut self) {
        match self.phase {
            RallyPhase::InProgress => {
                if self.ball.is_on_ground() {
                    self.end_rally();
                }
            }
            RallyPhase::Settling => {
                if !self.ball.is_moving {
                    self.phase = RallyPhase::Ready;
                    self.events.push(GameEvent::ServeReady);
                }
            }
            RallyPhase::Ready => {}
        }
    }

    fn end_rally(&mut self) {
        let passes = self.pass_count;
        log::info!("rally ended after {passes} passes");
        self.events.push(GameEvent::RallyEnded { passes });
        if passes >= self.cue_min_passes {
            self.audio.play(SoundCue::RallyCheer);
        }

        self.stats.rallies += 1;
        self.stats.total_passes += passes;
        self.stats.longest_rally = self.stats.longest_rally.max(passes);

        self.pass_count = 0;
        self.last_hit_by = None;
        if let Some(brain) = self.left_brain.as_mut() {
            brain.reset();
        }
        if let Some(brain) = self.right_brain.as_mut() {
            brain.reset();
        }
        self.phase = RallyPhase::Settling;
    }

    /// Put everything back on serve marks. Bound to the reset action.
    pub fn reset_match(&mut self) {
        self.left.body.x = 120.0;
        self.left.body.y = self.ground_y - self.left.body.height;
        self.left.body.vx = 0.0;
        self.left.body.vy = 0.0;
        self.left.body.on_ground = true;
        self.left.set_interactable(true);

        self.right.body.x = self.court_width - 260.0;
        self.right.body.y = self.ground_y - self.right.body.height;
        self.right.body.vx = 0.0;
        self.right.body.vy = 0.0;
        self.right.body.on_ground = true;
        self.right.set_interactable(true);

        self.ball.reset(
            self.left.body.center_x() + 50.0,
            self.ground_y - 100.0 - self.ball.body.height,
        );

        if let Some(brain) = self.left_brain.as_mut() {
            brain.reset();
        }
        if let Some(brain) = self.right_brain.as_mut() {
            brain.reset();
        }

        self.pass_count = 0;
        self.last_hit_by = None;
        self.phase = RallyPhase::Ready;
        self.deferred = DeferredQueue::new();
        self.serve_pending = false;
        log::info!("match reset");
    }
}
