//! NPC brain: the finite-state loop that makes the AI read as competent.
//!
//! The shape is reaction delay → predicted-position pursuit → fine
//! adjustment → commit. The brain never touches rally rules; it steers its
//! character through the same drive calls the input path uses and routes
//! its hits through the same ball gate as everyone else.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::ball::Ball;
use super::character::Character;
use super::math::{distance, frame_decay, lerp};
use super::physics_constants::{hit, npc as consts};
use super::Side;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NpcState {
    /// Cued by an opponent hit; waiting out the reaction delay.
    Tracking,
    /// Running toward the predicted intercept point.
    Positioning,
    /// On station, micro-adjusting, swinging when the ball is in reach.
    Ready,
    /// Rally over or ball elsewhere; drifting back home.
    Waiting,
}

#[derive(Clone, Debug)]
pub struct NpcBrain {
    pub state: NpcState,
    side: Side,
    /// Neutral stance position (character center X).
    home_x: f32,
    court_width: f32,
    move_speed: f32,
    reaction_timer_ms: f64,
    reaction_threshold_ms: f64,
    /// Continuously recomputed intercept target (character center X).
    pub target_x: f32,
}

impl NpcBrain {
    pub fn new(side: Side, home_x: f32, court_width: f32) -> Self {
        Self {
            state: NpcState::Waiting,
            side,
            home_x,
            court_width,
            move_speed: consts::MOVE_SPEED,
            reaction_timer_ms: 0.0,
            reaction_threshold_ms: 0.0,
            target_x: home_x,
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Opponent hit: start reacting after a freshly rolled delay.
    pub fn cue(&mut self, rng: &mut ChaCha8Rng) {
        self.state = NpcState::Tracking;
        self.reaction_timer_ms = 0.0;
        self.reaction_threshold_ms = consts::REACTION_MIN_MS
            + rng.gen::<f64>() * (consts::REACTION_MAX_MS - consts::REACTION_MIN_MS);
    }

    /// Rally over: back to neutral.
    pub fn reset(&mut self) {
        self.state = NpcState::Waiting;
        self.reaction_timer_ms = 0.0;
    }

    /// One decision step. Runs after the ball and rally updates so the
    /// brain sees this tick's world. Returns true when the brain landed a
    /// hit on the ball.
    pub fn update(
        &mut self,
        dt_ms: f32,
        character: &mut Character,
        ball: &mut Ball,
        now_ms: u64,
        rng: &mut ChaCha8Rng,
    ) -> bool {
        match self.state {
            NpcState::Waiting => {
                self.drift_home(dt_ms, character);
                false
            }
            NpcState::Tracking => {
                self.reaction_timer_ms += dt_ms as f64;
                if self.reaction_timer_ms >= self.reaction_threshold_ms
                    && ball.is_moving
                    && self.ball_incoming(ball)
                {
                    self.target_x = self.predict_intercept(ball, character).0;
                    self.state = NpcState::Positioning;
                }
                false
            }
            NpcState::Positioning => {
                if ball.is_on_ground() || !ball.is_moving {
                    self.state = NpcState::Waiting;
                    return false;
                }

                let (target_x, urgent) = self.predict_intercept(ball, character);
                self.target_x = target_x;

                let to_target = target_x - character.body.center_x();
                if to_target.abs() > consts::ARRIVE_TOLERANCE {
                    let speed = if urgent { self.move_speed * consts::BOOST } else { self.move_speed };
                    character.drive(to_target.signum() * speed);
                } else {
                    character.body.vx *= 0.7;
                    self.state = NpcState::Ready;
                }
                false
            }
            NpcState::Ready => self.update_ready(dt_ms, character, ball, now_ms, rng),
        }
    }

    fn update_ready(
        &mut self,
        dt_ms: f32,
        character: &mut Character,
        ball: &mut Ball,
        now_ms: u64,
        rng: &mut ChaCha8Rng,
    ) -> bool {
        let ball_cx = ball.body.center_x();
        let ball_cy = ball.body.center_y();
        let char_cx = character.body.center_x();

        // Fine corrections: shadow the ball instead of standing frozen.
        let off = ball_cx - char_cx;
        if off.abs() > consts::ARRIVE_TOLERANCE * 1.5 {
            character.drive(off.signum() * self.move_speed * 0.4);
        } else {
            character.body.vx *= frame_decay(consts::READY_DAMPING, dt_ms);
        }

        // Commit whenever the ball drops into reach.
        if ball.is_near(char_cx, character.body.center_y(), hit::REACH)
            && ball.hit_from_character(character, now_ms, rng)
        {
            self.state = NpcState::Waiting;
            return true;
        }

        // Ball landed, or left our half for good: stand down.
        let net_x = self.court_width / 2.0;
        let gone = match self.side {
            Side::Right => ball_cx < net_x - consts::DISENGAGE_PAST_NET,
            Side::Left => ball_cx > net_x + consts::DISENGAGE_PAST_NET,
        };
        if ball.is_on_ground() || gone {
            log::debug!("npc ({:?}) disengaging at ball ({ball_cx:.0},{ball_cy:.0})", self.side);
            self.state = NpcState::Waiting;
        }
        false
    }

    fn drift_home(&self, dt_ms: f32, character: &mut Character) {
        let dx = self.home_x - character.body.center_x();
        if dx.abs() > 60.0 {
            character.drive(dx.signum() * self.move_speed * 0.5);
        } else {
            character.body.vx *= frame_decay(consts::WAIT_DAMPING, dt_ms);
        }
    }

    /// Is the ball flying into this brain's half?
    fn ball_incoming(&self, ball: &Ball) -> bool {
        let net_x = self.court_width / 2.0;
        let cx = ball.body.center_x();
        match self.side {
            Side::Right => ball.body.vx > 0.0 && cx > net_x - 100.0,
            Side::Left => ball.body.vx < 0.0 && cx < net_x + 100.0,
        }
    }

    /// Project the ball a fixed lookahead forward under gravity, bias the
    /// result toward the half's strategic center, and clamp to the legal
    /// half. Returns (target center X, urgency).
    fn predict_intercept(&self, ball: &Ball, character: &Character) -> (f32, bool) {
        let t = consts::LOOKAHEAD_SEC;
        let cx = ball.body.center_x();
        let cy = ball.body.center_y();
        let future_x = cx + ball.body.vx * t;
        let future_y = cy + ball.body.vy * t + 0.5 * ball.gravity * t * t;

        let net_x = self.court_width / 2.0;
        let strategic_x = match self.side {
            Side::Right => (net_x + self.court_width) / 2.0,
            Side::Left => net_x / 2.0,
        };

        let fast = ball.body.vx.abs() > consts::BOOST_BALL_SPEED;
        let mut bias = consts::CENTER_BIAS;
        if fast {
            bias += consts::CENTER_BIAS_FAST;
        }
        let biased = lerp(future_x, strategic_x, bias);

        let half_w = character.body.width / 2.0;
        let target = match self.side {
            Side::Right => biased.clamp(
                net_x + consts::NET_MARGIN + half_w,
                self.court_width - consts::WALL_MARGIN - half_w,
            ),
            Side::Left => biased.clamp(
                consts::WALL_MARGIN + half_w,
                net_x - consts::NET_MARGIN - half_w,
            ),
        };

        // Urgency: ball about to drop into the return window, already
        // close, or simply fast.
        let dropping = future_y > ball.body.ground_y - 200.0;
        let near = distance(cx, cy, character.body.center_x(), character.body.center_y())
            < consts::BOOST_RANGE;
        (target, dropping || near || fast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ball::HitKind;
    use crate::engine::character::{CharacterKind, ControlKind};
    use crate::engine::physics_constants::character as char_consts;
    use rand::SeedableRng;

    const COURT_W: f32 = 1280.0;
    const GROUND_Y: f32 = 540.0;

    fn right_side_world() -> (NpcBrain, Character, Ball) {
        let home_x = COURT_W - 260.0 + char_consts::SIZE / 2.0;
        let brain = NpcBrain::new(Side::Right, home_x, COURT_W);

        let mut character = Character::new(
            COURT_W - 260.0,
            GROUND_Y - char_consts::SIZE,
            CharacterKind::DonQ,
            ControlKind::Npc,
        );
        character.set_ground_level(GROUND_Y);
        character.body.on_ground = true;

        let mut ball = Ball::new(250.0, GROUND_Y - 300.0, COURT_W);
        ball.set_ground_level(GROUND_Y);

        (brain, character, ball)
    }

    #[test]
    fn test_cue_rolls_reaction_threshold_in_band() {
        let (mut brain, _, _) = right_side_world();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        for _ in 0..50 {
            brain.cue(&mut rng);
            assert_eq!(brain.state, NpcState::Tracking);
            assert!(brain.reaction_threshold_ms >= consts::REACTION_MIN_MS);
            assert!(brain.reaction_threshold_ms < consts::REACTION_MAX_MS);
        }
    }

    #[test]
    fn test_tracking_waits_out_reaction_delay() {
        let (mut brain, mut character, mut ball) = right_side_world();
        let mut rng = ChaCha8Rng::seed_from_u64(2);

        // Ball already past the net, flying in.
        ball.body.x = 700.0;
        ball.launch_to(1_000.0, GROUND_Y - 100.0, 2.0, HitKind::Bump);
        brain.cue(&mut rng);

        // Before the minimum delay nothing can happen.
        brain.update(100.0, &mut character, &mut ball, 100, &mut rng);
        assert_eq!(brain.state, NpcState::Tracking);

        // Past the maximum delay with the ball incoming, it must move on.
        let mut now = 100u64;
        for _ in 0..10 {
            brain.update(100.0, &mut character, &mut ball, now, &mut rng);
            now += 100;
        }
        assert_eq!(brain.state, NpcState::Positioning);
    }

    #[test]
    fn test_intercept_target_clamped_to_own_half() {
        let (brain, character, mut ball) = right_side_world();

        // Ball racing toward the far wall: target stays inside the half.
        ball.body.vx = 5_000.0;
        let (target, _) = brain.predict_intercept(&ball, &character);
        assert!(target <= COURT_W - consts::WALL_MARGIN - character.body.width / 2.0);

        // Ball still on the opponent half: target never crosses the net.
        ball.body.vx = -5_000.0;
        let (target, _) = brain.predict_intercept(&ball, &character);
        assert!(target >= COURT_W / 2.0 + consts::NET_MARGIN + character.body.width / 2.0);
    }

    #[test]
    fn test_converges_and_returns_incoming_arcs() {
        // Representative launch spread: the brain must reach Ready and land
        // the return before the ball grounds.
        let cases = [(850.0, 2.0), (920.0, 2.2), (1000.0, 2.4)];

        for (seed, (target_x, flight)) in cases.into_iter().enumerate() {
            let (mut brain, mut character, mut ball) = right_side_world();
            let mut rng = ChaCha8Rng::seed_from_u64(seed as u64);

            ball.launch_to(target_x, GROUND_Y - 100.0, flight, HitKind::Bump);
            brain.cue(&mut rng);

            let mut now = 0u64;
            let mut hit = false;
            let mut reached_ready = false;
            for _ in 0..1000 {
                if brain.update(16.0, &mut character, &mut ball, now, &mut rng) {
                    hit = true;
                    break;
                }
                reached_ready |= brain.state == NpcState::Ready;
                character.update(16.0);
                ball.step(16.0, now);
                now += 16;
                if ball.is_on_ground() {
                    break;
                }
            }

            assert!(
                reached_ready,
                "target {target_x} t {flight}: brain never reached Ready (state {:?})",
                brain.state
            );
            assert!(hit, "target {target_x} t {flight}: brain never returned the ball");
            assert_eq!(brain.state, NpcState::Waiting, "hit must hand back to Waiting");
        }
    }

    #[test]
    fn test_waiting_drifts_toward_home() {
        let (mut brain, mut character, mut ball) = right_side_world();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        character.body.x = COURT_W - character.body.width - 10.0; // far from home
        for i in 0..400 {
            brain.update(16.0, &mut character, &mut ball, i * 16, &mut rng);
            character.update(16.0);
        }
        assert!(
            (character.body.center_x() - brain.home_x).abs() < 80.0,
            "should settle near home, at {}",
            character.body.center_x()
        );
    }

    #[test]
    fn test_ready_disengages_when_ball_leaves_half() {
        let (mut brain, mut character, mut ball) = right_side_world();
        let mut rng = ChaCha8Rng::seed_from_u64(4);

        brain.state = NpcState::Ready;
        ball.is_moving = true;
        ball.body.x = 100.0; // deep in the opponent half
        ball.body.y = 100.0;
        ball.body.vx = -300.0;

        brain.update(16.0, &mut character, &mut ball, 0, &mut rng);
        assert_eq!(brain.state, NpcState::Waiting);
    }
}
