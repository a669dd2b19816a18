//! Ball physics and rally-arc targeting.
//!
//! This module contains:
//! - `Ball` and its per-tick integration (gravity, bounce, air resistance)
//! - The bounded motion trail used by the renderer
//! - Hit admission (`hit_from_character`) with spike/set/bump classification
//! - The analytic arc solver that places every accepted hit on the opposite
//!   half at a chosen flight time

use std::collections::VecDeque;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::body::Body;
use super::character::Character;
use super::math::{distance, frame_decay, lerp, smoothing_factor};
use super::physics_constants::{ball as consts, court, hit, trail};

/// One sample of the motion streak behind a fast ball.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TrailSample {
    pub x: f32,
    pub y: f32,
    pub t_ms: u64,
}

/// Contact classification; decides the shape of the outgoing arc.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitKind {
    /// Standard underhand return. High, slow, lands mid-court.
    Bump,
    /// Grounded player under a high ball. Highest, slowest arc.
    Set,
    /// Rising jumper striking a ball above them. Flat, fast, lands deep.
    Spike,
}

impl HitKind {
    /// Flight duration in seconds, drawn from the kind's band.
    fn flight_time(&self, rng: &mut ChaCha8Rng) -> f32 {
        match self {
            HitKind::Bump => 1.8 + rng.gen::<f32>() * 0.4,
            HitKind::Set => 2.2 + rng.gen::<f32>() * 0.4,
            HitKind::Spike => 0.9 + rng.gen::<f32>() * 0.2,
        }
    }

    /// Landing height of the ball center above the sand line. Bumps and sets
    /// arrive chest-high so the receiver can return them; spikes dive low.
    fn landing_clearance(&self) -> f32 {
        match self {
            HitKind::Bump => 100.0,
            HitKind::Set => 120.0,
            HitKind::Spike => 40.0,
        }
    }

    /// Landing band measured from the net: (clearance, band width).
    fn target_band(&self) -> (f32, f32) {
        match self {
            HitKind::Bump => (hit::TARGET_NET_CLEARANCE, hit::TARGET_BAND_WIDTH),
            HitKind::Set => (hit::TARGET_NET_CLEARANCE * 0.8, hit::TARGET_BAND_WIDTH * 0.8),
            HitKind::Spike => (hit::TARGET_NET_CLEARANCE * 1.5, hit::TARGET_BAND_WIDTH * 1.3),
        }
    }

    /// Impact pulse applied to `target_scale`.
    fn scale_pulse(&self) -> f32 {
        match self {
            HitKind::Bump => 1.25,
            HitKind::Set => 1.2,
            HitKind::Spike => 1.4,
        }
    }
}

/// Record of the last solved launch; kept for diagnostics and AI reads.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct LaunchPlan {
    pub kind: HitKind,
    /// Ball-center landing point.
    pub target_x: f32,
    pub target_y: f32,
    pub flight_time_sec: f32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Ball {
    pub body: Body,
    pub gravity: f32,
    pub bounce: f32,
    pub ground_friction: f32,
    pub air_resistance: f32,
    /// Simulation-active flag; false once the ball has settled.
    pub is_moving: bool,
    pub is_in_air: bool,
    pub rotation: f32,
    pub rotation_speed: f32,
    pub scale: f32,
    pub target_scale: f32,
    court_width: f32,
    trail: VecDeque<TrailSample>,
    last_hit_at_ms: Option<u64>,
    pub last_launch: Option<LaunchPlan>,
}

impl Ball {
    pub fn new(x: f32, y: f32, court_width: f32) -> Self {
        Self {
            body: Body::new(x, y, consts::SIZE, consts::SIZE, 3),
            gravity: consts::GRAVITY,
            bounce: consts::BOUNCE,
            ground_friction: consts::GROUND_FRICTION,
            air_resistance: consts::AIR_RESISTANCE,
            is_moving: false,
            is_in_air: false,
            rotation: 0.0,
            rotation_speed: 0.0,
            scale: 1.0,
            target_scale: 1.0,
            court_width,
            trail: VecDeque::with_capacity(trail::MAX_LEN),
            last_hit_at_ms: None,
            last_launch: None,
        }
    }

    pub fn set_ground_level(&mut self, ground_y: f32) {
        self.body.set_ground_level(ground_y);
    }

    /// Resting on the sand line, within tolerance.
    pub fn is_on_ground(&self) -> bool {
        (self.body.y + self.body.height - self.body.ground_y).abs() < consts::GROUND_EPSILON
    }

    pub fn trail(&self) -> &VecDeque<TrailSample> {
        &self.trail
    }

    /// Advance the ball by `dt_ms`. `now_ms` is accumulated simulation time,
    /// used for trail aging and the hit cooldown.
    pub fn step(&mut self, dt_ms: f32, now_ms: u64) {
        let dt = dt_ms / 1000.0;

        if self.is_moving || !self.is_on_ground() {
            self.body.x += self.body.vx * dt;
            self.body.y += self.body.vy * dt;
            self.body.vy += self.gravity * dt;
            self.body.vx *= frame_decay(self.air_resistance, dt_ms);

            self.rotation += self.rotation_speed * dt;
            self.rotation_speed = self.body.vx * consts::ROTATION_FACTOR;

            self.record_trail(now_ms);

            if self.body.collide_ground() {
                self.body.vy *= -self.bounce;
                self.body.vx *= self.ground_friction;

                // Swallow micro-bounces so the ball doesn't buzz on the sand.
                if self.body.vy.abs() < consts::BOUNCE_KILL_SPEED {
                    self.body.vy = 0.0;
                }

                if self.body.vx.abs() < consts::SETTLE_SPEED
                    && self.body.vy.abs() < consts::SETTLE_SPEED
                {
                    self.settle();
                }
            }

            if self.body.clamp_horizontal(self.court_width) {
                self.body.vx *= -court::WALL_RESTITUTION;
            }
        }

        // Impact pulse relaxation runs even while settled.
        self.scale = lerp(self.scale, self.target_scale, smoothing_factor(consts::SCALE_RATE, dt_ms));
    }

    fn settle(&mut self) {
        self.body.vx = 0.0;
        self.body.vy = 0.0;
        self.is_moving = false;
        self.is_in_air = false;
        self.rotation_speed = 0.0;
        self.trail.clear();
    }

    fn record_trail(&mut self, now_ms: u64) {
        if self.body.vx.abs() > trail::MIN_SPEED || self.body.vy.abs() > trail::MIN_SPEED {
            self.trail.push_back(TrailSample { x: self.body.x, y: self.body.y, t_ms: now_ms });
            while self.trail.len() > trail::MAX_LEN {
                self.trail.pop_front();
            }
        }
        while let Some(front) = self.trail.front() {
            if now_ms.saturating_sub(front.t_ms) >= trail::MAX_AGE_MS {
                self.trail.pop_front();
            } else {
                break;
            }
        }
    }

    /// Attempt a hit from `character`. Returns false (and leaves the ball
    /// untouched) while on cooldown or when the ball is out of reach; the
    /// caller must not advance rally state on a false return.
    pub fn hit_from_character(
        &mut self,
        character: &Character,
        now_ms: u64,
        rng: &mut ChaCha8Rng,
    ) -> bool {
        if let Some(last) = self.last_hit_at_ms {
            if now_ms.saturating_sub(last) < hit::COOLDOWN_MS {
                log::debug!("hit rejected: cooldown ({}ms since last)", now_ms - last);
                return false;
            }
        }

        let char_cx = character.body.center_x();
        let char_cy = character.body.center_y();
        let ball_cx = self.body.center_x();
        let ball_cy = self.body.center_y();

        if distance(ball_cx, ball_cy, char_cx, char_cy) > hit::REACH {
            return false;
        }
        if (ball_cy - char_cy).abs() > hit::MAX_HEIGHT_OFFSET {
            return false;
        }

        let kind = classify_hit(character, ball_cy, char_cy);
        let (net_clearance, band_width) = kind.target_band();
        let mid = self.court_width / 2.0;

        // Always aim at the opposite half.
        let target_x = if char_cx < mid {
            mid + net_clearance + rng.gen::<f32>() * band_width
        } else {
            mid - net_clearance - band_width + rng.gen::<f32>() * band_width
        };
        let target_y = self.body.ground_y - kind.landing_clearance();
        let flight_time = kind.flight_time(rng);

        self.launch_to(target_x, target_y, flight_time, kind);

        // Bounded jitter for variety; the arc still lands in the band.
        self.body.vx += (rng.gen::<f32>() - 0.5) * hit::JITTER_VX;
        self.body.vy += (rng.gen::<f32>() - 0.5) * hit::JITTER_VY;
        self.rotation_speed = self.body.vx * 0.008;
        self.target_scale = kind.scale_pulse();
        self.last_hit_at_ms = Some(now_ms);

        log::debug!(
            "{:?} hit: target ({:.0}, {:.0}) in {:.2}s",
            kind,
            target_x,
            target_y,
            flight_time
        );
        true
    }

    /// Solve launch velocities so the ball center passes through
    /// `(target_x, target_y)` exactly `flight_time_sec` after launch, under
    /// constant gravity. With horizontal distance `d` this is `vx = d/T`;
    /// with launch height `h` above the target, `vy = -(h + g*T²/2)/T`.
    pub fn launch_to(&mut self, target_x: f32, target_y: f32, flight_time_sec: f32, kind: HitKind) {
        let t = flight_time_sec.max(0.05);
        let dx = target_x - self.body.center_x();
        let dy = target_y - self.body.center_y();

        self.body.vx = dx / t;
        self.body.vy = dy / t - 0.5 * self.gravity * t;

        self.is_moving = true;
        self.is_in_air = true;
        self.trail.clear();
        self.last_launch =
            Some(LaunchPlan { kind, target_x, target_y, flight_time_sec: t });
    }

    /// Lofted pass toward a point, with flight time derived from distance.
    /// Used by serve placement and the scripted return pass; rally hits go
    /// through `hit_from_character` instead.
    pub fn pass_to_target(&mut self, target_x: f32, target_y: f32, arc: f32, rng: &mut ChaCha8Rng) {
        let dx = target_x - self.body.center_x();
        let dy = target_y - self.body.center_y();
        let dist = (dx * dx + dy * dy).sqrt();

        let t = (dist / 400.0).max(0.05);
        self.body.vx = dx / t;
        self.body.vy = dy / t - self.gravity * t * 0.5 * arc;

        self.is_moving = true;
        self.is_in_air = true;
        self.target_scale = 1.1;
        self.rotation_speed = (rng.gen::<f32>() - 0.5) * 5.0;
        self.trail.clear();
    }

    /// Ball center within `threshold` of the given point.
    pub fn is_near(&self, x: f32, y: f32, threshold: f32) -> bool {
        distance(self.body.center_x(), self.body.center_y(), x, y) < threshold
    }

    /// Restore the serve state at a new position.
    pub fn reset(&mut self, x: f32, y: f32) {
        self.body.x = x;
        self.body.y = y;
        self.body.vx = 0.0;
        self.body.vy = 0.0;
        self.rotation = 0.0;
        self.rotation_speed = 0.0;
        self.is_moving = false;
        self.is_in_air = false;
        self.scale = 1.0;
        self.target_scale = 1.0;
        self.trail.clear();
        self.last_hit_at_ms = None;
        self.last_launch = None;
    }
}

fn classify_hit(character: &Character, ball_cy: f32, char_cy: f32) -> HitKind {
    if character.body.vy < hit::SPIKE_RISE_SPEED && ball_cy < char_cy {
        HitKind::Spike
    } else if character.body.on_ground && char_cy - ball_cy > hit::SET_BALL_CLEARANCE {
        HitKind::Set
    } else {
        HitKind::Bump
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::character::{Character, CharacterKind, ControlKind};
    use rand::SeedableRng;

    const COURT_W: f32 = 1280.0;
    const GROUND_Y: f32 = 540.0;

    fn test_ball(x: f32, y: f32) -> Ball {
        let mut ball = Ball::new(x, y, COURT_W);
        ball.set_ground_level(GROUND_Y);
        ball
    }

    fn test_character(x: f32) -> Character {
        let mut c = Character::new(x, GROUND_Y - 140.0, CharacterKind::DonQ, ControlKind::Human);
        c.body.set_ground_level(GROUND_Y);
        c.body.on_ground = true;
        c
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    #[test]
    fn test_ground_invariant_through_flight() {
        let mut ball = test_ball(200.0, 300.0);
        ball.launch_to(800.0, GROUND_Y - 100.0, 1.5, HitKind::Bump);

        let mut now = 0u64;
        for _ in 0..600 {
            ball.step(16.0, now);
            now += 16;
            assert!(
                ball.body.y + ball.body.height <= ball.body.ground_y + 1.0,
                "ball sank below ground: y={}",
                ball.body.y
            );
        }
    }

    #[test]
    fn test_bounce_reflects_with_restitution() {
        let mut ball = test_ball(400.0, GROUND_Y - consts::SIZE - 0.5);
        ball.is_moving = true;
        ball.body.vy = 400.0;

        ball.step(2.0, 0);
        assert!(ball.body.vy < 0.0, "bounce must reflect upward");
        assert!(
            (ball.body.vy.abs() - 0.3 * 400.0).abs() < 5.0,
            "post-bounce speed should be bounce * impact speed, got {}",
            ball.body.vy
        );
    }

    #[test]
    fn test_repeated_bounces_decay_until_settled() {
        let mut ball = test_ball(400.0, 200.0);
        ball.is_moving = true;

        let mut now = 0u64;
        let mut last_peak_speed = f32::MAX;
        let mut prev_vy = ball.body.vy;
        for _ in 0..4000 {
            ball.step(8.0, now);
            now += 8;
            // Downward-to-upward flip marks a bounce.
            if prev_vy > 0.0 && ball.body.vy < 0.0 {
                let peak = ball.body.vy.abs();
                assert!(peak < last_peak_speed, "bounce speed must strictly decay");
                last_peak_speed = peak;
            }
            prev_vy = ball.body.vy;
            if !ball.is_moving {
                break;
            }
        }
        assert!(!ball.is_moving, "ball should settle");
        assert_eq!(ball.body.vx, 0.0);
        assert_eq!(ball.body.vy, 0.0);
        assert!(ball.trail().is_empty());
    }

    #[test]
    fn test_settled_ball_is_idempotent() {
        let mut ball = test_ball(400.0, GROUND_Y - consts::SIZE);
        let (x, y) = (ball.body.x, ball.body.y);

        for i in 0..200 {
            ball.step(16.0, i * 16);
        }
        assert_eq!(ball.body.x, x);
        assert_eq!(ball.body.y, y);
        assert_eq!(ball.body.vx, 0.0);
        assert_eq!(ball.body.vy, 0.0);
        assert!(!ball.is_moving);
    }

    #[test]
    fn test_hit_cooldown_rejects_second_attempt() {
        let mut ball = test_ball(300.0, GROUND_Y - 200.0);
        let character = test_character(250.0);
        let mut rng = rng();

        assert!(ball.hit_from_character(&character, 1_000, &mut rng));
        let (vx, vy) = (ball.body.vx, ball.body.vy);

        assert!(!ball.hit_from_character(&character, 1_100, &mut rng));
        assert_eq!(ball.body.vx, vx, "rejected hit must not change velocity");
        assert_eq!(ball.body.vy, vy);

        // Past the window the next hit is admitted again.
        assert!(ball.hit_from_character(&character, 1_300, &mut rng));
    }

    #[test]
    fn test_hit_rejected_out_of_reach() {
        let mut ball = test_ball(300.0, GROUND_Y - 200.0);
        let character = test_character(900.0);
        let mut rng = rng();

        assert!(!ball.hit_from_character(&character, 1_000, &mut rng));
        assert!(!ball.is_moving);
    }

    #[test]
    fn test_hit_targets_opposite_half() {
        let mut rng = rng();

        // Left-side hitter sends right.
        let mut ball = test_ball(300.0, GROUND_Y - 200.0);
        let left = test_character(250.0);
        assert!(ball.hit_from_character(&left, 1_000, &mut rng));
        assert!(ball.last_launch.unwrap().target_x > COURT_W / 2.0);

        // Right-side hitter sends left.
        let mut ball = test_ball(950.0, GROUND_Y - 200.0);
        let right = test_character(900.0);
        assert!(ball.hit_from_character(&right, 1_000, &mut rng));
        assert!(ball.last_launch.unwrap().target_x < COURT_W / 2.0);
    }

    #[test]
    fn test_arc_lands_on_target() {
        let mut ball = test_ball(200.0, GROUND_Y - 240.0);
        let (tx, ty, t) = (900.0, GROUND_Y - 100.0, 2.0);
        ball.launch_to(tx, ty, t, HitKind::Bump);

        // Integrate the solved velocities under gravity alone with a fine
        // step for exactly the flight time.
        let (mut x, mut y) = (ball.body.center_x(), ball.body.center_y());
        let (vx, mut vy) = (ball.body.vx, ball.body.vy);
        let dt = 0.001;
        for _ in 0..(t * 1000.0) as usize {
            x += vx * dt;
            y += vy * dt;
            vy += ball.gravity * dt;
        }

        assert!((x - tx).abs() < 2.0, "landed at x={x}, wanted {tx}");
        assert!((y - ty).abs() < 2.0, "landed at y={y}, wanted {ty}");
    }

    #[test]
    fn test_spike_classification() {
        let mut character = test_character(250.0);
        character.body.on_ground = false;
        character.body.vy = -300.0; // rising fast
        character.body.y = GROUND_Y - 240.0; // mid-jump

        let mut ball = test_ball(300.0, GROUND_Y - 340.0); // above the character
        let mut rng = rng();
        assert!(ball.hit_from_character(&character, 1_000, &mut rng));
        assert_eq!(ball.last_launch.unwrap().kind, HitKind::Spike);
    }

    #[test]
    fn test_set_classification() {
        let character = test_character(250.0);
        // Ball well above a grounded character, inside reach.
        let mut ball = test_ball(270.0, GROUND_Y - 240.0);
        let mut rng = rng();
        assert!(ball.hit_from_character(&character, 1_000, &mut rng));
        assert_eq!(ball.last_launch.unwrap().kind, HitKind::Set);
    }

    #[test]
    fn test_bounds_clamp_and_reflect() {
        let mut ball = test_ball(COURT_W - consts::SIZE - 1.0, 200.0);
        ball.is_moving = true;
        ball.body.vx = 50_000.0;

        ball.step(16.0, 0);
        assert!(ball.body.x >= 0.0 && ball.body.x <= COURT_W - ball.body.width);
        assert!(ball.body.vx < 0.0, "wall contact must reflect vx");
    }

    #[test]
    fn test_trail_capped_and_age_pruned() {
        let mut ball = test_ball(200.0, 100.0);
        ball.is_moving = true;
        ball.body.vx = 300.0;

        let mut now = 0u64;
        for _ in 0..40 {
            ball.step(16.0, now);
            now += 16;
        }
        assert!(!ball.trail().is_empty());
        assert!(ball.trail().len() <= trail::MAX_LEN);
        for sample in ball.trail() {
            assert!(now - sample.t_ms < trail::MAX_AGE_MS);
        }
    }

    #[test]
    fn test_reset_restores_serve_state() {
        let mut ball = test_ball(300.0, GROUND_Y - 200.0);
        let character = test_character(250.0);
        let mut rng = rng();
        assert!(ball.hit_from_character(&character, 1_000, &mut rng));
        for i in 0..20 {
            ball.step(16.0, 1_000 + i * 16);
        }

        ball.reset(640.0, 300.0);
        assert_eq!(ball.body.x, 640.0);
        assert!(!ball.is_moving);
        assert!(ball.trail().is_empty());
        assert!(ball.last_launch.is_none());

        // Cooldown cleared: an immediate hit is admitted.
        let character = test_character(600.0);
        ball.body.y = GROUND_Y - 200.0;
        ball.body.x = 620.0;
        assert!(ball.hit_from_character(&character, 1_010, &mut rng));
    }
}
