//! Physics and tuning constants for the volleyball simulation.
//!
//! Units: positions in court units (one unit per canvas pixel),
//! velocities in units/second, times in milliseconds unless suffixed `_SEC`.
//! Y grows downward; the ground line is `court::HEIGHT * court::GROUND_RATIO`.

// ============================================================
// Court geometry
// ============================================================
pub mod court {
    /// Default court width.
    pub const WIDTH: f32 = 1280.0;

    /// Default court height.
    pub const HEIGHT: f32 = 720.0;

    /// Fraction of the court height where the sand line sits.
    pub const GROUND_RATIO: f32 = 0.75;

    /// Horizontal restitution against the court side walls.
    pub const WALL_RESTITUTION: f32 = 0.8;
}

// ============================================================
// Tick / scheduler
// ============================================================
pub mod tick {
    /// Upper bound applied to an incoming delta before physics runs.
    ///
    /// A backgrounded tab can hand the loop a multi-second delta on resume;
    /// integrating that in one step teleports bodies through the court.
    pub const MAX_DELTA_MS: f64 = 50.0;

    /// Nominal frame length the per-frame decay constants were tuned at.
    pub const FRAME_MS: f32 = 1000.0 / 60.0;
}

// ============================================================
// Ball
// ============================================================
pub mod ball {
    /// Ball bounding box edge.
    pub const SIZE: f32 = 50.0;

    /// Downward acceleration (units/s²). Lighter than the characters' so the
    /// ball floats the way a beach volleyball does.
    pub const GRAVITY: f32 = 800.0;

    /// Coefficient of restitution against the sand.
    pub const BOUNCE: f32 = 0.3;

    /// Horizontal velocity kept after each ground contact.
    pub const GROUND_FRICTION: f32 = 0.98;

    /// Per-frame horizontal air resistance (see `math::frame_decay`).
    pub const AIR_RESISTANCE: f32 = 0.999;

    /// Vertical speed below which a bounce is swallowed.
    pub const BOUNCE_KILL_SPEED: f32 = 50.0;

    /// Speed (per axis) below which the ball settles after a ground contact.
    pub const SETTLE_SPEED: f32 = 30.0;

    /// Tolerance for the resting-on-ground query.
    pub const GROUND_EPSILON: f32 = 5.0;

    /// Rotation speed per unit of horizontal velocity while in flight.
    pub const ROTATION_FACTOR: f32 = 0.02;

    /// Per-ms blend rate for the scale pulse relaxing to its target.
    pub const SCALE_RATE: f32 = 0.01;
}

/// Ball trail (motion streak) bookkeeping.
pub mod trail {
    /// Minimum per-axis speed before a sample is recorded.
    pub const MIN_SPEED: f32 = 50.0;

    /// Samples older than this are pruned every tick.
    pub const MAX_AGE_MS: u64 = 500;

    /// Hard cap on retained samples; oldest dropped first.
    pub const MAX_LEN: usize = 6;
}

// ============================================================
// Hit admission and targeting
// ============================================================
pub mod hit {
    /// Minimum interval between two accepted hits on the same ball.
    pub const COOLDOWN_MS: u64 = 200;

    /// Center-to-center reach for a hit to connect.
    pub const REACH: f32 = 160.0;

    /// Maximum vertical offset between ball and character centers.
    pub const MAX_HEIGHT_OFFSET: f32 = 150.0;

    /// Upward character speed that qualifies a contact as a spike.
    pub const SPIKE_RISE_SPEED: f32 = -100.0;

    /// Ball-above-character margin that qualifies a grounded contact as a set.
    pub const SET_BALL_CLEARANCE: f32 = 60.0;

    /// Landing band on the receiving half: offset from the net and its width.
    pub const TARGET_NET_CLEARANCE: f32 = 150.0;
    pub const TARGET_BAND_WIDTH: f32 = 200.0;

    /// Launch jitter bounds (units/s), applied symmetrically around zero.
    pub const JITTER_VX: f32 = 40.0;
    pub const JITTER_VY: f32 = 30.0;

    /// Coordinator-side eligibility: no swinging at a ball falling faster
    /// than this.
    pub const MAX_INCOMING_VY: f32 = 600.0;

    /// Coordinator-side eligibility: no swinging at a ball higher than this
    /// above the sand line.
    pub const MAX_HEIGHT_ABOVE_GROUND: f32 = 300.0;
}

// ============================================================
// Character
// ============================================================
pub mod character {
    /// Character bounding box edge.
    pub const SIZE: f32 = 140.0;

    /// Horizontal run speed.
    pub const SPEED: f32 = 420.0;

    /// Jump impulse (negative = up).
    pub const JUMP_POWER: f32 = -650.0;

    /// Downward acceleration (units/s²).
    pub const GRAVITY: f32 = 1800.0;

    /// Per-frame horizontal damping; gives the skating stop instead of a
    /// dead halt when keys are released.
    pub const FRICTION: f32 = 0.85;

    /// Duration of one hit-animation playthrough.
    pub const HIT_ANIM_MS: f32 = 500.0;
}

// ============================================================
// NPC brain
// ============================================================
pub mod npc {
    /// Reaction delay drawn per cue, milliseconds.
    pub const REACTION_MIN_MS: f64 = 300.0;
    pub const REACTION_MAX_MS: f64 = 700.0;

    /// Lookahead used when projecting the ball forward.
    pub const LOOKAHEAD_SEC: f32 = 0.5;

    /// Base chase speed; boosted when the ball is close or fast.
    pub const MOVE_SPEED: f32 = 300.0;

    /// Chase speed multiplier applied under pressure.
    pub const BOOST: f32 = 1.4;

    /// Ball distance below which the boost kicks in.
    pub const BOOST_RANGE: f32 = 320.0;

    /// Ball speed above which the boost kicks in.
    pub const BOOST_BALL_SPEED: f32 = 450.0;

    /// Arrival tolerance around the intercept target.
    pub const ARRIVE_TOLERANCE: f32 = 30.0;

    /// Blend toward the half's strategic center, 0..1.
    pub const CENTER_BIAS: f32 = 0.25;

    /// Extra center bias for fast incoming balls.
    pub const CENTER_BIAS_FAST: f32 = 0.15;

    /// Margin kept from the net and the back wall when clamping targets.
    pub const NET_MARGIN: f32 = 50.0;
    pub const WALL_MARGIN: f32 = 40.0;

    /// How far past the net the ball must retreat before the brain gives up
    /// on the exchange and drifts home.
    pub const DISENGAGE_PAST_NET: f32 = 150.0;

    /// Per-frame damping used while decelerating in Ready/Waiting.
    pub const READY_DAMPING: f32 = 0.8;
    pub const WAIT_DAMPING: f32 = 0.9;
}

// ============================================================
// Rally / match flow
// ============================================================
pub mod rally {
    /// Passes required before the rally-end celebration cue fires.
    pub const CUE_MIN_PASSES: u32 = 2;

    /// Deferred delay before interaction re-enables after a serve pass.
    pub const REENABLE_INPUT_MS: f64 = 1000.0;

    /// Deferred delay before the scripted return pass in demo flows.
    pub const AI_PASS_DELAY_MS: f64 = 1500.0;
}

// ============================================================
// Online session
// ============================================================
pub mod net {
    /// Minimum interval between outgoing state snapshots.
    pub const SYNC_INTERVAL_MS: u64 = 50;

    /// Window after a local hit during which remote ball state is ignored,
    /// so a stale echo cannot cancel the hit.
    pub const LOCAL_HIT_SUPPRESS_MS: u64 = 500;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ground_line_inside_court() {
        let ground = court::HEIGHT * court::GROUND_RATIO;
        assert!(ground > 0.0 && ground < court::HEIGHT);
    }

    #[test]
    fn test_settle_below_bounce_kill() {
        // Settling must be reachable: a swallowed bounce leaves |vy| = 0,
        // and the settle band must sit below the bounce-kill band.
        assert!(ball::SETTLE_SPEED < ball::BOUNCE_KILL_SPEED);
    }

    #[test]
    fn test_reaction_window_ordered() {
        assert!(npc::REACTION_MIN_MS < npc::REACTION_MAX_MS);
    }
}
