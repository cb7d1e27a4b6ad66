use glam::Vec2;
use tracing::debug;

use crate::api::ContactQuery;
use crate::error::ConfigError;
use crate::sweep::SweptResolver;
use crate::types::*;
use crate::world::FlatFloor;

/// A player-controlled box: velocity integration, swept movement against a
/// [`ContactQuery`], and the forgiveness rules (ground hysteresis, coyote
/// time, damage immunity) layered on top.
///
/// Flags are independent booleans; [`Player::phase`] folds them into a
/// single [`MotionPhase`] for consumers that want one.
#[derive(Clone, Debug)]
pub struct Player<Q: ContactQuery = FlatFloor> {
    query: Q,
    cfg: MotionConfig,
    resolver: SweptResolver,

    position: Vec2,
    velocity: Vec2,
    /// Current gravity; zero while climbing.
    gravity: f32,

    facing_right: bool,
    on_ground: bool,
    was_on_ground: bool,
    /// The last tick kept `on_ground` without contact.
    held_ground: bool,
    jumping: bool,
    moving: bool,
    climbing: bool,
    damaged: bool,

    damage_timer: f32,
    coyote_timer: f32,

    contact: ContactResult,
    last_step: StepStats,
}

impl Player<FlatFloor> {
    /// Player with no level attached; lands on a [`FlatFloor`] at its
    /// default height.
    pub fn new(position: Vec2) -> Self {
        Self::with_query(FlatFloor::default(), position)
    }
}

impl<Q: ContactQuery> Player<Q> {
    pub fn with_query(query: Q, position: Vec2) -> Self {
        let cfg = MotionConfig::default();
        Self {
            query,
            cfg,
            resolver: SweptResolver::default(),
            position,
            velocity: Vec2::ZERO,
            gravity: cfg.gravity,
            facing_right: true,
            on_ground: false,
            was_on_ground: false,
            held_ground: false,
            jumping: false,
            moving: false,
            climbing: false,
            damaged: false,
            damage_timer: 0.0,
            coyote_timer: 0.0,
            contact: ContactResult::default(),
            last_step: StepStats::default(),
        }
    }

    /// Like [`with_query`](Self::with_query) with explicit tunables.
    pub fn with_config(query: Q, position: Vec2, cfg: MotionConfig, resolver: ResolverConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let resolver = SweptResolver::new(resolver)?;
        let mut player = Self::with_query(query, position);
        player.cfg = cfg;
        player.gravity = cfg.gravity;
        player.resolver = resolver;
        Ok(player)
    }

    /// Swap the geometry the player moves through. Motion state is kept.
    pub fn set_query(&mut self, query: Q) {
        self.query = query;
    }

    pub fn query(&self) -> &Q {
        &self.query
    }

    pub fn config(&self) -> &MotionConfig {
        &self.cfg
    }

    /// Advance the simulation by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        if self.damage_timer > 0.0 {
            self.damage_timer -= dt;
            if self.damage_timer <= 0.0 {
                self.damage_timer = 0.0;
                self.damaged = false;
                debug!("damage immunity over");
            }
        }

        if !self.on_ground {
            self.velocity.y += self.gravity * dt;
        }
        // Same friction on the ground and in the air.
        self.velocity.x *= self.cfg.friction;

        let delta = self.velocity * dt;
        self.moving = self.velocity.x.abs() > self.cfg.moving_threshold;

        let prev_on_ground = self.on_ground;
        self.on_ground = false;

        let outcome = self.resolver.resolve(&self.query, self.bounds(), delta);
        self.position = outcome.position;

        let mut stats = StepStats::default();
        let mut landed = false;
        if let Some(x) = outcome.x {
            stats.queries += x.queries;
            stats.iterations += x.iterations;
            if x.blocked {
                self.velocity.x = 0.0;
            }
        }
        if let Some(y) = outcome.y {
            stats.queries += y.queries;
            stats.iterations += y.iterations;
            if y.blocked {
                self.velocity.y = 0.0;
            }
            landed = y.grounded;
        }

        let contact = self.query.check_aabb(self.bounds());
        stats.queries += 1;
        self.last_step = stats;

        // Never land while still rising (passing up through a one-way top).
        let grounded = (landed || contact.on_ground) && self.velocity.y >= 0.0;
        if grounded {
            if !prev_on_ground {
                debug!(x = self.position.x, y = self.position.y, one_way = contact.one_way, "landed");
            }
            self.on_ground = true;
            self.held_ground = false;
            self.jumping = false;
            if self.velocity.y > 0.0 {
                self.velocity.y = 0.0;
            }
        } else if !contact.on_ground
            && !contact.collision_y
            && prev_on_ground
            && !self.held_ground
            && self.velocity.y.abs() < self.cfg.hysteresis_max_vy
            && self.velocity.x.abs() < self.cfg.hysteresis_max_vx
        {
            // Float residue while standing still; hold the ground for this
            // tick only. Gravity is off while held, so a second hold would
            // never end.
            self.on_ground = true;
            self.held_ground = true;
        } else {
            self.held_ground = false;
            if prev_on_ground {
                debug!(x = self.position.x, y = self.position.y, jumping = self.jumping, "left ground");
            }
        }

        self.contact = contact;
        if contact.hazardous && !self.damaged {
            self.take_damage();
        }

        self.update_coyote(dt);
        self.was_on_ground = self.on_ground;
    }

    fn update_coyote(&mut self, dt: f32) {
        if self.was_on_ground && !self.on_ground && !self.jumping && self.coyote_timer <= 0.0 {
            self.coyote_timer = self.cfg.coyote_time;
            debug!(window = self.coyote_timer, "coyote armed");
        }
        if self.coyote_timer > 0.0 {
            self.coyote_timer = (self.coyote_timer - dt).max(0.0);
        }
        if self.on_ground && self.velocity.y >= 0.0 {
            self.coyote_timer = 0.0;
        }
    }

    pub fn move_left(&mut self) {
        if !self.damaged {
            self.velocity.x = -self.cfg.speed;
            self.facing_right = false;
        }
    }

    pub fn move_right(&mut self) {
        if !self.damaged {
            self.velocity.x = self.cfg.speed;
            self.facing_right = true;
        }
    }

    /// Jump if on the ground or within the coyote window. Returns whether
    /// the jump happened.
    pub fn jump(&mut self) -> bool {
        if self.damaged || !(self.on_ground || self.coyote_timer > 0.0) {
            return false;
        }
        if !self.on_ground {
            debug!(remaining = self.coyote_timer, "coyote jump");
        }
        self.velocity.y = -self.cfg.jump_speed;
        self.jumping = true;
        self.on_ground = false;
        self.coyote_timer = 0.0;
        true
    }

    pub fn start_climbing(&mut self) {
        if !self.damaged {
            self.climbing = true;
            self.velocity.y = 0.0;
            self.gravity = 0.0;
            debug!(x = self.position.x, y = self.position.y, "climb start");
        }
    }

    /// Leaving a climb is always allowed so a hit never pins the player to
    /// a wall without gravity.
    pub fn stop_climbing(&mut self) {
        if self.climbing {
            debug!(x = self.position.x, y = self.position.y, "climb stop");
        }
        self.climbing = false;
        self.gravity = self.cfg.gravity;
    }

    pub fn toggle_climbing(&mut self) {
        if self.climbing {
            self.stop_climbing();
        } else {
            self.start_climbing();
        }
    }

    pub fn climb_up(&mut self) {
        if self.climbing && !self.damaged {
            self.velocity.y = -self.cfg.climb_speed;
        }
    }

    pub fn climb_down(&mut self) {
        if self.climbing && !self.damaged {
            self.velocity.y = self.cfg.climb_speed;
        }
    }

    /// Start the immunity window and stop horizontal motion. No-op while
    /// already damaged.
    pub fn take_damage(&mut self) {
        if self.damaged {
            return;
        }
        self.damaged = true;
        self.damage_timer = self.cfg.damage_time;
        self.velocity.x = 0.0;
        debug!(x = self.position.x, y = self.position.y, "damaged");
    }

    pub fn phase(&self) -> MotionPhase {
        if self.damaged {
            MotionPhase::Damaged
        } else if self.climbing {
            MotionPhase::Climbing
        } else if !self.on_ground {
            if self.velocity.y < 0.0 {
                MotionPhase::Ascending
            } else {
                MotionPhase::Descending
            }
        } else if self.moving {
            MotionPhase::Moving
        } else {
            MotionPhase::Idle
        }
    }

    pub fn debug_info(&self) -> String {
        format!(
            "OnGround: {}, WasOnGround: {}, CoyoteTimer: {:.3}, VelocityY: {:.1}",
            self.on_ground, self.was_on_ground, self.coyote_timer, self.velocity.y
        )
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.position, self.cfg.size)
    }

    pub fn facing_right(&self) -> bool {
        self.facing_right
    }

    pub fn is_on_ground(&self) -> bool {
        self.on_ground
    }

    pub fn is_jumping(&self) -> bool {
        self.jumping
    }

    pub fn is_moving(&self) -> bool {
        self.moving
    }

    pub fn is_climbing(&self) -> bool {
        self.climbing
    }

    pub fn is_damaged(&self) -> bool {
        self.damaged
    }

    pub fn damage_timer(&self) -> f32 {
        self.damage_timer
    }

    pub fn coyote_timer(&self) -> f32 {
        self.coyote_timer
    }

    pub fn touching_wall(&self) -> bool {
        self.contact.touching_wall
    }

    pub fn touching_climbable(&self) -> bool {
        self.contact.climbable
    }

    /// Contact found at the end of the last tick.
    pub fn contact(&self) -> &ContactResult {
        &self.contact
    }

    pub fn last_step(&self) -> StepStats {
        self.last_step
    }
}
