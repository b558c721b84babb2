use crate::domain::entities::{ActorId, ActorSnapshot};
use crate::domain::geometry::{Vec3, actor_hitboxes, normalize};
use crate::domain::machines::ChargeKind;
use crate::domain::tuning::ProjectileTuning;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileKind {
    Normal,
    Speed,
    Kill,
    Dark,
    Teleport,
}

impl ProjectileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Speed => "speed",
            Self::Kill => "kill",
            Self::Dark => "dark",
            Self::Teleport => "teleport",
        }
    }
}

impl From<Option<ChargeKind>> for ProjectileKind {
    fn from(charge: Option<ChargeKind>) -> Self {
        match charge {
            None => Self::Normal,
            Some(ChargeKind::Speed) => Self::Speed,
            Some(ChargeKind::Kill) => Self::Kill,
            Some(ChargeKind::Dark) => Self::Dark,
            Some(ChargeKind::Teleport) => Self::Teleport,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ProjectileConfig {
    pub speed: f32,
    pub gravity: f32,
    pub hit_radius: f32,
    pub life_time_ms: u64,
}

impl From<&ProjectileTuning> for ProjectileConfig {
    fn from(t: &ProjectileTuning) -> Self {
        Self {
            speed: t.speed,
            gravity: t.gravity,
            hit_radius: t.hit_radius,
            life_time_ms: t.life_time_ms,
        }
    }
}

impl ProjectileConfig {
    /// Where a projectile launched from `start` along unit `direction` is after
    /// `t_secs`. Constant velocity plus gravity on the vertical axis only.
    pub fn position_at(&self, start: Vec3, direction: Vec3, t_secs: f32) -> Vec3 {
        let travelled = direction * (self.speed * t_secs);
        let drop = 0.5 * self.gravity * t_secs * t_secs;
        Vec3::new(
            start.x + travelled.x,
            start.y + travelled.y - drop,
            start.z + travelled.z,
        )
    }
}

// Launch record only; the current position is always re-derived from elapsed time.
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub id: u64,
    pub shooter: ActorId,
    pub start: Vec3,
    pub direction: Vec3,
    pub launched_at: u64,
    pub kind: ProjectileKind,
}

impl Projectile {
    pub fn flight_secs(&self, now: u64) -> f32 {
        now.saturating_sub(self.launched_at) as f32 / 1000.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProjectileEvent {
    Hit {
        projectile: Projectile,
        target: ActorId,
        distance: f32,
    },
    Expired {
        projectile: Projectile,
        // Nearest non-shooter approach seen on the final tick.
        closest: Option<(ActorId, f32)>,
    },
}

/// Owns every projectile in flight.
#[derive(Debug, Clone)]
pub struct ProjectileSimulator {
    cfg: ProjectileConfig,
    live: Vec<Projectile>,
    next_projectile_id: u64,
}

impl ProjectileSimulator {
    pub fn new(cfg: ProjectileConfig) -> Self {
        Self {
            cfg,
            live: Vec::new(),
            next_projectile_id: 1,
        }
    }

    pub fn config(&self) -> ProjectileConfig {
        self.cfg
    }

    /// Adds a projectile; a zero-length `forward` is silently ignored.
    pub fn launch(
        &mut self,
        shooter: ActorId,
        start: Vec3,
        forward: Vec3,
        kind: ProjectileKind,
        now: u64,
    ) -> Option<u64> {
        let direction = normalize(forward)?;
        let id = self.next_projectile_id;
        self.next_projectile_id = self.next_projectile_id.wrapping_add(1);

        self.live.push(Projectile {
            id,
            shooter,
            start,
            direction,
            launched_at: now,
            kind,
        });
        Some(id)
    }

    /// Advances every projectile to `now`, resolving hits against the snapshot and
    /// expiring stale ones. Each projectile produces at most one terminal event.
    ///
    /// The first actor in snapshot order within the hit radius is credited, not the
    /// globally closest one.
    pub fn tick(&mut self, now: u64, actors: &[ActorSnapshot]) -> Vec<ProjectileEvent> {
        if self.live.is_empty() {
            return Vec::new();
        }

        // Hit points depend only on the snapshot, so derive them once per tick
        // instead of once per projectile.
        let targets: Vec<(ActorId, Vec<Vec3>)> = actors
            .iter()
            .map(|a| {
                let points = actor_hitboxes(a).into_iter().map(|h| h.center).collect();
                (a.id, points)
            })
            .filter(|(_, points): &(ActorId, Vec<Vec3>)| !points.is_empty())
            .collect();

        let cfg = self.cfg;
        let mut events = Vec::new();
        let mut remaining = Vec::with_capacity(self.live.len());

        // Naive O(P*A); actor counts stay in the tens.
        for p in self.live.drain(..) {
            let pos = cfg.position_at(p.start, p.direction, p.flight_secs(now));
            let mut closest: Option<(ActorId, f32)> = None;
            let mut hit: Option<(ActorId, f32)> = None;

            for (actor, points) in &targets {
                if *actor == p.shooter {
                    continue;
                }

                let min_dist = points
                    .iter()
                    .map(|pt| pos.distance(*pt))
                    .fold(f32::INFINITY, f32::min);

                if closest.is_none_or(|(_, d)| min_dist < d) {
                    closest = Some((*actor, min_dist));
                }
                if min_dist < cfg.hit_radius {
                    hit = Some((*actor, min_dist));
                    break;
                }
            }

            if let Some((target, distance)) = hit {
                info!(
                    target_id = target.0,
                    shooter_id = p.shooter.0,
                    projectile_id = p.id,
                    kind = p.kind.as_str(),
                    distance,
                    "projectile hit"
                );
                events.push(ProjectileEvent::Hit {
                    projectile: p,
                    target,
                    distance,
                });
                continue;
            }

            if now.saturating_sub(p.launched_at) > cfg.life_time_ms {
                events.push(ProjectileEvent::Expired {
                    projectile: p,
                    closest,
                });
                continue;
            }

            remaining.push(p);
        }

        self.live = remaining;
        events
    }

    pub fn live(&self) -> &[Projectile] {
        &self.live
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHOOTER: ActorId = ActorId(1);

    fn simulator() -> ProjectileSimulator {
        ProjectileSimulator::new(ProjectileConfig::from(&ProjectileTuning::default()))
    }

    fn actor_at(id: u64, head: Vec3) -> ActorSnapshot {
        ActorSnapshot {
            head: Some(head),
            ..ActorSnapshot::new(ActorId(id), format!("actor-{id}"))
        }
    }

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-4,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn when_flight_time_is_a_tenth_of_a_second_then_position_matches_ballistics() {
        let cfg = simulator().config();

        let pos = cfg.position_at(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0), 0.1);

        assert_close(pos.x, 0.0);
        assert_close(pos.y, -0.049);
        assert_close(pos.z, 2.0);
    }

    #[test]
    fn when_position_is_sampled_twice_then_results_are_identical() {
        let cfg = simulator().config();
        let start = Vec3::new(3.0, 1.5, -2.0);
        let dir = Vec3::new(0.6, 0.0, 0.8);

        assert_eq!(cfg.position_at(start, dir, 0.0), start);
        assert_eq!(
            cfg.position_at(start, dir, 1.3),
            cfg.position_at(start, dir, 1.3)
        );
    }

    #[test]
    fn when_forward_vector_is_zero_then_launch_is_ignored() {
        let mut sim = simulator();

        let id = sim.launch(SHOOTER, Vec3::ZERO, Vec3::ZERO, ProjectileKind::Normal, 0);

        assert_eq!(id, None);
        assert!(sim.is_empty());
    }

    #[test]
    fn when_launched_then_direction_is_normalized() {
        let mut sim = simulator();

        sim.launch(SHOOTER, Vec3::ZERO, Vec3::new(0.0, 0.0, 5.0), ProjectileKind::Kill, 0);

        assert_eq!(sim.live()[0].direction, Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(sim.live()[0].kind, ProjectileKind::Kill);
    }

    #[test]
    fn when_only_the_shooter_is_near_then_no_hit_is_produced() {
        let mut sim = simulator();
        sim.launch(SHOOTER, Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0), ProjectileKind::Normal, 0);

        let events = sim.tick(100, &[actor_at(1, Vec3::new(0.0, 0.0, 2.0))]);

        assert!(events.is_empty());
        assert_eq!(sim.live_count(), 1);
    }

    #[test]
    fn when_target_is_within_hit_radius_then_single_hit_removes_projectile() {
        let mut sim = simulator();
        sim.launch(SHOOTER, Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0), ProjectileKind::Speed, 0);
        let actors = [
            actor_at(1, Vec3::ZERO),
            actor_at(2, Vec3::new(0.0, 0.0, 10.0)),
        ];

        let events = sim.tick(400, &actors);

        assert_eq!(events.len(), 1);
        match &events[0] {
            ProjectileEvent::Hit { target, projectile, .. } => {
                assert_eq!(*target, ActorId(2));
                assert_eq!(projectile.kind, ProjectileKind::Speed);
            }
            other => panic!("expected hit, got {other:?}"),
        }
        assert!(sim.is_empty());
        assert!(sim.tick(500, &actors).is_empty());
    }

    #[test]
    fn when_two_targets_are_in_range_then_first_in_snapshot_order_wins() {
        let mut sim = simulator();
        sim.launch(SHOOTER, Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0), ProjectileKind::Normal, 0);
        // At t=0.5s the projectile is near z=10; actor 3 is closer but listed later.
        let actors = [
            actor_at(2, Vec3::new(0.0, 0.0, 13.0)),
            actor_at(3, Vec3::new(0.0, 0.0, 10.0)),
        ];

        let events = sim.tick(500, &actors);

        assert!(matches!(
            events.as_slice(),
            [ProjectileEvent::Hit { target: ActorId(2), .. }]
        ));
    }

    #[test]
    fn when_lifetime_passes_without_hit_then_projectile_expires_once() {
        let mut sim = simulator();
        sim.launch(SHOOTER, Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0), ProjectileKind::Dark, 0);
        let far = [actor_at(2, Vec3::new(500.0, 0.0, 500.0))];

        assert!(sim.tick(20_000, &far).is_empty());
        let events = sim.tick(20_001, &far);

        assert!(matches!(
            events.as_slice(),
            [ProjectileEvent::Expired { closest: Some((ActorId(2), _)), .. }]
        ));
        assert!(sim.is_empty());
    }

    #[test]
    fn when_actor_has_no_pose_then_it_is_never_hit() {
        let mut sim = simulator();
        sim.launch(SHOOTER, Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0), ProjectileKind::Normal, 0);

        let events = sim.tick(100, &[ActorSnapshot::new(ActorId(2), "ghost")]);

        assert!(events.is_empty());
    }

    #[test]
    fn when_charge_is_consumed_then_projectile_kind_follows_it() {
        assert_eq!(ProjectileKind::from(None), ProjectileKind::Normal);
        assert_eq!(
            ProjectileKind::from(Some(ChargeKind::Teleport)),
            ProjectileKind::Teleport
        );
    }
}
