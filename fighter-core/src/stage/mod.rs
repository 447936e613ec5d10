//! Stage Collision Geometry
//!
//! Immutable per-match geometry shared by every fighter:
//! - Axis-aligned solid blocks (floors, ceilings, walls)
//! - One-sided platforms, passable from below and droppable from above
//! - Ledges fighters can hang from
//! - Outer boundary ("blast zone") and spawn points
//!
//! Movement resolution takes a proposed displacement for a fighter's diamond
//! and returns the corrected one. Every surface the diamond crosses
//! contributes a limit; the most restrictive limit per side wins, so the
//! order blocks are listed in never matters.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{read_json, ConfigError};
use crate::physics::{Facing, LocalDiamond, PhysicsDiamond};

// ============================================================================
// Geometry
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignedBlock {
    pub min: Vec2,
    pub max: Vec2,
}

impl AlignedBlock {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }
}

/// Horizontal one-sided surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub origin_y: f32,
    pub min_x: f32,
    pub max_x: f32,
}

/// Grab point at the corner of a block. `direction` points away from the stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ledge {
    pub position: Vec2,
    pub direction: Facing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LedgeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }
}

/// Outcome of moving a diamond through the stage
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MoveAttempt {
    /// Resolved origin position
    pub result: Vec2,
    pub collide_floor: bool,
    pub collide_ceiling: bool,
    pub collide_wall: bool,
    /// A slanted side of the diamond was pushed off a block corner
    pub collide_corner: bool,
    /// The floor that stopped the fall was a platform
    pub on_platform: bool,
    /// Side of the surface edge the move was stopped at (-1 left, +1 right), else 0
    pub edge: i32,
}

// ============================================================================
// Stage
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub name: String,
    #[serde(default)]
    pub blocks: Vec<AlignedBlock>,
    #[serde(default)]
    pub platforms: Vec<Platform>,
    #[serde(default)]
    pub ledges: Vec<Ledge>,
    pub inner_boundary: Bounds,
    pub outer_boundary: Bounds,
    pub spawn_points: Vec<Vec2>,
}

/// Surface edge a grounded move was stopped at
#[derive(Clone, Copy)]
struct EdgeStop {
    x: f32,
    height: f32,
    platform: bool,
}

/// Running limits per side while scanning geometry
#[derive(Default)]
struct Limits {
    floor: Option<(f32, bool)>,
    ceiling: Option<f32>,
    wall_min: Option<f32>,
    wall_max: Option<f32>,
    /// Left edge of a surface (moving left), keeping the first one reached
    edge_min: Option<EdgeStop>,
    /// Right edge of a surface (moving right), keeping the first one reached
    edge_max: Option<EdgeStop>,
    /// Corner push-out, as magnitudes per direction
    push_left: f32,
    push_right: f32,
    push_up: f32,
    push_down: f32,
    corner: bool,
}

impl Limits {
    fn floor(&mut self, height: f32, platform: bool) {
        match self.floor {
            Some((best, _)) if best >= height => {}
            _ => self.floor = Some((height, platform)),
        }
    }

    fn ceiling(&mut self, height: f32) {
        self.ceiling = Some(self.ceiling.map_or(height, |c| c.min(height)));
    }

    /// Lowest allowed origin x (wall on the left)
    fn wall_min(&mut self, x: f32) {
        self.wall_min = Some(self.wall_min.map_or(x, |w| w.max(x)));
    }

    /// Highest allowed origin x (wall on the right)
    fn wall_max(&mut self, x: f32) {
        self.wall_max = Some(self.wall_max.map_or(x, |w| w.min(x)));
    }

    fn edge_min(&mut self, stop: EdgeStop) {
        match self.edge_min {
            Some(best) if best.x > stop.x || (best.x == stop.x && best.height >= stop.height) => {}
            _ => self.edge_min = Some(stop),
        }
    }

    fn edge_max(&mut self, stop: EdgeStop) {
        match self.edge_max {
            Some(best) if best.x < stop.x || (best.x == stop.x && best.height >= stop.height) => {}
            _ => self.edge_max = Some(stop),
        }
    }

    /// Push the origin by `push`; only the largest push per direction counts
    fn corner(&mut self, push: Vec2) {
        self.push_right = self.push_right.max(push.x);
        self.push_left = self.push_left.max(-push.x);
        self.push_up = self.push_up.max(push.y);
        self.push_down = self.push_down.max(-push.y);
        self.corner = true;
    }
}

impl Stage {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let stage: Stage = serde_json::from_str(json)?;
        stage.validate()?;
        Ok(stage)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let stage: Stage = read_json(path)?;
        stage.validate()?;
        Ok(stage)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.spawn_points.is_empty() {
            return Err(ConfigError::invalid(format!(
                "stage '{}' has no spawn points",
                self.name
            )));
        }
        for block in &self.blocks {
            if block.min.x >= block.max.x || block.min.y >= block.max.y {
                return Err(ConfigError::invalid(format!(
                    "stage '{}' has an inverted block {:?}",
                    self.name, block
                )));
            }
        }
        for platform in &self.platforms {
            if platform.min_x >= platform.max_x {
                return Err(ConfigError::invalid(format!(
                    "stage '{}' has an inverted platform {:?}",
                    self.name, platform
                )));
            }
        }
        for spawn in &self.spawn_points {
            if !self.outer_boundary.contains(*spawn) {
                return Err(ConfigError::invalid(format!(
                    "stage '{}' spawn point {} is outside the blast zone",
                    self.name, spawn
                )));
            }
        }
        Ok(())
    }

    /// Flat main stage with a step, a ceiling block and three platforms
    pub fn test_zone() -> Self {
        Self {
            name: "TestZone".to_string(),
            blocks: vec![
                AlignedBlock::new(Vec2::new(-8.0, -1.0), Vec2::new(8.0, 0.0)),
                AlignedBlock::new(Vec2::new(-0.5, 6.5), Vec2::new(0.5, 7.5)),
                AlignedBlock::new(Vec2::new(-5.0, 0.0), Vec2::new(-4.0, 1.0)),
            ],
            platforms: vec![
                Platform {
                    origin_y: 2.5,
                    min_x: -5.3,
                    max_x: -1.7,
                },
                Platform {
                    origin_y: 2.5,
                    min_x: 1.7,
                    max_x: 5.3,
                },
                Platform {
                    origin_y: 5.0,
                    min_x: -1.8,
                    max_x: 1.8,
                },
            ],
            ledges: vec![
                Ledge {
                    position: Vec2::new(-8.0, 0.0),
                    direction: Facing::Left,
                },
                Ledge {
                    position: Vec2::new(8.0, 0.0),
                    direction: Facing::Right,
                },
            ],
            inner_boundary: Bounds {
                min: Vec2::new(-14.0, -6.0),
                max: Vec2::new(14.0, 14.0),
            },
            outer_boundary: Bounds {
                min: Vec2::new(-18.0, -10.0),
                max: Vec2::new(18.0, 18.0),
            },
            spawn_points: vec![
                Vec2::new(-3.0, 0.0),
                Vec2::new(3.0, 0.0),
                Vec2::new(-6.5, 0.0),
                Vec2::new(6.5, 0.0),
            ],
        }
    }

    /// Spawn point for a fighter slot, cycling when there are more fighters than points
    pub fn spawn_point(&self, index: usize) -> Vec2 {
        match self.spawn_points.len() {
            0 => Vec2::ZERO,
            n => self.spawn_points[index % n],
        }
    }

    pub fn ledge(&self, id: LedgeId) -> Option<&Ledge> {
        self.ledges.get(id.0)
    }

    // ------------------------------------------------------------------------
    // Movement resolution
    // ------------------------------------------------------------------------

    /// Corrected displacement for moving `diamond` at `origin` by `displacement`
    pub fn transform_response(
        &self,
        origin: Vec2,
        diamond: &LocalDiamond,
        displacement: Vec2,
    ) -> Vec2 {
        self.attempt_move(diamond, origin, displacement, false, false).result - origin
    }

    /// Resolve a move, reporting the resolved origin and which sides were hit.
    ///
    /// With `edge_stop`, a move that would carry the origin off the edge of the
    /// surface it stands on stops at that edge instead, unless another surface
    /// catches it at the target.
    pub fn attempt_move(
        &self,
        diamond: &LocalDiamond,
        origin: Vec2,
        displacement: Vec2,
        edge_stop: bool,
        ignore_platforms: bool,
    ) -> MoveAttempt {
        let current = PhysicsDiamond::new(diamond, origin);
        let target_origin = origin + displacement;
        let target = PhysicsDiamond::new(diamond, target_origin);

        let mut limits = Limits::default();

        for block in &self.blocks {
            let above = current.y_neg.y >= block.max.y;
            let below = current.y_pos.y <= block.min.y;
            // sides go by the centre so a diamond sliding off a corner still meets the wall
            let left = current.centre().x <= block.min.x;
            let right = current.centre().x >= block.max.x;
            debug_assert!(!(above && below), "diamond past block on both vertical sides");
            debug_assert!(!(left && right), "diamond past block on both horizontal sides");

            let in_x = |x: f32| x >= block.min.x && x <= block.max.x;
            let in_y = |y: f32| y >= block.min.y && y <= block.max.y;

            if above && target.y_neg.y < block.max.y && in_x(target.y_neg.x) {
                limits.floor(block.max.y, false);
            }
            if below && target.y_pos.y > block.min.y && in_x(target.y_pos.x) {
                limits.ceiling(block.min.y - diamond.offset_top);
            }
            if left && target.x_pos.x > block.min.x && in_y(target.x_pos.y) {
                limits.wall_max(block.min.x - diamond.half_width);
            }
            if right && target.x_neg.x < block.max.x && in_y(target.x_neg.y) {
                limits.wall_min(block.max.x + diamond.half_width);
            }

            if edge_stop {
                if above && target.y_neg.y < block.max.y {
                    edge_limits(&mut limits, origin.x, target_origin.x, block.min.x, block.max.x, block.max.y, false);
                }
            } else {
                corner_limits(&mut limits, diamond, &target, block);
            }
        }

        if !ignore_platforms {
            for platform in &self.platforms {
                let crossing =
                    current.y_neg.y >= platform.origin_y && target.y_neg.y < platform.origin_y;
                if !crossing {
                    continue;
                }
                let in_x = target.y_neg.x >= platform.min_x && target.y_neg.x <= platform.max_x;
                if in_x {
                    limits.floor(platform.origin_y, true);
                }
                if edge_stop {
                    edge_limits(&mut limits, origin.x, target_origin.x, platform.min_x, platform.max_x, platform.origin_y, true);
                }
            }
        }

        let mut attempt = MoveAttempt {
            result: target_origin,
            ..Default::default()
        };

        if let Some(min_x) = limits.wall_min {
            attempt.result.x = attempt.result.x.max(min_x);
            attempt.collide_wall = true;
        }
        if let Some(max_x) = limits.wall_max {
            attempt.result.x = attempt.result.x.min(max_x);
            attempt.collide_wall = true;
        }
        if let Some(ceiling) = limits.ceiling {
            attempt.result.y = attempt.result.y.min(ceiling);
            attempt.collide_ceiling = true;
        }
        if let Some((floor, platform)) = limits.floor {
            attempt.result.y = attempt.result.y.max(floor);
            attempt.collide_floor = true;
            attempt.on_platform = platform;
        } else {
            // a surface under the target overrides stopping at an edge
            for (stop, side) in [(limits.edge_max, 1), (limits.edge_min, -1)] {
                if let Some(stop) = stop {
                    attempt.result = Vec2::new(stop.x, stop.height);
                    attempt.collide_floor = true;
                    attempt.on_platform = stop.platform;
                    attempt.edge = side;
                }
            }
        }
        if limits.corner {
            attempt.result.x += limits.push_right - limits.push_left;
            attempt.result.y += limits.push_up - limits.push_down;
            attempt.collide_corner = true;
        }

        attempt
    }

    // ------------------------------------------------------------------------
    // Ledges & boundaries
    // ------------------------------------------------------------------------

    /// Ledge catchable from `position` while holding toward `direction` (-1, 0, 1)
    pub fn find_ledge(&self, position: Vec2, direction: i32, grab_distance: f32) -> Option<LedgeId> {
        if direction == 0 {
            return None;
        }
        self.ledges
            .iter()
            .enumerate()
            .find(|(_, ledge)| {
                if ledge.direction.as_i32() == direction {
                    return false;
                }
                if position.y >= ledge.position.y {
                    return false;
                }
                if position.distance(ledge.position) > grab_distance {
                    return false;
                }
                if direction > 0 {
                    position.x < ledge.position.x
                } else {
                    position.x > ledge.position.x
                }
            })
            .map(|(index, _)| LedgeId(index))
    }

    pub fn is_out_of_bounds(&self, point: Vec2) -> bool {
        !self.outer_boundary.contains(point)
    }

    /// Send a fighter whose diamond centre left the blast zone back to spawn.
    ///
    /// Returns true when the fighter was reset.
    pub fn check_boundary(&self, fighter: &mut crate::fighter::Fighter) -> bool {
        let centre = fighter.diamond().centre();
        if !self.is_out_of_bounds(centre) {
            return false;
        }
        tracing::info!(
            fighter = fighter.index(),
            x = centre.x,
            y = centre.y,
            "fighter passed stage boundary"
        );
        fighter.pass_boundary();
        true
    }
}

/// Stop a grounded origin crossing either end of a surface spanning `min_x..max_x`
fn edge_limits(
    limits: &mut Limits,
    from_x: f32,
    to_x: f32,
    min_x: f32,
    max_x: f32,
    height: f32,
    platform: bool,
) {
    if from_x >= min_x && to_x <= min_x {
        limits.edge_min(EdgeStop {
            x: min_x,
            height,
            platform,
        });
    }
    if from_x <= max_x && to_x >= max_x {
        limits.edge_max(EdgeStop {
            x: max_x,
            height,
            platform,
        });
    }
}

/// Push the slanted sides of `target` back off any block corner they overlap.
///
/// Each corner is only tested against the side facing it: the diamond centre
/// must be diagonally past the corner while its extent still overlaps the
/// block on both axes.
fn corner_limits(limits: &mut Limits, diamond: &LocalDiamond, target: &PhysicsDiamond, block: &AlignedBlock) {
    let centre = target.centre();
    let lower = diamond.normal_lower_left();
    let upper = diamond.normal_upper_left();
    let bottom = target.y_neg;
    let top = target.y_pos;

    let mut push_out = |normal: Vec2, corner: Vec2, edge_point: Vec2| {
        let depth = normal.dot(corner - edge_point);
        if depth < 0.0 {
            limits.corner(normal * depth);
        }
    };

    let past_right = centre.x > block.max.x && target.x_neg.x <= block.max.x;
    let past_left = centre.x < block.min.x && target.x_pos.x >= block.min.x;
    let past_top = centre.y > block.max.y && bottom.y <= block.max.y;
    let past_bottom = centre.y < block.min.y && top.y >= block.min.y;

    if past_right && past_top {
        push_out(lower, Vec2::new(block.max.x, block.max.y), bottom);
    }
    if past_left && past_top {
        push_out(Vec2::new(-lower.x, lower.y), Vec2::new(block.min.x, block.max.y), bottom);
    }
    if past_right && past_bottom {
        push_out(upper, Vec2::new(block.max.x, block.min.y), top);
    }
    if past_left && past_bottom {
        push_out(Vec2::new(-upper.x, upper.y), Vec2::new(block.min.x, block.min.y), top);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> LocalDiamond {
        LocalDiamond::default()
    }

    #[test]
    fn test_test_zone_is_valid() {
        assert!(Stage::test_zone().validate().is_ok());
    }

    #[test]
    fn test_json_roundtrip() {
        let stage = Stage::test_zone();
        let json = serde_json::to_string(&stage).unwrap();
        let restored = Stage::from_json(&json).unwrap();
        assert_eq!(restored, stage);
    }

    #[test]
    fn test_validate_rejects_inverted_block() {
        let mut stage = Stage::test_zone();
        stage.blocks.push(AlignedBlock::new(Vec2::ONE, Vec2::ZERO));
        assert!(stage.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_missing_spawns() {
        let mut stage = Stage::test_zone();
        stage.spawn_points.clear();
        assert!(stage.validate().is_err());
    }

    #[test]
    fn test_free_move_unchanged() {
        let stage = Stage::test_zone();
        let origin = Vec2::new(0.0, 3.0);
        let attempt = stage.attempt_move(&diamond(), origin, Vec2::new(0.1, 0.2), false, false);
        assert_eq!(attempt.result, origin + Vec2::new(0.1, 0.2));
        assert!(!attempt.collide_floor && !attempt.collide_wall && !attempt.collide_ceiling);
    }

    #[test]
    fn test_lands_on_block_top() {
        let stage = Stage::test_zone();
        let attempt = stage.attempt_move(&diamond(), Vec2::new(0.0, 0.1), Vec2::new(0.0, -0.5), false, false);
        assert_eq!(attempt.result.y, 0.0);
        assert!(attempt.collide_floor);
        assert!(!attempt.on_platform);
    }

    #[test]
    fn test_resting_on_floor_stays() {
        let stage = Stage::test_zone();
        let attempt = stage.attempt_move(&diamond(), Vec2::new(1.0, 0.0), Vec2::new(0.0, -0.01), false, false);
        assert_eq!(attempt.result, Vec2::new(1.0, 0.0));
        assert!(attempt.collide_floor);
    }

    #[test]
    fn test_lands_on_platform() {
        let stage = Stage::test_zone();
        let attempt = stage.attempt_move(&diamond(), Vec2::new(3.0, 2.6), Vec2::new(0.0, -0.3), false, false);
        assert_eq!(attempt.result.y, 2.5);
        assert!(attempt.on_platform);
    }

    #[test]
    fn test_platform_passable_from_below() {
        let stage = Stage::test_zone();
        let attempt = stage.attempt_move(&diamond(), Vec2::new(3.0, 2.0), Vec2::new(0.0, 1.0), false, false);
        assert_eq!(attempt.result.y, 3.0);
        assert!(!attempt.collide_ceiling);
    }

    #[test]
    fn test_ignore_platforms_drops_through() {
        let stage = Stage::test_zone();
        let attempt = stage.attempt_move(&diamond(), Vec2::new(3.0, 2.5), Vec2::new(0.0, -0.2), false, true);
        assert!((attempt.result.y - 2.3).abs() < 1e-6);
        assert!(!attempt.collide_floor);
    }

    #[test]
    fn test_ceiling_stops_head() {
        let stage = Stage::test_zone();
        // head at 5.0 + 1.4 = 6.4, ceiling block bottom at 6.5
        let attempt = stage.attempt_move(&diamond(), Vec2::new(0.0, 5.0), Vec2::new(0.0, 0.5), false, false);
        assert!(attempt.collide_ceiling);
        assert!((attempt.result.y - (6.5 - 1.4)).abs() < 1e-6);
    }

    #[test]
    fn test_wall_stops_side() {
        let stage = Stage::test_zone();
        // step block spans x -5..-4, y 0..1; walking left into its right face
        let origin = Vec2::new(-3.5, 0.0);
        let attempt = stage.attempt_move(&diamond(), origin, Vec2::new(-0.3, 0.0), false, false);
        assert!(attempt.collide_wall);
        assert!((attempt.result.x - (-4.0 + 0.4)).abs() < 1e-6);
    }

    #[test]
    fn test_corner_pushes_lower_side_out() {
        let stage = Stage::test_zone();
        // centre left of the main block, lower-right side dipping over its top-left corner
        let attempt = stage.attempt_move(&diamond(), Vec2::new(-8.2, 0.1), Vec2::new(0.0, -0.5), false, false);
        assert!(attempt.collide_corner);
        assert!(!attempt.collide_floor && !attempt.collide_wall);
        assert!(attempt.result.x < -8.2 && attempt.result.y > -0.4);

        let normal = diamond().normal_lower_left();
        let lower_right = Vec2::new(-normal.x, normal.y);
        let corner = Vec2::new(-8.0, 0.0);
        assert!(lower_right.dot(corner - attempt.result).abs() < 1e-5);
    }

    #[test]
    fn test_corner_pushes_upper_side_out() {
        let stage = Stage::test_zone();
        // ceiling block spans x -0.5..0.5, y 6.5..7.5; rising just right of it
        let attempt = stage.attempt_move(&diamond(), Vec2::new(0.7, 5.2), Vec2::new(0.0, 0.5), false, false);
        assert!(attempt.collide_corner);
        assert!(attempt.result.x > 0.7 && attempt.result.y < 5.7);
        let corner = Vec2::new(0.5, 6.5);
        let top = attempt.result + Vec2::new(0.0, diamond().offset_top);
        assert!(diamond().normal_upper_left().dot(corner - top).abs() < 1e-5);
    }

    #[test]
    fn test_side_wall_catches_diamond_below_corner() {
        let stage = Stage::test_zone();
        // right point still over the block while the centre drops below its top
        let attempt = stage.attempt_move(&diamond(), Vec2::new(-8.35, -0.65), Vec2::new(0.0, -0.2), false, false);
        assert!(attempt.collide_wall);
        assert!((attempt.result.x - (-8.4)).abs() < 1e-6);
    }

    #[test]
    fn test_edge_stop_holds_block_edges() {
        let stage = Stage::test_zone();
        let right = stage.attempt_move(&diamond(), Vec2::new(7.9, 0.0), Vec2::new(0.2, -0.01), true, false);
        assert_eq!(right.result, Vec2::new(8.0, 0.0));
        assert_eq!(right.edge, 1);
        assert!(right.collide_floor && !right.on_platform);

        let left = stage.attempt_move(&diamond(), Vec2::new(-7.9, 0.0), Vec2::new(-0.2, -0.01), true, false);
        assert_eq!(left.result, Vec2::new(-8.0, 0.0));
        assert_eq!(left.edge, -1);

        let free = stage.attempt_move(&diamond(), Vec2::new(7.9, 0.0), Vec2::new(0.2, -0.01), false, false);
        assert_eq!(free.edge, 0);
        assert!(!free.collide_floor);
        assert!(free.result.x > 8.0);
    }

    #[test]
    fn test_edge_stop_on_platform() {
        let stage = Stage::test_zone();
        let attempt = stage.attempt_move(&diamond(), Vec2::new(5.2, 2.5), Vec2::new(0.2, -0.01), true, false);
        assert_eq!(attempt.result, Vec2::new(5.3, 2.5));
        assert_eq!(attempt.edge, 1);
        assert!(attempt.on_platform);

        let dropping = stage.attempt_move(&diamond(), Vec2::new(5.2, 2.5), Vec2::new(0.2, -0.01), true, true);
        assert_eq!(dropping.edge, 0);
        assert!(!dropping.collide_floor);
    }

    #[test]
    fn test_edge_stop_yields_to_supported_target() {
        let mut stage = Stage::test_zone();
        stage.blocks.push(AlignedBlock::new(Vec2::new(8.0, -1.0), Vec2::new(10.0, 0.0)));
        let attempt = stage.attempt_move(&diamond(), Vec2::new(7.9, 0.0), Vec2::new(0.2, -0.01), true, false);
        assert_eq!(attempt.edge, 0);
        assert!(attempt.collide_floor);
        assert!((attempt.result.x - 8.1).abs() < 1e-6);
        assert_eq!(attempt.result.y, 0.0);
    }

    #[test]
    fn test_transform_response_is_displacement() {
        let stage = Stage::test_zone();
        let origin = Vec2::new(0.0, 0.25);
        let corrected = stage.transform_response(origin, &diamond(), Vec2::new(0.0, -1.0));
        assert!((corrected.y + 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_find_ledge() {
        let stage = Stage::test_zone();
        let below_left = Vec2::new(-8.5, -0.8);
        assert_eq!(stage.find_ledge(below_left, 1, 1.2), Some(LedgeId(0)));
        assert_eq!(stage.find_ledge(below_left, -1, 1.2), None);
        assert_eq!(stage.find_ledge(below_left, 0, 1.2), None);
        // above the ledge: no catch
        assert_eq!(stage.find_ledge(Vec2::new(-8.5, 0.5), 1, 1.2), None);
        // too far
        assert_eq!(stage.find_ledge(Vec2::new(-10.0, -0.8), 1, 1.2), None);
        let below_right = Vec2::new(8.5, -0.8);
        assert_eq!(stage.find_ledge(below_right, -1, 1.2), Some(LedgeId(1)));
    }

    #[test]
    fn test_out_of_bounds() {
        let stage = Stage::test_zone();
        assert!(!stage.is_out_of_bounds(Vec2::ZERO));
        assert!(stage.is_out_of_bounds(Vec2::new(0.0, -11.0)));
        assert!(stage.is_out_of_bounds(Vec2::new(19.0, 0.0)));
    }

    #[test]
    fn test_spawn_point_cycles() {
        let stage = Stage::test_zone();
        assert_eq!(stage.spawn_point(0), stage.spawn_point(4));
    }
}
