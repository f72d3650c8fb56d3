//! What a beam can hit
//!
//! Turns entities into the geodesic segments the raycaster tests against, and
//! turns a hit handle back into the behaviour of the surface that was hit.

use glam::Vec2;

use super::entities::{Entities, EntityId, MirrorWallType, Portal, PortalWallType, WallType};
use crate::geometry::Tolerances;

/// One blocking piece of an entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleSegment {
    pub endpoints: [Vec2; 2],
    pub id: EntityId,
    /// Which portal of a pair; 0 for everything else
    pub part: usize,
    /// Whether the piece may cross the boundary and has to be split first.
    /// Door pieces are used as they are.
    pub splittable: bool,
}

/// Call `f` for every segment that currently blocks beams, in a stable order
/// (walls, mirrors, portals, doors; slot order within each kind).
pub fn for_each_obstacle_segment(entities: &Entities, tol: &Tolerances, mut f: impl FnMut(ObstacleSegment)) {
    for (id, wall) in entities.walls.iter() {
        f(ObstacleSegment {
            endpoints: wall.endpoints,
            id: EntityId::Wall(id),
            part: 0,
            splittable: true,
        });
    }
    for (id, mirror) in entities.mirrors.iter() {
        f(ObstacleSegment {
            endpoints: mirror.calculate_endpoints(),
            id: EntityId::Mirror(id),
            part: 0,
            splittable: true,
        });
    }
    for (id, pair) in entities.portal_pairs.iter() {
        for (part, portal) in pair.portals.iter().enumerate() {
            f(ObstacleSegment {
                endpoints: portal.endpoints(),
                id: EntityId::PortalPair(id),
                part,
                splittable: true,
            });
        }
    }
    for (id, door) in entities.doors.iter() {
        for endpoints in door.segments(tol.min_segment_length) {
            f(ObstacleSegment {
                endpoints,
                id: EntityId::Door(id),
                part: 0,
                splittable: false,
            });
        }
    }
}

/// How a surface treats a beam
#[derive(Debug, Clone, PartialEq)]
pub enum Surface {
    Wall(WallType),
    /// Front faces `normal_angle` at `center`
    Mirror {
        center: Vec2,
        normal_angle: f32,
        back: MirrorWallType,
    },
    Portal {
        entry: Portal,
        exit: Portal,
        exit_part: usize,
    },
    Door,
}

impl Surface {
    /// Look up the surface behind a hit, `None` if the entity is gone
    pub fn resolve(entities: &Entities, id: EntityId, part: usize) -> Option<Surface> {
        match id {
            EntityId::Wall(id) => entities.walls.get(id).map(|wall| Surface::Wall(wall.wall_type)),
            EntityId::Mirror(id) => entities.mirrors.get(id).map(|mirror| Surface::Mirror {
                center: mirror.center,
                normal_angle: mirror.normal_angle,
                back: mirror.wall_type,
            }),
            EntityId::PortalPair(id) => {
                let pair = entities.portal_pairs.get(id)?;
                let exit_part = (part + 1) % 2;
                Some(Surface::Portal {
                    entry: pair.portals.get(part)?.clone(),
                    exit: pair.portals[exit_part].clone(),
                    exit_part,
                })
            }
            EntityId::Door(id) => entities.doors.get(id).map(|_| Surface::Door),
        }
    }
}

/// Back-side behaviour of a portal expressed as a plain wall, `None` when the
/// back teleports like the front.
pub fn portal_back_as_wall(wall_type: PortalWallType) -> Option<WallType> {
    match wall_type {
        PortalWallType::Portal => None,
        PortalWallType::Reflecting => Some(WallType::Reflecting),
        PortalWallType::Absorbing => Some(WallType::Absorbing),
    }
}
