use std::collections::HashMap;

use glam::Vec3;

use super::camera::Ray;
use super::registry::NodeRegistry;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    /// Distance along `ray` to the first surface crossing in front of the
    /// origin. A ray starting inside the sphere reports the exit point.
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        let offset = ray.origin - self.center;
        let b = offset.dot(ray.direction);
        let c = offset.length_squared() - self.radius * self.radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }

        let root = discriminant.sqrt();
        let far = -b + root;
        if far < 0.0 {
            return None;
        }

        let near = -b - root;
        Some(if near >= 0.0 { near } else { far })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RayHit<'a> {
    pub id: &'a str,
    pub distance: f32,
}

#[derive(Clone, Debug)]
struct BoundsEntry {
    id: String,
    bounds: BoundingSphere,
}

/// Id-keyed arena of node bounding volumes used for picking.
#[derive(Clone, Debug, Default)]
pub struct BoundsTable {
    entries: Vec<BoundsEntry>,
    index_by_id: HashMap<String, usize>,
}

impl BoundsTable {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, id: &str) -> Option<BoundingSphere> {
        self.index_by_id
            .get(id)
            .and_then(|&index| self.entries.get(index))
            .map(|entry| entry.bounds)
    }

    pub fn upsert(&mut self, id: &str, bounds: BoundingSphere) {
        if let Some(&index) = self.index_by_id.get(id) {
            self.entries[index].bounds = bounds;
            return;
        }

        self.index_by_id.insert(id.to_owned(), self.entries.len());
        self.entries.push(BoundsEntry {
            id: id.to_owned(),
            bounds,
        });
    }

    /// Refreshes the table from the live transforms of `registry`.
    ///
    /// Unplaced nodes get no entry. Entries are reused while the node order
    /// is unchanged.
    pub fn rebuild(&mut self, registry: &NodeRegistry, node_radius: f32) {
        let placed = registry
            .iter()
            .filter_map(|node| node.live.map(|live| (node.id.as_str(), live)));

        let mut count = 0usize;
        let mut reusable = true;
        for (index, (id, live)) in placed.enumerate() {
            let bounds = BoundingSphere {
                center: live.position,
                radius: node_radius * live.scale,
            };

            if reusable && self.entries.get(index).is_some_and(|entry| entry.id == id) {
                self.entries[index].bounds = bounds;
            } else {
                if reusable {
                    self.truncate(index);
                    reusable = false;
                }
                self.upsert(id, bounds);
            }
            count = index + 1;
        }

        if reusable {
            self.truncate(count);
        }
    }

    fn truncate(&mut self, len: usize) {
        for entry in self.entries.drain(len.min(self.entries.len())..) {
            self.index_by_id.remove(&entry.id);
        }
    }

    /// Nearest volume hit by `ray`. Linear in the number of entries.
    pub fn raycast(&self, ray: &Ray) -> Option<RayHit<'_>> {
        self.entries
            .iter()
            .filter_map(|entry| {
                entry.bounds.intersect(ray).map(|distance| RayHit {
                    id: entry.id.as_str(),
                    distance,
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::{BoundingSphere, BoundsTable};
    use crate::engine::camera::Ray;
    use crate::engine::registry::{NodeRecord, NodeRegistry, Transform};

    fn ray_down_z() -> Ray {
        Ray {
            origin: Vec3::new(0.0, 0.0, 100.0),
            direction: Vec3::NEG_Z,
        }
    }

    fn placed(registry: &mut NodeRegistry, id: &str, position: Vec3) {
        registry.insert(NodeRecord::bare(id));
        registry.get_mut(id).unwrap().live = Some(Transform {
            position,
            ..Transform::default()
        });
    }

    #[test]
    fn sphere_intersection_distances() {
        let sphere = BoundingSphere {
            center: Vec3::ZERO,
            radius: 10.0,
        };
        assert_eq!(sphere.intersect(&ray_down_z()), Some(90.0));

        let inside = Ray {
            origin: Vec3::ZERO,
            direction: Vec3::X,
        };
        assert_eq!(sphere.intersect(&inside), Some(10.0));

        let away = Ray {
            origin: Vec3::new(0.0, 0.0, 100.0),
            direction: Vec3::Z,
        };
        assert_eq!(sphere.intersect(&away), None);

        let miss = Ray {
            origin: Vec3::new(50.0, 0.0, 100.0),
            direction: Vec3::NEG_Z,
        };
        assert_eq!(sphere.intersect(&miss), None);
    }

    #[test]
    fn empty_table_never_hits() {
        let table = BoundsTable::new();
        assert!(table.raycast(&ray_down_z()).is_none());
    }

    #[test]
    fn raycast_returns_nearest_node() {
        let mut registry = NodeRegistry::new();
        placed(&mut registry, "back", Vec3::new(0.0, 0.0, -50.0));
        placed(&mut registry, "front", Vec3::new(0.0, 0.0, 20.0));
        placed(&mut registry, "aside", Vec3::new(80.0, 0.0, 20.0));
        let mut table = BoundsTable::new();
        table.rebuild(&registry, 10.0);

        let hit = table.raycast(&ray_down_z()).unwrap();
        assert_eq!(hit.id, "front");
        assert_eq!(hit.distance, 70.0);
    }

    #[test]
    fn rebuild_tracks_live_scale_and_membership() {
        let mut registry = NodeRegistry::new();
        placed(&mut registry, "a", Vec3::ZERO);
        placed(&mut registry, "b", Vec3::X * 100.0);
        registry.insert(NodeRecord::bare("unplaced"));
        let mut table = BoundsTable::new();
        table.rebuild(&registry, 10.0);
        assert_eq!(table.len(), 2);
        assert!(table.get("unplaced").is_none());

        registry.get_mut("a").unwrap().live.as_mut().unwrap().scale = 3.0;
        registry.sync(vec![NodeRecord::bare("a"), NodeRecord::bare("c")]);
        table.rebuild(&registry, 10.0);

        assert_eq!(table.len(), 1);
        assert_eq!(table.get("a").unwrap().radius, 30.0);
        assert!(table.get("b").is_none());
    }
}
