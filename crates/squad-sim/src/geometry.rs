//! Ray casting for shots: unit, weapon, and wall hitboxes, and the world bounds.

use glam::Vec3;

use crate::action::Struck;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length.
    pub dir: Vec3,
}

impl Ray {
    /// Ray from `from` toward `to`. `None` when the points coincide.
    pub fn between(from: Vec3, to: Vec3) -> Option<Self> {
        let dir = (to - from).try_normalize()?;
        Some(Self { origin: from, dir })
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }
}

/// Axis-aligned box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box of half extent `half` around `center`.
    pub fn around(center: Vec3, half: Vec3) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Entry distance and face normal of `ray`. Rays starting inside the box miss.
    pub fn intersect(&self, ray: &Ray) -> Option<(f32, Vec3)> {
        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;
        let mut normal = Vec3::ZERO;

        for axis in 0..3 {
            let o = ray.origin[axis];
            let d = ray.dir[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);
            if d.abs() < 1e-8 {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let (mut t0, mut t1) = ((lo - o) / d, (hi - o) / d);
            let mut n = Vec3::ZERO;
            n[axis] = -d.signum();
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            if t0 > t_enter {
                t_enter = t0;
                normal = n;
            }
            t_exit = t_exit.min(t1);
            if t_enter > t_exit {
                return None;
            }
        }
        (t_enter >= 0.0).then_some((t_enter, normal))
    }

    /// Where `ray`, starting inside, leaves the box, and the outward normal there.
    pub fn exit(&self, ray: &Ray) -> (Vec3, Vec3) {
        let mut t_exit = f32::INFINITY;
        let mut normal = Vec3::ZERO;
        for axis in 0..3 {
            let d = ray.dir[axis];
            if d.abs() < 1e-8 {
                continue;
            }
            let bound = if d > 0.0 { self.max[axis] } else { self.min[axis] };
            let t = ((bound - ray.origin[axis]) / d).max(0.0);
            if t < t_exit {
                t_exit = t;
                normal = Vec3::ZERO;
                normal[axis] = d.signum();
            }
        }
        if !t_exit.is_finite() {
            t_exit = 0.0;
        }
        (ray.at(t_exit), normal)
    }
}

/// The nearest hitbox along a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelHit {
    pub struck: Struck,
    pub point: Vec3,
    /// Surface normal at the hit, facing back toward the shooter.
    pub normal: Vec3,
    pub distance: f32,
}

/// Closest of `boxes` hit by `ray`.
pub fn intersect_model(ray: &Ray, boxes: impl IntoIterator<Item = (Struck, Aabb)>) -> Option<ModelHit> {
    boxes
        .into_iter()
        .filter_map(|(struck, aabb)| {
            aabb.intersect(ray).map(|(t, normal)| ModelHit {
                struck,
                point: ray.at(t),
                normal,
                distance: t,
            })
        })
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

/// Where a ray leaves the world box `[0, width] x [0, height] x [0, depth]`.
/// The returned normal points back into the world.
pub fn world_exit(ray: &Ray, width: f32, height: f32, depth: f32) -> (Vec3, Vec3) {
    let world = Aabb::new(Vec3::ZERO, Vec3::new(width, height, depth));
    let (point, outward) = world.exit(ray);
    (point, -outward)
}
