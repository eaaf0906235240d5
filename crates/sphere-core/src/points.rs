//! Project markers orbiting the sphere.
//!
//! Markers are laid out on a golden-angle spiral and built a few at a time,
//! one batch per animation frame. The hit-test list is published only once the
//! final batch lands, and every build carries a generation number so a batch
//! scheduled for an older project list can never touch the current one.

use crate::camera::{ray_sphere, Ray};
use crate::config::FieldConfig;
use crate::project::{combine, Category, ProjectDescriptor, ProjectEntry};
use fnv::FnvHashMap;
use glam::{Mat3, Vec3};
use rand::prelude::*;
use smallvec::SmallVec;
use std::collections::VecDeque;
use std::f32::consts::PI;

#[inline]
pub fn golden_angle() -> f32 {
    PI * (3.0 - 5.0_f32.sqrt())
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphericalCoord {
    pub phi: f32,
    pub theta: f32,
}

/// Spiral coordinate of marker `index` out of `count`.
pub fn spiral_coord(index: usize, count: usize) -> SphericalCoord {
    let t = if count > 1 {
        index as f32 / (count - 1) as f32
    } else {
        0.0
    };
    let y = (1.0 - 2.0 * t).clamp(-1.0, 1.0);
    SphericalCoord {
        phi: y.acos(),
        theta: index as f32 * golden_angle(),
    }
}

#[inline]
pub fn spherical_to_cartesian(coord: SphericalCoord, radius: f32) -> Vec3 {
    Vec3::new(
        radius * coord.phi.sin() * coord.theta.cos(),
        radius * coord.phi.sin() * coord.theta.sin(),
        radius * coord.phi.cos(),
    )
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub offset: Vec3,
    pub color: [f32; 3],
    pub size: f32,
}

fn particle_cloud(rng: &mut StdRng, count: usize) -> SmallVec<[Particle; 8]> {
    (0..count)
        .map(|_| {
            let phi = rng.gen::<f32>() * PI * 2.0;
            let theta = rng.gen::<f32>() * PI;
            let radius = 0.005 + rng.gen::<f32>() * 0.01;
            Particle {
                offset: Vec3::new(
                    radius * theta.sin() * phi.cos(),
                    radius * theta.sin() * phi.sin(),
                    radius * theta.cos(),
                ),
                color: [
                    1.0,
                    rng.gen::<f32>() * 0.2,
                    0.5 + rng.gen::<f32>() * 0.3,
                ],
                size: 1.0 + rng.gen::<f32>() * 1.2,
            }
        })
        .collect()
}

#[derive(Clone, Debug)]
pub struct Marker {
    pub id: String,
    pub category: Category,
    pub descriptor: ProjectDescriptor,
    pub original_position: Vec3,
    /// Position inside the field group after breathing is applied.
    pub position: Vec3,
    pub hover_factor: f32,
    pub destruction_factor: f32,
    pub is_hovered: bool,
    pub is_clicked: bool,
    pub phase: f32,
    pub particles: SmallVec<[Particle; 8]>,
}

impl Marker {
    /// Request a hover state. Clicked markers never become hovered again.
    /// Returns whether the flag changed.
    pub fn set_hovered(&mut self, hovered: bool) -> bool {
        let next = hovered && !self.is_clicked;
        let changed = next != self.is_hovered;
        self.is_hovered = next;
        changed
    }

    /// One-way transition into the broken state. Returns true the first time.
    pub fn mark_clicked(&mut self) -> bool {
        if self.is_clicked {
            return false;
        }
        self.is_clicked = true;
        self.is_hovered = false;
        true
    }

    fn animate(&mut self, now_ms: f64, cfg: &FieldConfig) {
        let breath = cfg.breathing_amplitude
            * ((now_ms * cfg.breathing_rate) as f32 + self.phase).sin();
        self.position = self.original_position * (1.0 + breath);

        if self.is_hovered {
            self.hover_factor = (self.hover_factor + cfg.hover_step).min(1.0);
        } else {
            self.hover_factor = (self.hover_factor - cfg.hover_step).max(0.0);
        }
        if self.is_clicked {
            self.destruction_factor =
                (self.destruction_factor + cfg.destruction_step).min(cfg.destruction_max);
        }
    }
}

/// Proof that a batch belongs to a particular build.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuildTicket {
    generation: u64,
}

impl BuildTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildStep {
    /// More batches remain; schedule another tick.
    Pending { built: usize, total: usize },
    /// Last batch placed and hit-test list published.
    Complete { total: usize },
    /// Ticket belongs to a superseded build; stop rescheduling.
    Stale,
}

pub struct PointField {
    cfg: FieldConfig,
    rng: StdRng,
    generation: u64,
    queue: VecDeque<ProjectEntry>,
    total: usize,
    markers: Vec<Marker>,
    by_id: FnvHashMap<String, usize>,
    hit_list: Vec<usize>,
    complete: bool,
}

impl PointField {
    pub fn new(cfg: FieldConfig, seed: u64) -> Self {
        Self {
            cfg,
            rng: StdRng::seed_from_u64(seed),
            generation: 0,
            queue: VecDeque::new(),
            total: 0,
            markers: Vec::new(),
            by_id: FnvHashMap::default(),
            hit_list: Vec::new(),
            complete: false,
        }
    }

    /// Drop every marker and start building a new field. Any ticket issued
    /// before this call becomes stale.
    pub fn rebuild(
        &mut self,
        music: Vec<ProjectDescriptor>,
        programming: Vec<ProjectDescriptor>,
    ) -> BuildTicket {
        self.generation = self.generation.wrapping_add(1);
        self.queue = combine(music, programming).into();
        self.total = self.queue.len();
        self.markers.clear();
        self.by_id.clear();
        self.hit_list.clear();
        self.complete = false;
        log::info!(
            "[field] rebuilding {} markers (generation {})",
            self.total,
            self.generation
        );
        BuildTicket {
            generation: self.generation,
        }
    }

    /// Place the next batch of markers.
    pub fn build_batch(&mut self, ticket: BuildTicket) -> BuildStep {
        if ticket.generation != self.generation {
            return BuildStep::Stale;
        }
        if self.complete {
            return BuildStep::Complete { total: self.total };
        }
        for _ in 0..self.cfg.batch_size {
            let Some(entry) = self.queue.pop_front() else {
                break;
            };
            let index = self.markers.len();
            let original = spherical_to_cartesian(spiral_coord(index, self.total), self.cfg.radius);
            let particles = particle_cloud(&mut self.rng, self.cfg.particles_per_marker);
            let phase = self.rng.gen::<f32>() * 2.0 * PI;
            self.by_id.insert(entry.id.clone(), index);
            self.markers.push(Marker {
                id: entry.id,
                category: entry.category,
                descriptor: entry.descriptor,
                original_position: original,
                position: original,
                hover_factor: 0.0,
                destruction_factor: 0.0,
                is_hovered: false,
                is_clicked: false,
                phase,
                particles,
            });
        }
        if self.queue.is_empty() {
            self.hit_list = (0..self.markers.len()).collect();
            self.complete = true;
            log::info!("[field] finished creating {} project points", self.total);
            BuildStep::Complete { total: self.total }
        } else {
            BuildStep::Pending {
                built: self.markers.len(),
                total: self.total,
            }
        }
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn markers_mut(&mut self) -> &mut [Marker] {
        &mut self.markers
    }

    pub fn hit_list_len(&self) -> usize {
        self.hit_list.len()
    }

    pub fn find(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    /// Nearest marker hit by `ray`, with the field group rotated by `rotation`.
    pub fn pick(&self, ray: &Ray, rotation: Mat3) -> Option<usize> {
        let mut best = None::<(usize, f32)>;
        for &i in &self.hit_list {
            let center = rotation * self.markers[i].position;
            if let Some(t) = ray_sphere(ray.origin, ray.dir, center, self.cfg.hit_radius) {
                match best {
                    Some((_, bt)) if t >= bt => {}
                    _ => best = Some((i, t)),
                }
            }
        }
        best.map(|(i, _)| i)
    }

    /// Breathing offsets and hover/destruction easing for one frame.
    pub fn animate(&mut self, now_ms: f64) {
        for marker in &mut self.markers {
            marker.animate(now_ms, &self.cfg);
        }
    }
}
