//! Body-body contact: neighbor queries, overlap correction, and the elastic
//! impulse exchange.
//!
//! Everything works on the loop-owned `&mut [Body<V>]` by index, so a pair can
//! be mutated together without shared ownership.
//!
//! ## Model
//!
//! - Radius stands in for mass.
//! - Frictionless: only the velocity component along the line of centres is
//!   exchanged, tangential components are untouched.
//! - Overlap is removed by pushing both bodies apart by half the penetration
//!   each. One pass is a sequential approximation; the loop repeats passes to
//!   settle piles of bodies.
//! - Neighbor search is a brute-force scan over all bodies.

use crate::body::Body;
use crate::vector::SimVector;
use bevy::color::Srgba;

/// Normal used when two centres coincide exactly (atan2(0, 0) points along +x).
const FALLBACK_NORMAL_AXIS: usize = 0;

/// Per-variant collision side effects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactRules {
    /// Multiplier on the `|v1| - |v2|` speed difference.
    pub damage_scale: f32,
    pub damage_color: Srgba,
    /// Emit collision effects at all.
    pub effects: bool,
    /// Seconds a body waits between two emitted effects.
    pub effect_cooldown: f32,
}

impl Default for ImpactRules {
    fn default() -> Self {
        Self {
            damage_scale: 0.0,
            damage_color: Srgba::rgb(1.0, 0.0, 0.0),
            effects: false,
            effect_cooldown: 1.0,
        }
    }
}

/// One resolved contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Impact<V> {
    pub pair: (usize, usize),
    /// Midpoint of the two centres after separation.
    pub midpoint: V,
    /// Damage applied to both bodies (zero when neither has health).
    pub damage: f32,
    /// Whether the loop should spawn an effect at `midpoint`.
    pub emit_effect: bool,
}

/// Indices of all spawned bodies overlapping `bodies[index]`, excluding itself.
/// An unspawned subject has no neighbors.
pub fn find_neighbors<V: SimVector>(bodies: &[Body<V>], index: usize) -> Vec<usize> {
    let Some(subject) = bodies.get(index) else {
        return Vec::new();
    };
    if !subject.spawned {
        return Vec::new();
    }
    bodies
        .iter()
        .enumerate()
        .filter(|&(j, other)| j != index && other.spawned && subject.overlaps(other))
        .map(|(j, _)| j)
        .collect()
}

/// Mutable access to two distinct bodies.
fn pair_mut<V>(bodies: &mut [Body<V>], i: usize, j: usize) -> (&mut Body<V>, &mut Body<V>) {
    debug_assert_ne!(i, j);
    if i < j {
        let (head, tail) = bodies.split_at_mut(j);
        (&mut head[i], &mut tail[0])
    } else {
        let (head, tail) = bodies.split_at_mut(i);
        (&mut tail[0], &mut head[j])
    }
}

/// Push `a` and `b` apart along the line of centres by half the penetration each.
fn separate<V: SimVector>(a: &mut Body<V>, b: &mut Body<V>) {
    let delta = a.position - b.position;
    let distance = delta.length();
    let overlap = a.radius + b.radius - distance;
    if overlap <= 0.0 {
        return;
    }
    let normal = if distance > 0.0 {
        delta / distance
    } else {
        V::unit(FALLBACK_NORMAL_AXIS)
    };
    let shift = normal * (overlap * 0.5);
    a.position += shift;
    b.position -= shift;
}

/// Exchange the normal velocity components of a separated pair using the
/// unequal-mass elastic formula with radius as mass.
fn exchange_momentum<V: SimVector>(a: &mut Body<V>, b: &mut Body<V>) {
    let delta = b.position - a.position;
    let distance = delta.length();
    if distance == 0.0 {
        return;
    }
    let normal = delta / distance;

    let (r1, r2) = (a.radius, b.radius);
    let v1n = a.velocity.dot(normal);
    let v2n = b.velocity.dot(normal);
    let tangent1 = a.velocity - normal * v1n;
    let tangent2 = b.velocity - normal * v2n;

    let m1 = (v1n * (r1 - r2) + 2.0 * r2 * v2n) / (r1 + r2);
    let m2 = (v2n * (r2 - r1) + 2.0 * r1 * v1n) / (r1 + r2);

    a.velocity = tangent1 + normal * m1;
    b.velocity = tangent2 + normal * m2;
}

/// For every neighbor still overlapping `bodies[index]`, push the pair apart.
pub fn correct_overlap<V: SimVector>(bodies: &mut [Body<V>], index: usize, neighbors: &[usize]) {
    for &j in neighbors {
        if j == index || j >= bodies.len() {
            continue;
        }
        let (a, b) = pair_mut(bodies, index, j);
        if a.overlaps(b) {
            separate(a, b);
        }
    }
}

/// Resolve every neighbor still overlapping `bodies[index]`: apply impact
/// damage from pre-collision speeds, separate the pair, then exchange
/// momentum along the normal.
pub fn resolve_collision<V: SimVector>(
    bodies: &mut [Body<V>],
    index: usize,
    neighbors: &[usize],
    rules: &ImpactRules,
) -> Vec<Impact<V>> {
    let mut impacts = Vec::new();
    for &j in neighbors {
        if j == index || j >= bodies.len() {
            continue;
        }
        let (a, b) = pair_mut(bodies, index, j);
        if !a.overlaps(b) {
            continue;
        }

        // Same signed amount to both sides; a subject slower than its
        // neighbor heals the pair.
        let damage = if a.health.is_some() || b.health.is_some() {
            (a.speed() - b.speed()) * rules.damage_scale
        } else {
            0.0
        };
        if damage != 0.0 {
            a.apply_damage(damage, rules.damage_color);
            b.apply_damage(damage, rules.damage_color);
        }

        separate(a, b);
        exchange_momentum(a, b);

        let emit_effect = rules.effects && a.effect_cooldown <= 0.0;
        if emit_effect {
            a.effect_cooldown = rules.effect_cooldown;
        }

        impacts.push(Impact {
            pair: (index, j),
            midpoint: (a.position + b.position) * 0.5,
            damage,
            emit_effect,
        });
    }
    impacts
}
