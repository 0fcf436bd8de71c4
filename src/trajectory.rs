//! CPU mirror of the math in `particles.wgsl`.
//!
//! The GPU does this work every frame; these functions exist so the motion
//! and sprite shaping can be checked without a device. Keep them in step
//! with the shader.

use glam::{Mat4, Vec2, Vec3, Vec4};

/// Roughly 2π, matching the constant baked into the shader.
pub const PHASE_SCALE: f32 = 6.28;

/// Smallest sprite drawn, in pixels. Far particles shrink to this instead of
/// flipping through zero.
pub const MIN_POINT_SIZE: f32 = 1.0;

/// Fragments below this alpha are discarded rather than blended.
pub const ALPHA_CUTOFF: f32 = 0.01;

/// GLSL-style `mod`: the result takes the sign of `y`.
#[inline]
pub fn glsl_mod(x: f32, y: f32) -> f32 {
    x - y * (x / y).floor()
}

/// Scales elapsed time by the particle's own fall speed, between 0.5 and 1.
#[inline]
pub fn fall_time(time: f32, random: Vec4) -> f32 {
    let fall_speed = 0.5 + random.x * 0.5;
    time * fall_speed
}

/// Vertical position after falling for `fall_time`, wrapped into
/// `[-spread * 2, spread * 2)`.
#[inline]
pub fn wrap_y(base_y: f32, spread: f32, fall_time: f32) -> f32 {
    glsl_mod(base_y * spread - fall_time * 2.0, spread * 4.0) - spread * 2.0
}

/// Sideways wobble added to x and z.
#[inline]
pub fn drift(fall_time: f32, random: Vec4) -> Vec2 {
    Vec2::new(
        (fall_time * 0.5 + random.z * PHASE_SCALE).sin() * 0.3,
        (fall_time * 0.3 + random.w * PHASE_SCALE).cos() * 0.2,
    )
}

/// Object-space position of a particle at `time`.
pub fn particle_position(base: Vec3, random: Vec4, spread: f32, time: f32) -> Vec3 {
    let fall_time = fall_time(time, random);
    let drift = drift(fall_time, random);

    Vec3::new(
        base.x * spread * 2.0 + drift.x,
        wrap_y(base.y, spread, fall_time),
        base.z * spread * 2.0 + drift.y,
    )
}

/// Point size in pixels for a particle at view-space position `view_pos`.
pub fn point_size(base_size: f32, size_randomness: f32, random: Vec4, view_pos: Vec3) -> f32 {
    let depth_size = 1.0 + (view_pos.z + 10.0) * 0.1;
    let size = (base_size * depth_size * (0.5 + size_randomness * random.y)) / view_pos.length();
    size.max(MIN_POINT_SIZE)
}

/// View-space position after the model and view transforms.
#[inline]
pub fn view_position(model: Mat4, view: Mat4, position: Vec3) -> Vec3 {
    (view * model).transform_point3(position)
}

#[inline]
pub fn sparkle(time: f32, random: Vec4) -> f32 {
    0.8 + 0.2 * (time * 2.0 + random.x * PHASE_SCALE).sin()
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Alpha of a sprite texel at `uv` in `[0, 1]^2`, or `None` when the texel
/// is discarded.
pub fn sprite_alpha(uv: Vec2, time: f32, random: Vec4) -> Option<f32> {
    let d = (uv - Vec2::splat(0.5)).length();
    let circle = 1.0 - smoothstep(0.1, 0.5, d);
    let alpha = circle * sparkle(time, random) * (0.3 + 0.7 * random.y);

    (alpha >= ALPHA_CUTOFF).then_some(alpha)
}

/// Sprite color, brightened slightly with the sparkle.
pub fn sprite_color(color: Vec3, time: f32, random: Vec4) -> Vec3 {
    color * (0.9 + 0.1 * sparkle(time, random))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPREAD: f32 = 15.0;

    #[test]
    fn test_glsl_mod_sign() {
        assert_eq!(glsl_mod(5.0, 4.0), 1.0);
        assert_eq!(glsl_mod(-1.0, 4.0), 3.0);
        assert_eq!(glsl_mod(-4.0, 4.0), 0.0);
    }

    #[test]
    fn test_wrap_stays_in_field() {
        for step in 0..2000 {
            let fall_time = step as f32 * 0.37;
            for base_y in [-1.0, -0.4, 0.0, 0.3, 0.99] {
                let y = wrap_y(base_y, SPREAD, fall_time);
                assert!(
                    (-SPREAD * 2.0 - 1e-3..SPREAD * 2.0 + 1e-3).contains(&y),
                    "y = {y} escaped the field at fall_time {fall_time}"
                );
            }
        }
    }

    #[test]
    fn test_wrap_is_periodic_and_continuous() {
        let period = SPREAD * 2.0;
        let eps = 1e-2;
        let base_y = 0.3;

        let start = wrap_y(base_y, SPREAD, 0.0);
        for k in 1..8 {
            let at_boundary = wrap_y(base_y, SPREAD, k as f32 * period);
            let after = wrap_y(base_y, SPREAD, k as f32 * period + eps);

            assert!((at_boundary - start).abs() < 1e-3);
            // falls at twice the fall-time rate, nothing more
            let step = at_boundary - after;
            assert!((step - 2.0 * eps).abs() < 1e-3, "step {step} at k = {k}");
        }
    }

    #[test]
    fn test_wrap_point_has_no_pop() {
        // Across the bottom edge the position reappears at the top. Measured
        // around the field (height spread * 4) the movement is still just the
        // fall distance.
        let height = SPREAD * 4.0;
        let base_y = 0.0;
        // the wrapped argument crosses -spread * 4 at fall_time = spread * 2
        let wrap_at = SPREAD * 2.0;
        let eps = 1e-3;

        let before = wrap_y(base_y, SPREAD, wrap_at - eps);
        let after = wrap_y(base_y, SPREAD, wrap_at + eps);

        assert!(before < -SPREAD * 2.0 + 0.1);
        assert!(after > SPREAD * 2.0 - 0.1);

        let travelled = glsl_mod(before - after, height);
        assert!((travelled - 4.0 * eps).abs() < 1e-2);
    }

    #[test]
    fn test_fall_speed_range() {
        assert_eq!(fall_time(2.0, Vec4::ZERO), 1.0);
        assert_eq!(fall_time(2.0, Vec4::new(1.0, 0.0, 0.0, 0.0)), 2.0);
    }

    #[test]
    fn test_drift_is_small() {
        for i in 0..100 {
            let t = i as f32 * 0.5;
            let d = drift(t, Vec4::new(0.1, 0.2, 0.3, 0.4));
            assert!(d.x.abs() <= 0.3 + f32::EPSILON);
            assert!(d.y.abs() <= 0.2 + f32::EPSILON);
        }
    }

    #[test]
    fn test_particle_position_scales_horizontally() {
        let random = Vec4::new(0.0, 0.5, 0.25, 0.25);
        let pos = particle_position(Vec3::new(0.5, 0.0, -0.5), random, SPREAD, 0.0);
        let drift = drift(0.0, random);
        assert!((pos.x - (SPREAD + drift.x)).abs() < 1e-4);
        assert!((pos.z - (-SPREAD + drift.y)).abs() < 1e-4);
    }

    #[test]
    fn test_point_size_shrinks_with_distance() {
        let random = Vec4::new(0.0, 0.5, 0.0, 0.0);
        let near = point_size(80.0, 1.5, random, Vec3::new(0.0, 0.0, -5.0));
        let far = point_size(80.0, 1.5, random, Vec3::new(0.0, 0.0, -9.0));
        assert!(near > far, "near {near} should be larger than far {far}");
    }

    #[test]
    fn test_point_size_never_grows_with_distance() {
        let config = crate::config::ParticleConfig::background();
        let mut camera = crate::camera::PerspectiveCamera::new(config.camera_distance);
        camera.set_viewport(1600, 900);
        let view = camera.get_view_matrix();

        for random_y in [0.0, 0.5, 1.0] {
            let random = Vec4::new(0.0, random_y, 0.0, 0.0);
            let mut previous = f32::INFINITY;

            // near edge of the field to the far edge
            for step in 0..=200 {
                let base_z = 1.0 - step as f32 * 0.01;
                let position = Vec3::new(0.3, 0.0, base_z * config.particle_spread * 2.0);
                let view_pos = view_position(Mat4::IDENTITY, view, position);
                if view_pos.z > -camera.near {
                    continue;
                }

                let size = point_size(
                    config.particle_base_size,
                    config.size_randomness,
                    random,
                    view_pos,
                );
                assert!(size >= MIN_POINT_SIZE, "size {size} at z {}", view_pos.z);
                assert!(
                    size <= previous,
                    "size grew from {previous} to {size} at z {}",
                    view_pos.z
                );
                previous = size;
            }
        }
    }

    #[test]
    fn test_sprite_is_a_disc() {
        let random = Vec4::new(0.0, 1.0, 0.0, 0.0);
        let center = sprite_alpha(Vec2::splat(0.5), 0.0, random).unwrap();
        assert!(center > 0.7);

        // corners fall outside the disc and are thrown away
        assert_eq!(sprite_alpha(Vec2::ZERO, 0.0, random), None);
        assert_eq!(sprite_alpha(Vec2::ONE, 0.0, random), None);

        // alpha falls off towards the rim
        let inner = sprite_alpha(Vec2::new(0.7, 0.5), 0.0, random).unwrap();
        assert!(inner < center);
    }

    #[test]
    fn test_sparkle_bounds() {
        for i in 0..64 {
            let s = sparkle(i as f32 * 0.1, Vec4::new(0.3, 0.0, 0.0, 0.0));
            assert!((0.6 - 1e-5..=1.0 + 1e-5).contains(&s));
        }
        let c = sprite_color(Vec3::ONE, 0.0, Vec4::ZERO);
        assert!((c.x - 0.98).abs() < 1e-5);
    }
}
