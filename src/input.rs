use glam::{UVec2, Vec2};

/// Maps a cursor position in surface pixels to `[-1, 1]` on both axes, with
/// +y pointing up.
pub fn normalize_cursor(position: Vec2, surface_size: UVec2) -> Vec2 {
    if surface_size.x == 0 || surface_size.y == 0 {
        return Vec2::ZERO;
    }

    let size = surface_size.as_vec2();
    let x = (position.x / size.x) * 2.0 - 1.0;
    let y = -((position.y / size.y) * 2.0 - 1.0);
    Vec2::new(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corners() {
        let size = UVec2::new(800, 600);
        assert_eq!(normalize_cursor(Vec2::ZERO, size), Vec2::new(-1.0, 1.0));
        assert_eq!(
            normalize_cursor(Vec2::new(800.0, 600.0), size),
            Vec2::new(1.0, -1.0)
        );
        assert_eq!(
            normalize_cursor(Vec2::new(400.0, 300.0), size),
            Vec2::ZERO
        );
    }

    #[test]
    fn test_degenerate_surface() {
        assert_eq!(
            normalize_cursor(Vec2::new(10.0, 10.0), UVec2::new(0, 600)),
            Vec2::ZERO
        );
    }
}
