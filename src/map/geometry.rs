use crate::braille::BrailleCanvas;
use std::f64::consts::TAU;

/// Draw a line using Bresenham's algorithm
pub fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        canvas.set_pixel_signed(x, y);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }

        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

/// Filled disc, used for event markers
pub fn draw_circle(canvas: &mut BrailleCanvas, cx: i32, cy: i32, radius: i32) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                canvas.set_pixel_signed(cx + dx, cy + dy);
            }
        }
    }
}

/// Filled pie wedge between two fractions of a full turn, clockwise from
/// twelve o'clock. `start` and `end` are in [0, 1].
pub fn fill_sector(canvas: &mut BrailleCanvas, cx: i32, cy: i32, radius: i32, start: f64, end: f64) {
    if end <= start {
        return;
    }
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy > radius * radius {
                continue;
            }
            // atan2(dx, -dy) measures clockwise from straight up
            let turn = (dx as f64).atan2(-dy as f64).rem_euclid(TAU) / TAU;
            if turn >= start && turn < end {
                canvas.set_pixel_signed(cx + dx, cy + dy);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_line() {
        let mut canvas = BrailleCanvas::new(5, 1);
        draw_line(&mut canvas, 0, 0, 9, 0);
        assert_eq!(canvas.to_string(), "⠉⠉⠉⠉⠉");
    }

    #[test]
    fn test_vertical_line() {
        let mut canvas = BrailleCanvas::new(1, 2);
        draw_line(&mut canvas, 0, 0, 0, 7);
        assert_eq!(canvas.to_string(), "⡇\n⡇");
    }

    #[test]
    fn test_sectors_tile_disc() {
        let mut whole = BrailleCanvas::new(10, 5);
        let mut left = BrailleCanvas::new(10, 5);
        let mut right = BrailleCanvas::new(10, 5);
        fill_sector(&mut whole, 10, 10, 8, 0.0, 1.0);
        fill_sector(&mut right, 10, 10, 8, 0.0, 0.5);
        fill_sector(&mut left, 10, 10, 8, 0.5, 1.0);

        assert!(left.glyphs().count() > 0);
        assert!(right.glyphs().count() > 0);
        // Right half never reaches the left edge columns
        assert!(right.glyphs().all(|(col, _, _)| col >= 4));
        assert!(whole.glyphs().count() >= right.glyphs().count());
    }

    #[test]
    fn test_empty_sector_draws_nothing() {
        let mut canvas = BrailleCanvas::new(4, 2);
        fill_sector(&mut canvas, 4, 4, 3, 0.3, 0.3);
        assert_eq!(canvas.glyphs().count(), 0);
    }
}
