//! Tiny 3x5 bitmap font for on-frame labels.
//!
//! Uppercase letters, digits and the punctuation the overlay actually
//! uses. Enough for banners and coordinate readouts without pulling a
//! rasterizer into the build.

pub fn draw_text_line(
    buffer: &mut [u8],
    width: usize,
    height: usize,
    x: usize,
    y: usize,
    text: &str,
    color: (u8, u8, u8),
    scale: usize,
) {
    let mut cx = x;
    for c in text.chars() {
        draw_char(buffer, width, height, cx, y, c, color, scale);
        cx += 4 * scale; // 3 columns + 1 spacing
    }
}

pub fn text_width(text: &str, scale: usize) -> usize {
    text.chars().count() * 4 * scale
}

pub fn text_height(scale: usize) -> usize {
    5 * scale
}

fn draw_char(
    buffer: &mut [u8],
    width: usize,
    height: usize,
    x: usize,
    y: usize,
    c: char,
    color: (u8, u8, u8),
    scale: usize,
) {
    // 5 rows, 3 bits per row, bit 2 is the left column.
    let map: [u8; 5] = match c.to_ascii_uppercase() {
        '0' => [0x7, 0x5, 0x5, 0x5, 0x7],
        '1' => [0x2, 0x6, 0x2, 0x2, 0x7],
        '2' => [0x7, 0x1, 0x7, 0x4, 0x7],
        '3' => [0x7, 0x1, 0x7, 0x1, 0x7],
        '4' => [0x5, 0x5, 0x7, 0x1, 0x1],
        '5' => [0x7, 0x4, 0x7, 0x1, 0x7],
        '6' => [0x7, 0x4, 0x7, 0x5, 0x7],
        '7' => [0x7, 0x1, 0x2, 0x4, 0x4],
        '8' => [0x7, 0x5, 0x7, 0x5, 0x7],
        '9' => [0x7, 0x5, 0x7, 0x1, 0x7],
        'A' => [0x2, 0x5, 0x7, 0x5, 0x5],
        'B' => [0x6, 0x5, 0x6, 0x5, 0x6],
        'C' => [0x3, 0x4, 0x4, 0x4, 0x3],
        'D' => [0x6, 0x5, 0x5, 0x5, 0x6],
        'E' => [0x7, 0x4, 0x6, 0x4, 0x7],
        'F' => [0x7, 0x4, 0x6, 0x4, 0x4],
        'G' => [0x3, 0x4, 0x5, 0x5, 0x3],
        'H' => [0x5, 0x5, 0x7, 0x5, 0x5],
        'I' => [0x7, 0x2, 0x2, 0x2, 0x7],
        'J' => [0x1, 0x1, 0x1, 0x5, 0x2],
        'K' => [0x5, 0x6, 0x4, 0x6, 0x5],
        'L' => [0x4, 0x4, 0x4, 0x4, 0x7],
        'M' => [0x5, 0x7, 0x7, 0x5, 0x5],
        'N' => [0x6, 0x5, 0x5, 0x5, 0x5],
        'O' => [0x2, 0x5, 0x5, 0x5, 0x2],
        'P' => [0x6, 0x5, 0x6, 0x4, 0x4],
        'Q' => [0x2, 0x5, 0x5, 0x2, 0x1],
        'R' => [0x6, 0x5, 0x6, 0x6, 0x5],
        'S' => [0x3, 0x4, 0x2, 0x1, 0x6],
        'T' => [0x7, 0x2, 0x2, 0x2, 0x2],
        'U' => [0x5, 0x5, 0x5, 0x5, 0x7],
        'V' => [0x5, 0x5, 0x5, 0x5, 0x2],
        'W' => [0x5, 0x5, 0x5, 0x7, 0x5],
        'X' => [0x5, 0x5, 0x2, 0x5, 0x5],
        'Y' => [0x5, 0x5, 0x2, 0x2, 0x2],
        'Z' => [0x7, 0x1, 0x2, 0x4, 0x7],
        ' ' => [0x0, 0x0, 0x0, 0x0, 0x0],
        ':' => [0x0, 0x2, 0x0, 0x2, 0x0],
        ',' => [0x0, 0x0, 0x0, 0x2, 0x4],
        '.' => [0x0, 0x0, 0x0, 0x0, 0x2],
        '-' => [0x0, 0x0, 0x7, 0x0, 0x0],
        '=' => [0x0, 0x7, 0x0, 0x7, 0x0],
        '(' => [0x2, 0x4, 0x4, 0x4, 0x2],
        ')' => [0x2, 0x1, 0x1, 0x1, 0x2],
        '+' => [0x0, 0x2, 0x7, 0x2, 0x0],
        _ => [0x7, 0x7, 0x7, 0x7, 0x7], // block for anything else
    };

    for (row, bits) in map.iter().enumerate() {
        for col in 0..3usize {
            if (bits >> (2 - col)) & 1 == 1 {
                for dy in 0..scale {
                    for dx in 0..scale {
                        let px = x + col * scale + dx;
                        let py = y + row * scale + dy;
                        if px < width && py < height {
                            let idx = (py * width + px) * 3;
                            if idx + 2 < buffer.len() {
                                buffer[idx] = color.0;
                                buffer[idx + 1] = color.1;
                                buffer[idx + 2] = color.2;
                            }
                        }
                    }
                }
            }
        }
    }
}
