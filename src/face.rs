use itertools::Itertools;
use ratatui::prelude::*;

/// Pips live on a 3x3 grid, indexed row-major 0..9.
const GRID: usize = 3;
const PIP: &str = "●";
const BLANK: &str = " ";

/// Standard pip layout per face value. Anything outside [1,6] renders as a
/// blank face rather than failing.
pub fn pip_indices(value: u8) -> &'static [usize] {
    match value {
        1 => &[4],
        2 => &[0, 8],
        3 => &[0, 4, 8],
        4 => &[0, 2, 6, 8],
        5 => &[0, 2, 4, 6, 8],
        6 => &[0, 2, 3, 5, 6, 8],
        _ => &[],
    }
}

/// Renders a face as three centered text rows; `None` is the blank face
/// shown before the first roll.
pub fn face_lines(value: Option<u8>) -> Vec<Line<'static>> {
    let pips = value.map(pip_indices).unwrap_or(&[]);
    (0..GRID)
        .map(|row| {
            let cells = (0..GRID)
                .map(|col| {
                    if pips.contains(&(row * GRID + col)) {
                        PIP
                    } else {
                        BLANK
                    }
                })
                .join(" ");
            Line::from(cells).centered()
        })
        .collect()
}
