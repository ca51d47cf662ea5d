// src/contours.rs - Boundary curves of the segmented design

use image::{GrayImage, Luma};
use imageproc::contours::{find_contours, BorderType};
use serde::Serialize;

use crate::errors::{TattooQuoteError, Result};
use crate::image_utils::BACKGROUND;
use crate::segmentation::BinaryMask;

/// A closed boundary of a foreground region or of a hole inside one
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    /// Corner vertices in pixel coordinates; the curve closes back to the first point
    pub points: Vec<(i32, i32)>,
    /// Index of the enclosing contour in the extracted list
    pub parent: Option<usize>,
    pub is_hole: bool,
}

/// Axis-aligned bounding box with inclusive pixel extents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl Contour {
    /// Bounding box of the vertices; a single pixel is 1 x 1
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let first = self.points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.0, first.1, first.0, first.1);

        for &(x, y) in &self.points[1..] {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }

        Some(BoundingBox {
            x: min_x,
            y: min_y,
            width: (max_x - min_x + 1) as u32,
            height: (max_y - min_y + 1) as u32,
        })
    }

    /// Length of the closed polyline in pixels
    pub fn arc_length(&self) -> f64 {
        let n = self.points.len();
        if n < 2 {
            return 0.0;
        }

        (0..n)
            .map(|i| {
                let (x0, y0) = self.points[i];
                let (x1, y1) = self.points[(i + 1) % n];
                let (dx, dy) = ((x1 - x0) as f64, (y1 - y0) as f64);
                (dx * dx + dy * dy).sqrt()
            })
            .sum()
    }

    /// Nesting depth: 0 for a top-level outer border
    pub fn depth(&self, all: &[Contour]) -> usize {
        let mut depth = 0;
        let mut parent = self.parent;
        while let Some(index) = parent {
            depth += 1;
            parent = all.get(index).and_then(|c| c.parent);
            if depth > all.len() {
                break;
            }
        }
        depth
    }
}

/// Drop vertices that lie on a straight run between their neighbours
///
/// Border points are 8-connected, so a vertex is redundant exactly when the
/// step into it equals the step out of it.
pub fn simplify_chain(points: &[(i32, i32)]) -> Vec<(i32, i32)> {
    let mut points = points.to_vec();
    points.dedup();
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }

    let n = points.len();
    if n < 3 {
        return points;
    }

    let step = |a: (i32, i32), b: (i32, i32)| (b.0 - a.0, b.1 - a.1);

    let simplified: Vec<(i32, i32)> = (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let next = points[(i + 1) % n];
            step(prev, points[i]) != step(points[i], next)
        })
        .map(|i| points[i])
        .collect();

    if simplified.is_empty() {
        vec![points[0]]
    } else {
        simplified
    }
}

/// Copy of the mask inside a 1 px background frame
///
/// Border following only starts an outer border on a pixel with background
/// to its left, so foreground in column 0 needs the frame to be traced.
fn pad_with_background(mask: &BinaryMask) -> GrayImage {
    let (width, height) = mask.dimensions();
    let mut padded = GrayImage::from_pixel(width + 2, height + 2, Luma([BACKGROUND]));
    image::imageops::replace(&mut padded, mask.as_gray(), 1, 1);
    padded
}

/// Find every border of the mask, outer borders and holes, keeping the hierarchy
pub fn extract_contours(mask: &BinaryMask) -> Result<Vec<Contour>> {
    let raw = find_contours::<i32>(&pad_with_background(mask));

    let contours: Vec<Contour> = raw
        .into_iter()
        .map(|c| {
            // Back to mask coordinates
            let points: Vec<(i32, i32)> = c.points.iter().map(|p| (p.x - 1, p.y - 1)).collect();
            Contour {
                points: simplify_chain(&points),
                parent: c.parent,
                is_hole: c.border_type == BorderType::Hole,
            }
        })
        .filter(|c| !c.points.is_empty())
        .collect();

    if contours.is_empty() {
        return Err(TattooQuoteError::NoContoursFound);
    }

    log::debug!(
        "Extracted {} contours ({} holes, max depth {})",
        contours.len(),
        count_holes(&contours),
        contours.iter().map(|c| c.depth(&contours)).max().unwrap_or(0)
    );

    Ok(contours)
}

/// Number of hole borders in the hierarchy
pub fn count_holes(contours: &[Contour]) -> usize {
    contours.iter().filter(|c| c.is_hole).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn square_mask(size: u32, from: u32, to: u32) -> BinaryMask {
        BinaryMask::from_fn(size, size, |x, y| {
            (from..to).contains(&x) && (from..to).contains(&y)
        })
    }

    #[test]
    fn empty_mask_has_no_contours() {
        let mask = BinaryMask::from_fn(10, 10, |_, _| false);
        assert!(matches!(extract_contours(&mask), Err(TattooQuoteError::NoContoursFound)));
    }

    #[test]
    fn filled_square_simplifies_to_four_corners() {
        let contours = extract_contours(&square_mask(20, 5, 15)).unwrap();
        assert_eq!(contours.len(), 1);

        let square = &contours[0];
        assert_eq!(square.points.len(), 4);
        assert!(!square.is_hole);
        assert_eq!(square.parent, None);

        let bbox = square.bounding_box().unwrap();
        assert_eq!((bbox.x, bbox.y, bbox.width, bbox.height), (5, 5, 10, 10));
        assert_approx_eq!(square.arc_length(), 36.0);
    }

    #[test]
    fn ring_has_outer_border_and_hole() {
        let mask = BinaryMask::from_fn(20, 20, |x, y| {
            let outer = (4..16).contains(&x) && (4..16).contains(&y);
            let inner = (7..13).contains(&x) && (7..13).contains(&y);
            outer && !inner
        });
        let contours = extract_contours(&mask).unwrap();

        assert_eq!(contours.len(), 2);
        assert_eq!(count_holes(&contours), 1);
        let hole = contours.iter().find(|c| c.is_hole).unwrap();
        assert!(hole.parent.is_some());
        assert_eq!(hole.depth(&contours), 1);
    }

    #[test]
    fn single_pixel_is_a_degenerate_contour() {
        let mask = BinaryMask::from_fn(5, 5, |x, y| x == 2 && y == 2);
        let contours = extract_contours(&mask).unwrap();
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].bounding_box().unwrap().area(), 1);
        assert_approx_eq!(contours[0].arc_length(), 0.0);
    }

    #[test]
    fn collinear_points_are_removed() {
        let chain = vec![(0, 0), (1, 0), (2, 0), (2, 1), (2, 2), (1, 2), (0, 2), (0, 1)];
        assert_eq!(simplify_chain(&chain), vec![(0, 0), (2, 0), (2, 2), (0, 2)]);
    }

    #[test]
    fn bar_on_the_left_edge_is_an_outer_border() {
        let mask = BinaryMask::from_fn(10, 10, |x, _| x < 3);
        let contours = extract_contours(&mask).unwrap();

        assert_eq!(contours.len(), 1);
        assert_eq!(count_holes(&contours), 0);
        let bbox = contours[0].bounding_box().unwrap();
        assert_eq!((bbox.x, bbox.y, bbox.width, bbox.height), (0, 0, 3, 10));
        assert!(contours[0].points.iter().all(|&(x, y)| x >= 0 && y >= 0));
    }

    #[test]
    fn full_mask_is_one_contour() {
        let mask = BinaryMask::from_fn(30, 30, |_, _| true);
        let contours = extract_contours(&mask).unwrap();

        assert_eq!(contours.len(), 1);
        assert!(!contours[0].is_hole);
        assert_eq!(contours[0].bounding_box().unwrap().area(), 900);
        assert_approx_eq!(contours[0].arc_length(), 116.0);
    }

    #[test]
    fn frame_with_window_has_outer_border_and_hole() {
        let mask = BinaryMask::from_fn(30, 30, |x, y| {
            !((10..20).contains(&x) && (10..20).contains(&y))
        });
        let contours = extract_contours(&mask).unwrap();

        assert_eq!(contours.len(), 2);
        assert_eq!(count_holes(&contours), 1);
        let outer = contours.iter().find(|c| !c.is_hole).unwrap();
        let bbox = outer.bounding_box().unwrap();
        assert_eq!((bbox.x, bbox.y, bbox.width, bbox.height), (0, 0, 30, 30));
        let hole = contours.iter().find(|c| c.is_hole).unwrap();
        assert_eq!(hole.depth(&contours), 1);
    }

    #[test]
    fn touching_the_edge_does_not_change_the_hole_count() {
        let inside = square_mask(20, 5, 15);
        let at_edge = BinaryMask::from_fn(20, 20, |x, y| x < 10 && (5..15).contains(&y));

        let inside = extract_contours(&inside).unwrap();
        let at_edge = extract_contours(&at_edge).unwrap();
        assert_eq!(count_holes(&inside), 0);
        assert_eq!(count_holes(&at_edge), 0);
        assert_eq!(at_edge.len(), inside.len());
        assert_approx_eq!(at_edge[0].arc_length(), inside[0].arc_length());
    }
}
