//! Contour geometry of the traced spiral
//!
//! The outer border of the largest ink region stands in for the drawn
//! spiral. Perimeters are open polyline lengths; areas use the shoelace
//! formula.

use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use imageproc::geometry::{arc_length, convex_hull};
use imageproc::point::Point;

/// Denominator floor for the shape ratios
const EPSILON: f64 = 1e-6;

/// Absolute polygon area by the shoelace formula
pub fn polygon_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64)
        .sum();
    (twice as f64 / 2.0).abs()
}

/// Outer contour with the largest enclosed area
///
/// Only outer borders of top-level regions are considered. Returns `None`
/// when the mask has no ink.
pub fn largest_external_contour(mask: &GrayImage) -> Option<Vec<Point<i32>>> {
    let contours = find_contours::<i32>(mask);
    log::debug!("Found {} contours", contours.len());

    contours
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| {
            let area = polygon_area(&c.points);
            (area, c.points)
        })
        .fold(None, |best: Option<(f64, Vec<Point<i32>>)>, (area, points)| match best {
            Some((best_area, _)) if best_area >= area => best,
            _ => Some((area, points)),
        })
        .map(|(_, points)| points)
}

/// Shape measurements of one contour
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContourShape {
    /// Enclosed area in square pixels
    pub area: f64,
    /// Open arc length in pixels
    pub perimeter: f64,
    /// Convex hull area
    pub hull_area: f64,
    /// Convex hull open arc length
    pub hull_perimeter: f64,
    /// Std/mean of point distances to the centroid
    pub radial_deviation: f64,
}

impl ContourShape {
    /// Measure a contour
    pub fn measure(points: &[Point<i32>]) -> Self {
        let hull = convex_hull(points);
        Self {
            area: polygon_area(points),
            perimeter: arc_length(points, false),
            hull_area: polygon_area(&hull),
            hull_perimeter: arc_length(&hull, false),
            radial_deviation: radial_deviation(points),
        }
    }

    /// `4 pi area / perimeter^2`; 1.0 for a circle
    pub fn circularity(&self) -> f64 {
        4.0 * std::f64::consts::PI * self.area / (self.perimeter * self.perimeter + EPSILON)
    }

    /// Area over hull area
    pub fn solidity(&self) -> f64 {
        self.area / (self.hull_area + EPSILON)
    }

    /// Hull perimeter over perimeter
    pub fn convexity(&self) -> f64 {
        self.hull_perimeter / (self.perimeter + EPSILON)
    }
}

/// Coefficient of variation of point distances to their centroid
pub fn radial_deviation(points: &[Point<i32>]) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    let n = points.len() as f64;
    let cx = points.iter().map(|p| p.x as f64).sum::<f64>() / n;
    let cy = points.iter().map(|p| p.y as f64).sum::<f64>() / n;

    let radii: Vec<f64> = points
        .iter()
        .map(|p| ((p.x as f64 - cx).powi(2) + (p.y as f64 - cy).powi(2)).sqrt())
        .collect();
    let mean = radii.iter().sum::<f64>() / n;
    let var = radii.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    var.sqrt() / (mean + EPSILON)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn square(side: i32) -> Vec<Point<i32>> {
        vec![
            Point::new(0, 0),
            Point::new(side, 0),
            Point::new(side, side),
            Point::new(0, side),
        ]
    }

    #[test]
    fn test_shoelace_area() {
        assert_eq!(polygon_area(&square(4)), 16.0);
        let mut reversed = square(4);
        reversed.reverse();
        assert_eq!(polygon_area(&reversed), 16.0);
        assert_eq!(polygon_area(&square(4)[..2]), 0.0);
    }

    #[test]
    fn test_square_shape() {
        let shape = ContourShape::measure(&square(10));
        assert_eq!(shape.area, 100.0);
        // Open polyline: three sides
        assert!((shape.perimeter - 30.0).abs() < 1e-9);
        assert!((shape.solidity() - 1.0).abs() < 1e-6);
        assert!(shape.radial_deviation < 1e-9);
    }

    #[test]
    fn test_largest_contour_wins() {
        let mut mask = GrayImage::new(40, 40);
        for y in 2..6 {
            for x in 2..6 {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
        for y in 10..30 {
            for x in 10..30 {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
        let contour = largest_external_contour(&mask).unwrap();
        assert!(contour.iter().all(|p| p.x >= 10 && p.y >= 10));
        assert!(polygon_area(&contour) > 300.0);
    }

    #[test]
    fn test_empty_mask_has_no_contour() {
        assert!(largest_external_contour(&GrayImage::new(10, 10)).is_none());
    }
}
