//! Decimation algorithms
//!
//! Reduce a sequence of (x, y) points to fewer points while keeping the
//! visually significant shape. LTTB, nth-point and Visvalingam are
//! count-driven; Douglas-Peucker is tolerance-driven.

use crate::kernels::{perpendicular_distance, triangle_area};
use crate::types::Point;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Decimation algorithm selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DecimationAlgorithm {
    Lttb,
    NthPoint,
    DouglasPeucker,
    Visvalingam,
}

impl std::fmt::Display for DecimationAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecimationAlgorithm::Lttb => write!(f, "lttb"),
            DecimationAlgorithm::NthPoint => write!(f, "nth-point"),
            DecimationAlgorithm::DouglasPeucker => write!(f, "douglas-peucker"),
            DecimationAlgorithm::Visvalingam => write!(f, "visvalingam"),
        }
    }
}

/// LTTB (Largest Triangle Three Buckets) downsampling
///
/// Reference: Sveinn Steinarsson's thesis
/// "Downsampling Time Series for Visual Representation"
pub fn lttb(points: &[Point], target_points: usize) -> Vec<Point> {
    lttb_indices(points, target_points)
        .into_iter()
        .map(|i| points[i])
        .collect()
}

/// LTTB returning the indices of the selected points, in ascending order
pub fn lttb_indices(points: &[Point], target_points: usize) -> Vec<usize> {
    let len = points.len();

    if target_points == 0 || target_points >= len || len <= 2 {
        return (0..len).collect();
    }

    // Too few buckets for a middle section: keep the endpoints
    if target_points < 3 {
        return vec![0, len - 1];
    }

    let mut selected = Vec::with_capacity(target_points);
    selected.push(0);

    // Bucket size (excluding first and last points)
    let bucket_size = (len - 2) as f64 / (target_points - 2) as f64;

    let mut a_index = 0usize;

    for i in 0..(target_points - 2) {
        let bucket_start = ((i as f64 * bucket_size) + 1.0).floor() as usize;
        let bucket_end = ((((i + 1) as f64 * bucket_size) + 1.0).floor() as usize).min(len - 1);

        // Average of the next bucket is the third vertex of the triangle
        let next_start = bucket_end;
        let next_end = ((((i + 2) as f64 * bucket_size) + 1.0).floor() as usize).min(len);

        let (avg_x, avg_y) = if next_start < next_end {
            let bucket = &points[next_start..next_end];
            let count = bucket.len() as f64;
            let sum_x: f64 = bucket.iter().map(|p| p.x).sum();
            let sum_y: f64 = bucket.iter().map(|p| p.y).sum();
            (sum_x / count, sum_y / count)
        } else {
            (points[len - 1].x, points[len - 1].y)
        };

        let a = points[a_index];
        let mut max_area = -1.0f64;
        let mut max_area_index = bucket_start;

        for (j, p) in points
            .iter()
            .enumerate()
            .take(bucket_end.max(bucket_start + 1))
            .skip(bucket_start)
        {
            let area = triangle_area(a.x, a.y, p.x, p.y, avg_x, avg_y);
            if area > max_area {
                max_area = area;
                max_area_index = j;
            }
        }

        selected.push(max_area_index);
        a_index = max_area_index;
    }

    selected.push(len - 1);
    selected
}

/// Keep every nth point; the last point is always included
pub fn nth_point(points: &[Point], target_points: usize) -> Vec<Point> {
    let len = points.len();
    if target_points == 0 || target_points >= len {
        return points.to_vec();
    }

    let step = (len / target_points).max(1);
    let mut result: Vec<Point> = points.iter().step_by(step).copied().collect();

    if (len - 1) % step != 0 {
        result.push(points[len - 1]);
    }

    result
}

/// Douglas-Peucker line simplification with tolerance `epsilon`
pub fn douglas_peucker(points: &[Point], epsilon: f64) -> Vec<Point> {
    let len = points.len();
    if len < 3 {
        return points.to_vec();
    }

    let mut keep = vec![false; len];
    keep[0] = true;
    keep[len - 1] = true;

    let mut segments = vec![(0usize, len - 1)];
    while let Some((start, end)) = segments.pop() {
        if end <= start + 1 {
            continue;
        }

        let chord_start = (points[start].x, points[start].y);
        let chord_end = (points[end].x, points[end].y);

        let mut max_distance = 0.0f64;
        let mut split = start;
        for (i, p) in points.iter().enumerate().take(end).skip(start + 1) {
            let d = perpendicular_distance((p.x, p.y), chord_start, chord_end);
            if d > max_distance {
                max_distance = d;
                split = i;
            }
        }

        if split != start && max_distance > epsilon {
            keep[split] = true;
            segments.push((start, split));
            segments.push((split, end));
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}

/// Heap entry ordered so that `BinaryHeap` pops the smallest area first,
/// breaking ties by the lowest index
#[derive(Debug, Clone, Copy)]
struct AreaEntry {
    area: f64,
    index: usize,
}

impl PartialEq for AreaEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for AreaEntry {}

impl PartialOrd for AreaEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AreaEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .area
            .total_cmp(&self.area)
            .then_with(|| other.index.cmp(&self.index))
    }
}

/// Visvalingam-Whyatt simplification down to exactly `target_points`
pub fn visvalingam(points: &[Point], target_points: usize) -> Vec<Point> {
    let len = points.len();
    if target_points == 0 || target_points >= len || len <= 2 {
        return points.to_vec();
    }
    let target = target_points.max(2);

    let area_of = |prev: usize, i: usize, next: usize| {
        triangle_area(
            points[prev].x,
            points[prev].y,
            points[i].x,
            points[i].y,
            points[next].x,
            points[next].y,
        )
    };

    let mut prev: Vec<usize> = (0..len).map(|i| i.saturating_sub(1)).collect();
    let mut next: Vec<usize> = (0..len).map(|i| (i + 1).min(len - 1)).collect();
    let mut removed = vec![false; len];
    let mut areas = vec![f64::INFINITY; len];

    let mut heap = BinaryHeap::with_capacity(len);
    for i in 1..len - 1 {
        areas[i] = area_of(i - 1, i, i + 1);
        heap.push(AreaEntry {
            area: areas[i],
            index: i,
        });
    }

    let mut remaining = len;
    while remaining > target {
        let Some(entry) = heap.pop() else {
            break;
        };
        // Stale entries are left in the heap and skipped here
        if removed[entry.index] || areas[entry.index].to_bits() != entry.area.to_bits() {
            continue;
        }

        let i = entry.index;
        let (p, n) = (prev[i], next[i]);
        removed[i] = true;
        remaining -= 1;
        next[p] = n;
        prev[n] = p;

        for neighbour in [p, n] {
            if neighbour != 0 && neighbour != len - 1 {
                areas[neighbour] = area_of(prev[neighbour], neighbour, next[neighbour]);
                heap.push(AreaEntry {
                    area: areas[neighbour],
                    index: neighbour,
                });
            }
        }
    }

    points
        .iter()
        .zip(removed)
        .filter_map(|(p, r)| (!r).then_some(*p))
        .collect()
}
