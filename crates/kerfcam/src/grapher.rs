use log::debug;

use crate::chain::Chain;
use crate::error::{GeometryError, Result};
use crate::geometry::{points_coincide, Shape};

/// Partition an unordered shape soup into connected, oriented chains.
///
/// Two shapes are adjacent when any pairing of their endpoints lies within
/// `tolerance`. Each connected component becomes one chain, with shapes in
/// discovery order and then reoriented end-to-start. An isolated shape is
/// a valid one-element chain.
///
/// The adjacency scan is O(n²) over the layer's shapes, which is fine for
/// the few hundred shapes a drawing layer carries.
pub fn graph_shapes(shapes: Vec<Shape>, tolerance: f64) -> Vec<Chain> {
    let count = shapes.len();
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); count];
    for i in 0..count {
        for j in (i + 1)..count {
            if endpoints_adjacent(&shapes[i], &shapes[j], tolerance) {
                adjacency[i].push(j);
                adjacency[j].push(i);
            }
        }
    }

    let mut visited = vec![false; count];
    let mut slots: Vec<Option<Shape>> = shapes.into_iter().map(Some).collect();
    let mut chains = Vec::new();

    for start in 0..count {
        if visited[start] {
            continue;
        }
        // Depth-first walk with an explicit stack; components keep
        // discovery order, not geometric order.
        let mut component = Vec::new();
        let mut stack = vec![start];
        visited[start] = true;
        while let Some(index) = stack.pop() {
            if let Some(shape) = slots[index].take() {
                component.push(shape);
            }
            for &next in &adjacency[index] {
                if !visited[next] {
                    visited[next] = true;
                    stack.push(next);
                }
            }
        }
        reorient_shapes(&mut component, tolerance);
        chains.push(Chain::new(component, tolerance));
    }

    debug!(
        "graphed {} shapes into {} chains",
        count,
        chains.len()
    );
    chains
}

/// Orient a connected component so consecutive shapes run end-to-start.
///
/// Walks left to right and reverses whichever shape of each adjacent pair
/// does not already connect; a shape that is already oriented is preferred
/// over forcing a reversal, in list order. That makes the result
/// deterministic but order-dependent, not globally optimal. A component
/// with a three-way junction cannot be fully chained and keeps a
/// discontinuity after the greedy pass.
pub fn reorient_shapes(shapes: &mut [Shape], tolerance: f64) {
    for i in 1..shapes.len() {
        let prev_end = shapes[i - 1].end_point();
        if points_coincide(prev_end, shapes[i].start_point(), tolerance) {
            continue;
        }
        if points_coincide(prev_end, shapes[i].end_point(), tolerance) {
            shapes[i].reverse();
            continue;
        }
        if i == 1 {
            // The very first shape has no predecessor constraining it yet;
            // it may be the one that needs to turn around.
            let prev_start = shapes[0].start_point();
            if points_coincide(prev_start, shapes[i].start_point(), tolerance) {
                shapes[0].reverse();
                continue;
            }
            if points_coincide(prev_start, shapes[i].end_point(), tolerance) {
                shapes[0].reverse();
                shapes[i].reverse();
                continue;
            }
        }
        // No endpoint pairing within tolerance: junction or gap, leave the
        // discontinuity in place.
    }
}

/// Strictly order shapes into a single end-to-start chain.
///
/// Unlike [`graph_shapes`], which tolerates gaps, this fails with
/// [`GeometryError::DisconnectedSequence`] when no remaining shape reaches
/// the current chain tail: a broken sequence here means an unmachinable
/// contour, and silently dropping shapes would hide that from the operator.
pub fn sort_into_chain(shapes: Vec<Shape>, tolerance: f64) -> Result<Vec<Shape>> {
    let mut remaining = shapes;
    if remaining.is_empty() {
        return Ok(Vec::new());
    }
    let mut ordered = vec![remaining.remove(0)];
    while !remaining.is_empty() {
        let tail = ordered[ordered.len() - 1].end_point();
        let mut connected = None;
        for (index, shape) in remaining.iter().enumerate() {
            if points_coincide(tail, shape.start_point(), tolerance) {
                connected = Some((index, false));
                break;
            }
            if points_coincide(tail, shape.end_point(), tolerance) {
                connected = Some((index, true));
                break;
            }
        }
        match connected {
            Some((index, needs_reversal)) => {
                let mut shape = remaining.remove(index);
                if needs_reversal {
                    shape.reverse();
                }
                ordered.push(shape);
            }
            None => {
                return Err(GeometryError::DisconnectedSequence {
                    x: tail.x,
                    y: tail.y,
                    tolerance,
                    remaining: remaining.len(),
                });
            }
        }
    }
    Ok(ordered)
}

fn endpoints_adjacent(a: &Shape, b: &Shape, tolerance: f64) -> bool {
    let (a0, a1) = (a.start_point(), a.end_point());
    let (b0, b1) = (b.start_point(), b.end_point());
    points_coincide(a0, b0, tolerance)
        || points_coincide(a0, b1, tolerance)
        || points_coincide(a1, b0, tolerance)
        || points_coincide(a1, b1, tolerance)
}
