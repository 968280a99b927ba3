use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::chain::Chain;
use crate::containment::chain_contains;
use crate::error::Result;

/// One machinable part: an outermost contour plus the contours cut out
/// of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    /// The outermost contour.
    pub shell: Chain,
    /// Contours directly enclosed by the shell.
    pub holes: Vec<Chain>,
}

/// Arena node; parent/children are indices into the node vector.
struct Node {
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Build the shell/holes forest for a flat list of closed cuts.
///
/// Every ordered pair of cuts runs through [`chain_contains`]; a cut's
/// parent is greedily tightened to the innermost enclosing cut. Each
/// parentless node becomes one part with its direct children as holes.
///
/// Islands nested inside a hole (shell → hole → island) are visited by the
/// traversal but not emitted as their own parts: only the shell and its
/// direct holes are captured. That matches the established output of this
/// pipeline and is pinned by tests; deeper nesting support would be a
/// behavior change for every consumer.
pub fn build_parts(cuts: Vec<Chain>) -> Result<Vec<Part>> {
    let count = cuts.len();

    // Pairwise containment, computed once. contained_in[q][p] answers
    // "does cut q enclose cut p".
    let mut contained_in = vec![vec![false; count]; count];
    for q in 0..count {
        for p in 0..count {
            if p != q {
                contained_in[q][p] = chain_contains(&cuts[q], &cuts[p])?;
            }
        }
    }

    let mut nodes: Vec<Node> = (0..count)
        .map(|_| Node {
            parent: None,
            children: Vec::new(),
        })
        .collect();

    for p in 0..count {
        for q in 0..count {
            if p == q || !contained_in[q][p] {
                continue;
            }
            // Adopt q as parent when p has none yet, or when q sits inside
            // p's current parent: later, tighter enclosures win.
            let adopt = match nodes[p].parent {
                None => true,
                Some(current) => contained_in[current][q],
            };
            if adopt {
                nodes[p].parent = Some(q);
            }
        }
    }

    for p in 0..count {
        if let Some(q) = nodes[p].parent {
            nodes[q].children.push(p);
        }
    }

    let mut slots: Vec<Option<Chain>> = cuts.into_iter().map(Some).collect();
    let mut parts = Vec::new();
    for root in 0..count {
        if nodes[root].parent.is_some() {
            continue;
        }
        let shell = match slots[root].take() {
            Some(chain) => chain,
            None => continue,
        };
        let mut holes = Vec::new();
        let mut dropped = 0usize;
        for &child in &nodes[root].children {
            if let Some(chain) = slots[child].take() {
                holes.push(chain);
            }
            // Walk the deeper levels with an explicit worklist so the
            // shell-and-direct-holes cutoff is a visible choice, not a
            // recursion accident.
            let mut worklist = nodes[child].children.clone();
            while let Some(island) = worklist.pop() {
                dropped += 1;
                worklist.extend(nodes[island].children.iter().copied());
            }
        }
        if dropped > 0 {
            warn!(
                "part with {} hole(s) drops {} island(s) nested inside holes",
                holes.len(),
                dropped
            );
        }
        debug!("emitting part: shell + {} hole(s)", holes.len());
        parts.push(Part { shell, holes });
    }

    Ok(parts)
}
