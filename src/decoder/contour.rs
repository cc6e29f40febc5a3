//! Contour reconstructor: joins one bucket's unordered segments into
//! continuous runs by endpoint matching and writes the runs out as
//! move/line/curve commands.
//!
//! Connectivity is exact integer equality of start-frame endpoints.
//! Segments are linked pairwise into at most two undirected neighbour
//! slots; the slot of the partner and the shared point are recorded on
//! both ends, which keeps duplicate edges and two-segment loops
//! unambiguous during the walk.

use fxhash::FxHashMap;

use crate::geom::Point;

use super::segment::{FramePoint, Segment};

/// A command over paired-frame points. The decode drivers project this
/// onto the flat or morph output model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RunCommand {
    MoveTo(FramePoint),
    LineTo(FramePoint),
    CurveTo {
        control: FramePoint,
        anchor: FramePoint,
    },
}

/// Undirected neighbour link: the partner segment, the partner's slot
/// pointing back here, and the shared endpoint.
#[derive(Debug, Clone, Copy)]
struct Link {
    seg: usize,
    slot: usize,
    at: Point,
}

pub(crate) fn reconstruct(segments: &[Segment]) -> Vec<RunCommand> {
    let mut links: Vec<[Option<Link>; 2]> = vec![[None; 2]; segments.len()];
    let mut endpoint_match: FxHashMap<Point, usize> = FxHashMap::default();

    // Pair up segments that meet at a point. Offering the start point
    // first is the tie-break when both ends of a segment find matches.
    // A segment whose endpoints coincide and match nothing else links
    // to itself and later plays as a trivial single-segment loop.
    for (i, segment) in segments.iter().enumerate() {
        for p in [segment.start_point(), segment.end_point()] {
            match endpoint_match.remove(&p) {
                Some(other) => link(&mut links, other, i, p),
                None => {
                    endpoint_match.insert(p, i);
                }
            }
        }
    }

    let mut visited = vec![false; segments.len()];
    let mut commands = Vec::new();

    for first in 0..segments.len() {
        if visited[first] {
            continue;
        }

        // With two neighbours, walk backwards out of slot 0 until a
        // dead end or until the walk comes back around to `first`
        // (closed run). With fewer, `first` is already a run start.
        // A segment with a single neighbour always carries it in slot
        // 0, so a dead end is simply a missing exit slot.
        let (run_start, closed) = if links[first][1].is_some() {
            let mut cur = first;
            let mut exit = 0;
            loop {
                match links[cur][exit] {
                    None => break (cur, false),
                    Some(Link { seg: prev, slot, .. }) => {
                        if prev == first {
                            break (first, true);
                        }
                        cur = prev;
                        exit = 1 - slot;
                    }
                }
            }
        } else {
            (first, false)
        };

        // A closed run plays its first segment in the segment's own
        // effective orientation; an open run starts at the free end of
        // the terminus so the whole chain is covered.
        let seg = &segments[run_start];
        let forward = if closed {
            true
        } else {
            match links[run_start][0] {
                Some(l) => l.at == seg.end_point(),
                None => true,
            }
        };

        let (pen, target) = if forward {
            (seg.head(), seg.tail())
        } else {
            (seg.tail(), seg.head())
        };
        commands.push(RunCommand::MoveTo(pen));
        commands.push(edge_command(seg, target));
        visited[run_start] = true;

        let mut cur = run_start;
        let mut pen = target;
        while let Some(next) = next_link(&links[cur], pen.start, &visited) {
            cur = next.seg;
            let seg = &segments[cur];
            // Flip any segment whose effective orientation disagrees
            // with the running pen.
            let target = if seg.start_point() == pen.start {
                seg.tail()
            } else {
                seg.head()
            };
            commands.push(edge_command(seg, target));
            visited[cur] = true;
            pen = target;
        }
    }

    commands
}

fn edge_command(segment: &Segment, target: FramePoint) -> RunCommand {
    match segment.control {
        Some(control) => RunCommand::CurveTo {
            control,
            anchor: target,
        },
        None => RunCommand::LineTo(target),
    }
}

fn link(links: &mut [[Option<Link>; 2]], a: usize, b: usize, at: Point) {
    let sa = first_free(&links[a]);
    let sb = if a == b { 1 } else { first_free(&links[b]) };
    links[a][sa] = Some(Link { seg: b, slot: sb, at });
    links[b][sb] = Some(Link { seg: a, slot: sa, at });
}

fn first_free(slots: &[Option<Link>; 2]) -> usize {
    if slots[0].is_none() {
        0
    } else {
        debug_assert!(slots[1].is_none(), "segment has more than two neighbours");
        1
    }
}

/// The unvisited neighbour attached at `at`, if any.
fn next_link(slots: &[Option<Link>; 2], at: Point, visited: &[bool]) -> Option<Link> {
    slots
        .iter()
        .flatten()
        .copied()
        .find(|l| l.at == at && !visited[l.seg])
}
