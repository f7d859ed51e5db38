use serde::{Deserialize, Serialize};

use crate::stream::CustomerSpec;

/// Tolerance for all simulated-time comparisons; absorbs drift from
/// repeated additions of rounded durations.
pub const EPSILON: f64 = 1e-4;

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SegmentKind {
    Service { customer: usize },
    Idle,
    PreemptionMarker,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub priority: i64,
    pub server: usize,
    pub start: f64,
    pub end: f64,
    pub duration: f64,
    pub preempted: bool,
}

impl Segment {
    pub fn customer(&self) -> Option<usize> {
        match self.kind {
            SegmentKind::Service { customer } => Some(customer),
            _ => None,
        }
    }

    pub fn is_service(&self) -> bool {
        matches!(self.kind, SegmentKind::Service { .. })
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.kind, SegmentKind::Idle)
    }

    pub fn is_marker(&self) -> bool {
        matches!(self.kind, SegmentKind::PreemptionMarker)
    }
}

#[derive(Clone, Debug, Default)]
pub struct Timeline {
    pub segments: Vec<Segment>,
    pub truncated: bool,
}

impl Timeline {
    /// End of the last segment across the whole run.
    pub fn makespan(&self) -> f64 {
        self.segments.iter().fold(0.0, |acc, s| acc.max(s.end))
    }
}

struct Customer {
    arrival: f64,
    priority: i64,
    remaining: f64,
    completed: bool,
    admitted: bool,
}

struct ServerSlot {
    available_at: f64,
    last_end: f64,
    current: Option<usize>,
    current_segment: Option<usize>,
}

/// Runs the preemptive-priority schedule for any server count. The ready
/// queue is totally ordered by (priority, arrival, id); a server only
/// preempts its own occupant, and every preemption leaves a zero-duration
/// marker behind.
pub fn run(customers: &[CustomerSpec], num_servers: usize) -> Timeline {
    let cap = (customers.len() * 8).max(1000);
    run_capped(customers, num_servers, cap)
}

fn run_capped(specs: &[CustomerSpec], num_servers: usize, cap: usize) -> Timeline {
    if specs.is_empty() {
        return Timeline::default();
    }

    let mut customers: Vec<Customer> = specs
        .iter()
        .map(|spec| Customer {
            arrival: spec.arrival,
            priority: spec.priority,
            remaining: spec.service,
            completed: false,
            admitted: false,
        })
        .collect();
    let mut servers: Vec<ServerSlot> = (0..num_servers)
        .map(|_| ServerSlot {
            available_at: 0.0,
            last_end: 0.0,
            current: None,
            current_segment: None,
        })
        .collect();
    let mut segments: Vec<Segment> = Vec::new();
    let mut ready: Vec<usize> = Vec::new();
    let mut t = 0.0f64;
    let mut truncated = false;
    let mut passes = 0usize;

    loop {
        if ready.is_empty() && customers.iter().all(|c| c.completed) {
            break;
        }
        passes += 1;
        if passes > cap {
            truncated = true;
            break;
        }

        for (idx, customer) in customers.iter_mut().enumerate() {
            if !customer.admitted && !customer.completed && customer.arrival <= t + EPSILON {
                customer.admitted = true;
                ready.push(idx);
            }
        }
        sort_ready(&mut ready, &customers);

        // Dispatch and preempt until the running set is stable at time t.
        loop {
            let mut changed = false;

            for (s, slot) in servers.iter_mut().enumerate() {
                if slot.current.is_some() || slot.available_at > t + EPSILON || ready.is_empty() {
                    continue;
                }
                let idx = ready.remove(0);
                if slot.last_end + EPSILON < t {
                    segments.push(idle_segment(s + 1, slot.last_end, t));
                }
                let customer = &mut customers[idx];
                let serve = customer.remaining;
                segments.push(Segment {
                    kind: SegmentKind::Service { customer: idx },
                    priority: customer.priority,
                    server: s + 1,
                    start: round2(t),
                    end: round2(t + serve),
                    duration: round2(serve),
                    preempted: false,
                });
                slot.current = Some(idx);
                slot.current_segment = Some(segments.len() - 1);
                slot.available_at = t + serve;
                slot.last_end = t + serve;
                customer.completed = true;
                customer.remaining = 0.0;
                changed = true;
            }

            if let Some(&head) = ready.first() {
                for (s, slot) in servers.iter_mut().enumerate() {
                    let occupant = match slot.current {
                        Some(idx) => idx,
                        None => continue,
                    };
                    if customers[head].priority < customers[occupant].priority {
                        preempt(slot, s, occupant, t, &mut customers, &mut segments);
                        ready.push(occupant);
                        changed = true;
                        break;
                    }
                }
            }

            if !changed {
                break;
            }
            sort_ready(&mut ready, &customers);
        }

        let next_completion = servers
            .iter()
            .filter(|slot| slot.current.is_some())
            .map(|slot| slot.available_at)
            .fold(f64::INFINITY, f64::min);
        let next_arrival = customers
            .iter()
            .filter(|c| !c.admitted && !c.completed)
            .map(|c| c.arrival)
            .fold(f64::INFINITY, f64::min);

        if next_completion.is_infinite() && next_arrival.is_infinite() {
            break;
        }
        t = next_completion.min(next_arrival);
        for slot in servers.iter_mut() {
            if slot.current.is_some() && slot.available_at <= t + EPSILON {
                slot.current = None;
                slot.current_segment = None;
            }
        }
    }

    pad_trailing_idle(&mut segments, &servers);
    segments.sort_by(|a, b| {
        a.server
            .cmp(&b.server)
            .then(a.start.total_cmp(&b.start))
            .then(b.is_marker().cmp(&a.is_marker()))
    });
    Timeline {
        segments: merge_segments(segments),
        truncated,
    }
}

fn sort_ready(ready: &mut [usize], customers: &[Customer]) {
    ready.sort_by(|&a, &b| {
        customers[a]
            .priority
            .cmp(&customers[b].priority)
            .then(customers[a].arrival.total_cmp(&customers[b].arrival))
            .then(a.cmp(&b))
    });
}

fn preempt(
    slot: &mut ServerSlot,
    server_index: usize,
    occupant: usize,
    t: f64,
    customers: &mut [Customer],
    segments: &mut Vec<Segment>,
) {
    let seg_idx = slot
        .current_segment
        .expect("busy server must own a segment");
    let booked_end = segments[seg_idx].end;
    segments[seg_idx].end = round2(t);
    segments[seg_idx].duration = round2(t - segments[seg_idx].start);
    segments[seg_idx].preempted = true;

    let customer = &mut customers[occupant];
    customer.remaining = booked_end - t;
    customer.completed = false;

    slot.available_at = t;
    slot.last_end = t;
    slot.current = None;
    slot.current_segment = None;

    segments.push(Segment {
        kind: SegmentKind::PreemptionMarker,
        priority: 0,
        server: server_index + 1,
        start: round2(t),
        end: round2(t),
        duration: 0.0,
        preempted: true,
    });
}

fn idle_segment(server: usize, start: f64, end: f64) -> Segment {
    Segment {
        kind: SegmentKind::Idle,
        priority: 0,
        server,
        start: round2(start),
        end: round2(end),
        duration: round2(end - start),
        preempted: false,
    }
}

/// Folds adjacent unpreempted pieces of one customer on one server into a
/// single segment; pieces separated by a preemption marker stay split
/// because the truncated piece carries the preempted flag.
fn merge_segments(segments: Vec<Segment>) -> Vec<Segment> {
    let mut merged: Vec<Segment> = Vec::with_capacity(segments.len());
    for segment in segments {
        if let (Some(last), Some(customer)) = (merged.last_mut(), segment.customer()) {
            if last.customer() == Some(customer)
                && last.server == segment.server
                && !last.preempted
                && (last.end - segment.start).abs() <= EPSILON
            {
                last.end = segment.end;
                last.duration = round2(last.end - last.start);
                last.preempted = segment.preempted;
                continue;
            }
        }
        merged.push(segment);
    }
    merged
}

fn pad_trailing_idle(segments: &mut Vec<Segment>, servers: &[ServerSlot]) {
    let makespan = segments.iter().fold(0.0f64, |acc, s| acc.max(s.end));
    for (s, slot) in servers.iter().enumerate() {
        if slot.last_end + EPSILON < makespan {
            segments.push(idle_segment(s + 1, slot.last_end, makespan));
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
