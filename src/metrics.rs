use serde::{Deserialize, Serialize};

use crate::scheduler::{Timeline, EPSILON};
use crate::stream::CustomerSpec;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ResultRow {
    pub customer: usize,
    pub priority: i64,
    pub inter_arrival: f64,
    pub arrival: f64,
    pub service: f64,
    pub start: f64,
    pub end: f64,
    pub turnaround: f64,
    pub waiting: f64,
    pub response: f64,
    pub server: usize,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Utilization {
    pub overall: f64,
    pub per_server: Vec<f64>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct GroupStats {
    pub count: usize,
    pub share_pct: f64,
    pub avg_waiting: f64,
    pub avg_turnaround: f64,
    pub avg_service: f64,
    pub avg_response: f64,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct PriorityBreakdown {
    pub priority: i64,
    #[serde(flatten)]
    pub stats: GroupStats,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ServerBreakdown {
    pub server: usize,
    #[serde(flatten)]
    pub stats: GroupStats,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Summary {
    pub total_customers: usize,
    pub avg_waiting: f64,
    pub avg_turnaround: f64,
    pub avg_service: f64,
    pub avg_response: f64,
    pub by_priority: Vec<PriorityBreakdown>,
    pub by_server: Vec<ServerBreakdown>,
}

/// Projects per-customer rows out of the timeline. Pure over its inputs:
/// the same timeline always derives the same rows. Customers whose
/// service was cut short by a truncated run are omitted; only fully
/// served customers get a row.
pub fn derive_rows(specs: &[CustomerSpec], timeline: &Timeline) -> Vec<ResultRow> {
    specs
        .iter()
        .filter_map(|spec| {
            let mut first_start = f64::INFINITY;
            let mut last_end = 0.0f64;
            let mut served = 0.0;
            let mut server = 0usize;
            for segment in &timeline.segments {
                if segment.customer() != Some(spec.id) {
                    continue;
                }
                if segment.start < first_start {
                    first_start = segment.start;
                    server = segment.server;
                }
                last_end = last_end.max(segment.end);
                served += segment.duration;
            }
            if (served - spec.service).abs() > EPSILON {
                return None;
            }
            let turnaround = last_end - spec.arrival;
            Some(ResultRow {
                customer: spec.id + 1,
                priority: spec.priority,
                inter_arrival: spec.inter_arrival,
                arrival: spec.arrival,
                service: spec.service,
                start: first_start,
                end: last_end,
                turnaround,
                waiting: (turnaround - spec.service).max(0.0),
                response: (first_start - spec.arrival).max(0.0),
                server,
            })
        })
        .collect()
}

/// Busy time over capacity. Overall utilization normalizes by server
/// count so it stays within [0, 100] for any C; per-server entries are
/// each server's busy share of the makespan. Values are exact here and
/// rounded only at the output boundary.
pub fn utilization(timeline: &Timeline, num_servers: usize) -> Utilization {
    let makespan = timeline.makespan();
    let mut busy = vec![0.0f64; num_servers];
    for segment in &timeline.segments {
        if segment.is_service() && segment.server >= 1 && segment.server <= num_servers {
            busy[segment.server - 1] += segment.duration;
        }
    }
    let total_busy: f64 = busy.iter().sum();
    let per_server = busy
        .iter()
        .map(|&b| {
            if makespan == 0.0 {
                0.0
            } else {
                100.0 * b / makespan
            }
        })
        .collect();
    let overall = if makespan == 0.0 {
        0.0
    } else {
        100.0 * total_busy / (makespan * num_servers as f64)
    };
    Utilization {
        overall,
        per_server,
    }
}

pub fn summarize(rows: &[ResultRow]) -> Summary {
    let mut by_priority = group_keys(rows.iter().map(|r| r.priority))
        .into_iter()
        .map(|priority| PriorityBreakdown {
            priority,
            stats: group_stats(rows, |r| r.priority == priority),
        })
        .collect::<Vec<_>>();
    by_priority.sort_by_key(|b| b.priority);

    let mut by_server = group_keys(rows.iter().map(|r| r.server))
        .into_iter()
        .map(|server| ServerBreakdown {
            server,
            stats: group_stats(rows, |r| r.server == server),
        })
        .collect::<Vec<_>>();
    by_server.sort_by_key(|b| b.server);

    Summary {
        total_customers: rows.len(),
        avg_waiting: mean(rows.iter().map(|r| r.waiting)),
        avg_turnaround: mean(rows.iter().map(|r| r.turnaround)),
        avg_service: mean(rows.iter().map(|r| r.service)),
        avg_response: mean(rows.iter().map(|r| r.response)),
        by_priority,
        by_server,
    }
}

fn group_keys<K: PartialEq + Copy>(keys: impl Iterator<Item = K>) -> Vec<K> {
    let mut unique = Vec::new();
    for key in keys {
        if !unique.contains(&key) {
            unique.push(key);
        }
    }
    unique
}

fn group_stats(rows: &[ResultRow], pred: impl Fn(&&ResultRow) -> bool) -> GroupStats {
    let group: Vec<&ResultRow> = rows.iter().filter(|r| pred(r)).collect();
    GroupStats {
        count: group.len(),
        share_pct: if rows.is_empty() {
            0.0
        } else {
            100.0 * group.len() as f64 / rows.len() as f64
        },
        avg_waiting: mean(group.iter().map(|r| r.waiting)),
        avg_turnaround: mean(group.iter().map(|r| r.turnaround)),
        avg_service: mean(group.iter().map(|r| r.service)),
        avg_response: mean(group.iter().map(|r| r.response)),
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for value in values {
        sum += value;
        count += 1;
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

pub(crate) fn round_to(value: f64, decimals: u32) -> f64 {
    if decimals == 0 {
        return value.round();
    }
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::{self, Segment, SegmentKind};

    fn spec(id: usize, arrival: f64, service: f64, priority: i64) -> CustomerSpec {
        CustomerSpec {
            id,
            inter_arrival: 0.0,
            arrival,
            service,
            priority,
        }
    }

    #[test]
    fn backlog_rows_report_waits_and_full_utilization() {
        let specs = vec![
            spec(0, 0.0, 4.0, 1),
            spec(1, 1.0, 2.0, 1),
            spec(2, 2.0, 2.0, 1),
        ];
        let timeline = scheduler::run(&specs, 1);
        let rows = derive_rows(&specs, &timeline);

        let ends: Vec<f64> = rows.iter().map(|r| r.end).collect();
        assert_eq!(ends, vec![4.0, 6.0, 8.0]);
        let waits: Vec<f64> = rows.iter().map(|r| r.waiting).collect();
        assert_eq!(waits, vec![0.0, 3.0, 4.0]);
        let responses: Vec<f64> = rows.iter().map(|r| r.response).collect();
        assert_eq!(responses, vec![0.0, 3.0, 4.0]);

        let util = utilization(&timeline, 1);
        assert_eq!(util.overall, 100.0);
        assert_eq!(util.per_server, vec![100.0]);
    }

    #[test]
    fn preempted_customer_spans_first_start_to_last_end() {
        let specs = vec![spec(0, 0.0, 5.0, 2), spec(1, 2.0, 1.0, 1)];
        let timeline = scheduler::run(&specs, 1);
        let rows = derive_rows(&specs, &timeline);

        assert_eq!(rows[0].start, 0.0);
        assert_eq!(rows[0].end, 6.0);
        assert_eq!(rows[0].turnaround, 6.0);
        assert_eq!(rows[0].waiting, 1.0);
        assert_eq!(rows[0].response, 0.0);

        assert_eq!(rows[1].start, 2.0);
        assert_eq!(rows[1].end, 3.0);
        assert_eq!(rows[1].waiting, 0.0);
    }

    #[test]
    fn utilization_identity_holds_exactly_for_one_server() {
        let specs = vec![spec(0, 0.0, 2.0, 1), spec(1, 5.0, 1.0, 1)];
        let timeline = scheduler::run(&specs, 1);
        let util = utilization(&timeline, 1);
        // 100 * (2 + 1) / 6, no intermediate rounding.
        assert_eq!(util.overall, 100.0 * 3.0 / 6.0);
        assert!(util.overall >= 0.0 && util.overall <= 100.0);
    }

    #[test]
    fn overall_utilization_is_bounded_with_multiple_servers() {
        let specs = vec![
            spec(0, 0.0, 2.0, 1),
            spec(1, 0.0, 2.0, 1),
            spec(2, 0.0, 2.0, 1),
            spec(3, 0.0, 2.0, 1),
        ];
        let timeline = scheduler::run(&specs, 2);
        let util = utilization(&timeline, 2);
        assert_eq!(util.overall, 100.0);
        assert_eq!(util.per_server, vec![100.0, 100.0]);
    }

    #[test]
    fn rederivation_is_idempotent() {
        let specs = vec![
            spec(0, 0.0, 6.0, 3),
            spec(1, 1.0, 2.0, 2),
            spec(2, 2.0, 1.0, 1),
        ];
        let timeline = scheduler::run(&specs, 1);
        let first = derive_rows(&specs, &timeline);
        let second = derive_rows(&specs, &timeline);
        assert_eq!(first, second);
        assert_eq!(summarize(&first), summarize(&second));
    }

    #[test]
    fn partially_served_customers_are_omitted() {
        let specs = vec![spec(0, 0.0, 4.0, 1), spec(1, 0.0, 4.0, 1)];
        let timeline = Timeline {
            segments: vec![
                Segment {
                    kind: SegmentKind::Service { customer: 0 },
                    priority: 1,
                    server: 1,
                    start: 0.0,
                    end: 4.0,
                    duration: 4.0,
                    preempted: false,
                },
                Segment {
                    kind: SegmentKind::Service { customer: 1 },
                    priority: 1,
                    server: 1,
                    start: 4.0,
                    end: 6.0,
                    duration: 2.0,
                    preempted: true,
                },
            ],
            truncated: true,
        };
        let rows = derive_rows(&specs, &timeline);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].customer, 1);
    }

    #[test]
    fn summary_groups_by_priority_and_server() {
        let specs = vec![
            spec(0, 0.0, 2.0, 1),
            spec(1, 0.0, 2.0, 2),
            spec(2, 0.0, 2.0, 1),
            spec(3, 0.0, 2.0, 2),
        ];
        let timeline = scheduler::run(&specs, 2);
        let rows = derive_rows(&specs, &timeline);
        let summary = summarize(&rows);

        assert_eq!(summary.total_customers, 4);
        assert_eq!(summary.by_priority.len(), 2);
        assert_eq!(summary.by_priority[0].priority, 1);
        assert_eq!(summary.by_priority[0].stats.count, 2);
        assert_eq!(summary.by_priority[0].stats.share_pct, 50.0);
        assert_eq!(summary.by_server.len(), 2);
        let total: usize = summary.by_server.iter().map(|b| b.stats.count).sum();
        assert_eq!(total, 4);
    }

    #[test]
    fn empty_rows_summarize_to_zeros() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_customers, 0);
        assert_eq!(summary.avg_waiting, 0.0);
        assert!(summary.by_priority.is_empty());
    }

    #[test]
    fn round_to_clips_at_the_requested_precision() {
        assert_eq!(round_to(12.3456, 2), 12.35);
        assert_eq!(round_to(12.3456, 0), 12.0);
    }
}
