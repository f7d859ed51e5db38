use std::fmt::Write as _;

use crate::analytics::AnalyticReport;
use crate::cli::{FormatArg, ReportFormatArg};
use crate::engine::SimulationResult;
use crate::metrics::round_to;
use crate::scheduler::Segment;

pub trait Formatter {
    fn write(&self, result: &SimulationResult) -> String;
}

pub struct HumanFormatter;
pub struct SummaryFormatter;
pub struct JsonFormatter;

pub fn formatter_for(format: &FormatArg) -> Box<dyn Formatter> {
    match format {
        FormatArg::Human => Box::new(HumanFormatter),
        FormatArg::Summary => Box::new(SummaryFormatter),
        FormatArg::Json => Box::new(JsonFormatter),
    }
}

impl Formatter for HumanFormatter {
    fn write(&self, result: &SimulationResult) -> String {
        let mut out = String::new();
        if result.truncated {
            out.push_str("WARNING: iteration cap reached, results are partial\n");
        }
        out.push_str(
            "#    prio  arrival  service  start    end      turnaround  wait    response  server\n",
        );
        for row in &result.rows {
            let _ = writeln!(
                out,
                "{:<4} {:<5} {:<8} {:<8} {:<8} {:<8} {:<11} {:<7} {:<9} {}",
                row.customer,
                row.priority,
                row.arrival,
                row.service,
                row.start,
                row.end,
                round_to(row.turnaround, 2),
                round_to(row.waiting, 2),
                round_to(row.response, 2),
                row.server,
            );
        }
        out.push_str("Timeline:\n");
        for segment in &result.timeline {
            let _ = writeln!(out, "{}", describe_segment(segment));
        }
        write_utilization(&mut out, result);
        write_summary(&mut out, result);
        out
    }
}

impl Formatter for SummaryFormatter {
    fn write(&self, result: &SimulationResult) -> String {
        let mut out = String::new();
        if result.truncated {
            out.push_str("WARNING: iteration cap reached, results are partial\n");
        }
        write_utilization(&mut out, result);
        write_summary(&mut out, result);
        out
    }
}

impl Formatter for JsonFormatter {
    fn write(&self, result: &SimulationResult) -> String {
        let mut out =
            serde_json::to_string_pretty(result).expect("simulation result serializes to JSON");
        out.push('\n');
        out
    }
}

fn describe_segment(segment: &Segment) -> String {
    let span = format!(
        "server {} [{:.2}-{:.2}]",
        segment.server, segment.start, segment.end
    );
    match segment.customer() {
        Some(customer) if segment.preempted => format!(
            "{span} customer {} (priority {}, preempted)",
            customer + 1,
            segment.priority
        ),
        Some(customer) => format!(
            "{span} customer {} (priority {})",
            customer + 1,
            segment.priority
        ),
        None if segment.is_marker() => format!("{span} preemption"),
        None => format!("{span} idle"),
    }
}

fn write_utilization(out: &mut String, result: &SimulationResult) {
    let _ = writeln!(
        out,
        "Utilization: {}%",
        round_to(result.utilization.overall, 1)
    );
    for (idx, pct) in result.utilization.per_server.iter().enumerate() {
        let _ = writeln!(out, "server {}: {}%", idx + 1, round_to(*pct, 1));
    }
}

fn write_summary(out: &mut String, result: &SimulationResult) {
    let summary = &result.summary;
    let _ = writeln!(out, "Summary:");
    let _ = writeln!(out, "customers: {}", summary.total_customers);
    let _ = writeln!(out, "avg wait: {}", round_to(summary.avg_waiting, 2));
    let _ = writeln!(
        out,
        "avg turnaround: {}",
        round_to(summary.avg_turnaround, 2)
    );
    let _ = writeln!(out, "avg service: {}", round_to(summary.avg_service, 2));
    let _ = writeln!(out, "avg response: {}", round_to(summary.avg_response, 2));
    for group in &summary.by_priority {
        let _ = writeln!(
            out,
            "priority {}: {} customers ({}%), avg wait {}",
            group.priority,
            group.stats.count,
            round_to(group.stats.share_pct, 1),
            round_to(group.stats.avg_waiting, 2),
        );
    }
    for group in &summary.by_server {
        let _ = writeln!(
            out,
            "server {}: {} customers ({}%), avg wait {}",
            group.server,
            group.stats.count,
            round_to(group.stats.share_pct, 1),
            round_to(group.stats.avg_waiting, 2),
        );
    }
}

pub fn format_report(report: &AnalyticReport, format: &ReportFormatArg) -> String {
    match format {
        ReportFormatArg::Json => {
            let mut out =
                serde_json::to_string_pretty(report).expect("analytic report serializes to JSON");
            out.push('\n');
            out
        }
        ReportFormatArg::Human => {
            let mut out = String::new();
            let _ = writeln!(out, "model: {}", report.model);
            let _ = writeln!(out, "servers: {}", report.servers);
            let _ = writeln!(out, "lambda: {}", round_to(report.lambda, 3));
            let _ = writeln!(out, "mu: {}", round_to(report.mu, 3));
            let _ = writeln!(out, "rho: {}", round_to(report.rho, 3));
            let _ = writeln!(out, "Ca2: {}", round_to(report.ca2, 3));
            let _ = writeln!(out, "Cs2: {}", round_to(report.cs2, 3));
            let _ = writeln!(out, "P0: {}", round_to(report.p_zero, 4));
            let _ = writeln!(out, "Lq: {}", round_to(report.lq, 3));
            let _ = writeln!(out, "L: {}", round_to(report.l, 3));
            let _ = writeln!(out, "Wq: {}", round_to(report.wq, 3));
            let _ = writeln!(out, "W: {}", round_to(report.w, 3));
            let _ = writeln!(out, "idle: {}", round_to(report.idle, 3));
            out
        }
    }
}
