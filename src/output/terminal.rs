use super::{FileReport, LearnerView};
use crate::core::{AnalysisResult, Detection, DetectionSource, DiagnosticKind};
use colored::*;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use std::fmt::Write;

fn tag_label(detection: &Detection) -> String {
    let mut tags = Vec::new();
    match (detection.is_positive(), detection.is_negative()) {
        (true, true) => tags.push("acceptable"),
        (true, false) => tags.push("good"),
        (false, true) => tags.push("issue"),
        (false, false) => {}
    }
    if detection.is_idiomatic() {
        tags.push("idiomatic");
    }
    if detection.is_trivial() {
        tags.push("trivial");
    }
    tags.join(", ")
}

fn source_label(source: DetectionSource) -> &'static str {
    match source {
        DetectionSource::NativeDetector => "native",
        DetectionSource::DataFlowDetector => "data-flow",
        DetectionSource::ExternalRuleEngine => "rule-engine",
    }
}

fn colored_slug(detection: &Detection) -> ColoredString {
    let slug = detection.topic_slug();
    match (detection.is_positive(), detection.is_negative()) {
        (false, true) => slug.red(),
        (true, true) => slug.yellow(),
        _ => slug.green(),
    }
}

fn detections_table(result: &AnalysisResult) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Loc", "Topic", "Tags", "Source", "Details"]);
    for detection in &result.detections {
        table.add_row(vec![
            detection
                .location()
                .map(|l| l.to_string())
                .unwrap_or_default(),
            colored_slug(detection).to_string(),
            tag_label(detection),
            source_label(detection.source()).to_string(),
            detection.details().unwrap_or_default().to_string(),
        ]);
    }
    table
}

fn render_learner(out: &mut String, view: &LearnerView) {
    let counts = view.layer_counts;
    let _ = writeln!(
        out,
        "{} ({} level): fundamentals {}, intermediate {}, patterns {}",
        "Focus".bold(),
        view.level,
        counts.fundamentals,
        counts.intermediate,
        counts.patterns
    );
    if view.surfaced.is_empty() {
        let _ = writeln!(out, "  {}", "nothing to work on at this level".dimmed());
    }
    for (rank, item) in view.surfaced.iter().enumerate() {
        let location = item
            .detection
            .location()
            .map(|l| format!(" at {}", l))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "  {}. [{}] {}{}",
            rank + 1,
            item.layer,
            colored_slug(&item.detection),
            location
        );
    }
}

/// Human-readable report for all files.
pub fn render(reports: &[FileReport]) -> String {
    let mut out = String::new();
    for report in reports {
        let result = &report.result;
        let tree = &result.tree;
        let _ = writeln!(out, "{}", report.path.display().to_string().bold().underline());
        let _ = writeln!(
            out,
            "dialect {}, {} statement(s){}{}",
            tree.dialect,
            tree.statement_count,
            if tree.uses_framework { ", component framework" } else { "" },
            if tree.partial { ", partial parse" } else { "" },
        );

        if result.detections.is_empty() {
            let _ = writeln!(out, "{}", "No patterns detected".dimmed());
        } else {
            let _ = writeln!(out, "{}", detections_table(result));
        }

        let summary = &result.summary;
        let _ = writeln!(
            out,
            "{} total, {} positive, {} negative, {} idiomatic, {} trivial",
            summary.total, summary.positive, summary.negative, summary.idiomatic, summary.trivial
        );
        for issue in &summary.top_issues {
            let _ = writeln!(out, "  {} x{}", issue.topic_slug.red(), issue.count);
        }

        for diagnostic in &result.diagnostics {
            let label = match diagnostic.kind {
                DiagnosticKind::Parse => "parse",
                DiagnosticKind::DetectorFault => "detector",
                DiagnosticKind::RuleEngine => "rule engine",
            };
            let location = diagnostic
                .location
                .map(|l| format!(" ({})", l))
                .unwrap_or_default();
            let _ = writeln!(
                out,
                "{} {}{}",
                format!("warning[{}]:", label).yellow(),
                diagnostic.message,
                location
            );
        }

        if let Some(view) = &report.learner {
            render_learner(&mut out, view);
        }
        out.push('\n');
    }
    out
}
