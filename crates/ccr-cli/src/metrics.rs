//! # Metrics Subcommand
//!
//! Prints entity-extraction quality metrics, one line per entity type.

use anyhow::Result;
use ccr_client::metrics::EntityMetrics;
use clap::Args;

use crate::{block_on, sign_out_if_unauthorized, Context};

/// Arguments for `ccr metrics`.
#[derive(Args, Debug)]
pub struct MetricsArgs {
    /// Print the raw response as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Execute `ccr metrics`.
pub fn run_metrics(args: &MetricsArgs, ctx: &Context) -> Result<u8> {
    let mut session = ctx.open_session()?;
    let client = ctx.client(&session)?;

    let metrics = match block_on(async { client.metrics().fetch().await })? {
        Ok(metrics) => metrics,
        Err(e) => return Err(sign_out_if_unauthorized(&mut session, e)),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&metrics)?);
    } else {
        print!("{}", render(&metrics));
    }
    Ok(0)
}

fn render(metrics: &EntityMetrics) -> String {
    let mut out = String::new();
    if let Some(message) = &metrics.message {
        out.push_str(&format!("{message}\n"));
    }
    out.push_str(&format!(
        "Entity detection summary ({} calls processed)\n",
        metrics.total_calls
    ));
    out.push_str(&format!(
        "  Entities: {}  Accuracy: {:.1}%  Avg confidence: {:.2}\n",
        metrics.total_entities, metrics.overall_accuracy, metrics.avg_confidence
    ));
    if let Some(failed) = metrics.failed_calls.filter(|f| *f > 0) {
        out.push_str(&format!("  Failed calls: {failed}\n"));
    }
    for (entity_type, summary) in &metrics.entity_summary {
        out.push_str(&format!(
            "  {:<16} detected {:>5}  low confidence {:>4} ({:>5.1}%)  {}\n",
            entity_type,
            summary.total_detected,
            summary.low_confidence_count,
            summary.low_confidence_pct,
            summary.action()
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_lists_types_with_actions() {
        let metrics: EntityMetrics = serde_json::from_value(serde_json::json!({
            "total_calls": 3,
            "total_entities": 50,
            "overall_accuracy": 88.0,
            "avg_confidence": 0.9,
            "failed_calls": 0,
            "entity_summary": {
                "persons": {"total_detected": 20, "avg_confidence": 0.9,
                            "low_confidence_count": 5, "low_confidence_pct": 25.0,
                            "action_needed": "Review"},
                "legal": {"total_detected": 0, "avg_confidence": 0,
                          "low_confidence_count": 0, "low_confidence_pct": 0}
            }
        }))
        .unwrap();

        let text = render(&metrics);
        assert!(text.contains("(3 calls processed)"));
        assert!(!text.contains("Failed calls"));
        let persons = text.lines().find(|l| l.contains("persons")).unwrap();
        assert!(persons.ends_with("Review"));
        let legal = text.lines().find(|l| l.contains("legal")).unwrap();
        assert!(legal.ends_with("No Data"));
    }

    #[test]
    fn render_shows_message() {
        let metrics = EntityMetrics {
            message: Some("No processed calls found".into()),
            ..EntityMetrics::default()
        };
        assert!(render(&metrics).starts_with("No processed calls found\n"));
    }
}
