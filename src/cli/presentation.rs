//! CLI presentation: text and json formatters for play and inspect.

use crate::error::EngineError;
use crate::timeline::{Context, StreamKind};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct StreamRow {
    pub id: u16,
    pub kind: StreamKind,
    pub time_scale: u32,
    pub units: usize,
    pub root: bool,
    pub last_time_ms: Option<u64>,
}

impl StreamRow {
    pub fn rows(ctx: &Context) -> Vec<StreamRow> {
        ctx.streams
            .iter()
            .map(|sc| StreamRow {
                id: sc.id,
                kind: sc.kind,
                time_scale: sc.time_scale,
                units: sc.unit_count(),
                root: sc.in_root_od,
                last_time_ms: sc.last_time_ms(),
            })
            .collect()
    }
}

fn kind_label(kind: StreamKind) -> &'static str {
    match kind {
        StreamKind::GraphUpdate => "graph",
        StreamKind::ObjectDescriptor => "od",
        StreamKind::Other => "other",
    }
}

/// Stream listing for `inspect`.
pub fn format_streams(ctx: &Context, format: &str) -> Result<String, EngineError> {
    let rows = StreamRow::rows(ctx);
    let duration = ctx.max_root_duration_ms();

    if format == "json" {
        let out = serde_json::json!({
            "scene": ctx.scene,
            "duration_ms": duration,
            "streams": rows,
        });
        return serde_json::to_string_pretty(&out).map_err(|e| EngineError::Config(e.to_string()));
    }

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Stream", "Kind", "Time-scale", "Units", "Root", "Last (ms)"]);
    for row in &rows {
        table.add_row(vec![
            row.id.to_string(),
            kind_label(row.kind).to_string(),
            row.time_scale.to_string(),
            row.units.to_string(),
            if row.root { "yes" } else { "no" }.to_string(),
            row.last_time_ms
                .map(|t| t.to_string())
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }

    let mut out = format!(
        "Scene: {}x{}{}\n",
        ctx.scene.width,
        ctx.scene.height,
        if ctx.scene.pixel_metrics { " (pixels)" } else { "" }
    );
    out.push_str(&format!(
        "Duration: {}\n\n",
        duration
            .map(|d| format!("{} ms", d))
            .unwrap_or_else(|| "unknown".to_string())
    ));
    out.push_str(&table.to_string());
    Ok(out)
}

/// What a `play` run did.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PlaySummary {
    pub loader: String,
    pub ticks: usize,
    pub stream_time_ms: u32,
    pub ended: bool,
    pub commands_applied: usize,
    pub objects_bound: usize,
    pub objects_disconnected: usize,
    pub duration_ms: Option<u64>,
}

pub fn format_play_summary(summary: &PlaySummary, format: &str) -> Result<String, EngineError> {
    if format == "json" {
        return serde_json::to_string_pretty(summary).map_err(|e| EngineError::Config(e.to_string()));
    }

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec!["Loader".to_string(), summary.loader.clone()]);
    table.add_row(vec!["Ticks".to_string(), summary.ticks.to_string()]);
    table.add_row(vec![
        "Stream time".to_string(),
        format!("{} ms", summary.stream_time_ms),
    ]);
    table.add_row(vec![
        "Ended".to_string(),
        if summary.ended { "yes" } else { "no (limit reached)" }.to_string(),
    ]);
    table.add_row(vec![
        "Commands applied".to_string(),
        summary.commands_applied.to_string(),
    ]);
    table.add_row(vec![
        "Objects bound".to_string(),
        summary.objects_bound.to_string(),
    ]);
    table.add_row(vec![
        "Objects disconnected".to_string(),
        summary.objects_disconnected.to_string(),
    ]);
    table.add_row(vec![
        "Duration".to_string(),
        summary
            .duration_ms
            .map(|d| format!("{} ms", d))
            .unwrap_or_else(|| "unknown".to_string()),
    ]);
    Ok(table.to_string())
}
