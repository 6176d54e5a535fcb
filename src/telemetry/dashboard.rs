use crate::models::number::{Color, RouletteNumber};
use crate::models::stats::StatsSummary;
use crate::models::strategy::StrategySuggestion;
use crate::session::{DashboardSnapshot, FeedStatus};
use std::fmt::Write;

const WIDTH: usize = 76;
const BAR_WIDTH: usize = 20;
const TOP_NUMBERS: usize = 5;

fn pct(value: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        value as f64 * 100.0 / total as f64
    }
}

fn bar(value: u32, total: u32) -> String {
    let filled = (pct(value, total) / 100.0 * BAR_WIDTH as f64).round() as usize;
    format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled.min(BAR_WIDTH)))
}

fn ball(n: RouletteNumber) -> String {
    let tag = match n.color() {
        Color::Red => 'R',
        Color::Black => 'B',
        Color::Green => 'G',
    };
    format!("{n}{tag}")
}

fn status_label(status: &FeedStatus) -> String {
    match status {
        FeedStatus::Loading => "loading".into(),
        FeedStatus::Online => "online".into(),
        FeedStatus::Offline(reason) => format!("OFFLINE ({reason})"),
    }
}

fn stat_line(out: &mut String, label: &str, value: u32, total: u32) {
    let _ = writeln!(
        out,
        "  {label:<8} {value:>3} ({:>3.0}%) {}",
        pct(value, total),
        bar(value, total)
    );
}

fn render_stats(out: &mut String, stats: &StatsSummary) {
    let total = stats.total();
    let non_zero = stats.non_zero();

    stat_line(out, "Red", stats.red, non_zero);
    stat_line(out, "Black", stats.black, non_zero);
    stat_line(out, "Zero", stats.zeros, total);
    stat_line(out, "Even", stats.even, non_zero);
    stat_line(out, "Odd", stats.odd, non_zero);

    let _ = writeln!(
        out,
        "  Dozens:  1st(1-12) {} | 2nd(13-24) {} | 3rd(25-36) {}",
        stats.dozens[0], stats.dozens[1], stats.dozens[2]
    );
    let _ = writeln!(
        out,
        "  Lines:   L1 {} | L2 {} | L3 {}",
        stats.columns[0], stats.columns[1], stats.columns[2]
    );

    let top = stats.top_numbers(TOP_NUMBERS);
    if !top.is_empty() {
        let top: Vec<String> = top.iter().map(|(n, c)| format!("{n} ({c}x)")).collect();
        let _ = writeln!(out, "  Hot:     {}", top.join("  "));
    }
    if !stats.trends.is_empty() {
        let trends: Vec<String> = stats.trends.iter().map(|t| t.to_string()).collect();
        let _ = writeln!(out, "  Trends:  {}", trends.join(", "));
    }
}

fn render_strategy(out: &mut String, strategy: &StrategySuggestion) {
    if strategy.loading {
        let _ = writeln!(out, "  Strategy: analysing...");
        return;
    }
    if strategy.is_empty() {
        let _ = writeln!(out, "  Strategy: waiting for enough spins");
        return;
    }
    let _ = writeln!(out, "  Strategy:    {}", strategy.estrategia);
    let _ = writeln!(out, "  Alternative: {}", strategy.alternativa);
    let _ = writeln!(out, "  Why:         {}", strategy.justificativa.replace('\n', " "));
    let _ = writeln!(
        out,
        "  Confidence:  {}% | Risk: {}",
        strategy.confianca, strategy.risco
    );
    if let Some(error) = &strategy.error {
        let _ = writeln!(out, "  Error:       {error}");
    }
}

/// Text rendering of a session snapshot.
pub fn render(snapshot: &DashboardSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  {}", "-".repeat(WIDTH));

    let table = snapshot
        .current_table
        .as_ref()
        .map(|t| format!("{} ({})", t.table_name, t.vendor_name))
        .unwrap_or_else(|| "no table selected".into());
    let updated = snapshot
        .last_update
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".into());
    let _ = writeln!(
        out,
        "  {table} | {} | updated {updated} | {} tables",
        status_label(&snapshot.status),
        snapshot.tables.len()
    );

    if snapshot.history.is_empty() {
        let _ = writeln!(out, "  Waiting for spins...");
        return out;
    }

    let balls: Vec<String> = snapshot.history.iter().rev().map(|&n| ball(n)).collect();
    let _ = writeln!(
        out,
        "  Spins ({}), newest first: {}",
        snapshot.history.len(),
        balls.join(" ")
    );

    render_stats(&mut out, &snapshot.stats);
    render_strategy(&mut out, &snapshot.strategy);
    out
}
