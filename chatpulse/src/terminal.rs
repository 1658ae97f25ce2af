//! Terminal rendering for reports.

use chatpulse_core::analytics::{
    Dashboard, DayStats, ExportStats, Insight, InsightKind, ReportPeriod, Trends,
};
use chatpulse_core::faq::FaqMatch;
use chatpulse_core::PopularQuestion;
use chrono::NaiveDate;

const WIDTH: usize = 60;

fn header(title: &str) {
    println!();
    println!("╭{}╮", "─".repeat(WIDTH));
    println!("│{:^width$}│", title, width = WIDTH);
    println!("╰{}╯", "─".repeat(WIDTH));
    println!();
}

fn satisfaction_display(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}", v))
}

/// Truncate to `max` characters, marking the cut with an ellipsis.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

fn print_day(label: &str, day: Option<&DayStats>) {
    println!("{}", label);
    let Some(day) = day else {
        println!("   No finished sessions.");
        println!();
        return;
    };

    println!(
        "   Sessions: {:<10} Messages: {:<10} Per session: {}",
        day.total_sessions, day.total_messages, day.average_messages_per_session
    );
    println!(
        "   FAQ: {:<15} AI: {:<16} Errors: {}",
        day.response_source_distribution.faq,
        day.response_source_distribution.ai,
        day.response_source_distribution.error
    );
    println!(
        "   Satisfaction: {:<8} 👍 {}%  😐 {}%  👎 {}%",
        satisfaction_display(day.average_satisfaction),
        day.satisfaction_distribution.positive,
        day.satisfaction_distribution.neutral,
        day.satisfaction_distribution.negative
    );
    if !day.top_topics.is_empty() {
        let topics: Vec<String> = day
            .top_topics
            .iter()
            .map(|t| format!("{} ({})", t.topic, t.count))
            .collect();
        println!("   Topics: {}", topics.join(", "));
    }
    println!();
}

fn print_questions(questions: &[PopularQuestion]) {
    if questions.is_empty() {
        return;
    }
    println!("POPULAR QUESTIONS");
    for (i, q) in questions.iter().enumerate() {
        println!("   {:>2}. {:<48} {:>4}", i + 1, truncate(&q.question, 48), q.count);
    }
    println!();
}

pub fn print_dashboard(dashboard: &Dashboard) {
    header(&format!("Chat dashboard: {}", dashboard.date));

    print_day("TODAY", dashboard.today.as_ref());
    print_day("YESTERDAY", dashboard.yesterday.as_ref());

    println!("TRENDS");
    println!(
        "   Sessions {}   Messages {}   Satisfaction {}",
        Trends::format_delta(dashboard.trends.sessions),
        Trends::format_delta(dashboard.trends.messages),
        Trends::format_delta(dashboard.trends.satisfaction)
    );
    println!("   Live sessions: {}", dashboard.active_sessions);
    println!();

    print_questions(&dashboard.popular_questions);

    if !dashboard.recent_feedback.is_empty() {
        println!("RECENT FEEDBACK");
        for record in &dashboard.recent_feedback {
            let comment = record
                .comment
                .as_deref()
                .map(|c| format!(" \"{}\"", truncate(c, 40)))
                .unwrap_or_default();
            println!(
                "   {} {}/5 via {}{}",
                record.timestamp.format("%Y-%m-%d %H:%M"),
                record.rating,
                record.source,
                comment
            );
        }
        println!();
    }
}

pub fn print_export(stats: &ExportStats) {
    header(&format!(
        "Chat report: {} to {}",
        stats.period.start, stats.period.end
    ));

    if stats.daily_stats.is_empty() {
        println!("  No activity found for this period.");
        println!();
        return;
    }

    println!("SUMMARY");
    println!(
        "   Sessions: {:<10} Messages: {:<10} Active days: {}",
        stats.summary.total_sessions, stats.summary.total_messages, stats.summary.active_days
    );
    println!(
        "   Average satisfaction: {}",
        satisfaction_display(stats.summary.average_satisfaction)
    );
    println!();

    println!("BY DAY");
    println!(
        "   {:<12} {:>8} {:>8} {:>6} {:>6} {:>6} {:>6}",
        "date", "sessions", "messages", "faq", "ai", "error", "rating"
    );
    for day in &stats.daily_stats {
        println!(
            "   {:<12} {:>8} {:>8} {:>6} {:>6} {:>6} {:>6}",
            day.date.to_string(),
            day.total_sessions,
            day.total_messages,
            day.response_source_distribution.faq,
            day.response_source_distribution.ai,
            day.response_source_distribution.error,
            satisfaction_display(day.average_satisfaction)
        );
    }
    println!();

    print_questions(&stats.popular_questions);
}

pub fn print_insights(period: &ReportPeriod, end: NaiveDate, insights: &[Insight]) {
    header(&format!("Insights: {} to {}", period.display_name(), end));

    for insight in insights {
        let marker = match insight.kind {
            InsightKind::Success => "✅",
            InsightKind::Warning => "⚠️",
            InsightKind::Error => "❌",
            InsightKind::Info => "ℹ️",
        };
        println!("{} [{:?}] {}", marker, insight.priority, insight.message);
        if let Some(action) = &insight.action {
            println!("   → {}", action);
        }
    }
    println!();
}

pub fn print_match(question: &str, hit: &FaqMatch) {
    if !hit.found {
        println!("No FAQ answer for: {}", question);
        return;
    }

    println!(
        "Matched \"{}\" with confidence {}%",
        hit.matched_keyword.as_deref().unwrap_or_default(),
        hit.confidence.unwrap_or_default()
    );
    println!();
    println!("{}", hit.answer.as_deref().unwrap_or_default().trim());
}
