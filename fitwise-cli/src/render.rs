use anyhow::Result;
use fitwise_core::{CompletionRecord, PerformanceAnalytics, Recommendation, SuitabilityScore};
use serde::Serialize;

pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn scores(scores: &[SuitabilityScore]) -> String {
    if scores.is_empty() {
        return "No eligible candidates.\n".to_string();
    }
    let mut out = String::new();
    for (rank, s) in scores.iter().enumerate() {
        let f = &s.factors;
        out.push_str(&format!(
            "{:>2}. {} (#{}) score={} [{}]\n",
            rank + 1,
            s.user_name,
            s.user_id,
            s.score,
            s.tier
        ));
        out.push_str(&format!(
            "    perf={} load={} avail={} skill={} prio={} | {}\n",
            f.performance, f.workload, f.availability, f.skill_match, f.priority_handling, s.rationale
        ));
    }
    out
}

pub fn recommendations(recs: &[Recommendation]) -> String {
    recs.iter()
        .map(|r| format!("[{:>3.0}%] {}\n", r.confidence * 100.0, r.message))
        .collect()
}

pub fn completion(record: &CompletionRecord) -> String {
    format!(
        "Task #{} completed by user #{}: {:.2}h spent, efficiency {:.2}\n",
        record.task_id, record.user_id, record.time_spent_hours, record.efficiency
    )
}

pub fn analytics(user: u64, a: &PerformanceAnalytics) -> String {
    format!(
        "User #{user}: {} completed | avg efficiency {:.2} | avg time {:.2}h | on time {:.0}%\n",
        a.completed_tasks,
        a.average_efficiency,
        a.average_time_spent_hours,
        a.on_time_completion_rate * 100.0
    )
}
