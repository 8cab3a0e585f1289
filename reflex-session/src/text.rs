//! Player-facing strings.

use crate::best::BestScore;
use reflex_core::{Aggregate, Button, Rank, TrialResult};
use std::fmt::Write;

pub const WITHHELD_CORRECT: &str = "正解（押さなかった）";
pub const WITHHELD_WRONG: &str = "不正解（青は押さない）";
pub const TOO_LATE: &str = "不正解（押し遅れ）";

pub fn trial_status(index: usize, max_trials: usize) -> String {
    format!("試行 {} / {}", index, max_trials)
}

pub fn correct_press(reaction_ms: u64) -> String {
    format!("正解（{}ms）", reaction_ms)
}

pub fn wrong_button(pattern_text: &str, pressed: Button) -> String {
    format!("不正解（{} なのに {} を押した）", pattern_text, pressed)
}

pub fn between_trials(message: &str) -> String {
    format!("{}\n次の試行まで少々お待ちください…", message)
}

/// Zero and missing averages both render as `-`
fn avg_label(avg_time_ms: Option<u64>) -> String {
    match avg_time_ms {
        Some(ms) if ms > 0 => ms.to_string(),
        _ => "-".to_string(),
    }
}

pub fn summary(
    aggregate: &Aggregate,
    rank: Rank,
    best: &BestScore,
    results: &[TrialResult],
    max_trials: usize,
) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "=== 結果 ===");
    let _ = writeln!(out, "正解数: {} / {}", aggregate.correct_count, max_trials);
    let _ = writeln!(out, "平均反応時間: {} ms", avg_label(aggregate.avg_time_ms));
    let _ = writeln!(out, "評価ランク: {}", rank);
    let _ = writeln!(out, "コメント: {}\n", rank.comment());

    let _ = writeln!(out, "--- 自己ベスト ---");
    let best_rank = best.rank.map(|r| r.to_string());
    let _ = writeln!(out, "最高ランク: {}", best_rank.as_deref().unwrap_or("なし"));
    let _ = writeln!(out, "最速平均反応: {} ms\n", avg_label(best.avg_time_ms));

    for r in results {
        let _ = writeln!(out, "試行{}: {}\n{}\n", r.trial_index, r.pattern_text, r.message);
    }
    out
}
