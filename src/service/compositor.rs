use crate::models::{ReconOutcome, ReconReport, RunStats};
use crate::service::matcher::BankOutcome;

/// 汇总各银行结果; 按银行顺序拼接, 行内顺序不变
///
/// 所有银行都没有产出行时返回 NoData, 与处理失败区分开.
pub fn compose(outcomes: Vec<BankOutcome>, mut stats: RunStats) -> ReconOutcome {
    let mut rows = Vec::new();
    for outcome in outcomes {
        match outcome {
            BankOutcome::Matched {
                rows: bank_rows,
                stats: bank_stats,
            } => {
                rows.extend(bank_rows);
                stats.banks.push(bank_stats);
            }
            BankOutcome::Skipped(skipped) => stats.skipped.push(skipped),
        }
    }

    if rows.is_empty() {
        tracing::warn!("No matching data found");
        return ReconOutcome::NoData(stats);
    }

    tracing::info!(
        "对账结果汇总: {} 家银行, {} 行, Ok {} 行",
        stats.banks.len(),
        rows.len(),
        stats.ok_rows()
    );
    ReconOutcome::Matched(ReconReport { rows, stats })
}
