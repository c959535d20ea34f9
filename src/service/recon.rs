use crate::config::ReconConfig;
use crate::error::Result;
use crate::io;
use crate::models::{ReconOutcome, RunStats, Table, Workbook};
use crate::service::aggregator::aggregate_ledger;
use crate::service::compositor::compose;
use crate::service::matcher::BankMatcher;
use crate::service::normalizer::Normalizer;
use crate::service::registry::BankRegistry;
use std::sync::Arc;
use std::time::Instant;

/// 对账服务: 台账 + 银行流水 -> 逐笔核对结果
///
/// 每次调用都是输入的纯函数, 服务本身不保存任何跨次状态.
pub struct ReconService {
    registry: Arc<BankRegistry>,
    normalizer: Normalizer,
    parallel: bool,
}

impl ReconService {
    pub fn new(registry: Arc<BankRegistry>, config: &ReconConfig) -> Self {
        Self {
            registry,
            normalizer: Normalizer::new(config.day_first),
            parallel: config.parallel_banks,
        }
    }

    /// 上传文件入口: 台账取第一个工作表, 流水读取全部工作表
    pub fn reconcile_files(&self, ledger: Vec<u8>, statement: Vec<u8>) -> Result<ReconOutcome> {
        let ledger = io::read_first_sheet("recon data", ledger)?;
        let statement = io::read_workbook("bank statement", statement)?;
        self.reconcile(ledger, &statement)
    }

    pub fn reconcile(&self, ledger: Table, statement: &Workbook) -> Result<ReconOutcome> {
        let start = Instant::now();

        // Phase 1: 台账规范化
        let rows = self.normalizer.normalize_ledger(ledger)?;
        let ledger_rows = rows.len();

        // Phase 2: 按 UTR 聚合
        let records = aggregate_ledger(rows);
        tracing::info!(
            "开始对账: 台账 {} 行, {} 个 UTR, 流水工作表 {} 个",
            ledger_rows,
            records.len(),
            statement.len()
        );

        // Phase 3: 逐银行匹配
        let matcher = BankMatcher::new(&self.registry, self.normalizer);
        let outcomes = matcher.match_all(&records, statement, self.parallel);

        // Phase 4: 汇总
        let stats = RunStats {
            ledger_rows,
            internal_records: records.len(),
            ..Default::default()
        };
        let outcome = compose(outcomes, stats);

        tracing::info!(
            "对账完成, 输出 {} 行 (Ok {}, fan-out {}), 耗时: {:?}",
            outcome.rows().len(),
            outcome.stats().ok_rows(),
            outcome.stats().fanout_rows(),
            start.elapsed()
        );
        Ok(outcome)
    }
}
