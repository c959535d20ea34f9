use crate::models::{
    BankStats, InternalRecord, MatchRecord, SkipReason, SkippedBank, StatementRecord, Status,
    StatusBundle, Workbook, PROJECTED_ATTRIBUTES,
};
use crate::service::normalizer::Normalizer;
use crate::service::registry::BankRegistry;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};

/// 字段级比对 (纯函数, 不依赖表结构)
///
/// utr 状态沿用原有口径: 只要关联到的流水日期可解析就算 matched, 并不比较
/// UTR 本身. 未关联到流水时四项全部 mismatched.
pub fn compute_statuses(internal: &InternalRecord, external: Option<&StatementRecord>) -> StatusBundle {
    let date = both_equal(internal.date.as_ref(), external.and_then(|e| e.date.as_ref()));
    let amount = both_equal(Some(&internal.amount), external.and_then(|e| e.amount.as_ref()));
    let bank_name = both_equal(
        internal.bank_name.as_ref(),
        external.and_then(|e| e.bank_name.as_ref()),
    );
    let utr = external.map(|e| e.date.is_some()).unwrap_or(false);

    StatusBundle::new(
        Status::from_bool(date),
        Status::from_bool(amount),
        Status::from_bool(bank_name),
        Status::from_bool(utr),
    )
}

/// 缺失值与任何值 (包括缺失值) 都不相等
fn both_equal<T: PartialEq>(left: Option<&T>, right: Option<&T>) -> bool {
    matches!((left, right), (Some(l), Some(r)) if l == r)
}

fn project(internal: &InternalRecord, statuses: StatusBundle) -> MatchRecord {
    MatchRecord {
        utr: internal.utr.clone(),
        amount: internal.amount.clone(),
        date: internal.date.clone(),
        bank_name: internal.bank_name.clone(),
        attributes: PROJECTED_ATTRIBUTES
            .iter()
            .map(|name| internal.attribute(name).cloned().unwrap_or_default())
            .collect(),
        statuses,
    }
}

/// 单个银行的匹配结果
#[derive(Debug, Clone)]
pub enum BankOutcome {
    Matched {
        rows: Vec<MatchRecord>,
        stats: BankStats,
    },
    Skipped(SkippedBank),
}

/// 按银行逐个匹配
pub struct BankMatcher<'a> {
    registry: &'a BankRegistry,
    normalizer: Normalizer,
}

impl<'a> BankMatcher<'a> {
    pub fn new(registry: &'a BankRegistry, normalizer: Normalizer) -> Self {
        Self {
            registry,
            normalizer,
        }
    }

    /// 对登记表中每家银行执行匹配, 结果顺序与登记顺序一致
    pub fn match_all(
        &self,
        records: &[InternalRecord],
        statement: &Workbook,
        parallel: bool,
    ) -> Vec<BankOutcome> {
        let banks: Vec<(&str, &str)> = self.registry.banks().collect();
        if parallel {
            // par_iter + collect 保持输入顺序
            banks
                .par_iter()
                .map(|(bank, sheet)| self.match_bank(bank, sheet, records, statement))
                .collect()
        } else {
            banks
                .iter()
                .map(|(bank, sheet)| self.match_bank(bank, sheet, records, statement))
                .collect()
        }
    }

    pub fn match_bank(
        &self,
        bank: &str,
        sheet: &str,
        records: &[InternalRecord],
        statement: &Workbook,
    ) -> BankOutcome {
        let skipped = |reason: SkipReason| {
            tracing::info!("Bank {} skipped: {:?}", bank, reason);
            BankOutcome::Skipped(SkippedBank {
                bank: bank.to_string(),
                reason,
            })
        };

        // 1. 选出该银行的内部记录
        let selected: Vec<&InternalRecord> = records
            .iter()
            .filter(|r| r.bank_name.as_deref() == Some(bank))
            .collect();
        if selected.is_empty() {
            return skipped(SkipReason::NoInternalRecords);
        }

        // 2. 定位工作表与列映射
        let Some(table) = statement.sheet(sheet) else {
            return skipped(SkipReason::SheetMissing {
                sheet: sheet.to_string(),
            });
        };
        let Some(mapping) = self.registry.mapping_for(sheet) else {
            return skipped(SkipReason::MappingMissing {
                sheet: sheet.to_string(),
            });
        };

        // 3. 规范化流水
        let statement_records = self.normalizer.normalize_statement(table, mapping);

        // 4. 预过滤: 只保留 UTR 出现在内部记录中的流水
        let keys: HashSet<&str> = selected.iter().map(|r| r.utr.as_str()).collect();
        let mut partners: HashMap<&str, Vec<&StatementRecord>> = HashMap::new();
        let mut retained = 0usize;
        for rec in &statement_records {
            if keys.contains(rec.utr.as_str()) {
                partners.entry(rec.utr.as_str()).or_default().push(rec);
                retained += 1;
            }
        }

        // 5. 左连接 + 6/7. 状态计算; 流水重复 UTR 时每个组合各出一行
        let mut rows = Vec::with_capacity(selected.len());
        let mut fanout_rows = 0usize;
        for internal in &selected {
            match partners.get(internal.utr.as_str()) {
                Some(matches) => {
                    fanout_rows += matches.len() - 1;
                    for external in matches.iter().copied() {
                        rows.push(project(internal, compute_statuses(internal, Some(external))));
                    }
                }
                None => rows.push(project(internal, compute_statuses(internal, None))),
            }
        }

        if fanout_rows > 0 {
            tracing::warn!(
                "Bank {}: sheet '{}' has duplicate UTRs, join produced {} extra rows",
                bank, sheet, fanout_rows
            );
        }

        let stats = BankStats {
            bank: bank.to_string(),
            sheet: sheet.to_string(),
            internal_records: selected.len(),
            statement_rows: statement_records.len(),
            retained_statement_rows: retained,
            output_rows: rows.len(),
            ok_rows: rows.iter().filter(|r| r.statuses.is_ok()).count(),
            fanout_rows,
        };

        tracing::info!(
            "Bank {} 匹配完成: 内部 {} 条, 流水 {}/{} 条, 输出 {} 行, Ok {} 行",
            bank,
            stats.internal_records,
            stats.retained_statement_rows,
            stats.statement_rows,
            stats.output_rows,
            stats.ok_rows
        );

        BankOutcome::Matched { rows, stats }
    }
}
