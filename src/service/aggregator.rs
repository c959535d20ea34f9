use crate::models::{InternalRecord, LedgerRow};
use bigdecimal::{BigDecimal, Zero};
use indexmap::map::Entry;
use indexmap::IndexMap;

impl InternalRecord {
    fn from_first_row(row: LedgerRow) -> Self {
        Self {
            utr: row.utr,
            amount: row.amount.unwrap_or_else(BigDecimal::zero),
            date: row.date,
            bank_name: row.bank_name,
            attributes: row.attributes,
            source_rows: 1,
        }
    }

    /// 合并同一 UTR 的后续行: 金额累加, 其他字段保留首个非空值
    fn absorb(&mut self, row: LedgerRow) {
        if let Some(amount) = row.amount {
            self.amount += amount;
        }
        if self.date.is_none() {
            self.date = row.date;
        }
        if self.bank_name.is_none() {
            self.bank_name = row.bank_name;
        }
        for (name, value) in row.attributes {
            self.attributes.entry(name).or_insert(value);
        }
        self.source_rows += 1;
    }
}

/// 按 UTR 去重聚合台账
///
/// 输出每个不同 UTR 恰好一条, 按 UTR 升序排列. 重复行中与首行不一致的
/// 非金额字段被直接丢弃, 不做一致性校验.
pub fn aggregate_ledger(rows: Vec<LedgerRow>) -> Vec<InternalRecord> {
    let total_rows = rows.len();
    let mut groups: IndexMap<String, InternalRecord> = IndexMap::with_capacity(total_rows);

    for row in rows {
        match groups.entry(row.utr.clone()) {
            Entry::Occupied(mut e) => e.get_mut().absorb(row),
            Entry::Vacant(e) => {
                e.insert(InternalRecord::from_first_row(row));
            }
        }
    }

    groups.sort_unstable_keys();

    tracing::info!(
        "台账聚合完成: {} 行 -> {} 个 UTR (合并 {} 行)",
        total_rows,
        groups.len(),
        total_rows - groups.len()
    );

    groups.into_values().collect()
}
