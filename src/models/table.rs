use super::Cell;
use indexmap::IndexMap;

static EMPTY_CELL: Cell = Cell::Empty;

/// 单个工作表: 表头 + 数据行
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(name: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    /// 按表头查找列下标 (重名时取第一列)
    pub fn column(&self, header: &str) -> Option<usize> {
        column_index(&self.headers, header)
    }

    /// 取单元格; 越界视为空单元格 (行长度可能短于表头)
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn column_index(headers: &[String], header: &str) -> Option<usize> {
    headers.iter().position(|h| h == header)
}

pub fn row_cell(row: &[Cell], col: Option<usize>) -> &Cell {
    col.and_then(|c| row.get(c)).unwrap_or(&EMPTY_CELL)
}

/// 多工作表文件 (保持原始工作表顺序)
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    sheets: IndexMap<String, Table>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, table: Table) {
        self.sheets.insert(table.name.clone(), table);
    }

    pub fn sheet(&self, name: &str) -> Option<&Table> {
        self.sheets.get(name)
    }

    pub fn into_first_sheet(self) -> Option<Table> {
        self.sheets.into_values().next()
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

impl FromIterator<Table> for Workbook {
    fn from_iter<I: IntoIterator<Item = Table>>(iter: I) -> Self {
        let mut workbook = Workbook::new();
        for table in iter {
            workbook.insert(table);
        }
        workbook
    }
}
