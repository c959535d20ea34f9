pub mod export;
pub mod workbook;

pub use export::{to_csv, to_xlsx, write_csv, ExportFormat, XLSX_FILE_NAME, XLSX_MIME};
pub use workbook::{read_first_sheet, read_workbook};
