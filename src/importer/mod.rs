// ==========================================
// 配送线路看板 - 导入层
// ==========================================
// 职责: 外部表格导入,生成规范化配送记录
// 支持: Excel (.xlsx/.xls), CSV
// ==========================================

// 模块声明
pub mod data_cleaner;
pub mod delivery_importer;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod importer_trait;
pub mod normalizer;

// 重导出核心类型
pub use delivery_importer::{DeliveryImporterImpl, ImportOutcome, ImportReport};
pub use error::{ImportError, ImportResult};
pub use field_mapper::{ColumnMapping, ColumnRole};
pub use file_parser::{parse_sheet, CsvParser, ExcelParser, RawSheet, SheetFormat};
pub use normalizer::{ExclusionReason, RecordNormalizer, RowOutcome, CANCELLED_STATUS};

// 重导出 Trait 接口
pub use importer_trait::{DeliveryImporter, SheetParser};
