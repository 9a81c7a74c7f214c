// ==========================================
// 配送线路看板 - 配送数据导入器实现
// ==========================================
// 流程: 读取字节(异步) → 解析 → 列映射 → 规范化 → 报告
// 说明: 导入器只产出记录,写入记录仓由调用方在同一次加锁中完成
// ==========================================

use crate::domain::delivery::DeliveryRecord;
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::{ColumnMapping, ColumnRole};
use crate::importer::file_parser::{parse_sheet, RawSheet, SheetFormat};
use crate::importer::importer_trait::DeliveryImporter;
use crate::importer::normalizer::{ExclusionReason, RecordNormalizer, RowOutcome};
use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

// ==========================================
// ImportReport - 导入报告
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    /// 来源文件名
    pub source: String,
    /// 数据行总数（不含表头、空白行）
    pub total_rows: usize,
    /// 导入成功数
    pub imported: usize,
    /// 因区域为空被排除
    pub excluded_no_region: usize,
    /// 因状态为 "Cancelada" 被排除
    pub excluded_cancelled: usize,
    /// 未识别的列角色
    pub missing_columns: Vec<ColumnRole>,
    /// 耗时（毫秒）
    pub elapsed_ms: i64,
}

/// 导入结果: 记录 + 报告
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub records: Vec<DeliveryRecord>,
    pub report: ImportReport,
}

// ==========================================
// DeliveryImporterImpl
// ==========================================
#[derive(Debug, Default, Clone)]
pub struct DeliveryImporterImpl {
    normalizer: RecordNormalizer,
}

impl DeliveryImporterImpl {
    pub fn new() -> Self {
        Self::default()
    }

    /// 同步导入（字节已就绪）
    pub fn import_bytes(
        &self,
        source: &str,
        format: SheetFormat,
        bytes: &[u8],
    ) -> ImportResult<ImportOutcome> {
        let sheet = parse_sheet(format, bytes)?;
        Ok(self.import_sheet(source, &sheet))
    }

    /// 处理已解析的表格
    pub fn import_sheet(&self, source: &str, sheet: &RawSheet) -> ImportOutcome {
        let start_time = Instant::now();

        // === 步骤 1: 列映射 ===
        let mapping = ColumnMapping::resolve(&sheet.headers);
        let missing_columns = mapping.missing_roles();
        if !missing_columns.is_empty() {
            warn!(source = %source, missing = ?missing_columns, "部分列未识别,对应字段按空值处理");
        }

        // === 步骤 2: 逐行规范化 ===
        let mut report = ImportReport {
            source: source.to_string(),
            total_rows: sheet.rows.len(),
            missing_columns,
            ..ImportReport::default()
        };
        let mut records = Vec::with_capacity(sheet.rows.len());

        for (idx, row) in sheet.rows.iter().enumerate() {
            match self.normalizer.normalize(row, &mapping) {
                RowOutcome::Accepted(record) => records.push(record),
                RowOutcome::Excluded(reason) => {
                    debug!(row_number = idx + 2, reason = ?reason, "行被排除");
                    match reason {
                        ExclusionReason::NoRegion => report.excluded_no_region += 1,
                        ExclusionReason::Cancelled => report.excluded_cancelled += 1,
                    }
                }
            }
        }

        report.imported = records.len();
        report.elapsed_ms = start_time.elapsed().as_millis() as i64;

        info!(
            source = %source,
            total = report.total_rows,
            imported = report.imported,
            no_region = report.excluded_no_region,
            cancelled = report.excluded_cancelled,
            "表格规范化完成"
        );

        ImportOutcome { records, report }
    }
}

#[async_trait]
impl DeliveryImporter for DeliveryImporterImpl {
    #[instrument(skip(self), fields(file = %file_path.display()))]
    async fn import_file(&self, file_path: &Path) -> ImportResult<ImportOutcome> {
        let format = SheetFormat::from_path(file_path)?;

        // 唯一的异步边界: 读取文件字节
        let bytes = tokio::fs::read(file_path).await?;
        debug!(bytes = bytes.len(), "文件读取完成");

        let source = file_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| file_path.display().to_string());

        self.import_bytes(&source, format, &bytes)
    }

    async fn import_files(&self, file_paths: &[PathBuf]) -> Vec<ImportResult<ImportOutcome>> {
        info!(count = file_paths.len(), "开始批量导入");
        join_all(file_paths.iter().map(|p| self.import_file(p))).await
    }
}
