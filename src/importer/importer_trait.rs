// ==========================================
// 配送线路看板 - 导入 Trait
// ==========================================
// 职责: 定义导入接口（不包含实现）
// ==========================================

use crate::importer::delivery_importer::ImportOutcome;
use crate::importer::error::ImportResult;
use crate::importer::file_parser::RawSheet;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

// ==========================================
// DeliveryImporter Trait
// ==========================================
// 用途: 配送数据导入主接口
// 实现者: DeliveryImporterImpl
#[async_trait]
pub trait DeliveryImporter: Send + Sync {
    /// 从文件导入配送数据
    ///
    /// # 参数
    /// - file_path: 文件路径（.xlsx / .xls / .csv）
    ///
    /// # 返回
    /// - Ok(ImportOutcome): 规范化后的记录 + 导入报告（尚未写入记录仓）
    /// - Err: 文件读取错误、格式错误
    ///
    /// # 导入流程
    /// 1. 异步读取文件字节
    /// 2. 解析第一个工作表
    /// 3. 表头 → 列角色映射
    /// 4. 逐行规范化（区域判定、取消行排除、派生指标）
    async fn import_file(&self, file_path: &Path) -> ImportResult<ImportOutcome>;

    /// 批量导入多个文件（并发读取）
    ///
    /// # 说明
    /// - 每个文件独立,某个文件失败不影响其他文件
    /// - 返回顺序与输入顺序一致
    async fn import_files(&self, file_paths: &[PathBuf]) -> Vec<ImportResult<ImportOutcome>>;
}

// ==========================================
// SheetParser Trait
// ==========================================
// 用途: 表格解析接口（阶段 0）
// 实现者: ExcelParser, CsvParser
pub trait SheetParser: Send + Sync {
    /// 解析文件字节为表头 + 数据行
    fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<RawSheet>;
}
