// ==========================================
// 配送线路看板 - 表格解析器
// ==========================================
// 阶段 0: 字节 → 表头 + 数据行网格
// 支持: Excel (.xlsx/.xls, 仅第一个工作表) / CSV (.csv)
// 说明: 单元格值保持原样（不 TRIM）,表头匹配时再做规范化
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::SheetParser;
use calamine::{open_workbook_auto_from_rs, Reader};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::Path;

// ==========================================
// RawSheet - 原始表格
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSheet {
    /// 第一行（表头）
    pub headers: Vec<String>,
    /// 数据行（已跳过完全空白行）
    pub rows: Vec<Vec<String>>,
}

impl RawSheet {
    /// 由网格构造: 第一行为表头
    pub fn from_grid(grid: Vec<Vec<String>>) -> Self {
        let mut iter = grid.into_iter();
        let headers = iter.next().unwrap_or_default();
        let rows = iter
            .filter(|row| !row.iter().all(|cell| cell.trim().is_empty()))
            .collect();
        Self { headers, rows }
    }
}

// ==========================================
// SheetFormat - 文件格式
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetFormat {
    Excel,
    Csv,
}

impl SheetFormat {
    /// 根据扩展名判定格式
    pub fn from_path(path: &Path) -> ImportResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "xlsx" | "xls" => Ok(SheetFormat::Excel),
            "csv" => Ok(SheetFormat::Csv),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl SheetParser for ExcelParser {
    fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<RawSheet> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

        // 只读第一个 sheet
        let sheet_names = workbook.sheet_names();
        let sheet_name = sheet_names
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;

        let range = workbook.worksheet_range(&sheet_name)?;

        let grid: Vec<Vec<String>> = range
            .rows()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect();

        if grid.is_empty() {
            return Err(ImportError::EmptySheet(sheet_name));
        }

        Ok(RawSheet::from_grid(grid))
    }
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl CsvParser {
    /// 按首行判定分隔符（巴西区域设置的导出通常为 ';'）
    fn detect_delimiter(bytes: &[u8]) -> u8 {
        let first_line = bytes.split(|b| *b == b'\n').next().unwrap_or(&[]);
        let semicolons = first_line.iter().filter(|b| **b == b';').count();
        let commas = first_line.iter().filter(|b| **b == b',').count();
        if semicolons > commas {
            b';'
        } else {
            b','
        }
    }
}

impl SheetParser for CsvParser {
    fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<RawSheet> {
        // 跳过 UTF-8 BOM
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // 允许行长度不一致
            .delimiter(Self::detect_delimiter(bytes))
            .from_reader(bytes);

        let mut grid = Vec::new();
        for result in reader.records() {
            let record = result?;
            grid.push(record.iter().map(|v| v.to_string()).collect::<Vec<_>>());
        }

        if grid.is_empty() {
            return Err(ImportError::EmptySheet("csv".to_string()));
        }

        Ok(RawSheet::from_grid(grid))
    }
}

// ==========================================
// 通用解析器（根据格式选择）
// ==========================================
pub fn parse_sheet(format: SheetFormat, bytes: &[u8]) -> ImportResult<RawSheet> {
    match format {
        SheetFormat::Excel => ExcelParser.parse_bytes(bytes),
        SheetFormat::Csv => CsvParser.parse_bytes(bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_parser_valid_bytes() {
        let data = "Agente,Veículo,Situação\nAna,SP-1,Concluída\nBeto,RJ-2,Cancelada\n";
        let sheet = CsvParser.parse_bytes(data.as_bytes()).unwrap();

        assert_eq!(sheet.headers, vec!["Agente", "Veículo", "Situação"]);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[1][2], "Cancelada");
    }

    #[test]
    fn test_csv_parser_semicolon_and_bom() {
        let data = "\u{FEFF}Agente;Veículo\nAna;SP-1\n";
        let sheet = CsvParser.parse_bytes(data.as_bytes()).unwrap();
        assert_eq!(sheet.headers, vec!["Agente", "Veículo"]);
        assert_eq!(sheet.rows, vec![vec!["Ana".to_string(), "SP-1".to_string()]]);
    }

    #[test]
    fn test_csv_parser_skip_empty_rows() {
        let data = "Agente,Veículo\nAna,SP-1\n,\nBeto,RJ-2\n";
        let sheet = CsvParser.parse_bytes(data.as_bytes()).unwrap();
        assert_eq!(sheet.rows.len(), 2);
    }

    #[test]
    fn test_csv_parser_empty_input() {
        assert!(matches!(
            CsvParser.parse_bytes(b""),
            Err(ImportError::EmptySheet(_))
        ));
    }

    #[test]
    fn test_excel_parser_reads_first_sheet_only() {
        let bytes = include_bytes!("../../tests/fixtures/rotas_dia.xlsx");
        let sheet = ExcelParser.parse_bytes(bytes).unwrap();

        assert_eq!(sheet.headers[0], "Agente");
        assert_eq!(sheet.headers[5], "Situação");
        // 第 3 行为空行,已跳过;第二个工作表不读取
        assert_eq!(sheet.rows.len(), 4);
        assert!(sheet.rows.iter().all(|row| row[0] != "Zeca"));

        // 数值单元格按整数文本输出
        assert_eq!(sheet.rows[0][3], "100");
        assert_eq!(sheet.rows[0][4], "80");
        assert_eq!(sheet.rows[0][5], "");
        assert_eq!(sheet.rows[3][4], "12.7");
    }

    #[test]
    fn test_excel_parser_rejects_garbage() {
        let result = ExcelParser.parse_bytes(b"definitely not a workbook");
        assert!(result.is_err());
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(SheetFormat::from_path(Path::new("a.XLSX")).unwrap(), SheetFormat::Excel);
        assert_eq!(SheetFormat::from_path(Path::new("a.csv")).unwrap(), SheetFormat::Csv);
        assert!(matches!(
            SheetFormat::from_path(Path::new("a.pdf")),
            Err(ImportError::UnsupportedFormat(_))
        ));
    }
}
