// ==========================================
// 配送线路看板 - 列角色映射器
// ==========================================
// 职责: 表头文本 → 列角色（按文本匹配,不依赖列位置）
// 规则: 表头 TRIM + 小写后与固定词表精确比较
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ==========================================
// ColumnRole - 列角色
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Agent,         // 司机
    Vehicle,       // 车辆（区域来源）
    StartTime,     // 实际开始时间
    PlannedCount,  // 计划服务数
    RealizedCount, // 实际完成服务数
    Status,        // 状态（仅用于排除 "Cancelada"）
}

impl ColumnRole {
    pub const ALL: [ColumnRole; 6] = [
        ColumnRole::Agent,
        ColumnRole::Vehicle,
        ColumnRole::StartTime,
        ColumnRole::PlannedCount,
        ColumnRole::RealizedCount,
        ColumnRole::Status,
    ];

    /// 规范化后的表头文本
    pub fn header_label(&self) -> &'static str {
        match self {
            ColumnRole::Agent => "agente",
            ColumnRole::Vehicle => "veículo",
            ColumnRole::StartTime => "início - realizado",
            ColumnRole::PlannedCount => "serviços - previsto",
            ColumnRole::RealizedCount => "serviços - realizado",
            ColumnRole::Status => "situação",
        }
    }

    fn from_header(header: &str) -> Option<Self> {
        let normalized = header.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|role| role.header_label() == normalized)
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.header_label())
    }
}

// ==========================================
// ColumnMapping - 列角色 → 列下标
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnMapping {
    columns: HashMap<ColumnRole, usize>,
}

impl ColumnMapping {
    /// 由表头行解析映射
    ///
    /// 同一角色出现多次时,以最后一列为准
    pub fn resolve(headers: &[String]) -> Self {
        let mut columns = HashMap::new();
        for (idx, header) in headers.iter().enumerate() {
            if let Some(role) = ColumnRole::from_header(header) {
                columns.insert(role, idx);
            }
        }
        Self { columns }
    }

    pub fn column(&self, role: ColumnRole) -> Option<usize> {
        self.columns.get(&role).copied()
    }

    /// 读取某行某角色的单元格（未映射或越界时为空串）
    pub fn cell<'a>(&self, row: &'a [String], role: ColumnRole) -> &'a str {
        self.column(role)
            .and_then(|idx| row.get(idx))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// 未识别的列角色
    pub fn missing_roles(&self) -> Vec<ColumnRole> {
        ColumnRole::ALL
            .into_iter()
            .filter(|role| !self.columns.contains_key(role))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolve_is_case_insensitive_and_trimmed() {
        let mapping = ColumnMapping::resolve(&headers(&[
            " SITUAÇÃO ",
            "Agente",
            "Extra",
            "veículo",
            "Serviços - Previsto",
            "SERVIÇOS - REALIZADO",
            "Início - Realizado",
        ]));

        assert_eq!(mapping.column(ColumnRole::Status), Some(0));
        assert_eq!(mapping.column(ColumnRole::Agent), Some(1));
        assert_eq!(mapping.column(ColumnRole::Vehicle), Some(3));
        assert_eq!(mapping.column(ColumnRole::PlannedCount), Some(4));
        assert_eq!(mapping.column(ColumnRole::RealizedCount), Some(5));
        assert_eq!(mapping.column(ColumnRole::StartTime), Some(6));
        assert!(mapping.missing_roles().is_empty());
    }

    #[test]
    fn test_missing_roles_and_empty_cells() {
        let mapping = ColumnMapping::resolve(&headers(&["Agente", "Placa"]));
        assert_eq!(mapping.missing_roles().len(), 5);

        let row = headers(&["Ana"]);
        assert_eq!(mapping.cell(&row, ColumnRole::Agent), "Ana");
        assert_eq!(mapping.cell(&row, ColumnRole::Vehicle), "");
    }
}
