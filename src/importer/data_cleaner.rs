// ==========================================
// 配送线路看板 - 单元格清洗
// ==========================================
// 职责: 导入阶段的数值强制转换 / 空值标准化
// 规则: 导入永不因单元格失败,非数字或缺失一律按 0
// ==========================================

use crate::domain::delivery::MAX_COUNT;

/// 单元格 → 计数（非数字/缺失/非有限值 → 0,小数截断,结果限定在 [0, MAX_COUNT]）
pub fn coerce_count(value: &str) -> i64 {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return 0;
    }

    let raw = match trimmed.parse::<i64>() {
        Ok(v) => v,
        Err(_) => match trimmed.parse::<f64>() {
            Ok(f) if f.is_finite() => f.trunc().clamp(0.0, MAX_COUNT as f64) as i64,
            _ => 0,
        },
    };
    raw.clamp(0, MAX_COUNT)
}

/// 空串 → None
pub fn normalize_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
