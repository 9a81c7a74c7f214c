// ==========================================
// 配送线路看板 - 人工输入解析
// ==========================================
// 规则: 空串视为 0;非数字、负数、带小数、超过 MAX_COUNT 的值一律拒绝（返回 None）
// 调用方对 None 做静默忽略,不向外抛错
// ==========================================

use crate::domain::delivery::MAX_COUNT;

/// 解析人工录入的计数值
pub fn parse_count_input(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0);
    }

    let value = match trimmed.parse::<i64>() {
        Ok(v) => v,
        Err(_) => {
            let f = trimmed.parse::<f64>().ok()?;
            if !f.is_finite() || f.fract() != 0.0 || f.abs() > MAX_COUNT as f64 {
                return None;
            }
            f as i64
        }
    };

    (0..=MAX_COUNT).contains(&value).then_some(value)
}
