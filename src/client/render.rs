//! 终端文本渲染

use std::fmt::Write;

use serde_json::Value;

use super::{GeoApi, HomePage};
use crate::storage::{GeoData, HistoryRecord};

const NOT_AVAILABLE: &str = "N/A";

/// 字段显示值；缺失、null、空串显示 N/A
fn field(geo: &GeoData, key: &str) -> String {
    optional_field(geo, key).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn optional_field(geo: &GeoData, key: &str) -> Option<String> {
    match geo.get(key)? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// 位置信息面板
pub fn render_location(geo: &GeoData) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Location Information");
    let _ = writeln!(out, "  IP Address:   {}", field(geo, "ip"));
    let _ = writeln!(out, "  City:         {}", field(geo, "city"));
    let _ = writeln!(out, "  Region:       {}", field(geo, "region"));
    let _ = writeln!(out, "  Country:      {}", field(geo, "country"));
    let _ = writeln!(out, "  Coordinates:  {}", field(geo, "loc"));
    let _ = writeln!(out, "  Timezone:     {}", field(geo, "timezone"));
    if let Some(postal) = optional_field(geo, "postal") {
        let _ = writeln!(out, "  Postal Code:  {}", postal);
    }
    if let Some(org) = optional_field(geo, "org") {
        let _ = writeln!(out, "  Organization: {}", org);
    }
    out
}

/// 历史列表；`selected` 中的条目带勾选标记
pub fn render_history(history: &[HistoryRecord], selected: &[i64]) -> String {
    if history.is_empty() {
        return "No search history\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "Search History ({})", history.len());
    for item in history {
        let mark = if selected.contains(&item.id) { "x" } else { " " };
        let _ = writeln!(
            out,
            "  [{}] #{:<5} {:<39} {}, {}  {}",
            mark,
            item.id,
            item.ip_address,
            field(&item.geo_data, "city"),
            field(&item.geo_data, "country"),
            item.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
        );
    }
    out
}

/// 整个页面
pub fn render_page<A: GeoApi>(page: &HomePage<A>) -> String {
    let state = page.state();
    let mut out = String::new();

    if let Some(error) = &state.error {
        let _ = writeln!(out, "Error: {}\n", error);
    }

    match &state.geo_data {
        Some(geo) => {
            out.push_str(&render_location(geo));
            if page.show_map() {
                let (lat, lng) = page.coordinates();
                let _ = writeln!(out, "  Map:          {:.4}, {:.4} (view #{})", lat, lng, state.map_key);
            }
        }
        None if state.loading => out.push_str("Loading...\n"),
        None => out.push_str("Enter an IP address to get started\n"),
    }

    out.push('\n');
    out.push_str(&render_history(&state.history, &state.selected));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn geo(value: Value) -> GeoData {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_render_location_fills_missing_fields() {
        let text = render_location(&geo(json!({"ip": "1.1.1.1", "city": ""})));
        assert!(text.contains("IP Address:   1.1.1.1"));
        assert!(text.contains("City:         N/A"));
        assert!(text.contains("Timezone:     N/A"));
        assert!(!text.contains("Postal Code"));
        assert!(!text.contains("Organization"));
    }

    #[test]
    fn test_render_location_optional_fields() {
        let text = render_location(&geo(json!({
            "ip": "8.8.8.8",
            "postal": "94043",
            "org": "AS15169 Google LLC"
        })));
        assert!(text.contains("Postal Code:  94043"));
        assert!(text.contains("Organization: AS15169 Google LLC"));
    }

    #[test]
    fn test_render_empty_history() {
        assert_eq!(render_history(&[], &[]), "No search history\n");
    }
}
