//! IP 地址输入处理

use std::net::Ipv6Addr;

/// 规范化查询参数中的 IP：去除首尾空白，空串视为未提供
pub fn normalize_ip_input(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

/// 是否为合法的 IPv4 点分十进制或 IPv6 地址
///
/// IPv4 每段为 1 到 3 位数字且不超过 255，允许前导零（`010.0.0.1`）。
/// IPv6 只接受十六进制分组形式，不接受内嵌 IPv4（`::ffff:192.0.2.1`）。
pub fn is_valid_ip(input: &str) -> bool {
    is_valid_ipv4(input) || is_valid_ipv6(input)
}

fn is_valid_ipv4(input: &str) -> bool {
    let octets: Vec<&str> = input.split('.').collect();
    octets.len() == 4
        && octets.iter().all(|o| {
            (1..=3).contains(&o.len())
                && o.bytes().all(|b| b.is_ascii_digit())
                && o.parse::<u16>().is_ok_and(|v| v <= 255)
        })
}

fn is_valid_ipv6(input: &str) -> bool {
    !input.contains('.') && input.parse::<Ipv6Addr>().is_ok()
}
