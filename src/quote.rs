//! 字面量转义：把 [`SqlValue`] 编码成可直接拼进 SQL 的文本。
//!
//! builder 默认走绑定参数；这里用于 DDL 里的 `DEFAULT` 值，
//! 以及 [`Gateway::quote`](crate::Gateway::quote) 的默认实现。

use crate::flavor::Flavor;
use crate::value::SqlValue;
use time::macros::format_description;

/// 以 `flavor` 的语法编码一个字面量。
pub fn quote_value(flavor: Flavor, value: &SqlValue) -> String {
    let mut out = String::new();
    encode_sql_value(&mut out, value, flavor);
    out
}

/// 以 `flavor` 的语法给字符串加引号。
pub fn quote_str(flavor: Flavor, s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 3);
    quote_string(&mut out, s, flavor);
    out
}

fn encode_sql_value(out: &mut String, v: &SqlValue, flavor: Flavor) {
    match v {
        SqlValue::Null => out.push_str("NULL"),
        SqlValue::Bool(b) => match flavor {
            Flavor::SQLServer => out.push_str(if *b { "1" } else { "0" }),
            Flavor::MySQL => out.push_str(if *b { "TRUE" } else { "FALSE" }),
        },
        SqlValue::I64(n) => out.push_str(&n.to_string()),
        SqlValue::U64(n) => out.push_str(&n.to_string()),
        SqlValue::F64(n) => out.push_str(&n.to_string()),
        SqlValue::String(s) => quote_string(out, s.as_ref(), flavor),
        SqlValue::Bytes(b) => encode_bytes(out, b, flavor),
        SqlValue::DateTime(dt) => encode_datetime(out, dt, flavor),
    }
}

fn encode_bytes(out: &mut String, data: &[u8], flavor: Flavor) {
    if data.is_empty() {
        out.push_str("NULL");
        return;
    }

    match flavor {
        Flavor::MySQL => {
            out.push_str("_binary");
            quote_string(out, &String::from_utf8_lossy(data), flavor);
        }
        Flavor::SQLServer => {
            out.push_str("0x");
            push_hex(out, data);
        }
    }
}

fn push_hex(out: &mut String, data: &[u8]) {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    for &b in data {
        out.push(HEX[((b >> 4) & 0xF) as usize] as char);
        out.push(HEX[(b & 0xF) as usize] as char);
    }
}

fn quote_string(out: &mut String, s: &str, flavor: Flavor) {
    match flavor {
        // T-SQL 没有反斜杠转义，只需把单引号写两遍。
        Flavor::SQLServer => {
            out.push_str("N'");
            out.push_str(&s.replace('\'', "''"));
            out.push('\'');
        }
        Flavor::MySQL => {
            out.push('\'');
            for ch in s.chars() {
                match ch {
                    '\u{0000}' => out.push_str("\\0"),
                    '\u{0008}' => out.push_str("\\b"),
                    '\n' => out.push_str("\\n"),
                    '\r' => out.push_str("\\r"),
                    '\t' => out.push_str("\\t"),
                    '\u{001a}' => out.push_str("\\Z"),
                    '\'' => out.push_str("\\'"),
                    '"' => out.push_str("\\\""),
                    '\\' => out.push_str("\\\\"),
                    _ => out.push(ch),
                }
            }
            out.push('\'');
        }
    }
}

fn encode_datetime(out: &mut String, dt: &time::OffsetDateTime, flavor: Flavor) {
    let formatted = match flavor {
        Flavor::MySQL => dt.format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:6]"
        )),
        Flavor::SQLServer => dt.format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:6] [offset_hour sign:mandatory]:[offset_minute]"
        )),
    };
    match formatted {
        Ok(s) => {
            out.push('\'');
            out.push_str(&s);
            out.push('\'');
        }
        // 超出格式可表示范围的年份：退回 RFC 风格的 Display。
        Err(_) => quote_string(out, &dt.to_string(), flavor),
    }
}
