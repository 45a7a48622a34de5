//! 字符串拼接工具：语句按“每个子句一行”输出，行首带缩进。

use crate::args::indent;

#[derive(Debug, Default, Clone)]
pub(crate) struct StringBuilder {
    buf: String,
}

impl StringBuilder {
    pub(crate) fn new() -> Self {
        Self { buf: String::new() }
    }

    /// 写入 `s`；如果不是首次写入，会先写入一个空格。
    pub(crate) fn write_leading(&mut self, s: &str) {
        if !self.buf.is_empty() {
            self.buf.push(' ');
        }
        self.buf.push_str(s);
    }

    /// 写入一行子句：非首行先换行，然后写入 `level` 个制表符。
    pub(crate) fn write_line(&mut self, level: usize, line: &str) {
        if !self.buf.is_empty() {
            self.buf.push('\n');
        }
        self.buf.push_str(&indent(level));
        self.buf.push_str(line);
    }

    pub(crate) fn write_str(&mut self, s: &str) {
        self.buf.push_str(s);
    }

    /// 用 `sep` 连接非空的 `items`。
    pub(crate) fn write_strings(&mut self, items: &[String], sep: &str) {
        let mut first_added = false;
        for s in items {
            if s.is_empty() {
                continue;
            }
            if first_added {
                self.buf.push_str(sep);
            }
            self.buf.push_str(s);
            first_added = true;
        }
    }

    pub(crate) fn into_string(self) -> String {
        self.buf
    }
}

/// 用 `sep` 连接非空字符串。
pub(crate) fn join_non_empty(items: &[String], sep: &str) -> String {
    let mut sb = StringBuilder::new();
    sb.write_strings(items, sep);
    sb.into_string()
}

#[cfg(test)]
mod tests {
    use super::StringBuilder;

    #[test]
    fn write_line_indents_and_breaks() {
        let mut sb = StringBuilder::new();
        sb.write_line(1, "SELECT *");
        sb.write_line(1, "FROM `t`");
        assert_eq!(sb.into_string(), "\tSELECT *\n\tFROM `t`");
    }

    #[test]
    fn write_strings_skips_empty() {
        let mut sb = StringBuilder::new();
        sb.write_leading("INSERT");
        sb.write_leading("INTO");
        sb.write_str(" ");
        sb.write_strings(&["a".into(), String::new(), "b".into()], ", ");
        assert_eq!(sb.into_string(), "INSERT INTO a, b");
    }
}
