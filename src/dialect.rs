//! 方言策略：标识符转义字符、分页方式、Upsert 能力与占位符风格。

/// SQL 占位符风格。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// 使用 `?` 作为占位符（MySQL）。
    QuestionMark,
    /// 使用 `@p1, @p2, ...` 作为占位符（SQL Server）。
    AtNumbered,
}

impl Placeholder {
    pub(crate) fn write_placeholder(self, index_1_based: usize, out: &mut String) {
        match self {
            Self::QuestionMark => out.push('?'),
            Self::AtNumbered => {
                out.push_str("@p");
                out.push_str(&index_1_based.to_string());
            }
        }
    }
}

/// 分页语法。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pagination {
    /// `LIMIT offset, count`
    LimitOffset,
    /// `TOP n`，带 offset 时改写为 `ROW_NUMBER()` 窗口子查询。
    TopRowNumber,
}

/// 目标库的 Upsert 能力。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// `ON DUPLICATE KEY UPDATE col = VALUES(col)`
    OnDuplicateKeyUpdate,
    Unsupported,
}

/// 由 [`Flavor`](crate::Flavor) 选出的一组渲染策略。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub open_quote: char,
    pub close_quote: char,
    pub pagination: Pagination,
    pub upsert: Upsert,
    pub placeholder: Placeholder,
}

impl Dialect {
    pub const MYSQL: Dialect = Dialect {
        open_quote: '`',
        close_quote: '`',
        pagination: Pagination::LimitOffset,
        upsert: Upsert::OnDuplicateKeyUpdate,
        placeholder: Placeholder::QuestionMark,
    };

    pub const MSSQL: Dialect = Dialect {
        open_quote: '[',
        close_quote: ']',
        pagination: Pagination::TopRowNumber,
        upsert: Upsert::Unsupported,
        placeholder: Placeholder::AtNumbered,
    };

    /// 转义可能带限定符的标识符：按 `.` 拆段逐段加引号。
    pub fn quote_ident(&self, name: &str) -> String {
        let mut out = String::with_capacity(name.len() + 4);
        for (i, segment) in name.split('.').enumerate() {
            if i > 0 {
                out.push('.');
            }
            self.write_segment(segment, &mut out);
        }
        out
    }

    fn write_segment(&self, segment: &str, out: &mut String) {
        let already_quoted = segment.len() >= 2
            && segment.starts_with(self.open_quote)
            && segment.ends_with(self.close_quote);
        if segment == "*" || segment.is_empty() || already_quoted {
            out.push_str(segment);
            return;
        }

        out.push(self.open_quote);
        for c in segment.chars() {
            if c == self.close_quote {
                out.push(c);
            }
            out.push(c);
        }
        out.push(self.close_quote);
    }
}

#[cfg(test)]
mod tests {
    use super::{Dialect, Placeholder};

    #[test]
    fn write_placeholder_question_mark() {
        let mut s = String::new();
        Placeholder::QuestionMark.write_placeholder(1, &mut s);
        assert_eq!(s, "?");
    }

    #[test]
    fn write_placeholder_at_numbered() {
        let mut s = String::new();
        Placeholder::AtNumbered.write_placeholder(12, &mut s);
        assert_eq!(s, "@p12");
    }

    #[test]
    fn quote_ident_keeps_quoted_segments() {
        assert_eq!(Dialect::MSSQL.quote_ident("[dbo].news"), "[dbo].[news]");
        assert_eq!(Dialect::MYSQL.quote_ident("`n`.title"), "`n`.`title`");
    }
}
