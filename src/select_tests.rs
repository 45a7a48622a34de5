#[cfg(test)]
mod tests {
    use crate::condition::bind;
    use crate::error::BuildError;
    use crate::expr::Expr;
    use crate::flavor::Flavor;
    use crate::modifiers::Builder;
    use crate::select::{FieldRef, JoinKind, SelectBuilder, SelectItem, Term};
    use crate::tree;
    use crate::value::SqlValue;
    use pretty_assertions::assert_eq;

    fn news_query(flavor: Flavor) -> SelectBuilder {
        let mut sb = SelectBuilder::with_flavor(flavor);
        sb.select([
            SelectItem::fields("n", ["id", "title"]),
            SelectItem::column("l.user_id").alias("liker"),
        ])
        .from("news n");
        sb.inner_join(("like", "l"), tree!(["l.news_id" => "n.id"]))
            .unwrap();
        sb
    }

    #[test]
    fn select_star_when_empty() {
        let mut sb = SelectBuilder::new();
        sb.from("news");
        assert_eq!(sb.build().0, "SELECT *\nFROM `news`");
    }

    #[test]
    fn select_fields_joins_and_where() {
        let mut sb = news_query(Flavor::MySQL);
        sb.where_(tree!(["and", ["=", "n.status", bind(1)], ["is not null", "n.title"]]))
            .unwrap();

        let (sql, args) = sb.build();
        assert_eq!(
            sql,
            "SELECT `n`.`id`, `n`.`title`, `l`.`user_id` AS `liker`\n\
             FROM `news` AS `n`\n\
             INNER JOIN `like` AS `l` ON `l`.`news_id` = `n`.`id`\n\
             WHERE (`n`.`status` = ?\n\t AND `n`.`title` IS NOT NULL)"
        );
        assert_eq!(args, vec![SqlValue::I64(1)]);
    }

    #[test]
    fn select_mssql_quotes_with_brackets() {
        let sb = news_query(Flavor::SQLServer);
        assert_eq!(
            sb.build().0,
            "SELECT [n].[id], [n].[title], [l].[user_id] AS [liker]\n\
             FROM [news] AS [n]\n\
             INNER JOIN [like] AS [l] ON [l].[news_id] = [n].[id]"
        );
    }

    #[test]
    fn select_field_aliases_raw_and_subquery_items() {
        let mut sub = SelectBuilder::new();
        sub.select([Expr::raw("COUNT(*)")])
            .from("like")
            .where_(tree!(["=", "like.news_id", "news.id"]))
            .unwrap();

        let mut sb = SelectBuilder::new();
        sb.select([
            SelectItem::fields("news", [FieldRef::from(("headline", "title"))]),
            SelectItem::from(("total", Expr::raw("1 + 1"))),
            SelectItem::query("likes", sub),
        ])
        .from("news");

        assert_eq!(
            sb.build().0,
            "SELECT `news`.`title` AS `headline`, 1 + 1 AS `total`, (\n\
             \tSELECT COUNT(*)\n\
             \tFROM `like`\n\
             \tWHERE `like`.`news_id` = `news`.`id`\n\
             ) AS `likes`\n\
             FROM `news`"
        );
    }

    #[test]
    fn select_joins_default_left_and_cross_has_no_on() {
        let mut sb = SelectBuilder::new();
        sb.from("a");
        sb.join(JoinKind::default(), "b", tree!(["b.a_id" => "a.id"]))
            .unwrap();
        sb.cross_join("c");
        assert_eq!(
            sb.build().0,
            "SELECT *\nFROM `a`\nLEFT JOIN `b` ON `b`.`a_id` = `a`.`id`\nCROSS JOIN `c`"
        );
    }

    #[test]
    fn select_subquery_in_from() {
        let mut inner = SelectBuilder::new();
        inner.select(["id"]).from("news").limit(5);
        let mut sb = SelectBuilder::new();
        sb.from((inner, "top_news"));
        assert_eq!(
            sb.build().0,
            "SELECT *\nFROM (\n\tSELECT `id`\n\tFROM `news`\n\tLIMIT 5\n) AS `top_news`"
        );
    }

    #[test]
    fn and_where_or_where_wrap_existing_tree() {
        let mut sb = SelectBuilder::new();
        sb.from("t");
        sb.and_where(tree!(["a" => 1])).unwrap();
        sb.or_where(tree!(["b" => 2])).unwrap();
        assert_eq!(
            sb.build().0,
            "SELECT *\nFROM `t`\nWHERE ((`a` = 1)\n\t OR `b` = 2)"
        );
    }

    #[test]
    fn group_having_order() {
        let mut sb = SelectBuilder::new();
        sb.select([SelectItem::column("status"), SelectItem::from(("c", "COUNT(*)"))])
            .from("news")
            .group(["status"])
            .order(["c DESC", "status"]);
        sb.having(tree!([">", "COUNT(*)", 1])).unwrap();

        assert_eq!(
            sb.build().0,
            "SELECT `status`, COUNT(*) AS `c`\n\
             FROM `news`\n\
             GROUP BY `status`\n\
             HAVING COUNT(*) > 1\n\
             ORDER BY `c` DESC, `status`"
        );
    }

    #[test]
    fn mysql_limit_offset_forms() {
        let cases = vec![
            (Some(10), None, "\nLIMIT 10"),
            (Some(10), Some(20), "\nLIMIT 20, 10"),
            (None, Some(20), "\nLIMIT 20, 18446744073709551615"),
            (None, None, ""),
        ];

        for (limit, offset, suffix) in cases {
            let mut sb = SelectBuilder::new();
            sb.from("t");
            if let Some(limit) = limit {
                sb.limit(limit);
            }
            if let Some(offset) = offset {
                sb.offset(offset);
            }
            assert_eq!(sb.build().0, format!("SELECT *\nFROM `t`{suffix}"));
        }
    }

    #[test]
    fn mssql_limit_only_uses_top() {
        let mut sb = SelectBuilder::with_flavor(Flavor::SQLServer);
        sb.select(["id"]).from("t").order(["id"]).limit(10);
        assert_eq!(sb.build().0, "SELECT TOP 10 [id]\nFROM [t]\nORDER BY [id]");
    }

    #[test]
    fn mssql_offset_rewrites_to_row_number_window() {
        let mut sb = SelectBuilder::with_flavor(Flavor::SQLServer);
        sb.from("t").limit(10).offset(20).order(["id"]);
        assert_eq!(
            sb.build().0,
            "SELECT TOP 10 *\n\
             FROM (\n\
             \tSELECT *, ROW_NUMBER() OVER (ORDER BY [id]) AS [__row_number]\n\
             \tFROM [t]\n\
             ) AS [__paged]\n\
             WHERE [__row_number] > 20\n\
             ORDER BY [__row_number]"
        );
    }

    #[test]
    fn mssql_window_order_replaces_select_aliases() {
        let mut sb = SelectBuilder::with_flavor(Flavor::SQLServer);
        sb.select([SelectItem::column("k"), SelectItem::from(("cnt", "COUNT(*)"))])
            .from("t")
            .group(["k"])
            .order(["cnt DESC", "k"])
            .limit(10)
            .offset(20);
        assert_eq!(
            sb.build().0,
            "SELECT TOP 10 *\n\
             FROM (\n\
             \tSELECT [k], COUNT(*) AS [cnt], ROW_NUMBER() OVER (ORDER BY COUNT(*) DESC, [k]) AS [__row_number]\n\
             \tFROM [t]\n\
             \tGROUP BY [k]\n\
             ) AS [__paged]\n\
             WHERE [__row_number] > 20\n\
             ORDER BY [__row_number]"
        );
    }

    #[test]
    fn mssql_window_order_falls_back_to_columns_then_null() {
        let mut sb = SelectBuilder::with_flavor(Flavor::SQLServer);
        sb.select(["id", "title"]).from("t").offset(5);
        assert!(
            sb.build()
                .0
                .contains("ROW_NUMBER() OVER (ORDER BY [id], [title]) AS [__row_number]")
        );

        let mut sb = SelectBuilder::with_flavor(Flavor::SQLServer);
        sb.from("t").offset(5);
        let sql = sb.build().0;
        assert!(sql.starts_with("SELECT *\nFROM (\n"));
        assert!(sql.contains("ROW_NUMBER() OVER (ORDER BY (SELECT NULL))"));
    }

    #[test]
    fn build_with_flavor_overrides_own_flavor() {
        let mut sb = SelectBuilder::new();
        sb.from("t").where_(tree!(["id" => bind(3)])).unwrap();
        let (sql, args) = sb.build_with_flavor(Flavor::SQLServer);
        assert_eq!(sql, "SELECT *\nFROM [t]\nWHERE [id] = @p1");
        assert_eq!(args, vec![SqlValue::I64(3)]);
    }

    #[test]
    fn to_sql_indents_every_clause() {
        let mut sb = SelectBuilder::new();
        sb.from("t").limit(1);
        assert_eq!(sb.to_sql(2).0, "\t\tSELECT *\n\t\tFROM `t`\n\t\tLIMIT 1");
    }

    #[test]
    fn add_select_conflict_leaves_state_unchanged() {
        let mut sb = SelectBuilder::new();
        sb.select(["id", "title"]).from("news");

        let err = sb.add_select(["body", "ID"]).unwrap_err();
        assert_eq!(
            err,
            BuildError::FieldConflict {
                clause: "select",
                key: "ID".to_string(),
            }
        );
        assert_eq!(sb.items().len(), 2);

        sb.add_select(["body"]).unwrap();
        assert_eq!(sb.build().0, "SELECT `id`, `title`, `body`\nFROM `news`");
    }

    #[test]
    fn add_group_and_add_order_conflicts() {
        let mut sb = SelectBuilder::new();
        sb.from("t").group(["a"]).order(["a DESC"]);

        assert!(matches!(
            sb.add_group(["b", "a"]),
            Err(BuildError::FieldConflict { clause: "group by", .. })
        ));
        assert!(matches!(
            sb.add_order([Term::parse("a").asc()]),
            Err(BuildError::FieldConflict { clause: "order by", .. })
        ));
        assert_eq!(sb.order_terms().len(), 1);

        sb.add_group(["b"]).unwrap();
        sb.add_order(["b"]).unwrap();
        assert_eq!(
            sb.build().0,
            "SELECT *\nFROM `t`\nGROUP BY `a`, `b`\nORDER BY `a` DESC, `b`"
        );
    }

    #[test]
    fn add_from_conflict_on_alias() {
        let mut sb = SelectBuilder::new();
        sb.from("news n");
        assert!(sb.add_from(("authors", "n")).is_err());
        sb.add_from("authors a").unwrap();
        assert_eq!(sb.from_tables().len(), 2);
        assert_eq!(
            sb.build().0,
            "SELECT *\nFROM `news` AS `n`, `authors` AS `a`"
        );
    }

    #[test]
    fn arity_error_surfaces_from_where() {
        let mut sb = SelectBuilder::new();
        assert!(matches!(
            sb.where_(tree!(["in", "a"])),
            Err(BuildError::InvalidArity { .. })
        ));
        assert!(sb.where_condition().is_none());
    }
}
