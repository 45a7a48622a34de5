#[cfg(test)]
mod tests {
    use crate::create_table::{CreateTableBuilder, create_table, drop_table, truncate_table};
    use crate::flavor::Flavor;
    use crate::modifiers::Builder;
    use crate::schema::{ColumnDescriptor, Columns};
    use pretty_assertions::assert_eq;

    fn news_columns() -> Columns {
        [
            ColumnDescriptor::new("id", "int(11)")
                .primary()
                .extra("auto_increment"),
            ColumnDescriptor::new("title", "varchar(255)").nullable(true),
            ColumnDescriptor::new("status", "tinyint(1)").default_value("0"),
            ColumnDescriptor::new("created", "datetime")
                .default_value("CURRENT_TIMESTAMP")
                .indexed(),
            ColumnDescriptor::new("code", "varchar(8)").default_value("abc"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn create_table_mysql() {
        let mut ctb = create_table("news", news_columns());
        ctb.if_not_exists();

        let (sql, args) = ctb.build();
        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS `news` (\n\
             \t`id` int(11) NOT NULL auto_increment,\n\
             \t`title` varchar(255) DEFAULT NULL,\n\
             \t`status` tinyint(1) NOT NULL DEFAULT 0,\n\
             \t`created` datetime NOT NULL DEFAULT CURRENT_TIMESTAMP,\n\
             \t`code` varchar(8) NOT NULL DEFAULT 'abc',\n\
             \tPRIMARY KEY (`id`),\n\
             \tKEY `created` (`created`)\n\
             ) ENGINE=InnoDB DEFAULT CHARSET=utf8"
        );
        assert!(args.is_empty());
    }

    #[test]
    fn create_table_mssql_guarded_by_object_id() {
        let columns: Columns = [
            ColumnDescriptor::new("id", "int")
                .primary()
                .extra("auto_increment"),
            ColumnDescriptor::new("created", "datetime").indexed(),
        ]
        .into_iter()
        .collect();
        let mut ctb = CreateTableBuilder::with_flavor(Flavor::SQLServer);
        ctb.create_table("news").columns(columns).if_not_exists();

        assert_eq!(
            ctb.build().0,
            "IF OBJECT_ID(N'news', N'U') IS NULL CREATE TABLE [news] (\n\
             \t[id] int NOT NULL IDENTITY(1,1),\n\
             \t[created] datetime NOT NULL,\n\
             \tPRIMARY KEY ([id]),\n\
             \tINDEX [ix_news_created] ([created])\n\
             )"
        );
    }

    #[test]
    fn create_table_without_guard() {
        let columns: Columns = [ColumnDescriptor::new("id", "int")].into_iter().collect();
        let ctb = create_table("t", columns);
        assert_eq!(
            ctb.build().0,
            "CREATE TABLE `t` (\n\t`id` int NOT NULL\n) ENGINE=InnoDB DEFAULT CHARSET=utf8"
        );
        assert_eq!(
            ctb.build_with_flavor(Flavor::SQLServer).0,
            "CREATE TABLE [t] (\n\t[id] int NOT NULL\n)"
        );
    }

    #[test]
    fn drop_and_truncate() {
        let mut dtb = drop_table("news");
        assert_eq!(dtb.build().0, "DROP TABLE `news`");
        dtb.if_exists();
        assert_eq!(dtb.build().0, "DROP TABLE IF EXISTS `news`");
        assert_eq!(
            dtb.build_with_flavor(Flavor::SQLServer).0,
            "DROP TABLE IF EXISTS [news]"
        );

        let ttb = truncate_table("news");
        assert_eq!(ttb.build().0, "TRUNCATE TABLE `news`");
        assert_eq!(
            ttb.build_with_flavor(Flavor::SQLServer).0,
            "TRUNCATE TABLE [news]"
        );
    }
}
