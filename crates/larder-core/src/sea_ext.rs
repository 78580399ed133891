use sea_orm::{
    ColumnTrait, QueryFilter,
    sea_query::{Expr, Func, IntoColumnRef, SimpleExpr},
};

/// Restrict a query to one tenant. `None` leaves the query unscoped.
///
/// Implemented for every filterable statement so reads, bulk updates and deletes share
/// the same scoping.
pub trait ScopeToTenant {
    fn scope_to_tenant<C: ColumnTrait>(self, column: C, tenant: Option<i64>) -> Self;
}

impl<Q> ScopeToTenant for Q
where
    Q: QueryFilter,
{
    fn scope_to_tenant<C: ColumnTrait>(self, column: C, tenant: Option<i64>) -> Self {
        match tenant {
            Some(id) => self.filter(column.eq(id)),
            None => self,
        }
    }
}

/// `LOWER(column) LIKE '%needle%'` with the needle lowercased and LIKE wildcards escaped.
pub fn lower_contains<T: IntoColumnRef>(column: T, needle: &str) -> SimpleExpr {
    let pattern = format!("%{}%", escape_like(&needle.to_lowercase()));
    Expr::expr(Func::lower(Expr::col(column))).like(pattern)
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{
        DbBackend, EntityTrait, QueryTrait,
        sea_query::{Alias, Asterisk, PostgresQueryBuilder, Query},
    };

    mod widget {
        use sea_orm::entity::prelude::*;

        #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
        #[sea_orm(table_name = "widgets")]
        pub struct Model {
            #[sea_orm(primary_key)]
            pub id: i64,
            pub household_id: i64,
        }

        #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
        pub enum Relation {}

        impl ActiveModelBehavior for ActiveModel {}
    }

    #[test]
    fn should_filter_by_tenant_when_present() {
        let sql = widget::Entity::find()
            .scope_to_tenant(widget::Column::HouseholdId, Some(4))
            .build(DbBackend::Postgres)
            .to_string();
        assert!(sql.contains(r#""widgets"."household_id" = 4"#), "{sql}");
    }

    #[test]
    fn should_leave_query_unscoped_without_tenant() {
        let sql = widget::Entity::find()
            .scope_to_tenant(widget::Column::HouseholdId, None)
            .build(DbBackend::Postgres)
            .to_string();
        assert!(!sql.contains("WHERE"), "{sql}");
    }

    #[test]
    fn should_scope_bulk_updates() {
        let sql = widget::Entity::update_many()
            .col_expr(widget::Column::HouseholdId, Expr::value(1))
            .scope_to_tenant(widget::Column::HouseholdId, Some(9))
            .build(DbBackend::Postgres)
            .to_string();
        assert!(sql.contains(r#"WHERE "widgets"."household_id" = 9"#), "{sql}");
    }

    #[test]
    fn should_compare_lowercased_column() {
        let sql = Query::select()
            .column(Asterisk)
            .from(Alias::new("recipes"))
            .and_where(lower_contains(
                (Alias::new("recipes"), Alias::new("title")),
                "Pasta",
            ))
            .to_string(PostgresQueryBuilder);
        assert!(sql.contains(r#"LOWER("recipes"."title") LIKE"#), "{sql}");
        assert!(sql.contains("%pasta%"), "{sql}");
    }

    #[test]
    fn should_escape_like_wildcards() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }
}
