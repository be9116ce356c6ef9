//! Query options for the people collection.
//!
//! # Responsibility
//! - Describe filter, sort and paging options as plain data.
//! - Render those options into SQL clauses with bound parameters.
//!
//! # Invariants
//! - User input only ever reaches SQL as bound values.
//! - Unsorted queries follow natural (insertion) order.

use rusqlite::types::Value;

/// Sortable document fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonSortField {
    Name,
    Age,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Filter, sort and paging options for person lookups.
///
/// Builder methods chain, so a query reads in the order it is applied:
///
/// ```
/// use personbook_core::{PersonQuery, PersonSortField, SortOrder};
///
/// let query = PersonQuery::default()
///     .with_favorite_food("burrito")
///     .order_by(PersonSortField::Name, SortOrder::Ascending)
///     .limit(2);
/// assert_eq!(query.limit, Some(2));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonQuery {
    /// Exact-match filter on `name`.
    pub name: Option<String>,
    /// Exact-match filter on membership in `favoriteFoods`.
    pub favorite_food: Option<String>,
    pub sort: Option<(PersonSortField, SortOrder)>,
    pub limit: Option<u32>,
    pub offset: u32,
}

impl PersonQuery {
    /// Query matching every person with exactly this `name`.
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Query matching every person whose favorites contain `food`.
    pub fn by_favorite_food(food: impl Into<String>) -> Self {
        Self::default().with_favorite_food(food)
    }

    pub fn with_favorite_food(mut self, food: impl Into<String>) -> Self {
        self.favorite_food = Some(food.into());
        self
    }

    pub fn order_by(mut self, field: PersonSortField, order: SortOrder) -> Self {
        self.sort = Some((field, order));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn skip(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    /// Renders `WHERE`, `ORDER BY` and `LIMIT/OFFSET` clauses.
    ///
    /// The returned SQL starts with a space and is meant to be appended to a
    /// `SELECT ... FROM people` statement.
    pub(crate) fn to_sql(&self) -> (String, Vec<Value>) {
        let mut sql = String::from(" WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(name) = &self.name {
            sql.push_str(" AND name = ?");
            bind_values.push(Value::Text(name.clone()));
        }

        if let Some(food) = &self.favorite_food {
            sql.push_str(
                " AND EXISTS (
                    SELECT 1 FROM json_each(people.favorite_foods)
                    WHERE json_each.value = ?
                )",
            );
            bind_values.push(Value::Text(food.clone()));
        }

        match self.sort {
            Some((field, order)) => {
                sql.push_str(&format!(
                    " ORDER BY {} {}, seq ASC",
                    sort_column(field),
                    sort_direction(order)
                ));
            }
            None => sql.push_str(" ORDER BY seq ASC"),
        }

        if let Some(limit) = self.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if self.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(self.offset)));
            }
        } else if self.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(self.offset)));
        }

        (sql, bind_values)
    }
}

fn sort_column(field: PersonSortField) -> &'static str {
    match field {
        PersonSortField::Name => "name",
        PersonSortField::Age => "age",
    }
}

fn sort_direction(order: SortOrder) -> &'static str {
    match order {
        SortOrder::Ascending => "ASC",
        SortOrder::Descending => "DESC",
    }
}

#[cfg(test)]
mod tests {
    use super::{PersonQuery, PersonSortField, SortOrder};
    use rusqlite::types::Value;

    #[test]
    fn default_query_uses_natural_order_without_binds() {
        let (sql, binds) = PersonQuery::default().to_sql();
        assert_eq!(sql, " WHERE 1 = 1 ORDER BY seq ASC");
        assert!(binds.is_empty());
    }

    #[test]
    fn chained_options_render_in_order() {
        let query = PersonQuery::by_favorite_food("burrito")
            .order_by(PersonSortField::Name, SortOrder::Ascending)
            .limit(2)
            .skip(1);
        let (sql, binds) = query.to_sql();

        assert!(sql.contains("json_each(people.favorite_foods)"));
        assert!(sql.contains("ORDER BY name ASC, seq ASC LIMIT ? OFFSET ?"));
        assert_eq!(
            binds,
            vec![
                Value::Text("burrito".to_string()),
                Value::Integer(2),
                Value::Integer(1),
            ]
        );
    }

    #[test]
    fn offset_without_limit_uses_unbounded_limit() {
        let (sql, binds) = PersonQuery::by_name("Mary").skip(3).to_sql();
        assert!(sql.ends_with("LIMIT -1 OFFSET ?"));
        assert_eq!(
            binds,
            vec![Value::Text("Mary".to_string()), Value::Integer(3)]
        );
    }
}
