//! Builder for table select requests.

use url::Url;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Ascending,
    Descending,
}

impl Order {
    const fn suffix(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

/// A select against one table: columns, equality filters and ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableQuery {
    table: String,
    columns: String,
    filters: Vec<(String, String)>,
    order: Option<(String, Order)>,
}

impl TableQuery {
    /// Select every column of `table`.
    #[must_use]
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: "*".to_string(),
            filters: Vec::new(),
            order: None,
        }
    }

    #[must_use]
    pub fn columns(mut self, columns: &str) -> Self {
        self.columns = columns.to_string();
        self
    }

    /// Keep rows where `column` equals `value`.
    #[must_use]
    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.filters
            .push((column.to_string(), format!("eq.{}", value.to_string())));
        self
    }

    #[must_use]
    pub fn order(mut self, column: &str, order: Order) -> Self {
        self.order = Some((column.to_string(), order));
        self
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Resolve against the backend's REST root (`.../rest/v1/`).
    ///
    /// # Errors
    ///
    /// Returns an error if the table name does not form a valid URL path.
    pub fn to_url(&self, rest_root: &Url) -> Result<Url, url::ParseError> {
        let mut url = rest_root.join(&self.table)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("select", &self.columns);
            for (column, filter) in &self.filters {
                pairs.append_pair(column, filter);
            }
            if let Some((column, order)) = &self.order {
                pairs.append_pair("order", &format!("{column}.{}", order.suffix()));
            }
        }
        Ok(url)
    }
}
