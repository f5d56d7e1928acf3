use crate::*;

/// Descriptor is the declared shape of one table.
///
/// An ordered column -> SQL type mapping, an optional composite primary key,
/// and the table's name. Construction validates the declaration; a built
/// descriptor is immutable.
///
/// # Invariants
///
/// - `name` and `schema` are non-empty
/// - column names are unique, ignoring ASCII case
/// - every primary-key column is declared, none repeated
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "Declaration", into = "Declaration")]
pub struct Descriptor {
    name: String,
    schema: Vec<(String, String)>,
    primary: Vec<String>,
}

impl Descriptor {
    pub fn new<N, C, T, K>(
        name: N,
        schema: impl IntoIterator<Item = (C, T)>,
        primary: impl IntoIterator<Item = K>,
    ) -> Result<Self>
    where
        N: Into<String>,
        C: Into<String>,
        T: Into<String>,
        K: Into<String>,
    {
        let name = name.into();
        let schema = schema
            .into_iter()
            .map(|(c, t)| (c.into(), t.into()))
            .collect::<Vec<(String, String)>>();
        let primary = primary.into_iter().map(Into::into).collect::<Vec<String>>();
        if name.trim().is_empty() || schema.is_empty() {
            return Err(Error::Config(
                "both a table name and a non-empty schema must be declared".into(),
            ));
        }
        if let Some((i, (column, _))) = schema
            .iter()
            .enumerate()
            .find(|(i, (c, _))| schema[..*i].iter().any(|(d, _)| d.eq_ignore_ascii_case(c)))
        {
            return Err(Error::Config(format!(
                "column {} declared twice (position {})",
                column, i
            )));
        }
        if let Some(key) = primary
            .iter()
            .find(|k| !schema.iter().any(|(c, _)| c == *k))
        {
            return Err(Error::Config(format!(
                "primary key column {} is not in the schema",
                key
            )));
        }
        if let Some((_, key)) = primary
            .iter()
            .enumerate()
            .find(|(i, k)| primary[..*i].contains(k))
        {
            return Err(Error::Config(format!(
                "primary key column {} repeated",
                key
            )));
        }
        Ok(Self {
            name,
            schema,
            primary,
        })
    }

    /// The same declaration stored under a different table name.
    pub fn renamed(&self, name: impl Into<String>) -> Result<Self> {
        Self::new(name, self.schema.clone(), self.primary.clone())
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn schema(&self) -> &[(String, String)] {
        &self.schema
    }
    /// Primary-key columns in declared order, if any are configured.
    pub fn primary(&self) -> Option<&[String]> {
        match self.primary.is_empty() {
            true => None,
            false => Some(&self.primary),
        }
    }

    /// Declared spelling of `column`, matched ignoring ASCII case.
    pub fn column(&self, column: &str) -> Option<&str> {
        self.schema
            .iter()
            .map(|(c, _)| c.as_str())
            .find(|c| c.eq_ignore_ascii_case(column))
    }

    pub fn is_key(&self, column: &str) -> bool {
        self.primary.iter().any(|k| k == column)
    }

    /// `CREATE TABLE IF NOT EXISTS` DDL, columns then key in declared order.
    pub fn creates(&self) -> String {
        let columns = self
            .schema
            .iter()
            .map(|(c, t)| format!("{} {}", quote(c), t))
            .chain(
                self.primary()
                    .map(|keys| format!("PRIMARY KEY ({})", quotes(keys))),
            )
            .collect::<Vec<_>>()
            .join(", ");
        format!("CREATE TABLE IF NOT EXISTS {} ({})", quote(&self.name), columns)
    }
}

/// Serialized form of a [`Descriptor`], as read from declaration files.
///
/// ```json
/// { "name": "users", "schema": [["id", "INTEGER"], ["name", "TEXT"]], "primary_key": ["id"] }
/// ```
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Declaration {
    pub name: String,
    pub schema: Vec<(String, String)>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub primary_key: Vec<String>,
}

impl TryFrom<Declaration> for Descriptor {
    type Error = Error;
    fn try_from(d: Declaration) -> Result<Self> {
        Self::new(d.name, d.schema, d.primary_key)
    }
}

impl From<Descriptor> for Declaration {
    fn from(d: Descriptor) -> Self {
        Self {
            name: d.name,
            schema: d.schema,
            primary_key: d.primary,
        }
    }
}
