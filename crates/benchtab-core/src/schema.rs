//! Column schema derived from a result type's declared fields.
//!
//! A result type implements [`TableRow`] and registers its fields once in
//! [`TableRow::describe`]. [`schema_of`] turns that registration into an
//! ordered, immutable [`Schema`] and caches it for the rest of the process.
//!
//! Width, format and visibility resolve independently through
//! field → type default → global default.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use crate::error::SchemaError;
use crate::format::{Template, Value};

/// Column width used when neither the field nor the type declares one.
pub const DEFAULT_WIDTH: usize = 20;

/// Order of fields that do not declare one; they sort after all ordered fields.
pub const ORDER_LAST: i32 = i32::MAX;

/// Where a column is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    /// Console only.
    Console,
    /// File outputs only.
    File,
    /// Everywhere.
    #[default]
    All,
    /// Nowhere; a field declared `None` is left out of the schema.
    None,
}

/// Kind of output destination, for visibility decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    Console,
    File,
}

impl Visibility {
    pub fn shows_on(self, sink: SinkKind) -> bool {
        match self {
            Visibility::All => true,
            Visibility::Console => sink == SinkKind::Console,
            Visibility::File => sink == SinkKind::File,
            Visibility::None => false,
        }
    }
}

/// A result type that can be rendered as a table row.
pub trait TableRow: Sized + Send + Sync + 'static {
    /// Register the type's defaults and fields, in declaration order.
    fn describe(table: &mut TableSpec<Self>);
}

type Accessor<R> = Box<dyn Fn(&R) -> Value + Send + Sync>;

struct FieldDecl<R> {
    key: &'static str,
    name: Option<String>,
    order: Option<i32>,
    width: Option<usize>,
    format: Option<String>,
    visibility: Option<Visibility>,
    accessor: Accessor<R>,
}

/// Field registration table filled in by [`TableRow::describe`].
pub struct TableSpec<R> {
    default_width: Option<usize>,
    default_format: Option<String>,
    default_visibility: Option<Visibility>,
    fields: Vec<FieldDecl<R>>,
}

impl<R: 'static> TableSpec<R> {
    fn new() -> Self {
        Self {
            default_width: None,
            default_format: None,
            default_visibility: None,
            fields: Vec::new(),
        }
    }

    /// Width of every field that does not declare its own.
    pub fn default_width(&mut self, width: usize) -> &mut Self {
        self.default_width = Some(width);
        self
    }

    /// Format template of every field that does not declare its own.
    pub fn default_format(&mut self, format: impl Into<String>) -> &mut Self {
        self.default_format = Some(format.into());
        self
    }

    /// Visibility of every field that does not declare its own.
    pub fn default_visibility(&mut self, visibility: Visibility) -> &mut Self {
        self.default_visibility = Some(visibility);
        self
    }

    /// Declare a field. `key` identifies it in errors; the header text is set with
    /// [`FieldBuilder::name`].
    pub fn field<V, F>(&mut self, key: &'static str, get: F) -> FieldBuilder<'_, R>
    where
        V: Into<Value> + 'static,
        F: Fn(&R) -> V + Send + Sync + 'static,
    {
        self.fields.push(FieldDecl {
            key,
            name: None,
            order: None,
            width: None,
            format: None,
            visibility: None,
            accessor: Box::new(move |row: &R| -> Value { get(row).into() }),
        });
        let index = self.fields.len() - 1;
        FieldBuilder {
            decl: &mut self.fields[index],
        }
    }
}

/// Per-field metadata setters returned by [`TableSpec::field`].
pub struct FieldBuilder<'a, R> {
    decl: &'a mut FieldDecl<R>,
}

impl<R> FieldBuilder<'_, R> {
    /// Header text of the column.
    pub fn name(self, name: impl Into<String>) -> Self {
        self.decl.name = Some(name.into());
        self
    }

    pub fn order(self, order: i32) -> Self {
        self.decl.order = Some(order);
        self
    }

    pub fn width(self, width: usize) -> Self {
        self.decl.width = Some(width);
        self
    }

    pub fn format(self, format: impl Into<String>) -> Self {
        self.decl.format = Some(format.into());
        self
    }

    pub fn show(self, visibility: Visibility) -> Self {
        self.decl.visibility = Some(visibility);
        self
    }

    /// Shorthand for `show(Visibility::None)`.
    pub fn hidden(self) -> Self {
        self.show(Visibility::None)
    }
}

/// One rendered column of a result type.
pub struct Column<R> {
    name: String,
    width: usize,
    format: Option<Template>,
    visibility: Visibility,
    accessor: Accessor<R>,
}

impl<R> Column<R> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn shows_on(&self, sink: SinkKind) -> bool {
        self.visibility.shows_on(sink)
    }

    /// Raw value of this column for `row`.
    pub fn value(&self, row: &R) -> Value {
        (self.accessor)(row)
    }

    /// Display text: the format applied to the value, else its default text.
    pub fn cell(&self, row: &R) -> String {
        let value = self.value(row);
        match &self.format {
            Some(template) => template.render(&value),
            None => value.to_string(),
        }
    }
}

impl<R> std::fmt::Debug for Column<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Column")
            .field("name", &self.name)
            .field("width", &self.width)
            .field("format", &self.format)
            .field("visibility", &self.visibility)
            .finish_non_exhaustive()
    }
}

/// Ordered columns of a result type.
pub struct Schema<R> {
    columns: Vec<Column<R>>,
}

impl<R> std::fmt::Debug for Schema<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(&self.columns).finish()
    }
}

impl<R: TableRow> Schema<R> {
    /// Derive the schema from `R`'s registration without consulting the cache.
    pub fn derive() -> Result<Self, SchemaError> {
        let type_name = std::any::type_name::<R>();
        let mut spec = TableSpec::new();
        R::describe(&mut spec);

        let TableSpec {
            default_width,
            default_format,
            default_visibility,
            fields,
        } = spec;

        let mut fields: Vec<FieldDecl<R>> = fields
            .into_iter()
            .filter(|f| f.visibility != Some(Visibility::None))
            .collect();
        // Stable: equal orders keep declaration order.
        fields.sort_by_key(|f| f.order.unwrap_or(ORDER_LAST));

        let mut columns = Vec::with_capacity(fields.len());
        for field in fields {
            let name = match field.name {
                Some(name) if !name.is_empty() => name,
                _ => {
                    return Err(SchemaError::MissingName {
                        type_name,
                        field: field.key,
                    })
                }
            };
            let width = field.width.or(default_width).unwrap_or(DEFAULT_WIDTH);
            if width == 0 {
                return Err(SchemaError::ZeroWidth {
                    type_name,
                    field: field.key,
                });
            }
            let format = field
                .format
                .or_else(|| default_format.clone())
                .map(|f| Template::parse(&f))
                .transpose()
                .map_err(|source| SchemaError::Format {
                    type_name,
                    field: field.key,
                    source,
                })?;
            let visibility = field
                .visibility
                .or(default_visibility)
                .unwrap_or_default();

            columns.push(Column {
                name,
                width,
                format,
                visibility,
                accessor: field.accessor,
            });
        }

        tracing::debug!(type_name, columns = columns.len(), "derived table schema");
        Ok(Self { columns })
    }
}

impl<R> Schema<R> {
    pub fn columns(&self) -> &[Column<R>] {
        &self.columns
    }

    /// Columns shown on the given kind of sink, in order.
    pub fn visible(&self, sink: SinkKind) -> impl Iterator<Item = &Column<R>> {
        self.columns.iter().filter(move |c| c.shows_on(sink))
    }

    /// Sum of visible column widths plus one for the closing border.
    pub fn total_width(&self, sink: SinkKind) -> usize {
        self.visible(sink).map(Column::width).sum::<usize>() + 1
    }
}

type Registry = Mutex<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>;

fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Schema of `R`, derived on first use and shared afterwards.
/// Failed derivations are not cached.
pub fn schema_of<R: TableRow>() -> Result<Arc<Schema<R>>, SchemaError> {
    let key = TypeId::of::<R>();
    if let Some(cached) = registry()
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&key)
        .cloned()
    {
        if let Ok(schema) = cached.downcast::<Schema<R>>() {
            return Ok(schema);
        }
    }

    let schema = Arc::new(Schema::<R>::derive()?);
    let mut map = registry().lock().unwrap_or_else(PoisonError::into_inner);
    // Another thread may have derived it meanwhile; keep the first one.
    let entry = map
        .entry(key)
        .or_insert_with(|| Arc::clone(&schema) as Arc<dyn Any + Send + Sync>);
    Ok(Arc::clone(entry).downcast::<Schema<R>>().unwrap_or(schema))
}
