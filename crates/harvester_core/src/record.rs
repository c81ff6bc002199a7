/// Named columns derived positionally from a record's cells.
///
/// Column 0 is the key; projections start at column 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Projection {
    Category,
    Color,
    Dimensions,
    Price,
    Label,
    Score,
}

impl Projection {
    pub const ALL: [Projection; 6] = [
        Projection::Category,
        Projection::Color,
        Projection::Dimensions,
        Projection::Price,
        Projection::Label,
        Projection::Score,
    ];

    /// Cell index this projection reads from.
    pub fn column(self) -> usize {
        match self {
            Projection::Category => 1,
            Projection::Color => 2,
            Projection::Dimensions => 3,
            Projection::Price => 4,
            Projection::Label => 5,
            Projection::Score => 6,
        }
    }

    /// Field name used in the exported artifact.
    pub fn field_name(self) -> &'static str {
        match self {
            Projection::Category => "category",
            Projection::Color => "color",
            Projection::Dimensions => "dimensions",
            Projection::Price => "price",
            Projection::Label => "product",
            Projection::Score => "score",
        }
    }
}

/// One harvested row. Immutable once built; the key is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    key: String,
    fields: Vec<String>,
}

impl Record {
    /// Build a record from raw cell texts in column order.
    ///
    /// Cells are trimmed. Returns `None` when there are no cells or the first
    /// cell is empty after trimming.
    pub fn from_cells<I, S>(cells: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fields: Vec<String> = cells
            .into_iter()
            .map(|cell| cell.as_ref().trim().to_owned())
            .collect();
        let key = fields.first().filter(|k| !k.is_empty())?.clone();
        Some(Self { key, fields })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn projection(&self, projection: Projection) -> Option<&str> {
        self.fields.get(projection.column()).map(String::as_str)
    }
}
