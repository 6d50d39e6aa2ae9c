//! Static model metadata.
//!
//! Each entity declares its persisted fields once; consumers such as the
//! admin registry read these tables instead of inspecting types at runtime.

/// Kind of a declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Scalar,
    /// Foreign key to the named model.
    ForeignKey(&'static str),
    ManyToMany(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMeta {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldMeta {
    pub const fn scalar(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Scalar,
        }
    }

    pub const fn foreign_key(name: &'static str, to: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::ForeignKey(to),
        }
    }
}

/// Declared shape of one entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelMeta {
    /// Lowercase model name, also used in admin URLs.
    pub name: &'static str,
    pub verbose_name: &'static str,
    pub verbose_name_plural: &'static str,
    pub fields: &'static [FieldMeta],
}

impl ModelMeta {
    /// Names of every field stored on the model's own table.
    pub fn concrete_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields
            .iter()
            .filter(|f| !matches!(f.kind, FieldKind::ManyToMany(_)))
            .map(|f| f.name)
    }
}
