//! Static field metadata for property-bag models.
//!
//! # Design
//! Each model declares a `const` table of `FieldDescriptor`s in declaration
//! order and wraps it in a `ModelSchema` built once behind a `OnceLock`. The
//! schema is read-only after construction and shared freely between threads.
//!
//! Flags on a descriptor may conflict; that is never an error. The effective
//! behaviour is resolved by precedence: ignore, then pair splice, then complex
//! pass-through, then scalar.

use std::collections::HashMap;

use tracing::warn;

/// How a date or instant field is rendered into a pair value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateEncoding {
    /// `yyyy-MM-dd`.
    #[default]
    None,
    /// Milliseconds since the Unix epoch of the exact instant.
    EpochMillis,
    /// Milliseconds since the Unix epoch of midnight UTC on the value's date.
    EpochDateOnly,
}

/// The resolved behaviour of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Ignored,
    /// The field holds pairs that are spliced into the parent sequence.
    PairSplice,
    /// The field's value is emitted as nested JSON.
    Complex,
    Scalar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    wire_name: &'static str,
    ignore: bool,
    date_encoding: DateEncoding,
    complex: bool,
    pairs: bool,
}

impl FieldDescriptor {
    pub const fn new(wire_name: &'static str) -> Self {
        Self {
            wire_name,
            ignore: false,
            date_encoding: DateEncoding::None,
            complex: false,
            pairs: false,
        }
    }

    pub const fn ignored(mut self) -> Self {
        self.ignore = true;
        self
    }

    pub const fn date(mut self, encoding: DateEncoding) -> Self {
        self.date_encoding = encoding;
        self
    }

    pub const fn complex(mut self) -> Self {
        self.complex = true;
        self
    }

    pub const fn pairs(mut self) -> Self {
        self.pairs = true;
        self
    }

    pub fn wire_name(&self) -> &'static str {
        self.wire_name
    }

    pub fn date_encoding(&self) -> DateEncoding {
        self.date_encoding
    }

    pub fn kind(&self) -> FieldKind {
        if self.ignore {
            FieldKind::Ignored
        } else if self.pairs {
            FieldKind::PairSplice
        } else if self.complex {
            FieldKind::Complex
        } else {
            FieldKind::Scalar
        }
    }

    /// Whether an inbound pair with this wire name may be assigned.
    pub fn accepts_pair(&self) -> bool {
        matches!(self.kind(), FieldKind::Scalar | FieldKind::Complex)
    }
}

/// The ordered descriptor table of one model type.
#[derive(Debug)]
pub struct ModelSchema {
    name: &'static str,
    fields: Vec<FieldDescriptor>,
    by_wire_name: HashMap<&'static str, usize>,
}

impl ModelSchema {
    /// Indexes `fields` by wire name. If two descriptors share a name, the one
    /// declared first is the one hydration assigns to.
    pub fn new(name: &'static str, fields: &[FieldDescriptor]) -> Self {
        let mut by_wire_name = HashMap::with_capacity(fields.len());
        for (index, field) in fields.iter().enumerate() {
            if by_wire_name.contains_key(field.wire_name) {
                warn!(model = name, wire_name = field.wire_name, "duplicate wire name in schema");
                continue;
            }
            by_wire_name.insert(field.wire_name, index);
        }
        Self {
            name,
            fields: fields.to_vec(),
            by_wire_name,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// All descriptors in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Descriptors that take part in serialization, in declaration order.
    pub fn participating(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields
            .iter()
            .filter(|f| f.kind() != FieldKind::Ignored)
    }

    pub fn lookup(&self, wire_name: &str) -> Option<&FieldDescriptor> {
        self.by_wire_name.get(wire_name).map(|&i| &self.fields[i])
    }
}
