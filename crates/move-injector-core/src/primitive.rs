//! Primitive-type table: the last step of the resolution chain.

use crate::error::{LoaderError, LoaderResult};

/// Primitive scalar kinds plus `void`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Byte,
    Short,
    Int,
    Long,
    Char,
    Float,
    Double,
    Boolean,
    Void,
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 9] = [
        PrimitiveType::Byte,
        PrimitiveType::Short,
        PrimitiveType::Int,
        PrimitiveType::Long,
        PrimitiveType::Char,
        PrimitiveType::Float,
        PrimitiveType::Double,
        PrimitiveType::Boolean,
        PrimitiveType::Void,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveType::Byte => "byte",
            PrimitiveType::Short => "short",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Char => "char",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Void => "void",
        }
    }

    /// Single-letter descriptor code.
    pub fn descriptor(self) -> char {
        match self {
            PrimitiveType::Byte => 'B',
            PrimitiveType::Short => 'S',
            PrimitiveType::Int => 'I',
            PrimitiveType::Long => 'J',
            PrimitiveType::Char => 'C',
            PrimitiveType::Float => 'F',
            PrimitiveType::Double => 'D',
            PrimitiveType::Boolean => 'Z',
            PrimitiveType::Void => 'V',
        }
    }

    /// Look up by keyword or descriptor code.
    pub fn lookup(name: &str) -> LoaderResult<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.keyword() == name || Self::matches_descriptor(*p, name))
            .ok_or_else(|| LoaderError::not_found(name))
    }

    fn matches_descriptor(p: PrimitiveType, name: &str) -> bool {
        let mut chars = name.chars();
        chars.next() == Some(p.descriptor()) && chars.next().is_none()
    }
}

impl std::fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}
