// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Parser for the data blob carried by `CreateEffect`.
//!
//! ```text
//! vertex_entry_name \0 fragment_entry_name \0 effect_source_text
//! ```
//!
//! The source text runs to the end of the blob and may or may not carry a
//! trailing NUL.  Any other NUL inside the source is an error.

use std::fmt::Display;

/// Which field of the blob an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectDataField {
    VertexEntry,
    FragmentEntry,
    Source,
}

impl Display for EffectDataField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EffectDataField::VertexEntry => f.write_str("vertex entry point"),
            EffectDataField::FragmentEntry => f.write_str("fragment entry point"),
            EffectDataField::Source => f.write_str("effect source"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EffectDataError {
    #[error("{field} starting at byte {position} has no NUL terminator")]
    MissingTerminator { field: EffectDataField, position: usize },
    #[error("{field} is empty")]
    Empty { field: EffectDataField },
    #[error("{field} is not UTF-8 (byte {position})")]
    NotUtf8 { field: EffectDataField, position: usize },
    #[error("{field} has an embedded NUL at byte {position}")]
    EmbeddedNul { field: EffectDataField, position: usize },
}

/// The three fields of an effect creation blob, borrowed from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectData<'a> {
    pub vertex_entry: &'a str,
    pub fragment_entry: &'a str,
    pub source: &'a str,
}

impl<'a> EffectData<'a> {
    pub fn parse(data: &'a [u8]) -> Result<Self, EffectDataError> {
        let (vertex_entry, rest, rest_at) = Self::terminated(data, 0, EffectDataField::VertexEntry)?;
        let (fragment_entry, rest, rest_at) =
            Self::terminated(rest, rest_at, EffectDataField::FragmentEntry)?;
        let source = rest.strip_suffix(b"\0").unwrap_or(rest);
        if let Some(nul) = source.iter().position(|b| *b == 0) {
            return Err(EffectDataError::EmbeddedNul {
                field: EffectDataField::Source,
                position: rest_at + nul,
            });
        }
        let source = Self::text(source, rest_at, EffectDataField::Source)?;
        if source.is_empty() {
            return Err(EffectDataError::Empty {
                field: EffectDataField::Source,
            });
        }
        Ok(EffectData {
            vertex_entry,
            fragment_entry,
            source,
        })
    }

    /// Splits one NUL-terminated, non-empty field off the front of `data`.
    fn terminated(
        data: &'a [u8],
        at: usize,
        field: EffectDataField,
    ) -> Result<(&'a str, &'a [u8], usize), EffectDataError> {
        let end = data
            .iter()
            .position(|b| *b == 0)
            .ok_or(EffectDataError::MissingTerminator { field, position: at })?;
        if end == 0 {
            return Err(EffectDataError::Empty { field });
        }
        let text = Self::text(&data[..end], at, field)?;
        Ok((text, &data[end + 1..], at + end + 1))
    }

    fn text(bytes: &'a [u8], at: usize, field: EffectDataField) -> Result<&'a str, EffectDataError> {
        std::str::from_utf8(bytes).map_err(|e| EffectDataError::NotUtf8 {
            field,
            position: at + e.valid_up_to(),
        })
    }
}
