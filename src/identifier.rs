//! Classification of incoming variant identifiers.
//!
//! A variant is requested either by coordinates (`chromosome:position:reference[:alternate]`)
//! or by an opaque ID such as a dbSNP accession. The decision is made once, here, and the
//! rest of the service works on the tagged [`VariantIdentifier`].

use crate::{Error, Result};

/// A parsed variant identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariantIdentifier {
    Positional {
        chromosome: String,
        position: u64,
        reference: String,
        alternate: Option<String>,
    },
    Opaque {
        id: String,
    },
}

impl VariantIdentifier {
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(Error::MalformedIdentifier("empty identifier".to_string()));
        }

        if !raw.contains(':') {
            return Ok(VariantIdentifier::Opaque {
                id: raw.to_string(),
            });
        }

        let segments: Vec<&str> = raw.split(':').collect();
        if segments.len() < 3 {
            return Err(Error::MalformedIdentifier(format!(
                "{raw}: expected chromosome:position:reference[:alternate]"
            )));
        }

        let position = segments[1].parse::<u64>().map_err(|_| {
            Error::MalformedIdentifier(format!("{raw}: position '{}' is not an integer", segments[1]))
        })?;

        Ok(VariantIdentifier::Positional {
            chromosome: segments[0].to_string(),
            position,
            reference: segments[2].to_string(),
            alternate: segments.get(3).map(|alt| alt.to_string()),
        })
    }

    pub fn is_positional(&self) -> bool {
        matches!(self, VariantIdentifier::Positional { .. })
    }
}
