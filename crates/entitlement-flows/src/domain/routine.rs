//! # Routine Descriptors
//!
//! A routine record carries two payloads: a public descriptor anyone can
//! read, and a private routine body that leaves this client only as a derived
//! content reference. The full routine is never placed in the public payload.

use crate::domain::errors::FlowError;
use serde::{Deserialize, Serialize};
use shared_types::ContentRef;

/// Structured description of a personalized routine.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineDescriptor {
    /// Skin type (the only field surfaced publicly, as an attribute).
    pub skin_type: String,
    /// Skin concerns.
    pub concerns: String,
    /// Recommended products.
    pub products: String,
    /// Morning and evening routine steps.
    pub routine: String,
}

impl RoutineDescriptor {
    /// A descriptor must at least name the skin type to be mintable.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.skin_type.trim().is_empty()
    }
}

/// One display attribute of the public descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name.
    pub trait_type: String,
    /// Attribute value.
    pub value: String,
}

/// Public metadata attached to a minted record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicDescriptor {
    /// Record title.
    pub name: String,
    /// Record description.
    pub description: String,
    /// Cover image URL.
    pub image: String,
    /// Display attributes.
    pub attributes: Vec<Attribute>,
}

impl PublicDescriptor {
    /// Build the public descriptor for a routine.
    #[must_use]
    pub fn for_routine(routine: &RoutineDescriptor) -> Self {
        Self {
            name: "Face-Fit Skincare Plan".to_string(),
            description: "Personalized skincare routine record".to_string(),
            image: "https://images.pexels.com/photos/3992213/pexels-photo-3992213.jpeg"
                .to_string(),
            attributes: vec![Attribute {
                trait_type: "Skin Type".to_string(),
                value: routine.skin_type.clone(),
            }],
        }
    }
}

/// Everything a mint submission needs: the public URI and the reference to
/// the privately stored payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MintArtifacts {
    /// Public descriptor rendered as a data URI.
    pub public_uri: String,
    /// Derived reference to the private payload.
    pub private_ref: ContentRef,
}

impl MintArtifacts {
    /// Prepare the mint payloads for a routine.
    pub fn prepare(routine: &RoutineDescriptor) -> Result<Self, FlowError> {
        if !routine.is_complete() {
            return Err(FlowError::Descriptor("skin type is required".to_string()));
        }

        let private_payload = serde_json::to_vec(routine)
            .map_err(|e| FlowError::Descriptor(e.to_string()))?;
        let private_ref = ContentRef::derive(&private_payload);

        let descriptor = PublicDescriptor::for_routine(routine);
        let public_json = serde_json::to_string(&descriptor)
            .map_err(|e| FlowError::Descriptor(e.to_string()))?;

        Ok(Self {
            public_uri: format!("data:application/json,{public_json}"),
            private_ref,
        })
    }
}
