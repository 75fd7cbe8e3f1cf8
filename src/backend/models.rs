//! Catalog of model identifiers offered to the user
//!
//! Identifiers are opaque to the client and forwarded to the backend verbatim.

/// Model definition with metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelDef {
    /// Identifier sent in the request body
    pub id: &'static str,
    /// Human-readable description
    pub description: &'static str,
}

/// Get all available model definitions. The first entry is the default.
pub fn all_models() -> &'static [ModelDef] {
    &[
        ModelDef {
            id: "meta-llama/Llama-3.2-1B-Instruct",
            description: "Llama 3.2 1B Instruct (fast, default)",
        },
        ModelDef {
            id: "meta-llama/Llama-3.2-3B-Instruct",
            description: "Llama 3.2 3B Instruct",
        },
        ModelDef {
            id: "Qwen/Qwen2.5-1.5B-Instruct",
            description: "Qwen 2.5 1.5B Instruct",
        },
        ModelDef {
            id: "microsoft/Phi-3.5-mini-instruct",
            description: "Phi 3.5 mini instruct",
        },
        ModelDef {
            id: "mistralai/Mistral-7B-Instruct-v0.3",
            description: "Mistral 7B Instruct v0.3 (slower)",
        },
    ]
}

/// Look up a catalog entry by exact identifier
pub fn find_model(id: &str) -> Option<&'static ModelDef> {
    all_models().iter().find(|m| m.id == id)
}

pub fn default_model() -> &'static ModelDef {
    &all_models()[0]
}
