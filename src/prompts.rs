use serde::Serialize;
use std::collections::BTreeMap;

/// System instruction for the generic generation route. The full prompt is
/// maintained by the product team; this placeholder matches what the route
/// shipped with.
const GENERATE_SYSTEM_PROMPT: &str =
    "Eres un generador de perfiles para PsyConnect... [Tu prompt de sistema completo aquí] ...";

/// System instruction for the specialist-profile route. Spanish text is the
/// product copy sent to the model, kept verbatim.
const GENERATE_PROFILES_SYSTEM_PROMPT: &str = r#"Eres un generador de perfiles para PsyConnect. Basado en las necesidades del usuario, crea un array de 2 o 3 perfiles de especialistas *ficticios*. Adhiérete estrictamente al esquema JSON proporcionado.
El usuario ha proporcionado varias respuestas (razón, severidad, formato, estilo, etc.).
Tu tarea más importante es que la 'matchReason' (razón del match) sea un desglose detallado que conecte *múltiples* de estas respuestas con el perfil del especialista. Sé específico.
Ejemplo: 'Como buscas terapia online (formato) para una ansiedad que te afecta severamente (severidad) y prefieres un enfoque práctico (estilo), la Dra. Luna es ideal por su experiencia en TCC para trastornos de ansiedad en modalidad virtual.'"#;

/// The two generation routes share one handler; a profile carries everything
/// that differs between them: the system instruction and whether the response
/// schema annotates its fields with descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptProfile {
    /// Generic profile generation (`/api/generate`).
    Generate,
    /// Specialist matching profiles (`/api/generateProfiles`).
    GenerateProfiles,
}

impl PromptProfile {
    /// Fixed system instruction sent upstream with every request.
    pub fn system_instruction(&self) -> &'static str {
        match self {
            PromptProfile::Generate => GENERATE_SYSTEM_PROMPT,
            PromptProfile::GenerateProfiles => GENERATE_PROFILES_SYSTEM_PROMPT,
        }
    }

    /// JSON schema the upstream service is asked to conform its output to:
    /// an array of specialist profiles with four required string fields.
    pub fn response_schema(&self) -> SchemaNode {
        let describe = matches!(self, PromptProfile::GenerateProfiles);

        let field = |description: &str| {
            if describe {
                SchemaNode::string(Some(description))
            } else {
                SchemaNode::string(None)
            }
        };

        SchemaNode::array(SchemaNode::object(
            vec![
                ("name", field("Nombre ficticio (Ej. Dra. Isabel Luna)")),
                (
                    "specialty",
                    field("Especialidad principal (Ej. Terapia Cognitivo-Conductual)"),
                ),
                (
                    "description",
                    field("Breve descripción (Ej. 10 años de experiencia en ansiedad...)"),
                ),
                (
                    "matchReason",
                    field("Razón personalizada y detallada de por qué es un buen match, conectando múltiples respuestas del usuario."),
                ),
            ],
            &["name", "specialty", "description", "matchReason"],
        ))
    }
}

/// One node of a Gemini response schema. Covers the subset this service
/// sends: STRING leaves, OBJECT with properties, ARRAY of items.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaNode {
    #[serde(rename = "type")]
    pub node_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<&'static str, SchemaNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<&'static str>>,
}

impl SchemaNode {
    pub fn string(description: Option<&str>) -> Self {
        Self {
            node_type: "STRING",
            description: description.map(str::to_string),
            items: None,
            properties: None,
            required: None,
        }
    }

    pub fn array(items: SchemaNode) -> Self {
        Self {
            node_type: "ARRAY",
            description: None,
            items: Some(Box::new(items)),
            properties: None,
            required: None,
        }
    }

    pub fn object(properties: Vec<(&'static str, SchemaNode)>, required: &[&'static str]) -> Self {
        Self {
            node_type: "OBJECT",
            description: None,
            items: None,
            properties: Some(properties.into_iter().collect()),
            required: Some(required.to_vec()),
        }
    }
}
