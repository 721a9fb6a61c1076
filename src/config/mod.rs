//! # Módulo de Configuração - Metadados da Conversão
//!
//! Os metadados não vêm do XML: quem chama a conversão informa tag, link,
//! responsáveis, suite etc. Todos são opcionais e têm string vazia como padrão.
//!
//! ## Fontes (da menor para a maior precedência):
//!
//! | Fonte                 | Exemplo                                  |
//! |-----------------------|------------------------------------------|
//! | Padrão                | tudo vazio                               |
//! | Arquivo JSON          | `{"tag": "smoke", "epic": "Payments"}`   |
//! | Variáveis de ambiente | `CONVERTER_TAG=smoke`                    |
//! | Flags do CLI          | `--tag smoke`                            |

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

// ============================================================================
// ESTRUTURAS
// ============================================================================

/// Os dez campos opcionais que vão direto para as colunas do CSV.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub tag: String,
    pub link: String,
    pub parameter: String,
    pub lead: String,
    pub owner: String,
    pub suite: String,
    pub component: String,
    pub story: String,
    pub feature: String,
    pub epic: String,
}

/// Parâmetros de uma chamada a [`crate::convert`].
///
/// `file_name` é o nome do arquivo de origem (sem diretório). Quando ausente,
/// `Suite` e `Story` não têm de onde derivar um valor e ficam vazios.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionParams {
    #[serde(flatten)]
    pub metadata: Metadata,
    pub file_name: Option<String>,
}

/// Prefixo das variáveis de ambiente lidas por [`ConversionParams::from_env`].
pub const ENV_PREFIX: &str = "CONVERTER_";

impl Metadata {
    /// Pares (nome do campo, referência mutável), na ordem das colunas.
    fn fields_mut(&mut self) -> [(&'static str, &mut String); 10] {
        [
            ("tag", &mut self.tag),
            ("link", &mut self.link),
            ("parameter", &mut self.parameter),
            ("lead", &mut self.lead),
            ("owner", &mut self.owner),
            ("suite", &mut self.suite),
            ("component", &mut self.component),
            ("story", &mut self.story),
            ("feature", &mut self.feature),
            ("epic", &mut self.epic),
        ]
    }

    /// Sobrescreve cada campo para o qual `lookup` devolve um valor.
    pub fn overlay_with<F>(&mut self, mut lookup: F)
    where
        F: FnMut(&str) -> Option<String>,
    {
        for (name, slot) in self.fields_mut() {
            if let Some(value) = lookup(name) {
                *slot = value;
            }
        }
    }

    /// Sobrescreve com os campos não vazios de `other`.
    pub fn overlay(&mut self, other: &Metadata) {
        let mut other = other.clone();
        for ((_, slot), (_, value)) in self.fields_mut().into_iter().zip(other.fields_mut()) {
            if !value.is_empty() {
                *slot = std::mem::take(value);
            }
        }
    }
}

impl ConversionParams {
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Cria parâmetros a partir de variáveis de ambiente.
    ///
    /// ## Variáveis suportadas:
    ///
    /// `CONVERTER_TAG`, `CONVERTER_LINK`, `CONVERTER_PARAMETER`, `CONVERTER_LEAD`,
    /// `CONVERTER_OWNER`, `CONVERTER_SUITE`, `CONVERTER_COMPONENT`,
    /// `CONVERTER_STORY`, `CONVERTER_FEATURE`, `CONVERTER_EPIC`
    pub fn from_env() -> Self {
        let mut params = Self::default();
        params.metadata.overlay_with(|name| {
            std::env::var(format!("{ENV_PREFIX}{}", name.to_uppercase())).ok()
        });
        params
    }

    /// Carrega metadados de um arquivo JSON. Chaves ausentes ficam vazias.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let content = fs::read_to_string(path_ref)
            .with_context(|| format!("Failed to read metadata file {:?}", path_ref))?;
        let params = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse metadata JSON {:?}", path_ref))?;
        Ok(params)
    }
}
