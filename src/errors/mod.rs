//! # Módulo de Códigos de Erro Estruturados
//!
//! Define os erros da conversão XML → CSV e os códigos padronizados
//! usados pelo CLI e por qualquer camada externa (serviço HTTP, CI/CD).
//!
//! ## Para todos entenderem:
//!
//! Quando a conversão falha, o chamador precisa saber **o quê** deu errado
//! e **onde**. Cada erro carrega um código único que pode ser pesquisado.
//!
//! ## Categorias de Erro
//!
//! | Faixa  | Categoria       | Descrição                               |
//! |--------|-----------------|-----------------------------------------|
//! | E1xxx  | Validação       | XML bem formado, mas fora do dialeto    |
//! | E2xxx  | Entrada         | XML malformado ou encoding inválido     |
//! | E3xxx  | Renderização    | Falha ao montar o texto do test-case    |
//! | E4xxx  | Configuração    | Arquivos de entrada/saída, metadados    |
//! | E5xxx  | Interno         | Bug no próprio conversor                |
//!
//! ## Exemplo:
//!
//! ```text
//! [E1003] Test case without ID
//! [E1004] Test case  has no steps
//! ```

use std::fmt;

use thiserror::Error;

use crate::validation::ValidationError;

// ============================================================================
// CÓDIGO DE ERRO
// ============================================================================

/// Código de erro estruturado com categoria e número.
///
/// Primeiro dígito: categoria (1-5). Últimos 3 dígitos: erro específico.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorCode(u16);

impl ErrorCode {
    // ========================================================================
    // E1xxx: Validação estrutural
    // ========================================================================

    /// Elemento raiz diferente de `<test>`.
    pub const UNEXPECTED_ROOT: Self = Self(1001);

    /// Nenhum `<test-case>` no documento.
    pub const NO_TEST_CASES: Self = Self(1002);

    /// `<test-case>` sem atributo `id`.
    pub const MISSING_TEST_CASE_ID: Self = Self(1003);

    /// `<test-case>` sem nenhum `<event>`, `<request>` ou `<q>`.
    pub const TEST_CASE_WITHOUT_STEPS: Self = Self(1004);

    // ========================================================================
    // E2xxx: Entrada
    // ========================================================================

    /// XML não é bem formado.
    pub const MALFORMED_XML: Self = Self(2001);

    // ========================================================================
    // E3xxx: Renderização
    // ========================================================================

    /// Falha ao montar test-cases a partir da árvore (ex.: mockData incompleto).
    pub const RENDERING_FAILED: Self = Self(3001);

    // ========================================================================
    // E4xxx: Configuração/Ambiente
    // ========================================================================

    /// Arquivo de entrada não pôde ser lido.
    pub const INPUT_NOT_READABLE: Self = Self(4001);

    /// Arquivo de metadados inválido.
    pub const INVALID_METADATA: Self = Self(4002);

    // ========================================================================
    // E5xxx: Erros Internos
    // ========================================================================

    /// Falha ao escrever o CSV.
    pub const CSV_WRITE_FAILED: Self = Self(5001);

    pub fn code(&self) -> u16 {
        self.0
    }

    /// Exemplo: `ErrorCode::NO_TEST_CASES.formatted() == "E1002"`
    pub fn formatted(&self) -> String {
        format!("E{:04}", self.0)
    }

    pub fn category(&self) -> ErrorCategory {
        match self.0 / 1000 {
            1 => ErrorCategory::Validation,
            2 => ErrorCategory::Input,
            3 => ErrorCategory::Rendering,
            4 => ErrorCategory::Configuration,
            5 => ErrorCategory::Internal,
            _ => ErrorCategory::Unknown,
        }
    }

    /// Descrição curta, útil em logs.
    pub fn description(&self) -> &'static str {
        match self.0 {
            1001 => "Elemento raiz inesperado",
            1002 => "Documento sem test-cases",
            1003 => "Test-case sem ID",
            1004 => "Test-case sem steps",
            2001 => "XML malformado",
            3001 => "Falha de renderização",
            4001 => "Arquivo de entrada ilegível",
            4002 => "Metadados inválidos",
            5001 => "Falha ao escrever CSV",
            _ => "Erro desconhecido",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.formatted())
    }
}

// ============================================================================
// CATEGORIA DE ERRO
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// E1xxx: o XML não segue o dialeto de test-cases.
    Validation,
    /// E2xxx: bytes de entrada não formam um XML.
    Input,
    /// E3xxx: falha ao montar o texto.
    Rendering,
    /// E4xxx: arquivos e metadados.
    Configuration,
    /// E5xxx: bug no conversor.
    Internal,
    Unknown,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "Validação"),
            Self::Input => write!(f, "Entrada"),
            Self::Rendering => write!(f, "Renderização"),
            Self::Configuration => write!(f, "Configuração"),
            Self::Internal => write!(f, "Interno"),
            Self::Unknown => write!(f, "Desconhecido"),
        }
    }
}

// ============================================================================
// ERROS DA CONVERSÃO
// ============================================================================

/// Etapa do pipeline em que uma falha inesperada aconteceu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Rendering,
    Writing,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rendering => write!(f, "rendering"),
            Self::Writing => write!(f, "writing"),
        }
    }
}

/// Erro retornado por [`crate::convert`].
///
/// - `MalformedInput`: o XML não é bem formado. Não há recuperação possível.
/// - `StructuralValidation`: XML válido, mas fora do dialeto. Traz **todas**
///   as violações encontradas, não só a primeira.
/// - `ConversionFailure`: qualquer outra falha, com a etapa anexada.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("malformed XML at byte {position}: {message}")]
    MalformedInput { position: u64, message: String },

    #[error("{}", join_violations(.0))]
    StructuralValidation(Vec<ValidationError>),

    #[error("conversion failed during {stage}: {source:#}")]
    ConversionFailure {
        stage: Stage,
        #[source]
        source: anyhow::Error,
    },
}

fn join_violations(violations: &[ValidationError]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

impl ConversionError {
    pub fn malformed(position: u64, message: impl fmt::Display) -> Self {
        Self::MalformedInput {
            position,
            message: message.to_string(),
        }
    }

    pub fn failure(stage: Stage, source: impl Into<anyhow::Error>) -> Self {
        Self::ConversionFailure {
            stage,
            source: source.into(),
        }
    }

    /// Código do erro. Para validação, usa o código da primeira violação.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::MalformedInput { .. } => ErrorCode::MALFORMED_XML,
            Self::StructuralValidation(violations) => violations
                .first()
                .map(ValidationError::code)
                .unwrap_or(ErrorCode::NO_TEST_CASES),
            Self::ConversionFailure { stage, .. } => match stage {
                Stage::Rendering => ErrorCode::RENDERING_FAILED,
                Stage::Writing => ErrorCode::CSV_WRITE_FAILED,
            },
        }
    }

    /// Mensagem para o usuário, com o código na frente de cada linha de violação.
    pub fn user_message(&self) -> String {
        match self {
            Self::StructuralValidation(violations) => violations
                .iter()
                .map(|v| format!("[{}] {}", v.code(), v))
                .collect::<Vec<_>>()
                .join("\n"),
            other => format!("[{}] {}", other.code(), other),
        }
    }
}
