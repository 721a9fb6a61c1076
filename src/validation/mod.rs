//! # Módulo de Validação Estrutural
//!
//! Valida o documento XML antes da conversão para garantir que ele segue
//! o dialeto de test-cases.
//!
//! ## Para leigos:
//!
//! Antes de preencher a planilha, conferimos se o XML tem o formato
//! esperado: a raiz certa, pelo menos um test-case, e cada test-case com
//! um ID e com passos. Se algo estiver errado, mostramos **tudo** de uma vez,
//! para que a pessoa corrija o arquivo numa única rodada.
//!
//! ## Validações realizadas:
//!
//! 1. **Raiz**: o elemento raiz deve ser `<test>` (falha imediata)
//! 2. **Test-cases**: deve existir ao menos um `<test-case>` (falha imediata)
//! 3. **ID**: cada `<test-case>` precisa de `id` não vazio
//! 4. **Steps**: cada `<test-case>` precisa de um filho `<event>`, `<request>` ou `<q>`
//!
//! As regras 3 e 4 acumulam erros de todos os test-cases.

use thiserror::Error;

use crate::errors::ErrorCode;
use crate::loader::{XmlDocument, XmlElement};
use crate::model::StepAttributes;

// ============================================================================
// TIPOS DE ERRO
// ============================================================================

/// Erros de validação do dialeto.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Raiz do documento não é `<test>`.
    #[error("Invalid XML: expected root element <test>, found <{found}>")]
    UnexpectedRoot { found: String },

    /// Nenhum `<test-case>` no documento.
    #[error("XML contains no test cases (<test-case>)")]
    NoTestCases,

    /// `<test-case>` sem `id` ou com `id` vazio.
    #[error("Test case without ID")]
    MissingId,

    /// `<test-case>` sem nenhum elemento de step como filho direto.
    #[error("Test case {id} has no steps")]
    NoSteps { id: String },
}

impl ValidationError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnexpectedRoot { .. } => ErrorCode::UNEXPECTED_ROOT,
            Self::NoTestCases => ErrorCode::NO_TEST_CASES,
            Self::MissingId => ErrorCode::MISSING_TEST_CASE_ID,
            Self::NoSteps { .. } => ErrorCode::TEST_CASE_WITHOUT_STEPS,
        }
    }
}

// ============================================================================
// CONSTANTES
// ============================================================================

/// Nome obrigatório do elemento raiz.
pub const ROOT_ELEMENT: &str = "test";

/// Nome do elemento de cada test-case.
pub const TEST_CASE_ELEMENT: &str = "test-case";

/// `Ok(())` ou a lista completa de problemas.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

// ============================================================================
// FUNÇÃO PRINCIPAL DE VALIDAÇÃO
// ============================================================================

/// Valida o documento inteiro.
///
/// Raiz errada e ausência de test-cases interrompem a validação na hora,
/// porque não há o que validar depois. Os demais erros são acumulados.
///
/// ## Exemplo:
///
/// ```ignore
/// match validate_document(&doc) {
///     Ok(()) => convert(doc),
///     Err(errors) => show_errors(errors),
/// }
/// ```
pub fn validate_document(doc: &XmlDocument) -> ValidationResult {
    let root = &doc.root;

    if root.name != ROOT_ELEMENT {
        return Err(vec![ValidationError::UnexpectedRoot {
            found: root.name.clone(),
        }]);
    }

    let test_cases = root.descendants(TEST_CASE_ELEMENT);
    if test_cases.is_empty() {
        return Err(vec![ValidationError::NoTestCases]);
    }

    let mut errors = Vec::new();
    for test_case in test_cases {
        validate_test_case(test_case, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// ============================================================================
// VALIDAÇÃO DE TEST-CASE INDIVIDUAL
// ============================================================================

/// Verifica `id` e a presença de pelo menos um step como filho direto.
fn validate_test_case(test_case: &XmlElement, errors: &mut Vec<ValidationError>) {
    let id = test_case.attribute_or_empty("id");
    if id.is_empty() {
        errors.push(ValidationError::MissingId);
    }

    let has_steps = test_case
        .elements()
        .any(|child| StepAttributes::is_step_element(&child.name));

    if !has_steps {
        errors.push(ValidationError::NoSteps { id: id.to_string() });
    }
}

// ============================================================================
// TESTES
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::parse_document;

    fn validate(xml: &str) -> ValidationResult {
        let doc = parse_document(xml.as_bytes()).unwrap();
        validate_document(&doc)
    }

    #[test]
    fn test_valid_document() {
        assert!(validate(r#"<test><test-case id="tc1"><q>Hello</q></test-case></test>"#).is_ok());
    }

    #[test]
    fn test_wrong_root_names_found_element() {
        let errors = validate(r#"<suite><test-case id="tc1"><q>Hello</q></test-case></suite>"#).unwrap_err();

        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0], ValidationError::UnexpectedRoot { found } if found == "suite"));
        assert!(errors[0].to_string().contains("<suite>"));
    }

    #[test]
    fn test_no_test_cases() {
        let errors = validate("<test><other/></test>").unwrap_err();
        assert_eq!(errors, vec![ValidationError::NoTestCases]);
    }

    #[test]
    fn test_missing_id_and_steps_are_both_reported() {
        let errors = validate("<test><test-case><mockData/></test-case></test>").unwrap_err();

        assert_eq!(
            errors,
            vec![
                ValidationError::MissingId,
                ValidationError::NoSteps { id: String::new() },
            ]
        );
    }

    #[test]
    fn test_errors_accumulate_across_test_cases() {
        let errors = validate(
            r#"<test>
                <test-case id="ok"><event>start</event></test-case>
                <test-case id="empty"><a state="s">x</a></test-case>
                <test-case><request>{}</request></test-case>
            </test>"#,
        )
        .unwrap_err();

        assert_eq!(
            errors,
            vec![
                ValidationError::NoSteps { id: "empty".to_string() },
                ValidationError::MissingId,
            ]
        );
    }

    #[test]
    fn test_nested_step_does_not_count() {
        let errors = validate(r#"<test><test-case id="x"><group><q>Hi</q></group></test-case></test>"#)
            .unwrap_err();
        assert_eq!(errors, vec![ValidationError::NoSteps { id: "x".to_string() }]);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(ValidationError::MissingId.code(), ErrorCode::MISSING_TEST_CASE_ID);
        assert_eq!(ValidationError::NoTestCases.code(), ErrorCode::NO_TEST_CASES);
    }
}
