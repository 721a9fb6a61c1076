//! # Módulo de Conversão - Pipeline XML → CSV
//!
//! Junta todas as etapas numa única chamada:
//!
//! ```text
//! bytes ─> parse_document ─> validate_document ─> build_test_case (por <test-case>)
//!       ─> write_test_cases ─> bytes CSV
//! ```
//!
//! A conversão é síncrona e não guarda estado entre chamadas, então pode ser
//! usada em paralelo sem coordenação.

use tracing::{debug, info, info_span};

use crate::config::ConversionParams;
use crate::csv_writer::write_test_cases;
use crate::errors::{ConversionError, Stage};
use crate::formatters::render_preconditions;
use crate::grouping::group_steps;
use crate::loader::{parse_document, XmlDocument, XmlElement};
use crate::model::{file_stem, TestCase};
use crate::validation::{validate_document, TEST_CASE_ELEMENT};

/// Nome usado quando a entrada não tem nome de arquivo (XML enviado direto).
pub const DEFAULT_OUTPUT_FILE_NAME: &str = "conversion-result.csv";

/// Converte bytes XML em bytes CSV.
///
/// ## Retorno:
/// - `Ok(Vec<u8>)`: CSV com BOM, cabeçalho e uma linha por test-case
/// - `Err(MalformedInput)`: XML mal formado
/// - `Err(StructuralValidation)`: todas as violações do dialeto
/// - `Err(ConversionFailure)`: falha inesperada, com a etapa
pub fn convert(xml: &[u8], params: &ConversionParams) -> Result<Vec<u8>, ConversionError> {
    let span = info_span!("convert", file_name = params.file_name.as_deref().unwrap_or("-"));
    let _guard = span.enter();

    let doc = load_and_validate(xml)?;
    let test_cases = build_test_cases(&doc, params)?;

    let csv = write_test_cases(&test_cases).map_err(|err| ConversionError::failure(Stage::Writing, err))?;

    info!(test_cases = test_cases.len(), bytes = csv.len(), "Conversão concluída");
    Ok(csv)
}

/// Atalho para XML já em memória como texto.
pub fn convert_str(xml: &str, params: &ConversionParams) -> Result<Vec<u8>, ConversionError> {
    convert(xml.as_bytes(), params)
}

/// Parse + validação estrutural, sem gerar CSV.
pub fn load_and_validate(xml: &[u8]) -> Result<XmlDocument, ConversionError> {
    let doc = parse_document(xml)?;
    validate_document(&doc).map_err(ConversionError::StructuralValidation)?;
    Ok(doc)
}

/// Monta um [`TestCase`] por `<test-case>`, em ordem de documento.
pub fn build_test_cases(
    doc: &XmlDocument,
    params: &ConversionParams,
) -> Result<Vec<TestCase>, ConversionError> {
    doc.root
        .descendants(TEST_CASE_ELEMENT)
        .into_iter()
        .map(|element| build_test_case(element, params))
        .collect()
}

fn build_test_case(element: &XmlElement, params: &ConversionParams) -> Result<TestCase, ConversionError> {
    let name = element.attribute_or_empty("id").to_string();

    let precondition = render_preconditions(element)
        .map_err(|err| ConversionError::failure(Stage::Rendering, err.context(format!("test case {name}"))))?;
    let steps = group_steps(element);

    debug!(
        test_case = %name,
        steps = steps.len(),
        mocks = element.descendants("mockData").len(),
        "Test-case montado"
    );

    Ok(TestCase {
        name,
        precondition,
        steps,
        file_name: params.file_name.clone(),
        metadata: params.metadata.clone(),
    })
}

/// Nome do CSV gerado: `<nome sem extensão>.csv`, ou o padrão sem nome de entrada.
pub fn output_file_name(file_name: Option<&str>) -> String {
    match file_name.filter(|name| !name.is_empty()) {
        Some(name) => format!("{}.csv", file_stem(name)),
        None => DEFAULT_OUTPUT_FILE_NAME.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Metadata;
    use crate::csv_writer::UTF8_BOM;
    use crate::validation::ValidationError;

    const HEADER_LINE: &str = "name;full_name;description;precondition;expected_result;scenario;tag;link;parameter;Lead;Owner;Suite;Component;Story;Feature;Epic";

    fn rows(csv: &[u8]) -> Vec<Vec<String>> {
        csv::ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(false)
            .from_reader(&csv[3..])
            .records()
            .map(|record| record.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn test_full_conversion() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<test>
  <test-case id="greeting">
    <mockData>
      <query method="get">/users/${id}</query>
      <response status="200">{"name":"Ann"}</response>
      <parameters><id>42</id></parameters>
    </mockData>
    <q>Hello</q>
    <a state="greet">Hi there</a>
    <request>{"text":"bye"}</request>
    <responseData field="status"></responseData>
  </test-case>
</test>"#;
        let params = ConversionParams {
            metadata: Metadata {
                tag: "smoke".to_string(),
                ..Default::default()
            },
            file_name: Some("bot.xml".to_string()),
        };

        let csv = convert_str(xml, &params).unwrap();
        assert!(csv.starts_with(&UTF8_BOM));
        assert!(std::str::from_utf8(&csv[3..]).unwrap().starts_with(HEADER_LINE));

        let rows = rows(&csv);
        assert_eq!(rows.len(), 2);
        let row = &rows[1];
        assert_eq!(row.len(), 16);
        assert_eq!(row[0], "greeting");
        assert_eq!(row[1], "JAICP greeting");
        assert_eq!(
            row[3],
            "1. **GET** /users/42\n**Статус:** 200 \n**Ответ:** \n`{\n  \"name\": \"Ann\"\n}`\n"
        );
        assert_eq!(row[4], "Ключ status не равен NULL/существует в ответе");
        assert!(row[5].starts_with("[step 1] Отправить текст в бота:\nHello\n\t[expected 1.1] Expected Result\n"));
        assert!(row[5].contains("[expected.step 1.1.1] state = 'greet'\nОтвет бота:\nHi there"));
        assert!(row[5].contains("[step 2] Отправить запрос:\n\t[step 2.1] {\n  \"text\": \"bye\"\n}"));
        assert_eq!(row[6], "smoke");
        assert_eq!(row[11], "JIACPbot");
        assert_eq!(row[13], "bot");
    }

    #[test]
    fn test_wrong_root_fails_validation() {
        let err = convert_str("<suite><test-case id=\"a\"><q>x</q></test-case></suite>", &ConversionParams::default())
            .unwrap_err();

        match err {
            ConversionError::StructuralValidation(errors) => {
                assert!(errors[0].to_string().contains("suite"));
            }
            other => panic!("expected StructuralValidation, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_id_and_steps_reported_together() {
        let err = convert_str("<test><test-case></test-case></test>", &ConversionParams::default()).unwrap_err();

        assert!(matches!(
            &err,
            ConversionError::StructuralValidation(errors)
                if errors == &vec![ValidationError::MissingId, ValidationError::NoSteps { id: String::new() }]
        ));
        assert!(err.to_string().contains("Test case without ID\n"));
    }

    #[test]
    fn test_malformed_xml() {
        let err = convert(b"<test><test-case id=\"a\">", &ConversionParams::default()).unwrap_err();
        assert!(matches!(err, ConversionError::MalformedInput { .. }));
    }

    #[test]
    fn test_incomplete_mock_is_rendering_failure() {
        let err = convert_str(
            "<test><test-case id=\"a\"><mockData><query>/x</query></mockData><q>x</q></test-case></test>",
            &ConversionParams::default(),
        )
        .unwrap_err();

        assert!(matches!(err, ConversionError::ConversionFailure { stage: Stage::Rendering, .. }));
    }

    #[test]
    fn test_multiple_test_cases_keep_order() {
        let csv = convert_str(
            "<test><test-case id=\"b\"><q>1</q></test-case><test-case id=\"a\"><event>e</event></test-case></test>",
            &ConversionParams::default(),
        )
        .unwrap();

        let rows = rows(&csv);
        assert_eq!(rows[1][0], "b");
        assert_eq!(rows[2][0], "a");
        assert_eq!(rows[2][11], "");
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name(Some("cases.xml")), "cases.csv");
        assert_eq!(output_file_name(Some("cases")), "cases.csv");
        assert_eq!(output_file_name(Some("")), DEFAULT_OUTPUT_FILE_NAME);
        assert_eq!(output_file_name(None), DEFAULT_OUTPUT_FILE_NAME);
    }
}
