//! # Módulo de Carregamento - Leitura do XML de Test-Cases
//!
//! Este módulo é responsável por **ler e parsear** o XML de entrada.
//!
//! ## O que este módulo faz?
//!
//! 1. Lê os bytes do arquivo (ou da entrada padrão)
//! 2. Converte os eventos do `quick-xml` numa árvore navegável ([`XmlDocument`])
//! 3. Retorna `MalformedInput` se o XML não for bem formado
//!
//! A árvore é pequena e vive só durante uma conversão: o documento inteiro
//! fica em memória, não há streaming.
//!
//! ## Exemplo de uso:
//!
//! ```ignore
//! let doc = loader::parse_document(b"<test><test-case id=\"a\"><q>Oi</q></test-case></test>")?;
//! assert_eq!(doc.root.name, "test");
//! ```

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::errors::ConversionError;

// ============================================================================
// ÁRVORE XML
// ============================================================================

/// Nó filho de um elemento: outro elemento ou um trecho de texto.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// Elemento XML com atributos e filhos em ordem de documento.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

/// Documento já parseado. Só o elemento raiz interessa.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    pub root: XmlElement,
}

impl XmlElement {
    /// Valor do atributo, se presente.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Valor do atributo ou string vazia (mesma semântica do DOM).
    pub fn attribute_or_empty(&self, key: &str) -> &str {
        self.attribute(key).unwrap_or("")
    }

    /// Filhos diretos que são elementos.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|child| match child {
            XmlNode::Element(el) => Some(el),
            XmlNode::Text(_) => None,
        })
    }

    /// Concatenação de todo o texto descendente, sem trim.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                XmlNode::Text(text) => out.push_str(text),
                XmlNode::Element(el) => el.collect_text(out),
            }
        }
    }

    /// Texto descendente com espaços das pontas removidos.
    pub fn trimmed_text(&self) -> String {
        self.text_content().trim().to_string()
    }

    /// Todos os descendentes com o nome dado, em pré-ordem (o próprio elemento não entra).
    pub fn descendants(&self, name: &str) -> Vec<&XmlElement> {
        let mut found = Vec::new();
        self.collect_descendants(name, &mut found);
        found
    }

    fn collect_descendants<'a>(&'a self, name: &str, found: &mut Vec<&'a XmlElement>) {
        for el in self.elements() {
            if el.name == name {
                found.push(el);
            }
            el.collect_descendants(name, found);
        }
    }

    /// Primeiro descendente com o nome dado.
    pub fn first_descendant(&self, name: &str) -> Option<&XmlElement> {
        for el in self.elements() {
            if el.name == name {
                return Some(el);
            }
            if let Some(found) = el.first_descendant(name) {
                return Some(found);
            }
        }
        None
    }
}

// ============================================================================
// PARSING
// ============================================================================

/// Converte bytes XML numa árvore.
///
/// Qualquer problema de boa formação (tags não fechadas, nomes de fechamento
/// trocados, entidades inválidas, texto fora da raiz, mais de uma raiz)
/// vira [`ConversionError::MalformedInput`] com a posição em bytes.
pub fn parse_document(bytes: &[u8]) -> Result<XmlDocument, ConversionError> {
    let mut reader = Reader::from_reader(bytes);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;
    let mut buf = Vec::new();

    loop {
        let position = reader.buffer_position() as u64;
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                stack.push(element_from_start(e, position)?);
            }
            Ok(Event::Empty(ref e)) => {
                let element = element_from_start(e, position)?;
                attach(element, &mut stack, &mut root, position)?;
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| ConversionError::malformed(position, "unexpected closing tag"))?;
                attach(element, &mut stack, &mut root, position)?;
            }
            Ok(Event::Text(ref e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| ConversionError::malformed(position, err))?;
                push_text(text.into_owned(), &mut stack, position)?;
            }
            Ok(Event::CData(e)) => {
                let text = String::from_utf8(e.into_inner().into_owned())
                    .map_err(|err| ConversionError::malformed(position, err))?;
                push_text(text, &mut stack, position)?;
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                return Err(ConversionError::malformed(reader.error_position() as u64, err));
            }
            // Declaração, comentários, PIs e DOCTYPE não entram na árvore.
            _ => {}
        }
        buf.clear();
    }

    let end = reader.buffer_position() as u64;
    if let Some(open) = stack.last() {
        return Err(ConversionError::malformed(
            end,
            format!("unclosed element <{}>", open.name),
        ));
    }

    root.map(|root| XmlDocument { root })
        .ok_or_else(|| ConversionError::malformed(end, "document has no root element"))
}

fn element_from_start(e: &BytesStart<'_>, position: u64) -> Result<XmlElement, ConversionError> {
    let name = std::str::from_utf8(e.name().as_ref())
        .map_err(|err| ConversionError::malformed(position, format!("invalid tag name: {err}")))?
        .to_string();

    let mut attributes = Vec::new();
    for attr_result in e.attributes() {
        let attr = attr_result.map_err(|err| ConversionError::malformed(position, err))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|err| ConversionError::malformed(position, format!("invalid attribute name: {err}")))?
            .to_string();
        let value = attr
            .unescape_value()
            .map_err(|err| ConversionError::malformed(position, err))?
            .into_owned();
        attributes.push((key, value));
    }

    Ok(XmlElement {
        name,
        attributes,
        children: Vec::new(),
    })
}

fn attach(
    element: XmlElement,
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    position: u64,
) -> Result<(), ConversionError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(XmlNode::Element(element));
        return Ok(());
    }
    if root.is_some() {
        return Err(ConversionError::malformed(
            position,
            format!("second root element <{}>", element.name),
        ));
    }
    *root = Some(element);
    Ok(())
}

fn push_text(text: String, stack: &mut [XmlElement], position: u64) -> Result<(), ConversionError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(XmlNode::Text(text));
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(ConversionError::malformed(position, "text outside of the root element")),
    }
}

// ============================================================================
// LEITURA DE ARQUIVOS
// ============================================================================

/// Lê o XML de um arquivo ou, quando o caminho é `-`, da entrada padrão.
///
/// ## Exemplos de erro:
/// - "Failed to read XML file" → Arquivo não existe ou sem permissão
/// - "Failed to read XML from stdin" → Entrada padrão fechada/ilegível
pub fn read_xml_input<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let path_ref = path.as_ref();

    if path_ref == Path::new("-") {
        let mut bytes = Vec::new();
        std::io::stdin()
            .read_to_end(&mut bytes)
            .context("Failed to read XML from stdin")?;
        return Ok(bytes);
    }

    fs::read(path_ref).with_context(|| format!("Failed to read XML file {:?}", path_ref))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_builds_tree_in_document_order() {
        let doc = parse_document(
            br#"<?xml version="1.0" encoding="UTF-8"?>
<test>
  <test-case id="greeting">
    <q>Hello</q>
    <a state="greet">Hi there</a>
  </test-case>
</test>"#,
        )
        .unwrap();

        assert_eq!(doc.root.name, "test");
        let case = doc.root.elements().next().unwrap();
        assert_eq!(case.attribute("id"), Some("greeting"));
        let names: Vec<&str> = case.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["q", "a"]);
        assert_eq!(case.elements().nth(1).unwrap().trimmed_text(), "Hi there");
    }

    #[test]
    fn test_entities_and_cdata_are_decoded() {
        let doc = parse_document(
            b"<test><q a=\"x &amp; y\">1 &lt; 2</q><r><![CDATA[{\"k\": \"<v>\"}]]></r></test>",
        )
        .unwrap();

        let q = doc.root.first_descendant("q").unwrap();
        assert_eq!(q.attribute("a"), Some("x & y"));
        assert_eq!(q.text_content(), "1 < 2");
        assert_eq!(doc.root.first_descendant("r").unwrap().text_content(), "{\"k\": \"<v>\"}");
    }

    #[test]
    fn test_descendants_search_nested_elements() {
        let doc = parse_document(b"<test><group><test-case id=\"a\"/></group><test-case id=\"b\"/></test>")
            .unwrap();

        let ids: Vec<&str> = doc
            .root
            .descendants("test-case")
            .iter()
            .map(|e| e.attribute_or_empty("id"))
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_mismatched_closing_tag_is_malformed() {
        let result = parse_document(b"<test><q>Hello</a></test>");
        assert!(matches!(result, Err(ConversionError::MalformedInput { .. })));
    }

    #[test]
    fn test_unclosed_element_is_malformed() {
        let result = parse_document(b"<test><test-case id=\"x\">");
        match result {
            Err(ConversionError::MalformedInput { message, .. }) => {
                assert!(!message.is_empty());
            }
            other => panic!("expected MalformedInput, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_input_is_malformed() {
        assert!(matches!(
            parse_document(b"   "),
            Err(ConversionError::MalformedInput { .. })
        ));
    }

    #[test]
    fn test_two_roots_are_malformed() {
        assert!(matches!(
            parse_document(b"<test/><test/>"),
            Err(ConversionError::MalformedInput { .. })
        ));
    }

    #[test]
    fn test_read_xml_input_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"<test/>").unwrap();

        let bytes = read_xml_input(file.path()).unwrap();
        assert_eq!(bytes, b"<test/>");
    }

    #[test]
    fn test_read_xml_input_missing_file() {
        let err = read_xml_input("/nonexistent/dir/cases.xml").unwrap_err();
        assert!(err.to_string().contains("Failed to read XML file"));
    }
}
