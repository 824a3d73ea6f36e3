//! Parse ttml documents.

/*
    REFERENCES
    ----------

    1. https://w3c.github.io/ttml2
    2. https://www.speechpad.com/captions/ttml

*/

use crate::{Cue, CueSettings, CueText, Error, ParseOptions, Result, timestamp, tokenizer};
use serde::Deserialize;

// TODO - Deserialize `span` elements in place once quick-xml supports
// mixed cdata+text content (https://docs.rs/quick-xml/latest/quick_xml/de/index.html).
/// Parse a ttml document into cues: every `begin`/`end`-timed paragraph
/// becomes one cue.
pub(crate) fn parse_document(xml: &str, options: &ParseOptions) -> Result<Vec<Cue>> {
    let mut xml = xml
        .replace("<br></br>", "\n")
        .replace("<br/>", "\n")
        .replace("<br />", "\n");

    // Flatten styling spans into inline markup before deserializing,
    // innermost first.
    while let (Some(start), Some(end)) = (xml.find("<span"), xml.find("span>")) {
        let Some(span_match) = xml.get(start..(end + 5)) else {
            break;
        };
        let Some(sub_span) = xml.get((start + 5)..(end + 5)) else {
            break;
        };

        if let (Some(sub_span_start), Some(sub_span_end)) =
            (sub_span.find("<span"), sub_span.find("span>"))
        {
            if let Some(sub_span_match) = sub_span.get(sub_span_start..(sub_span_end + 5)) {
                let span = quick_xml::de::from_str::<Span>(sub_span_match).map_err(de_err)?;
                xml = xml.replace(sub_span_match, &span.format());
                continue;
            }
        }

        let span = quick_xml::de::from_str::<Span>(span_match).map_err(de_err)?;
        xml = xml.replace(span_match, &span.format());
    }

    let tt = quick_xml::de::from_str::<Tt>(&xml).map_err(de_err)?;
    Ok(tt.into_cues(options))
}

fn de_err(err: quick_xml::de::DeError) -> Error {
    Error::new_invalid_input(format!("could not parse ttml document ({err})"))
}

#[derive(Deserialize)]
struct Span {
    #[serde(rename = "@fontStyle")]
    font_style: Option<String>,
    #[serde(rename = "@fontWeight")]
    font_weight: Option<String>,
    #[serde(rename = "@textDecoration")]
    text_decoration: Option<String>,
    #[serde(rename = "$value", default)]
    value: String,
}

impl Span {
    // Brace markers survive the xml round-trip as plain text and are
    // swapped for real tags right before tokenization.
    fn format(&self) -> String {
        let mut value = self.value.clone();

        if self.font_weight.as_deref() == Some("bold") {
            value = format!("{{b}}{value}{{/b}}");
        }

        if self.font_style.as_deref() == Some("italic") {
            value = format!("{{i}}{value}{{/i}}");
        }

        if self.text_decoration.as_deref() == Some("underline") {
            value = format!("{{u}}{value}{{/u}}");
        }

        value
    }
}

#[derive(Deserialize)]
struct Tt {
    #[serde(rename = "body")]
    body: Body,
}

#[derive(Deserialize)]
struct Body {
    #[serde(rename = "div", default)]
    divs: Vec<Div>,
}

#[derive(Deserialize)]
struct Div {
    #[serde(rename = "p", default)]
    paragraphs: Vec<Paragraph>,
}

#[derive(Deserialize)]
struct Paragraph {
    #[serde(rename = "@begin")]
    begin: String,
    #[serde(rename = "@end")]
    end: String,
    #[serde(rename = "@id", alias = "@xml:id", default)]
    id: Option<String>,
    #[serde(rename = "$value", default)]
    value: String,
}

impl Tt {
    fn into_cues(self, options: &ParseOptions) -> Vec<Cue> {
        let mut cues = vec![];

        for div in self.body.divs {
            for paragraph in div.paragraphs {
                let index = cues.len();
                cues.push(paragraph.into_cue(index, options));
            }
        }

        cues
    }
}

impl Paragraph {
    fn into_cue(self, index: usize, options: &ParseOptions) -> Cue {
        // An unparseable clock value degrades to zero instead of dropping
        // the paragraph; an inverted range is clamped by the cue itself.
        let start = timestamp::parse_ttml(&self.begin).unwrap_or(0.0);
        let end = timestamp::parse_ttml(&self.end).unwrap_or(0.0);

        let payload = self
            .value
            .replace("{b}", "<b>")
            .replace("{/b}", "</b>")
            .replace("{i}", "<i>")
            .replace("{/i}", "</i>")
            .replace("{u}", "<u>")
            .replace("{/u}", "</u>");

        let text = if options.process_cue_html {
            CueText::Structured(tokenizer::tokenize(&payload, options))
        } else {
            CueText::Raw(payload)
        };

        Cue::new(
            self.id.unwrap_or_else(|| index.to_string()),
            start,
            end,
            text,
            CueSettings::default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = concat!(
        "<tt xmlns=\"http://www.w3.org/ns/ttml\" xml:lang=\"en\">\n",
        "<body><div>\n",
        "<p begin=\"00:00:01.000\" end=\"00:00:03.000\" xml:id=\"c1\">Hello <span fontWeight=\"bold\">bold</span></p>\n",
        "<p begin=\"4.5s\" end=\"6s\">Second<br/>line</p>\n",
        "</div></body></tt>\n",
    );

    #[test]
    fn paragraphs_become_cues() {
        let cues = parse_document(SAMPLE, &ParseOptions::default()).unwrap();
        assert_eq!(cues.len(), 2);

        assert_eq!(cues[0].id(), "c1");
        assert_eq!(cues[0].start_time(), 1.0);
        assert_eq!(cues[0].end_time(), 3.0);
        assert_eq!(cues[0].render(None), "Hello <b>bold</b>");

        assert_eq!(cues[1].id(), "1");
        assert_eq!(cues[1].start_time(), 4.5);
        assert_eq!(cues[1].end_time(), 6.0);
        assert_eq!(cues[1].render(None), "Second<br />line");
    }

    #[test]
    fn unparseable_clock_values_degrade_to_zero() {
        let xml = "<tt xmlns=\"x\"><body><div><p begin=\"soon\" end=\"later\">text</p></div></body></tt>";
        let cues = parse_document(xml, &ParseOptions::default()).unwrap();
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].start_time(), 0.0);
        assert_eq!(cues[0].end_time(), 0.0);
    }

    #[test]
    fn malformed_xml_is_an_invalid_input_error() {
        let err = parse_document("<tt xml", &ParseOptions::default()).unwrap_err();
        assert!(err.is_invalid_input());
    }
}
