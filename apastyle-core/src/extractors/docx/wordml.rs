//! WordprocessingML parsing: style sheet, theme fonts and document body.
//!
//! Measurements arrive in Word's native units and are converted here:
//! twips (1/1440in) for indents and page geometry, half-points for font
//! sizes, 240ths of a line for `lineRule="auto"` spacing. Space before and
//! after a paragraph is in twips too and is reported in points.

use crate::error::ExtractError;
use crate::types::*;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;

const TWIPS_PER_INCH: f32 = 1440.0;
const TWIPS_PER_POINT: f32 = 20.0;
const AUTO_LINE_UNITS: f32 = 240.0;
/// Word's font size when no `w:sz` is set anywhere in the chain
const DEFAULT_FONT_SIZE_PT: f32 = 10.0;
const MAX_STYLE_DEPTH: usize = 16;

fn xml_error(part: &'static str, position: usize, err: impl std::fmt::Display) -> ExtractError {
    ExtractError::Xml {
        part,
        position,
        message: err.to_string(),
    }
}

/// Attribute value by local name (namespace prefix ignored).
fn attr(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

fn attr_f32(e: &BytesStart, key: &[u8]) -> Option<f32> {
    attr(e, key).and_then(|v| v.trim().parse::<f32>().ok())
}

fn attr_inches(e: &BytesStart, key: &[u8]) -> Option<f32> {
    attr_f32(e, key).map(|twips| twips / TWIPS_PER_INCH)
}

/// `<w:b/>` is on; `<w:b w:val="0"/>` is off.
fn toggle(e: &BytesStart) -> bool {
    !matches!(attr(e, b"val").as_deref(), Some("0") | Some("false") | Some("off"))
}

fn within(path: &[Vec<u8>], name: &[u8]) -> bool {
    path.iter().any(|p| p.as_slice() == name)
}

// ============================================================================
// PROPERTIES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum LineSpacing {
    Multiple(f32),
    /// Exact or minimum line height
    Points(f32),
}

#[derive(Debug, Clone, Default, PartialEq)]
struct ParagraphProps {
    alignment: Option<Alignment>,
    left_indent: Option<f32>,
    first_line_indent: Option<f32>,
    line_spacing: Option<LineSpacing>,
    space_before_pt: Option<f32>,
    space_after_pt: Option<f32>,
}

impl ParagraphProps {
    fn overlay(&mut self, other: &ParagraphProps) {
        if other.alignment.is_some() {
            self.alignment = other.alignment;
        }
        if other.left_indent.is_some() {
            self.left_indent = other.left_indent;
        }
        if other.first_line_indent.is_some() {
            self.first_line_indent = other.first_line_indent;
        }
        if other.line_spacing.is_some() {
            self.line_spacing = other.line_spacing;
        }
        if other.space_before_pt.is_some() {
            self.space_before_pt = other.space_before_pt;
        }
        if other.space_after_pt.is_some() {
            self.space_after_pt = other.space_after_pt;
        }
    }

    fn apply(&mut self, e: &BytesStart) {
        match e.local_name().as_ref() {
            b"jc" => {
                let alignment = match attr(e, b"val").as_deref() {
                    Some("left") | Some("start") => Some(Alignment::Left),
                    Some("center") => Some(Alignment::Center),
                    Some("right") | Some("end") => Some(Alignment::Right),
                    Some("both") | Some("distribute") | Some("justify") => Some(Alignment::Justify),
                    _ => None,
                };
                if alignment.is_some() {
                    self.alignment = alignment;
                }
            }
            b"ind" => {
                if let Some(left) = attr_inches(e, b"left").or_else(|| attr_inches(e, b"start")) {
                    self.left_indent = Some(left);
                }
                if let Some(hanging) = attr_inches(e, b"hanging") {
                    self.first_line_indent = Some(-hanging);
                } else if let Some(first_line) = attr_inches(e, b"firstLine") {
                    self.first_line_indent = Some(first_line);
                }
            }
            b"spacing" => {
                if let Some(line) = attr_f32(e, b"line") {
                    self.line_spacing = Some(match attr(e, b"lineRule").as_deref() {
                        Some("exact") | Some("atLeast") => LineSpacing::Points(line / TWIPS_PER_POINT),
                        _ => LineSpacing::Multiple(line / AUTO_LINE_UNITS),
                    });
                }
                if let Some(before) = attr_f32(e, b"before") {
                    self.space_before_pt = Some(before / TWIPS_PER_POINT);
                }
                if let Some(after) = attr_f32(e, b"after") {
                    self.space_after_pt = Some(after / TWIPS_PER_POINT);
                }
            }
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ThemeSlot {
    Major,
    Minor,
}

#[derive(Debug, Clone, PartialEq)]
enum FontRef {
    Named(String),
    Theme(ThemeSlot),
}

#[derive(Debug, Clone, Default, PartialEq)]
struct RunProps {
    font: Option<FontRef>,
    size_pt: Option<f32>,
    bold: Option<bool>,
    italic: Option<bool>,
}

impl RunProps {
    fn overlay(&mut self, other: &RunProps) {
        if other.font.is_some() {
            self.font = other.font.clone();
        }
        if other.size_pt.is_some() {
            self.size_pt = other.size_pt;
        }
        if other.bold.is_some() {
            self.bold = other.bold;
        }
        if other.italic.is_some() {
            self.italic = other.italic;
        }
    }

    fn apply(&mut self, e: &BytesStart) {
        match e.local_name().as_ref() {
            b"rFonts" => {
                // Theme attributes take precedence over explicit names
                let font = match attr(e, b"asciiTheme") {
                    Some(theme) if theme.starts_with("major") => Some(FontRef::Theme(ThemeSlot::Major)),
                    Some(_) => Some(FontRef::Theme(ThemeSlot::Minor)),
                    None => attr(e, b"ascii").or_else(|| attr(e, b"hAnsi")).map(FontRef::Named),
                };
                if font.is_some() {
                    self.font = font;
                }
            }
            b"sz" => {
                if let Some(half_points) = attr_f32(e, b"val") {
                    self.size_pt = Some(half_points / 2.0);
                }
            }
            b"b" => self.bold = Some(toggle(e)),
            b"i" => self.italic = Some(toggle(e)),
            _ => {}
        }
    }
}

// ============================================================================
// THEME
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ThemeFonts {
    pub major: String,
    pub minor: String,
}

impl Default for ThemeFonts {
    fn default() -> Self {
        // Office theme
        Self {
            major: "Calibri Light".to_string(),
            minor: "Calibri".to_string(),
        }
    }
}

impl ThemeFonts {
    fn get(&self, slot: ThemeSlot) -> &str {
        match slot {
            ThemeSlot::Major => &self.major,
            ThemeSlot::Minor => &self.minor,
        }
    }

    pub fn parse(xml: &str) -> Result<Self, ExtractError> {
        let mut fonts = Self::default();
        let mut reader = Reader::from_str(xml);
        let mut buf = Vec::new();
        let mut slot: Option<ThemeSlot> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"majorFont" => slot = Some(ThemeSlot::Major),
                    b"minorFont" => slot = Some(ThemeSlot::Minor),
                    _ => {}
                },
                Ok(Event::Empty(e)) if e.local_name().as_ref() == b"latin" => {
                    if let (Some(slot), Some(typeface)) = (slot, attr(&e, b"typeface")) {
                        if !typeface.is_empty() {
                            match slot {
                                ThemeSlot::Major => fonts.major = typeface,
                                ThemeSlot::Minor => fonts.minor = typeface,
                            }
                        }
                    }
                }
                Ok(Event::End(e)) => {
                    if matches!(e.local_name().as_ref(), b"majorFont" | b"minorFont") {
                        slot = None;
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(xml_error("word/theme/theme1.xml", reader.buffer_position(), e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(fonts)
    }
}

// ============================================================================
// STYLES
// ============================================================================

#[derive(Debug, Clone, Default)]
struct StyleDef {
    name: String,
    based_on: Option<String>,
    paragraph: ParagraphProps,
    run: RunProps,
}

/// Properties a paragraph inherits from its style chain.
#[derive(Debug, Clone, Default)]
struct ResolvedStyle {
    paragraph: ParagraphProps,
    run: RunProps,
    role: Option<RoleHint>,
}

fn role_for_style_name(name: &str) -> Option<RoleHint> {
    let name = name.trim().to_lowercase();
    if let Some(level) = name.strip_prefix("heading") {
        return level.trim().parse::<u8>().ok().map(|_| RoleHint::Heading);
    }
    match name.as_str() {
        "title" | "subtitle" => Some(RoleHint::TitlePage),
        "bibliography" => Some(RoleHint::Reference),
        _ => None,
    }
}

/// Paragraph styles of `word/styles.xml` plus the document defaults.
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    default_paragraph: ParagraphProps,
    default_run: RunProps,
    styles: HashMap<String, StyleDef>,
    default_style_id: Option<String>,
}

impl StyleSheet {
    pub fn parse(xml: &str) -> Result<Self, ExtractError> {
        let mut sheet = Self::default();
        let mut reader = Reader::from_str(xml);
        let mut buf = Vec::new();
        let mut path: Vec<Vec<u8>> = Vec::new();
        let mut current: Option<(String, StyleDef)> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    sheet.handle_element(&e, &path, &mut current);
                    path.push(e.local_name().as_ref().to_vec());
                }
                Ok(Event::Empty(e)) => sheet.handle_element(&e, &path, &mut current),
                Ok(Event::End(e)) => {
                    path.pop();
                    if e.local_name().as_ref() == b"style" {
                        if let Some((id, style)) = current.take() {
                            sheet.styles.insert(id, style);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(xml_error("word/styles.xml", reader.buffer_position(), e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(sheet)
    }

    fn handle_element(&mut self, e: &BytesStart, path: &[Vec<u8>], current: &mut Option<(String, StyleDef)>) {
        let local = e.local_name();
        match local.as_ref() {
            b"style" => {
                let is_paragraph = attr(e, b"type").map_or(true, |t| t == "paragraph");
                *current = match (is_paragraph, attr(e, b"styleId")) {
                    (true, Some(id)) => {
                        if matches!(attr(e, b"default").as_deref(), Some("1") | Some("true")) {
                            self.default_style_id = Some(id.clone());
                        }
                        Some((id, StyleDef::default()))
                    }
                    _ => None,
                };
                return;
            }
            b"name" | b"basedOn" => {
                if let Some((_, style)) = current.as_mut() {
                    let value = attr(e, b"val");
                    if local.as_ref() == b"name" {
                        style.name = value.unwrap_or_default();
                    } else {
                        style.based_on = value;
                    }
                }
                return;
            }
            _ => {}
        }

        let in_defaults = within(path, b"docDefaults");
        let target = if in_defaults {
            Some((&mut self.default_paragraph, &mut self.default_run))
        } else if within(path, b"style") {
            current.as_mut().map(|(_, s)| (&mut s.paragraph, &mut s.run))
        } else {
            None
        };
        let Some((paragraph, run)) = target else {
            return;
        };

        if within(path, b"rPr") {
            run.apply(e);
        } else if within(path, b"pPr") {
            paragraph.apply(e);
        }
    }

    /// Walks `basedOn` from the document defaults down to `style_id`
    /// (or the default paragraph style).
    fn resolve(&self, style_id: Option<&str>) -> ResolvedStyle {
        let mut chain: Vec<&StyleDef> = Vec::new();
        let mut seen: Vec<&str> = Vec::new();
        let mut next = style_id.or(self.default_style_id.as_deref());

        while let Some(id) = next {
            if seen.contains(&id) || seen.len() >= MAX_STYLE_DEPTH {
                break;
            }
            let Some(style) = self.styles.get(id) else {
                break;
            };
            seen.push(id);
            chain.push(style);
            next = style.based_on.as_deref();
        }

        let mut resolved = ResolvedStyle {
            paragraph: self.default_paragraph.clone(),
            run: self.default_run.clone(),
            role: chain.iter().find_map(|style| role_for_style_name(&style.name)),
        };
        for style in chain.iter().rev() {
            resolved.paragraph.overlay(&style.paragraph);
            resolved.run.overlay(&style.run);
        }
        resolved
    }
}

// ============================================================================
// DOCUMENT BODY
// ============================================================================

#[derive(Debug, Default)]
struct RunBuilder {
    props: RunProps,
    text: String,
}

#[derive(Debug, Default)]
struct ParagraphBuilder {
    style_id: Option<String>,
    direct: ParagraphProps,
    runs: Vec<RunBuilder>,
}

impl ParagraphBuilder {
    fn finish(self, styles: &StyleSheet, theme: &ThemeFonts) -> ParagraphAttributes {
        let resolved = styles.resolve(self.style_id.as_deref());
        let mut paragraph = resolved.paragraph.clone();
        paragraph.overlay(&self.direct);

        let text: String = self.runs.iter().map(|r| r.text.as_str()).collect();

        // Font and emphasis come from the first run with visible text
        let mut lead = resolved.run.clone();
        if let Some(run) = self.runs.iter().find(|r| !r.text.trim().is_empty()) {
            lead.overlay(&run.props);
        }

        let font_name = match &lead.font {
            Some(FontRef::Named(name)) => name.clone(),
            Some(FontRef::Theme(slot)) => theme.get(*slot).to_string(),
            None => theme.minor.clone(),
        };
        let font_size = lead.size_pt.unwrap_or(DEFAULT_FONT_SIZE_PT);
        let line_spacing = match paragraph.line_spacing {
            Some(LineSpacing::Multiple(multiple)) => multiple,
            Some(LineSpacing::Points(points)) => points / font_size,
            None => 1.0,
        };

        ParagraphAttributes {
            text,
            font_name,
            font_size,
            bold: lead.bold.unwrap_or(false),
            italic: lead.italic.unwrap_or(false),
            alignment: paragraph.alignment.unwrap_or_default(),
            left_indent_inches: paragraph.left_indent.unwrap_or(0.0),
            first_line_indent_inches: paragraph.first_line_indent.unwrap_or(0.0),
            line_spacing,
            space_before_pt: paragraph.space_before_pt.unwrap_or(0.0),
            space_after_pt: paragraph.space_after_pt.unwrap_or(0.0),
            role_hint: resolved.role,
        }
    }
}

/// Paragraphs and section geometry read from `word/document.xml`.
#[derive(Debug, Clone, Default)]
pub struct DocumentBody {
    pub paragraphs: Vec<ParagraphAttributes>,
    pub page_size: Option<PageSize>,
    pub margins: Option<Margins>,
    pub page_breaks: u32,
}

struct BodyParser<'s> {
    styles: &'s StyleSheet,
    theme: &'s ThemeFonts,
    body: DocumentBody,
    // Stacks: text boxes nest paragraphs inside runs
    paragraphs: Vec<ParagraphBuilder>,
    runs: Vec<RunBuilder>,
}

impl<'s> BodyParser<'s> {
    fn start(&mut self, e: &BytesStart, path: &[Vec<u8>]) {
        let local = e.local_name();
        let in_run_props = within(path, b"rPr") && !within(path, b"rPrChange");
        let in_paragraph_props =
            within(path, b"pPr") && !within(path, b"rPr") && !within(path, b"pPrChange");

        match local.as_ref() {
            b"p" => self.paragraphs.push(ParagraphBuilder::default()),
            b"r" if !self.paragraphs.is_empty() => self.runs.push(RunBuilder::default()),
            b"pStyle" if in_paragraph_props => {
                if let Some(paragraph) = self.paragraphs.last_mut() {
                    paragraph.style_id = attr(e, b"val");
                }
            }
            b"tab" if path.last().is_some_and(|p| p.as_slice() == b"r") => {
                if let Some(run) = self.runs.last_mut() {
                    run.text.push('\t');
                }
            }
            b"br" if path.last().is_some_and(|p| p.as_slice() == b"r") => {
                if attr(e, b"type").as_deref() == Some("page") {
                    self.body.page_breaks += 1;
                } else if let Some(run) = self.runs.last_mut() {
                    run.text.push(' ');
                }
            }
            b"pgSz" if within(path, b"sectPr") => {
                if let (Some(width), Some(height)) = (attr_inches(e, b"w"), attr_inches(e, b"h")) {
                    self.body.page_size = Some(PageSize {
                        width_inches: width,
                        height_inches: height,
                    });
                }
            }
            b"pgMar" if within(path, b"sectPr") => {
                // Negative top/bottom only pins the margin against header growth.
                // A side that is absent or malformed stays NaN so the checker
                // reports it as unreadable.
                let side = |key: &[u8]| attr_inches(e, key).map(f32::abs).unwrap_or(f32::NAN);
                self.body.margins = Some(Margins {
                    top: side(b"top"),
                    bottom: side(b"bottom"),
                    left: side(b"left"),
                    right: side(b"right"),
                });
            }
            _ if in_run_props && within(path, b"r") => {
                if let Some(run) = self.runs.last_mut() {
                    run.props.apply(e);
                }
            }
            _ if in_paragraph_props => {
                if let Some(paragraph) = self.paragraphs.last_mut() {
                    paragraph.direct.apply(e);
                }
            }
            _ => {}
        }
    }

    fn end(&mut self, local: &[u8]) {
        match local {
            b"r" => {
                if let (Some(run), Some(paragraph)) = (self.runs.pop(), self.paragraphs.last_mut()) {
                    paragraph.runs.push(run);
                }
            }
            b"p" => {
                if let Some(paragraph) = self.paragraphs.pop() {
                    let attributes = paragraph.finish(self.styles, self.theme);
                    self.body.paragraphs.push(attributes);
                }
            }
            _ => {}
        }
    }
}

impl DocumentBody {
    pub fn parse(xml: &str, styles: &StyleSheet, theme: &ThemeFonts) -> Result<Self, ExtractError> {
        const PART: &str = "word/document.xml";
        let mut parser = BodyParser {
            styles,
            theme,
            body: DocumentBody::default(),
            paragraphs: Vec::new(),
            runs: Vec::new(),
        };
        let mut reader = Reader::from_str(xml);
        let mut buf = Vec::new();
        let mut path: Vec<Vec<u8>> = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    parser.start(&e, &path);
                    path.push(e.local_name().as_ref().to_vec());
                }
                Ok(Event::Empty(e)) => {
                    parser.start(&e, &path);
                    let local = e.local_name();
                    if matches!(local.as_ref(), b"p" | b"r") {
                        parser.end(local.as_ref());
                    }
                }
                Ok(Event::End(e)) => {
                    path.pop();
                    parser.end(e.local_name().as_ref());
                }
                Ok(Event::Text(t)) => {
                    if path.last().is_some_and(|p| p.as_slice() == b"t") {
                        let text = t
                            .unescape()
                            .map_err(|err| xml_error(PART, reader.buffer_position(), err))?;
                        if let Some(run) = parser.runs.last_mut() {
                            run.text.push_str(&text);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(xml_error(PART, reader.buffer_position(), e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(parser.body)
    }
}

/// `<Pages>` from `docProps/app.xml`, when present and positive.
pub fn parse_page_count(xml: &str) -> Result<Option<u32>, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut in_pages = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => in_pages = e.local_name().as_ref() == b"Pages",
            Ok(Event::Text(t)) if in_pages => {
                let text = t
                    .unescape()
                    .map_err(|err| xml_error("docProps/app.xml", reader.buffer_position(), err))?;
                return Ok(text.trim().parse::<u32>().ok().filter(|&n| n > 0));
            }
            Ok(Event::End(_)) => in_pages = false,
            Ok(Event::Eof) => return Ok(None),
            Err(e) => return Err(xml_error("docProps/app.xml", reader.buffer_position(), e)),
            _ => {}
        }
        buf.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;

    #[test]
    fn test_style_chain_overlays_in_order() {
        let xml = format!(
            r#"<w:styles {W}>
              <w:docDefaults><w:rPrDefault><w:rPr><w:sz w:val="22"/></w:rPr></w:rPrDefault></w:docDefaults>
              <w:style w:type="paragraph" w:default="1" w:styleId="Normal">
                <w:name w:val="Normal"/>
                <w:pPr><w:spacing w:line="480" w:lineRule="auto"/></w:pPr>
                <w:rPr><w:rFonts w:ascii="Georgia"/></w:rPr>
              </w:style>
              <w:style w:type="paragraph" w:styleId="Heading2">
                <w:name w:val="heading 2"/><w:basedOn w:val="Normal"/>
                <w:rPr><w:b/><w:sz w:val="24"/></w:rPr>
              </w:style>
            </w:styles>"#
        );
        let sheet = StyleSheet::parse(&xml).unwrap();

        let heading = sheet.resolve(Some("Heading2"));
        assert_eq!(heading.role, Some(RoleHint::Heading));
        assert_eq!(heading.run.bold, Some(true));
        assert_eq!(heading.run.size_pt, Some(12.0));
        assert_eq!(heading.run.font, Some(FontRef::Named("Georgia".to_string())));
        assert_eq!(heading.paragraph.line_spacing, Some(LineSpacing::Multiple(2.0)));

        let normal = sheet.resolve(None);
        assert_eq!(normal.run.size_pt, Some(11.0));
        assert_eq!(normal.role, None);
    }

    #[test]
    fn test_space_before_and_after_in_points() {
        let styles = format!(
            r#"<w:styles {W}>
              <w:docDefaults><w:pPrDefault><w:pPr><w:spacing w:after="160"/></w:pPr></w:pPrDefault></w:docDefaults>
            </w:styles>"#
        );
        let sheet = StyleSheet::parse(&styles).unwrap();
        let xml = format!(
            r#"<w:document {W}><w:body>
              <w:p><w:r><w:t>Inherited</w:t></w:r></w:p>
              <w:p><w:pPr><w:spacing w:before="240" w:after="0"/></w:pPr><w:r><w:t>Direct</w:t></w:r></w:p>
            </w:body></w:document>"#
        );
        let body = DocumentBody::parse(&xml, &sheet, &ThemeFonts::default()).unwrap();
        assert_eq!(body.paragraphs[0].space_before_pt, 0.0);
        assert_eq!(body.paragraphs[0].space_after_pt, 8.0);
        assert_eq!(body.paragraphs[1].space_before_pt, 12.0);
        assert_eq!(body.paragraphs[1].space_after_pt, 0.0);
    }

    #[test]
    fn test_based_on_cycle_terminates() {
        let xml = format!(
            r#"<w:styles {W}>
              <w:style w:type="paragraph" w:styleId="A"><w:name w:val="A"/><w:basedOn w:val="B"/></w:style>
              <w:style w:type="paragraph" w:styleId="B"><w:name w:val="B"/><w:basedOn w:val="A"/></w:style>
            </w:styles>"#
        );
        let sheet = StyleSheet::parse(&xml).unwrap();
        assert_eq!(sheet.resolve(Some("A")).role, None);
    }

    #[test]
    fn test_exact_line_spacing_is_relative_to_font_size() {
        let xml = format!(
            r#"<w:document {W}><w:body>
              <w:p><w:pPr><w:spacing w:line="480" w:lineRule="exact"/></w:pPr>
                <w:r><w:rPr><w:sz w:val="24"/></w:rPr><w:t>Exact</w:t></w:r></w:p>
            </w:body></w:document>"#
        );
        let body = DocumentBody::parse(&xml, &StyleSheet::default(), &ThemeFonts::default()).unwrap();
        assert_eq!(body.paragraphs[0].line_spacing, 2.0);
        assert_eq!(body.paragraphs[0].font_name, "Calibri");
    }

    #[test]
    fn test_paragraph_mark_run_properties_are_ignored() {
        let xml = format!(
            r#"<w:document {W}><w:body>
              <w:p><w:pPr><w:rPr><w:b/></w:rPr></w:pPr><w:r><w:t>Plain</w:t></w:r></w:p>
              <w:p/>
            </w:body></w:document>"#
        );
        let body = DocumentBody::parse(&xml, &StyleSheet::default(), &ThemeFonts::default()).unwrap();
        assert_eq!(body.paragraphs.len(), 2);
        assert!(!body.paragraphs[0].bold);
        assert!(body.paragraphs[1].is_blank());
    }

    #[test]
    fn test_theme_fonts() {
        let xml = r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"><a:themeElements><a:fontScheme name="Office">
            <a:majorFont><a:latin typeface="Georgia"/><a:ea typeface=""/></a:majorFont>
            <a:minorFont><a:latin typeface="Arial"/></a:minorFont>
          </a:fontScheme></a:themeElements></a:theme>"#;
        let fonts = ThemeFonts::parse(xml).unwrap();
        assert_eq!(fonts.major, "Georgia");
        assert_eq!(fonts.minor, "Arial");
    }

    #[test]
    fn test_page_count() {
        let xml = "<Properties><Template>Normal.dotm</Template><Pages>12</Pages></Properties>";
        assert_eq!(parse_page_count(xml).unwrap(), Some(12));
        assert_eq!(parse_page_count("<Properties/>").unwrap(), None);
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        let err = StyleSheet::parse("<w:styles><w:style></w:styles>").unwrap_err();
        assert!(matches!(err, ExtractError::Xml { part: "word/styles.xml", .. }));
    }
}
