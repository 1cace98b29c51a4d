//! Page layout model recovered from a PDF content stream.
//!
//! Only what table detection needs is kept: positioned runs of text and the
//! horizontal/vertical rulings drawn on the page. Coordinates are PDF user
//! space (points, origin bottom-left, y grows upwards).

use lopdf::content::{Content, Operation};
use lopdf::{Object, ObjectId};
use std::collections::HashMap;
use tracing::debug;

use crate::error::ExtractionError;

/// Rough glyph advance as a fraction of the font size; no font metrics are read.
const GLYPH_WIDTH: f64 = 0.5;
/// Rulings whose ends differ by less than this along one axis count as axis aligned.
const AXIS_TOLERANCE: f64 = 1.0;
/// `TJ` adjustments (thousandths of an em) beyond this are treated as a word break.
const TJ_SPACE_THRESHOLD: f64 = 200.0;
/// Page tree levels searched for inherited resources.
const MAX_TREE_DEPTH: usize = 32;

/// A run of text drawn at one position.
#[derive(Debug, Clone, PartialEq)]
pub struct TextChunk {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub font_size: f64,
    pub text: String,
}

impl TextChunk {
    pub fn new(x: f64, y: f64, font_size: f64, text: impl Into<String>) -> Self {
        let text = text.into();
        let width = text.chars().count() as f64 * GLYPH_WIDTH * font_size;
        Self {
            x,
            y,
            width,
            font_size,
            text,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }
}

/// An axis-aligned line segment, normalised so that `x0 <= x1` and `y0 <= y1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ruling {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Ruling {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    pub fn horizontal(y: f64, x0: f64, x1: f64) -> Self {
        Self::new(x0, y, x1, y)
    }

    pub fn vertical(x: f64, y0: f64, y1: f64) -> Self {
        Self::new(x, y0, x, y1)
    }

    pub fn is_horizontal(&self) -> bool {
        self.y1 - self.y0 <= AXIS_TOLERANCE && self.x1 - self.x0 > AXIS_TOLERANCE
    }

    pub fn is_vertical(&self) -> bool {
        self.x1 - self.x0 <= AXIS_TOLERANCE && self.y1 - self.y0 > AXIS_TOLERANCE
    }

    pub fn length(&self) -> f64 {
        (self.x1 - self.x0).max(self.y1 - self.y0)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    /// 1-based page number.
    pub number: u32,
    pub chunks: Vec<TextChunk>,
    pub rulings: Vec<Ruling>,
}

/// Which pages a detector should look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSelection {
    Page(u32),
    All,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pages: Vec<Page>,
}

impl Document {
    pub fn from_pages(pages: Vec<Page>) -> Self {
        Self { pages }
    }

    /// Parses PDF bytes and interprets every page's content stream.
    pub fn from_pdf_bytes(bytes: &[u8]) -> Result<Self, ExtractionError> {
        let pdf = lopdf::Document::load_mem(bytes)
            .map_err(|e| ExtractionError::Document(e.to_string()))?;

        let mut pages = Vec::new();
        for (number, page_id) in pdf.get_pages() {
            let raw = pdf
                .get_page_content(page_id)
                .map_err(|e| ExtractionError::Document(format!("page {number}: {e}")))?;
            let content = Content::decode(&raw)
                .map_err(|e| ExtractionError::Document(format!("page {number}: {e}")))?;

            let fonts = page_fonts(&pdf, page_id);
            let page = interpret(number, &content.operations, fonts);
            debug!(
                page = number,
                chunks = page.chunks.len(),
                rulings = page.rulings.len(),
                "Page interpreted"
            );
            pages.push(page);
        }

        if pages.is_empty() {
            return Err(ExtractionError::Document("document has no pages".into()));
        }

        Ok(Self { pages })
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn select(&self, selection: PageSelection) -> impl Iterator<Item = &Page> {
        self.pages.iter().filter(move |p| match selection {
            PageSelection::Page(n) => p.number == n,
            PageSelection::All => true,
        })
    }
}

/// Text decoding for one font resource, taken from its `ToUnicode` CMap.
#[derive(Debug, Clone, PartialEq)]
struct FontDecoder {
    /// Bytes per character code.
    code_width: usize,
    to_unicode: HashMap<u32, String>,
}

/// Font decoders of one page keyed by resource name (`F1` in `/F1 8 Tf`).
/// Fonts without a `ToUnicode` map are absent and fall back to [`decode_text`].
type FontMap = HashMap<Vec<u8>, FontDecoder>;

impl FontDecoder {
    fn decode(&self, bytes: &[u8]) -> String {
        let mut text = String::new();
        for code in bytes.chunks(self.code_width) {
            match self.to_unicode.get(&code_of(code)) {
                Some(mapped) => text.push_str(mapped),
                None if self.code_width == 1 => text.push(char::from(code[0])),
                None => text.push(char::REPLACEMENT_CHARACTER),
            }
        }
        text
    }

    /// Reads the `codespacerange`, `bfchar` and `bfrange` sections of a CMap.
    /// The CMap body tokenises like a content stream, so each `end*` keyword
    /// arrives as an operator carrying its section's entries as operands.
    fn from_cmap(data: &[u8], code_width: usize) -> Option<Self> {
        let content = Content::decode(data).ok()?;
        let mut decoder = Self {
            code_width,
            to_unicode: HashMap::new(),
        };

        for op in &content.operations {
            match op.operator.as_str() {
                "endcodespacerange" => {
                    if let Some(Object::String(low, _)) = op.operands.first() {
                        decoder.code_width = low.len().max(1);
                    }
                }
                "endbfchar" => {
                    for pair in op.operands.chunks_exact(2) {
                        if let [Object::String(src, _), Object::String(dst, _)] = pair {
                            decoder.to_unicode.insert(code_of(src), utf16_text(dst));
                        }
                    }
                }
                "endbfrange" => {
                    for entry in op.operands.chunks_exact(3) {
                        let [Object::String(low, _), Object::String(high, _), dst] = entry else {
                            continue;
                        };
                        decoder.insert_range(code_of(low), code_of(high), dst);
                    }
                }
                _ => {}
            }
        }

        (!decoder.to_unicode.is_empty()).then_some(decoder)
    }

    fn insert_range(&mut self, low: u32, high: u32, dst: &Object) {
        match dst {
            Object::String(start, _) => {
                let mut units = utf16_units(start);
                for code in low..=high {
                    self.to_unicode
                        .insert(code, String::from_utf16_lossy(&units));
                    if let Some(last) = units.last_mut() {
                        *last = last.wrapping_add(1);
                    }
                }
            }
            Object::Array(targets) => {
                for (code, target) in (low..=high).zip(targets) {
                    if let Object::String(bytes, _) = target {
                        self.to_unicode.insert(code, utf16_text(bytes));
                    }
                }
            }
            _ => {}
        }
    }
}

fn code_of(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b))
}

fn utf16_units(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect()
}

fn utf16_text(bytes: &[u8]) -> String {
    String::from_utf16_lossy(&utf16_units(bytes))
}

fn resolve<'a>(pdf: &'a lopdf::Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => pdf.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Looks `key` up on the page, then on its ancestors in the page tree.
fn inherited<'a>(pdf: &'a lopdf::Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut node = pdf.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return resolve(pdf, value);
        }
        let parent = node.get(b"Parent").ok()?.as_reference().ok()?;
        node = pdf.get_dictionary(parent).ok()?;
    }
    None
}

/// Decoders for every font of the page that carries a `ToUnicode` map.
/// Fonts that cannot be resolved are left out rather than failing the page.
fn page_fonts(pdf: &lopdf::Document, page_id: ObjectId) -> FontMap {
    let mut fonts = FontMap::new();
    let Some(Object::Dictionary(resources)) = inherited(pdf, page_id, b"Resources") else {
        return fonts;
    };
    let Some(Object::Dictionary(font_dict)) = resources
        .get(b"Font")
        .ok()
        .and_then(|obj| resolve(pdf, obj))
    else {
        return fonts;
    };

    for (name, value) in font_dict.iter() {
        let Some(Object::Dictionary(font)) = resolve(pdf, value) else {
            continue;
        };
        let Some(Object::Stream(cmap)) = font
            .get(b"ToUnicode")
            .ok()
            .and_then(|obj| resolve(pdf, obj))
        else {
            continue;
        };
        let composite = matches!(font.get(b"Subtype"), Ok(Object::Name(n)) if n.as_slice() == b"Type0");
        let data = cmap
            .decompressed_content()
            .unwrap_or_else(|_| cmap.content.clone());
        match FontDecoder::from_cmap(&data, if composite { 2 } else { 1 }) {
            Some(decoder) => {
                fonts.insert(name.clone(), decoder);
            }
            None => debug!(font = %String::from_utf8_lossy(name), "Unusable ToUnicode map, using raw bytes"),
        }
    }
    fonts
}

/// Row-vector affine matrix `[a b c d e f]` as used by PDF.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix([f64; 6]);

impl Matrix {
    const IDENTITY: Matrix = Matrix([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    fn translate(tx: f64, ty: f64) -> Self {
        Matrix([1.0, 0.0, 0.0, 1.0, tx, ty])
    }

    /// `self × rhs`
    fn then(&self, rhs: &Matrix) -> Matrix {
        let [a, b, c, d, e, f] = self.0;
        let [ra, rb, rc, rd, re, rf] = rhs.0;
        Matrix([
            a * ra + b * rc,
            a * rb + b * rd,
            c * ra + d * rc,
            c * rb + d * rd,
            e * ra + f * rc + re,
            e * rb + f * rd + rf,
        ])
    }

    fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let [a, b, c, d, e, f] = self.0;
        (a * x + c * y + e, b * x + d * y + f)
    }

    fn vertical_scale(&self) -> f64 {
        self.0[2].hypot(self.0[3])
    }
}

/// The part of the graphics state saved by `q` and restored by `Q`,
/// including the text state the interpreter tracks.
#[derive(Debug, Clone, Default)]
struct GraphicsState {
    ctm: Option<Matrix>,
    font: Option<Vec<u8>>,
    font_size: f64,
    leading: f64,
}

#[derive(Default)]
struct Interpreter {
    state: GraphicsState,
    stack: Vec<GraphicsState>,
    fonts: FontMap,
    tm: Option<Matrix>,
    tlm: Option<Matrix>,
    current: (f64, f64),
    subpath_start: (f64, f64),
    path: Vec<((f64, f64), (f64, f64))>,
    page: Page,
}

fn interpret(number: u32, operations: &[Operation], fonts: FontMap) -> Page {
    let mut it = Interpreter {
        state: GraphicsState {
            font_size: 1.0,
            ..Default::default()
        },
        fonts,
        page: Page {
            number,
            ..Default::default()
        },
        ..Default::default()
    };
    for op in operations {
        it.step(op);
    }
    it.page
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

fn numbers<const N: usize>(operands: &[Object]) -> Option<[f64; N]> {
    if operands.len() < N {
        return None;
    }
    let mut out = [0.0; N];
    for (slot, obj) in out.iter_mut().zip(&operands[operands.len() - N..]) {
        *slot = number(obj)?;
    }
    Some(out)
}

/// Decodes a PDF string with no font mapping: UTF-16BE when it carries a
/// byte order mark, Latin-1 otherwise.
fn decode_text(bytes: &[u8]) -> String {
    if let [0xFE, 0xFF, rest @ ..] = bytes {
        return utf16_text(rest);
    }
    bytes.iter().map(|&b| b as char).collect()
}

impl Interpreter {
    fn ctm(&self) -> Matrix {
        self.state.ctm.unwrap_or(Matrix::IDENTITY)
    }

    fn decode(&self, bytes: &[u8]) -> String {
        match self.state.font.as_ref().and_then(|name| self.fonts.get(name)) {
            Some(font) => font.decode(bytes),
            None => decode_text(bytes),
        }
    }

    fn tm(&self) -> Matrix {
        self.tm.unwrap_or(Matrix::IDENTITY)
    }

    fn step(&mut self, op: &Operation) {
        let operands = op.operands.as_slice();
        match op.operator.as_str() {
            "q" => self.stack.push(self.state.clone()),
            "Q" => {
                if let Some(saved) = self.stack.pop() {
                    self.state = saved;
                }
            }
            "cm" => {
                if let Some(m) = numbers::<6>(operands) {
                    self.state.ctm = Some(Matrix(m).then(&self.ctm()));
                }
            }
            "BT" => {
                self.tm = Some(Matrix::IDENTITY);
                self.tlm = Some(Matrix::IDENTITY);
            }
            "Tf" => {
                if let Some(Object::Name(name)) = operands.first() {
                    self.state.font = Some(name.clone());
                }
                if let Some([size]) = numbers::<1>(operands) {
                    self.state.font_size = size;
                }
            }
            "TL" => {
                if let Some([leading]) = numbers::<1>(operands) {
                    self.state.leading = leading;
                }
            }
            "Td" => {
                if let Some([tx, ty]) = numbers::<2>(operands) {
                    self.move_line(tx, ty);
                }
            }
            "TD" => {
                if let Some([tx, ty]) = numbers::<2>(operands) {
                    self.state.leading = -ty;
                    self.move_line(tx, ty);
                }
            }
            "Tm" => {
                if let Some(m) = numbers::<6>(operands) {
                    self.tm = Some(Matrix(m));
                    self.tlm = Some(Matrix(m));
                }
            }
            "T*" => self.move_line(0.0, -self.state.leading),
            "Tj" => {
                if let Some(Object::String(bytes, _)) = operands.first() {
                    self.show(self.decode(bytes));
                }
            }
            "'" | "\"" => {
                self.move_line(0.0, -self.state.leading);
                if let Some(Object::String(bytes, _)) = operands.last() {
                    self.show(self.decode(bytes));
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    self.show_array(items);
                }
            }
            "m" => {
                if let Some([x, y]) = numbers::<2>(operands) {
                    self.current = (x, y);
                    self.subpath_start = (x, y);
                }
            }
            "l" => {
                if let Some([x, y]) = numbers::<2>(operands) {
                    self.path.push((self.current, (x, y)));
                    self.current = (x, y);
                }
            }
            "h" => {
                self.path.push((self.current, self.subpath_start));
                self.current = self.subpath_start;
            }
            "re" => {
                if let Some([x, y, w, h]) = numbers::<4>(operands) {
                    let corners = [(x, y), (x + w, y), (x + w, y + h), (x, y + h)];
                    for i in 0..4 {
                        self.path.push((corners[i], corners[(i + 1) % 4]));
                    }
                    self.current = (x, y);
                    self.subpath_start = (x, y);
                }
            }
            "S" | "s" | "f" | "F" | "f*" | "B" | "B*" | "b" | "b*" => self.paint(),
            "n" => self.path.clear(),
            _ => {}
        }
    }

    fn move_line(&mut self, tx: f64, ty: f64) {
        let tlm = Matrix::translate(tx, ty).then(&self.tlm.unwrap_or(Matrix::IDENTITY));
        self.tlm = Some(tlm);
        self.tm = Some(tlm);
    }

    fn show(&mut self, text: String) {
        let advance = text.chars().count() as f64 * GLYPH_WIDTH * self.state.font_size;
        self.emit(text);
        self.advance(advance);
    }

    fn show_array(&mut self, items: &[Object]) {
        let mut text = String::new();
        let mut advance = 0.0;
        for item in items {
            match item {
                Object::String(bytes, _) => {
                    let piece = self.decode(bytes);
                    advance += piece.chars().count() as f64 * GLYPH_WIDTH * self.state.font_size;
                    text.push_str(&piece);
                }
                other => {
                    if let Some(adjust) = number(other) {
                        if adjust < -TJ_SPACE_THRESHOLD && !text.ends_with(' ') {
                            text.push(' ');
                        }
                        advance -= adjust / 1000.0 * self.state.font_size;
                    }
                }
            }
        }
        self.emit(text);
        self.advance(advance);
    }

    fn emit(&mut self, text: String) {
        if text.trim().is_empty() {
            return;
        }
        let trm = self.tm().then(&self.ctm());
        let (x, y) = trm.apply(0.0, 0.0);
        let size = self.state.font_size * trm.vertical_scale();
        self.page.chunks.push(TextChunk::new(x, y, size, text));
    }

    fn advance(&mut self, tx: f64) {
        self.tm = Some(Matrix::translate(tx, 0.0).then(&self.tm()));
    }

    fn paint(&mut self) {
        let ctm = self.ctm();
        for ((x0, y0), (x1, y1)) in self.path.drain(..) {
            let (ax, ay) = ctm.apply(x0, y0);
            let (bx, by) = ctm.apply(x1, y1);
            let ruling = Ruling::new(ax, ay, bx, by);
            if ruling.is_horizontal() || ruling.is_vertical() {
                self.page.rulings.push(ruling);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{Stream, StringFormat, dictionary};

    /// Identity-H style glyph IDs for "Sofia": bfchar for S and o, a ranged
    /// entry covering f..i and an array entry for a.
    const SUBSET_CMAP: &str = "/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
/CMapName /Adobe-Identity-UCS def
/CMapType 2 def
1 begincodespacerange
<0000> <FFFF>
endcodespacerange
2 beginbfchar
<0036> <0053>
<0052> <006F>
endbfchar
2 beginbfrange
<0049> <004C> <0066>
<0044> <0044> [<0061>]
endbfrange
endcmap
CMapName currentdict /CMap defineresource pop
end
end
";
    const SOFIA_GLYPHS: [u8; 10] = [0x00, 0x36, 0x00, 0x52, 0x00, 0x49, 0x00, 0x4C, 0x00, 0x44];

    fn hex(bytes: &[u8]) -> Object {
        Object::String(bytes.to_vec(), StringFormat::Hexadecimal)
    }

    fn op(operator: &str, operands: Vec<Object>) -> Operation {
        Operation::new(operator, operands)
    }

    fn s(text: &str) -> Object {
        Object::String(text.as_bytes().to_vec(), StringFormat::Literal)
    }

    #[test]
    fn test_text_position_follows_text_matrix_and_ctm() {
        let ops = vec![
            op("q", vec![]),
            op("cm", vec![1.into(), 0.into(), 0.into(), 1.into(), 10.into(), 20.into()]),
            op("BT", vec![]),
            op("Tf", vec![Object::Name(b"F1".to_vec()), 12.into()]),
            op("Td", vec![100.into(), 700.into()]),
            op("Tj", vec![s("Budapest")]),
            op("ET", vec![]),
            op("Q", vec![]),
        ];
        let page = interpret(1, &ops, FontMap::new());

        assert_eq!(page.chunks.len(), 1);
        let chunk = &page.chunks[0];
        assert_eq!(chunk.text, "Budapest");
        assert_eq!(chunk.x, 110.0);
        assert_eq!(chunk.y, 720.0);
        assert_eq!(chunk.font_size, 12.0);
    }

    #[test]
    fn test_rectangles_become_rulings() {
        let ops = vec![
            op("re", vec![0.into(), 0.into(), 100.into(), 20.into()]),
            op("S", vec![]),
            op("m", vec![5.into(), 5.into()]),
            op("l", vec![50.into(), 60.into()]),
            op("S", vec![]),
        ];
        let page = interpret(1, &ops, FontMap::new());

        // the diagonal line is dropped
        assert_eq!(page.rulings.len(), 4);
        assert_eq!(page.rulings.iter().filter(|r| r.is_horizontal()).count(), 2);
        assert_eq!(page.rulings.iter().filter(|r| r.is_vertical()).count(), 2);
    }

    #[test]
    fn test_discarded_path_is_not_painted() {
        let ops = vec![
            op("re", vec![0.into(), 0.into(), 100.into(), 20.into()]),
            op("n", vec![]),
        ];
        assert!(interpret(1, &ops, FontMap::new()).rulings.is_empty());
    }

    #[test]
    fn test_tj_array_inserts_word_breaks() {
        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec![Object::Name(b"F1".to_vec()), 10.into()]),
            op(
                "TJ",
                vec![Object::Array(vec![s("Data"), Object::Integer(-300), s("generated")])],
            ),
            op("ET", vec![]),
        ];
        let page = interpret(1, &ops, FontMap::new());
        assert_eq!(page.chunks[0].text, "Data generated");
    }

    #[test]
    fn test_q_restores_text_state() {
        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec![Object::Name(b"F1".to_vec()), 12.into()]),
            op("Td", vec![0.into(), 100.into()]),
            op("q", vec![]),
            op("Tf", vec![Object::Name(b"F2".to_vec()), 20.into()]),
            op("TL", vec![30.into()]),
            op("Q", vec![]),
            op("T*", vec![]),
            op("Tj", vec![s("Rome")]),
            op("ET", vec![]),
        ];
        let page = interpret(1, &ops, FontMap::new());

        let chunk = &page.chunks[0];
        assert_eq!(chunk.font_size, 12.0);
        // leading was restored to zero, so T* stays on the same line
        assert_eq!(chunk.y, 100.0);
    }

    #[test]
    fn test_unbalanced_restore_keeps_state() {
        let ops = vec![
            op("Q", vec![]),
            op("BT", vec![]),
            op("Tf", vec![Object::Name(b"F1".to_vec()), 9.into()]),
            op("Tj", vec![s("Rome")]),
            op("ET", vec![]),
        ];
        assert_eq!(interpret(1, &ops, FontMap::new()).chunks[0].font_size, 9.0);
    }

    #[test]
    fn test_cmap_maps_chars_and_ranges() {
        let decoder = FontDecoder::from_cmap(SUBSET_CMAP.as_bytes(), 1).unwrap();
        assert_eq!(decoder.code_width, 2);
        assert_eq!(decoder.to_unicode.len(), 7);
        assert_eq!(decoder.decode(&SOFIA_GLYPHS), "Sofia");
        // unmapped two-byte codes are not read as Latin-1
        assert_eq!(decoder.decode(&[0x00, 0x01]), "\u{FFFD}");
    }

    #[test]
    fn test_cmap_without_mappings_is_unusable() {
        assert!(FontDecoder::from_cmap(b"begincmap endcmap", 2).is_none());
    }

    #[test]
    fn test_text_decodes_through_the_selected_font() {
        let fonts: FontMap = [(
            b"F1".to_vec(),
            FontDecoder::from_cmap(SUBSET_CMAP.as_bytes(), 2).unwrap(),
        )]
        .into_iter()
        .collect();
        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec![Object::Name(b"F1".to_vec()), 10.into()]),
            op("Tj", vec![hex(&SOFIA_GLYPHS)]),
            op("TJ", vec![Object::Array(vec![hex(&SOFIA_GLYPHS[..4]), Object::Integer(-10), hex(&SOFIA_GLYPHS[4..])])]),
            op("Tf", vec![Object::Name(b"F2".to_vec()), 10.into()]),
            op("Tj", vec![s("Rome")]),
            op("ET", vec![]),
        ];
        let page = interpret(1, &ops, fonts);

        let texts: Vec<&str> = page.chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["Sofia", "Sofia", "Rome"]);
    }

    #[test]
    fn test_subset_font_text_is_read_from_pdf() {
        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let cmap_id = doc.add_object(Stream::new(dictionary! {}, SUBSET_CMAP.as_bytes().to_vec()));
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "BaseFont" => "ABCDEF+Helvetica",
            "Encoding" => "Identity-H",
            "ToUnicode" => cmap_id,
        });
        let content = Content {
            operations: vec![
                op("BT", vec![]),
                op("Tf", vec![Object::Name(b"F1".to_vec()), 10.into()]),
                op("Td", vec![50.into(), 700.into()]),
                op("Tj", vec![hex(&SOFIA_GLYPHS)]),
                op("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();

        let parsed = Document::from_pdf_bytes(&bytes).unwrap();
        let chunk = &parsed.pages()[0].chunks[0];
        assert_eq!(chunk.text, "Sofia");
        assert_eq!((chunk.x, chunk.y), (50.0, 700.0));
    }

    #[test]
    fn test_decode_utf16_with_bom() {
        let bytes = [0xFE, 0xFF, 0x00, 0x4B, 0x00, 0x72, 0x00, 0x61, 0x00, 0x6B, 0x00, 0xF3, 0x00, 0x77];
        assert_eq!(decode_text(&bytes), "Kraków");
    }

    #[test]
    fn test_invalid_bytes_are_a_document_error() {
        let err = Document::from_pdf_bytes(b"not a pdf").unwrap_err();
        assert!(matches!(err, ExtractionError::Document(_)));
    }

    #[test]
    fn test_select_pages() {
        let doc = Document::from_pages(vec![
            Page { number: 1, ..Default::default() },
            Page { number: 2, ..Default::default() },
        ]);
        assert_eq!(doc.select(PageSelection::Page(2)).count(), 1);
        assert_eq!(doc.select(PageSelection::All).count(), 2);
        assert_eq!(doc.select(PageSelection::Page(3)).count(), 0);
    }
}
