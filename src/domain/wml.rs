//! WordprocessingML vocabulary used by the section model.

pub const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";
/// Office Math (OMML), embedded in paragraphs as `m:oMath`.
pub const MATH_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/math";
pub const PREFIX: &str = "w";

pub const DOCUMENT: &str = "document";
pub const BODY: &str = "body";

// block level
pub const P: &str = "p";
pub const P_PR: &str = "pPr";
pub const SECT_PR: &str = "sectPr";
pub const SECT_TYPE: &str = "type";
pub const TBL: &str = "tbl";
pub const TR: &str = "tr";
pub const TC: &str = "tc";

// run level
pub const R: &str = "r";
pub const R_PR: &str = "rPr";
pub const T: &str = "t";
pub const TAB: &str = "tab";
pub const BR: &str = "br";
pub const CR: &str = "cr";
pub const INSTR_TEXT: &str = "instrText";

// run properties
pub const R_FONTS: &str = "rFonts";
pub const B: &str = "b";
pub const I: &str = "i";
pub const STRIKE: &str = "strike";
pub const COLOR: &str = "color";
pub const SZ: &str = "sz";
pub const SZ_CS: &str = "szCs";
pub const HIGHLIGHT: &str = "highlight";
pub const U: &str = "u";

// revisions
pub const INS: &str = "ins";
pub const DEL: &str = "del";
pub const DEL_TEXT: &str = "delText";
pub const DEL_INSTR_TEXT: &str = "delInstrText";

/// Elements whose `w:id` shares the revision id space.
pub const REVISION_ELEMENTS: &[&str] = &[
    INS,
    DEL,
    "moveFrom",
    "moveTo",
    "rPrChange",
    "pPrChange",
    "sectPrChange",
    "tblPrChange",
    "trPrChange",
    "tcPrChange",
];

/// Elements whose whitespace-only text content is significant.
pub const TEXT_CARRIERS: &[&str] = &[T, DEL_TEXT, INSTR_TEXT, DEL_INSTR_TEXT];

/// OMML text element (`m:t`).
pub const MATH_TEXT: &str = "t";
