//! Section-aware document object model for WordprocessingML bodies.
//!
//! A `.docx` body is a flat run of paragraphs and tables; sections are not
//! subtrees but stretches of that run closed by `w:sectPr` markers. This
//! crate resolves which blocks belong to which section and edits sections in
//! place (enumerate, clear, insert) on an arena-backed markup tree.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
