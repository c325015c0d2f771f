//! Reader and writer for the OpenStep property-list dialect used by Xcode
//! `project.pbxproj` files.
//!
//! Responsibilities:
//! - Parse text into an ordered [`Value`] tree, remembering which strings
//!   were quoted so untouched values serialize back unchanged.
//! - Write a tree back in Xcode's layout (object sections, one-line build
//!   files and file references, `/* name */` reference comments).
//!
//! Comments in the input are discarded; the writer regenerates reference
//! comments through an [`Annotator`] supplied by the caller.

mod error;
mod parse;
mod value;
mod write;

pub use error::ParseError;
pub use parse::parse;
pub use value::{Dict, PbxString, Value};
pub use write::{Annotator, NoComments, to_string};
