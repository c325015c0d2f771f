//! Reading the app identifier from config.xml and versions from Info.plist.

use crate::error::{InputError, ToolError};
use anyhow::Context;
use camino::Utf8Path;
use fs_err as fs;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::collections::BTreeMap;

pub const SHORT_VERSION_KEY: &str = "CFBundleShortVersionString";
pub const BUNDLE_VERSION_KEY: &str = "CFBundleVersion";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleVersions {
    pub short_version: String,
    pub bundle_version: String,
}

/// The `id` attribute of the root element of a Cordova `config.xml`.
pub fn read_app_id(config_xml: &Utf8Path) -> Result<String, ToolError> {
    let text = read_required(config_xml)?;
    parse_app_id(&text)
        .with_context(|| format!("parse {config_xml}"))?
        .ok_or_else(|| {
            InputError::IdentifierMissing {
                path: config_xml.to_path_buf(),
                what: "widget id",
            }
            .into()
        })
}

/// Anything before the first `<` (a BOM, stray whitespace) is ignored.
pub fn parse_app_id(text: &str) -> anyhow::Result<Option<String>> {
    let start = text.find('<').unwrap_or(text.len());
    let mut reader = Reader::from_str(&text[start..]);

    loop {
        match reader.read_event().context("read xml event")? {
            Event::Start(e) | Event::Empty(e) => {
                let Some(attr) = e.try_get_attribute("id").context("read id attribute")? else {
                    return Ok(None);
                };
                let id = attr.unescape_value().context("unescape id attribute")?;
                return Ok(Some(id.into_owned()));
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

/// Version strings from the host app's Info.plist.
pub fn read_bundle_versions(info_plist: &Utf8Path) -> Result<BundleVersions, ToolError> {
    let text = read_required(info_plist)?;
    let mut strings =
        parse_plist_strings(&text).with_context(|| format!("parse {info_plist}"))?;
    let mut take = |key: &'static str| {
        strings.remove(key).ok_or_else(|| InputError::IdentifierMissing {
            path: info_plist.to_path_buf(),
            what: key,
        })
    };
    Ok(BundleVersions {
        short_version: take(SHORT_VERSION_KEY)?,
        bundle_version: take(BUNDLE_VERSION_KEY)?,
    })
}

/// String-valued entries of a property list's top-level dictionary.
pub fn parse_plist_strings(text: &str) -> anyhow::Result<BTreeMap<String, String>> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut path: Vec<String> = Vec::new();
    let mut key: Option<String> = None;
    let mut strings = BTreeMap::new();

    loop {
        match reader.read_event().context("read plist event")? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if path.join("/") == "plist/dict" && name != "key" && name != "string" {
                    key = None;
                }
                path.push(name);
            }
            Event::Text(t) => {
                let value = t.unescape().context("unescape plist text")?.into_owned();
                match path.join("/").as_str() {
                    "plist/dict/key" => key = Some(value),
                    "plist/dict/string" => {
                        if let Some(k) = key.take() {
                            strings.insert(k, value);
                        }
                    }
                    _ => {}
                }
            }
            Event::Empty(e) if path.join("/") == "plist/dict" => {
                if let Some(k) = key.take()
                    && e.local_name().as_ref() == b"string"
                {
                    strings.insert(k, String::new());
                }
            }
            Event::End(_) => {
                if path.join("/") == "plist/dict/string"
                    && let Some(k) = key.take()
                {
                    strings.insert(k, String::new());
                }
                path.pop();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(strings)
}

fn read_required(path: &Utf8Path) -> Result<String, ToolError> {
    if !path.is_file() {
        return Err(InputError::FileMissing {
            path: path.to_path_buf(),
        }
        .into());
    }
    Ok(fs::read_to_string(path).with_context(|| format!("read {path}"))?)
}
