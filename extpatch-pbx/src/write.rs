use crate::value::{Dict, PbxString, Value};
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Object classes Xcode writes on a single line.
const INLINE_ISAS: &[&str] = &["PBXBuildFile", "PBXFileReference"];

/// Keys whose values hold an object id Xcode never annotates.
const UNANNOTATED_KEYS: &[&str] = &["remoteGlobalIDString", "TestTargetID"];

/// Supplies the `/* ... */` comment written after an object id.
pub trait Annotator {
    fn annotate(&self, id: &str) -> Option<String>;
}

/// Annotator that writes no comments.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoComments;

impl Annotator for NoComments {
    fn annotate(&self, _id: &str) -> Option<String> {
        None
    }
}

impl<S: std::hash::BuildHasher> Annotator for std::collections::HashMap<String, String, S> {
    fn annotate(&self, id: &str) -> Option<String> {
        self.get(id).cloned()
    }
}

/// Serialize `root` in Xcode's pbxproj layout.
///
/// A top-level `objects` dictionary is written as isa-grouped sections with
/// each section's objects sorted by id.
pub fn to_string(root: &Value, annotator: &dyn Annotator) -> String {
    let mut w = Writer {
        out: String::new(),
        annotator,
    };
    w.out.push_str("// !$*UTF8*$!\n");
    match root {
        Value::Dict(d) => w.root(d),
        other => {
            w.value(other, 0, None);
            w.out.push('\n');
        }
    }
    w.out
}

struct Writer<'a> {
    out: String,
    annotator: &'a dyn Annotator,
}

impl Writer<'_> {
    fn indent(&mut self, depth: usize) {
        for _ in 0..depth {
            self.out.push('\t');
        }
    }

    fn root(&mut self, d: &Dict) {
        self.out.push_str("{\n");
        for (key, value) in d {
            self.indent(1);
            self.key(key);
            self.out.push_str(" = ");
            match (key.as_str(), value) {
                ("objects", Value::Dict(objects)) => {
                    self.out.push_str("{\n");
                    self.objects(objects);
                    self.indent(1);
                    self.out.push('}');
                }
                _ => self.value(value, 1, Some(key)),
            }
            self.out.push_str(";\n");
        }
        self.out.push_str("}\n");
    }

    fn objects(&mut self, objects: &Dict) {
        let mut sections: BTreeMap<&str, Vec<(&String, &Value)>> = BTreeMap::new();
        for (id, obj) in objects {
            let isa = obj.get("isa").and_then(Value::as_str).unwrap_or("");
            sections.entry(isa).or_default().push((id, obj));
        }

        for (isa, mut entries) in sections {
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let _ = writeln!(self.out, "\n/* Begin {isa} section */");
            for (id, obj) in entries {
                self.indent(2);
                self.key(id);
                self.comment_for(id);
                self.out.push_str(" = ");
                if INLINE_ISAS.contains(&isa) {
                    self.inline(obj, None);
                } else {
                    self.value(obj, 2, None);
                }
                self.out.push_str(";\n");
            }
            let _ = writeln!(self.out, "/* End {isa} section */");
        }
    }

    fn value(&mut self, value: &Value, depth: usize, parent_key: Option<&str>) {
        match value {
            Value::String(s) => self.string(s, parent_key),
            Value::Data(bytes) => self.data(bytes),
            Value::Array(items) => {
                self.out.push_str("(\n");
                for item in items {
                    self.indent(depth + 1);
                    self.value(item, depth + 1, parent_key);
                    self.out.push_str(",\n");
                }
                self.indent(depth);
                self.out.push(')');
            }
            Value::Dict(d) => {
                self.out.push_str("{\n");
                for (key, item) in d {
                    self.indent(depth + 1);
                    self.key(key);
                    self.out.push_str(" = ");
                    self.value(item, depth + 1, Some(key));
                    self.out.push_str(";\n");
                }
                self.indent(depth);
                self.out.push('}');
            }
        }
    }

    fn inline(&mut self, value: &Value, parent_key: Option<&str>) {
        match value {
            Value::String(s) => self.string(s, parent_key),
            Value::Data(bytes) => self.data(bytes),
            Value::Array(items) => {
                self.out.push('(');
                for item in items {
                    self.inline(item, parent_key);
                    self.out.push_str(", ");
                }
                self.out.push(')');
            }
            Value::Dict(d) => {
                self.out.push('{');
                for (key, item) in d {
                    self.key(key);
                    self.out.push_str(" = ");
                    self.inline(item, Some(key));
                    self.out.push_str("; ");
                }
                self.out.push('}');
            }
        }
    }

    fn key(&mut self, key: &str) {
        write_text(&mut self.out, &PbxString::new(key));
    }

    fn string(&mut self, s: &PbxString, parent_key: Option<&str>) {
        write_text(&mut self.out, s);
        let annotated = parent_key.is_none_or(|k| !UNANNOTATED_KEYS.contains(&k));
        if annotated && parent_key != Some("isa") {
            self.comment_for(s.as_str());
        }
    }

    fn comment_for(&mut self, id: &str) {
        if let Some(comment) = self.annotator.annotate(id) {
            let _ = write!(self.out, " /* {comment} */");
        }
    }

    fn data(&mut self, bytes: &[u8]) {
        self.out.push('<');
        self.out.push_str(&hex::encode(bytes));
        self.out.push('>');
    }
}

fn write_text(out: &mut String, s: &PbxString) {
    if !s.needs_quotes() {
        out.push_str(s.as_str());
        return;
    }
    out.push('"');
    for c in s.as_str().chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\U{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn writes_empty_containers_on_two_lines() {
        let mut d = Dict::new();
        d.insert("classes".to_string(), Value::empty_dict());
        d.insert("list".to_string(), Value::Array(vec![]));
        let text = to_string(&Value::Dict(d), &NoComments);
        assert_eq!(
            text,
            "// !$*UTF8*$!\n{\n\tclasses = {\n\t};\n\tlist = (\n\t);\n}\n"
        );
    }

    #[test]
    fn quotes_only_when_needed() {
        let mut d = Dict::new();
        d.insert("a".to_string(), Value::string("plain.m"));
        d.insert("b".to_string(), Value::string("<group>"));
        d.insert("c".to_string(), Value::quoted("Debug"));
        d.insert("d".to_string(), Value::string("say \"hi\"\n"));
        let text = to_string(&Value::Dict(d), &NoComments);
        assert!(text.contains("\ta = plain.m;\n"));
        assert!(text.contains("\tb = \"<group>\";\n"));
        assert!(text.contains("\tc = \"Debug\";\n"));
        assert!(text.contains("\td = \"say \\\"hi\\\"\\n\";\n"));
    }

    #[test]
    fn annotates_references_but_not_isa_or_proxy_ids() {
        let src = r#"{
	objects = {
		P = {isa = PBXContainerItemProxy; containerPortal = R; remoteGlobalIDString = T; };
	};
}"#;
        let v = parse(src).unwrap();
        let mut names = HashMap::new();
        names.insert("R".to_string(), "Project object".to_string());
        names.insert("T".to_string(), "ShareExt".to_string());
        names.insert("PBXContainerItemProxy".to_string(), "never".to_string());
        let text = to_string(&v, &names);
        assert!(text.contains("containerPortal = R /* Project object */;"));
        assert!(text.contains("remoteGlobalIDString = T;"));
        assert!(text.contains("isa = PBXContainerItemProxy;"));
    }

    #[test]
    fn sections_are_sorted_by_isa_then_id() {
        let src = r#"{
	objects = {
		B2 = {isa = PBXGroup; children = (); };
		A1 = {isa = PBXGroup; children = (); };
		F1 = {isa = PBXFileReference; path = a.m; };
	};
}"#;
        let text = to_string(&parse(src).unwrap(), &NoComments);
        let file_at = text.find("Begin PBXFileReference").unwrap();
        let group_at = text.find("Begin PBXGroup").unwrap();
        assert!(file_at < group_at);
        assert!(text.find("\t\tA1 = ").unwrap() < text.find("\t\tB2 = ").unwrap());
        assert!(text.contains("\t\tF1 = {isa = PBXFileReference; path = a.m; };\n"));
    }
}
