//! Build-setting patches keyed on `PRODUCT_NAME`.
//!
//! Configurations are selected by their `PRODUCT_NAME` setting rather than by
//! the owning target's configuration list. Two targets sharing a product
//! name would both be patched.

use crate::events::EventSink;
use crate::graph::ProjectGraph;
use extpatch_pbx::Value;
use extpatch_types::event::PatchEvent;

pub const PRODUCT_NAME: &str = "PRODUCT_NAME";
pub const PRODUCT_BUNDLE_IDENTIFIER: &str = "PRODUCT_BUNDLE_IDENTIFIER";

/// Set `setting` to `value` (written quoted) in every build configuration
/// whose `PRODUCT_NAME` equals `product_name`, quoted or not.
///
/// Returns the number of configurations patched; zero is reported as a
/// warning event, not an error. Configurations that do not match are left
/// untouched. A matched configuration gets its settings re-sorted only when
/// the key is new to it.
pub fn patch_build_setting(
    graph: &mut ProjectGraph,
    product_name: &str,
    setting: &str,
    value: &str,
    sink: &mut dyn EventSink,
) -> usize {
    let mut patched = 0;
    for id in graph.configuration_ids() {
        let Ok(config) = graph.configuration_mut(&id) else {
            continue;
        };
        let matches = config
            .setting(PRODUCT_NAME)
            .is_some_and(|name| name.matches(product_name));
        if !matches {
            continue;
        }

        let settings = &mut config.build_settings;
        let is_new = !settings.contains_key(setting);
        settings.insert(setting.to_string(), Value::quoted(value));
        if is_new {
            settings.sort_keys();
        }
        patched += 1;

        sink.emit(PatchEvent::BuildSettingPatched {
            configuration: config.name.as_str().to_string(),
            key: id.to_string(),
            setting: setting.to_string(),
            value: value.to_string(),
        });
    }

    if patched == 0 {
        sink.emit(PatchEvent::BuildSettingsUnmatched {
            product_name: product_name.to_string(),
        });
    }
    patched
}

/// Point the product's bundle identifier at `bundle_id`.
pub fn patch_bundle_identifier(
    graph: &mut ProjectGraph,
    product_name: &str,
    bundle_id: &str,
    sink: &mut dyn EventSink,
) -> usize {
    patch_build_setting(graph, product_name, PRODUCT_BUNDLE_IDENTIFIER, bundle_id, sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn graph(configs: &[(&str, &str)]) -> ProjectGraph {
        let mut objects = String::new();
        let mut ids = Vec::new();
        for (i, (name, product)) in configs.iter().enumerate() {
            let id = format!("CC{i:022}");
            objects.push_str(&format!(
                "{id} = {{isa = XCBuildConfiguration; buildSettings = {{ PRODUCT_NAME = {product}; }}; name = {name}; }};\n"
            ));
            ids.push(id);
        }
        let text = format!(
            r#"{{
	objects = {{
		AA0000000000000000000001 = {{isa = PBXProject; buildConfigurationList = AA0000000000000000000002; mainGroup = AA0000000000000000000003; targets = (); }};
		AA0000000000000000000002 = {{isa = XCConfigurationList; buildConfigurations = ({}); }};
		AA0000000000000000000003 = {{isa = PBXGroup; children = (); }};
		{objects}
	}};
	rootObject = AA0000000000000000000001;
}}"#,
            ids.join(", ")
        );
        ProjectGraph::parse(&text).unwrap()
    }

    #[test]
    fn patches_quoted_and_unquoted_product_names() {
        let mut g = graph(&[("Debug", "\"ShareExt\""), ("Release", "ShareExt")]);
        let mut events = Vec::<PatchEvent>::new();
        let bundle_id = "io.cordova.hello.shareextension";
        let n = patch_bundle_identifier(&mut g, "ShareExt", bundle_id, &mut events);
        assert_eq!(n, 2);
        for (_, config) in g.configurations() {
            let value = config.setting(PRODUCT_BUNDLE_IDENTIFIER).unwrap();
            assert_eq!(value.as_str(), bundle_id);
            assert!(value.is_quoted());
        }
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn zero_matches_is_a_warning_not_an_error() {
        let mut g = graph(&[("Debug", "HelloCordova")]);
        let mut events = Vec::<PatchEvent>::new();
        assert_eq!(patch_bundle_identifier(&mut g, "ShareExt", "x", &mut events), 0);
        assert!(matches!(events[..], [PatchEvent::BuildSettingsUnmatched { .. }]));
    }

    #[test]
    fn new_key_is_sorted_into_place() {
        let mut g = graph(&[("Debug", "ShareExt")]);
        patch_bundle_identifier(&mut g, "ShareExt", "a.b", &mut Vec::<PatchEvent>::new());
        let (_, config) = g.configurations().next().unwrap();
        let keys: Vec<_> = config.build_settings.keys().cloned().collect();
        assert_eq!(keys, vec!["PRODUCT_BUNDLE_IDENTIFIER", "PRODUCT_NAME"]);
    }
}
