//! Property tests for token substitution.

use extpatch_edit::{TokenTable, TokenValues};
use proptest::prelude::*;

fn values() -> TokenValues {
    TokenValues {
        display_name: "HelloCordova".to_string(),
        app_id: "io.cordova.hellocordova".to_string(),
        bundle_suffix: ".shareextension".to_string(),
        short_version: "1.0.0".to_string(),
        bundle_version: "17".to_string(),
        url_scheme: "openwithcxm".to_string(),
        uniform_type_identifier: "public.data".to_string(),
    }
}

proptest! {
    // Text without a double underscore cannot contain a token.
    #[test]
    fn text_without_tokens_is_untouched(text in "[A-Za-z0-9 <>/=\"._\\n-]{0,200}") {
        prop_assume!(!text.contains("__"));
        let (out, count) = TokenTable::standard(&values()).substitute(&text);
        prop_assert_eq!(out, text);
        prop_assert_eq!(count, 0);
    }

    #[test]
    fn every_display_name_occurrence_is_counted(prefix in "[a-z ]{0,20}", n in 1usize..8) {
        let text = format!("{prefix}{}", "__DISPLAY_NAME__;".repeat(n));
        let (out, count) = TokenTable::standard(&values()).substitute(&text);
        prop_assert_eq!(count, n as u64);
        prop_assert_eq!(out, format!("{prefix}{}", "HelloCordova;".repeat(n)));
    }

    #[test]
    fn substitution_is_stable_once_applied(n in 0usize..5) {
        let table = TokenTable::standard(&values());
        let text = "<string>__BUNDLE_VERSION__</string>\n".repeat(n);
        let (once, _) = table.substitute(&text);
        let (twice, count) = table.substitute(&once);
        prop_assert_eq!(twice, once);
        prop_assert_eq!(count, 0);
    }
}
