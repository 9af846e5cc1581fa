use proc_macro::TokenStream;
use quote::quote;
use serde::Deserialize;
use std::{collections::BTreeMap, fs};
use syn::{parse_macro_input, LitStr};

#[derive(Deserialize)]
struct DeserializedJsonEntity {
    characters: Box<str>,
    legacy: bool,
}

/// Reads a named-character-reference data file (see `data/entities.json`) and
/// expands to two `lazy_static` maps: `STRICT`, every entry keyed by name
/// without the leading `&` or trailing `;`, and `LEGACY`, the subset valid
/// without a trailing semicolon.
#[proc_macro]
pub fn entities_lookup(input: TokenStream) -> TokenStream {
    let file_path = parse_macro_input!(input as LitStr).value();

    let json_content =
        fs::read_to_string(&file_path).unwrap_or_else(|_| panic!("Failed to read file: {file_path}"));
    let raw: BTreeMap<String, DeserializedJsonEntity> =
        serde_json::from_str(&json_content).expect("Failed to parse entities JSON");

    let mut strict_entries = Vec::new();
    let mut legacy_entries = Vec::new();

    for (name, entity) in &raw {
        let chars = entity.characters.as_ref();
        strict_entries.push(quote! { (#name, #chars) });
        if entity.legacy {
            legacy_entries.push(quote! { (#name, #chars) });
        }
    }

    let result = quote! {
        use lazy_static::lazy_static;
        use rustc_hash::FxHashMap;

        lazy_static! {
            static ref STRICT: FxHashMap<&'static str, &'static str> = {
                let mut map = FxHashMap::default();
                #(map.insert(#strict_entries.0, #strict_entries.1);)*
                map
            };
            static ref LEGACY: FxHashMap<&'static str, &'static str> = {
                let mut map = FxHashMap::default();
                #(map.insert(#legacy_entries.0, #legacy_entries.1);)*
                map
            };
        }
    };

    result.into()
}
