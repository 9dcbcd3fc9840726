//! Template expansion over WordprocessingML part text.
//!
//! Placeholder grammar, all names being ASCII letters, digits or `_`:
//!
//! | Tag | Meaning |
//! |-----|---------|
//! | `{name}` | scalar value, or an image |
//! | `{#name}…{/name}` | repeat the body per list item; `{field}` reads the item |
//! | `{?name}…{:else}…{/name}` | keep one branch by truthiness |
//! | `{table:name}` | repeat the enclosing `<w:tr>` per list item |
//!
//! Braces that do not form one of these tags are left untouched.
//!
//! # Examples
//!
//! ```
//! use docxtpl::template::{DataTree, expand};
//!
//! let data = DataTree::new()
//!     .with("name", "Amy")
//!     .with("tasks", vec![DataTree::new().with("title", "A"), DataTree::new().with("title", "B")]);
//!
//! let out = expand("Hi {name}: {#tasks}[{title}]{/tasks}", &data);
//! assert_eq!(out.text, "Hi Amy: [A][B]");
//! ```

mod expand;
pub mod layout;
pub mod normalize;
mod options;
pub mod token;
mod value;
pub(crate) mod wml;

pub use expand::{Expansion, ExpansionStats, ImagePlacement, Warning, WarningKind};
pub use layout::{ImageExtent, InlineImage, compute_extent, image_extent};
pub use normalize::{normalize_fragments, normalize_part};
pub use options::TemplateOptions;
pub use value::{DataTree, ImageDescriptor, Value, format_number};

/// Expand `text` against `data` with default options.
pub fn expand<'d>(text: &str, data: &'d DataTree) -> Expansion<'d> {
    expand_with(text, data, &TemplateOptions::default())
}

/// Expand `text` against `data`.
///
/// Runs the loop, conditional, table-row and placeholder passes in that
/// order. Image values are left as markers listed in
/// [`Expansion::images`]; embedding them needs a package, see
/// [`DocxTemplate`](crate::DocxTemplate).
pub fn expand_with<'d>(text: &str, data: &'d DataTree, options: &TemplateOptions) -> Expansion<'d> {
    expand::Expander::new(data, options).run(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn titled(titles: &[String]) -> Value {
        titles
            .iter()
            .map(|t| DataTree::new().with("title", t.as_str()))
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn test_task_list_scenario() {
        let data = DataTree::new().with("name", "Amy").with(
            "tasks",
            vec![
                DataTree::new().with("title", "A").with("done", "yes"),
                DataTree::new().with("title", "B").with("done", "no"),
            ],
        );
        let out = expand("Hello {name}, you have {#tasks}{title} ({done}); {/tasks}done.", &data);
        assert_eq!(out.text, "Hello Amy, you have A (yes); B (no); done.");
        assert_eq!(out.stats.loops, 1);
        assert_eq!(out.stats.placeholders, 1);
    }

    #[test]
    fn test_numeric_zero_is_falsy() {
        let data = DataTree::new().with("flag", 0);
        assert_eq!(expand("{?flag}YES{:else}NO{/flag}", &data).text, "NO");
        let data = DataTree::new().with("flag", 2);
        assert_eq!(expand("{?flag}YES{:else}NO{/flag}", &data).text, "YES");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_loop_emits_one_copy_per_item(titles in proptest::collection::vec("[a-z]{1,5}", 1..8)) {
            let data = DataTree::new().with("k", titled(&titles));
            let out = expand("{#k}[{title}]{/k}", &data);
            let expected: String = titles.iter().map(|t| format!("[{}]", t)).collect();
            prop_assert_eq!(out.text, expected);
            prop_assert!(out.warnings.is_empty());
        }

        #[test]
        fn prop_table_emits_n_rows(titles in proptest::collection::vec("[a-z]{1,5}", 1..8)) {
            let data = DataTree::new().with("items", titled(&titles));
            let template = "<w:tbl><w:tr><w:tc><w:t>{table:items}{title}</w:t></w:tc></w:tr></w:tbl>";
            let out = expand(template, &data);
            prop_assert_eq!(out.text.matches("<w:tr>").count(), titles.len());
            prop_assert!(!out.text.contains("{table:items}"), "output still contains {{table:items}}");
        }

        #[test]
        fn prop_unusable_loop_data_warns_once(kind in 0usize..4) {
            let value = match kind {
                0 => None,
                1 => Some(Value::Null),
                2 => Some(Value::from("text")),
                _ => Some(Value::List(Vec::new())),
            };
            let mut data = DataTree::new();
            if let Some(value) = value {
                data.insert("k", value);
            }
            let out = expand("{#k}{x}{/k}", &data);
            prop_assert_eq!(out.text, "");
            prop_assert_eq!(out.warnings.len(), 1);
        }
    }

    #[test]
    fn test_split_placeholder_then_expand() {
        let xml = "<w:p><w:r><w:t>Dear {cust</w:t></w:r><w:r><w:t>omer},</w:t></w:r></w:p>";
        let data = DataTree::new().with("customer", "Ann & Bo");
        let normalized = normalize_part(xml, 256);
        let out = expand(&normalized, &data);
        assert_eq!(
            out.text,
            r#"<w:p><w:r><w:t xml:space="preserve">Dear Ann &amp; Bo</w:t></w:r><w:r><w:t xml:space="preserve">,</w:t></w:r></w:p>"#
        );
    }

    #[test]
    fn test_pass_order_loop_then_conditional() {
        // Loop output is not rescanned for loops, but later passes see it
        let data = DataTree::new()
            .with("show", true)
            .with("items", vec![DataTree::new().with("v", "1")]);
        let out = expand("{#items}{v}{?show}!{/show}{/items}", &data);
        assert_eq!(out.text, "1!");
    }

    #[test]
    fn test_loop_inside_conditional() {
        let data = DataTree::new()
            .with("show", false)
            .with("items", vec![DataTree::new().with("v", "1")]);
        assert_eq!(expand("{?show}{#items}{v}{/items}{/show}", &data).text, "");
    }

    #[test]
    fn test_no_tags_is_identity() {
        let text = "<w:p><w:r><w:t>plain { text }</w:t></w:r></w:p>";
        let data = DataTree::new();
        let out = expand(text, &data);
        assert_eq!(out.text, text);
        assert_eq!(out.stats, ExpansionStats::default());
    }

    #[test]
    fn test_json_data_end_to_end() {
        let data = DataTree::from_json_str(r#"{"total": 12.5, "paid": 0}"#).unwrap();
        let out = expand("{total} {?paid}paid{:else}open{/paid}", &data);
        assert_eq!(out.text, "12.5 open");
    }
}
