//! YAML frontmatter.

use std::collections::BTreeMap;
use std::fmt::Write;

use serde::Serialize;
use serde_json::Value;

use crate::ast::MetaData;
use crate::options::{ConversionOptions, MetaDataMode};

/// Renders metadata and URL references as a `---` delimited YAML block,
/// followed by a blank line.
///
/// Returns an empty string when metadata is disabled. Keys are always sorted.
pub fn render_frontmatter(
    meta: &MetaData,
    opts: &ConversionOptions,
    url_map: &BTreeMap<String, String>,
) -> String {
    if opts.include_meta_data == MetaDataMode::None {
        return String::new();
    }

    let mut out = String::from("---\n");
    write_map(&mut out, &meta.standard, 0);

    if opts.include_meta_data == MetaDataMode::Extended {
        if !meta.open_graph.is_empty() {
            out.push_str("openGraph:\n");
            write_map(&mut out, &meta.open_graph, 2);
        }
        if !meta.twitter.is_empty() {
            out.push_str("twitter:\n");
            write_map(&mut out, &meta.twitter, 2);
        }
        if !meta.json_ld.is_empty() {
            out.push_str("schema:\n");
            for item in &meta.json_ld {
                let ty = item
                    .get("@type")
                    .and_then(Value::as_str)
                    .filter(|ty| !ty.is_empty())
                    .unwrap_or("(unknown type)");
                let _ = writeln!(out, "  {ty}:");

                let mut entries: Vec<_> = item
                    .iter()
                    .filter(|(key, _)| !matches!(key.as_str(), "@context" | "@type"))
                    .collect();
                entries.sort_by(|a, b| a.0.cmp(b.0));
                for (key, value) in entries {
                    write_entry(&mut out, key, value, 4);
                }
            }
        }
    }

    if opts.refify_urls && !url_map.is_empty() {
        out.push_str("urlReferences:\n");
        write_map(&mut out, url_map, 2);
    }

    out.push_str("---\n\n");
    out
}

fn write_map(out: &mut String, map: &BTreeMap<String, String>, indent: usize) {
    for (key, value) in map {
        write_entry(out, key, value, indent);
    }
}

/// Writes `key: value`. Non-empty mappings and sequences always go below the
/// key. Multi-line scalars are kept after the key when they open a block
/// scalar. Nested lines are indented past the key.
fn write_entry<T: Serialize + ?Sized>(out: &mut String, key: &str, value: &T, indent: usize) {
    let prefix = " ".repeat(indent);
    let yaml = serde_yaml::to_value(value).and_then(|value| {
        let nested = match &value {
            serde_yaml::Value::Mapping(map) => !map.is_empty(),
            serde_yaml::Value::Sequence(seq) => !seq.is_empty(),
            _ => false,
        };
        Ok((nested, serde_yaml::to_string(&value)?))
    });
    let (nested, yaml) = match yaml {
        Ok(yaml) => yaml,
        Err(err) => {
            log::warn!("cannot serialize frontmatter value of {key:?}: {err}");
            (false, "null\n".to_owned())
        }
    };

    let mut lines = yaml.lines();
    let Some(first) = lines.next() else {
        let _ = writeln!(out, "{prefix}{key}: null");
        return;
    };
    let rest: Vec<_> = lines.collect();

    if nested {
        let _ = writeln!(out, "{prefix}{key}:");
        let nested = " ".repeat(indent + 2);
        for line in std::iter::once(first).chain(rest) {
            let _ = writeln!(out, "{nested}{line}");
        }
    } else {
        let _ = writeln!(out, "{prefix}{key}: {first}");
        for line in rest {
            let _ = writeln!(out, "{prefix}{line}");
        }
    }
}
