//! Diagnostic renderings of the whole tree.
//!
//! Neither format is versioned; they exist for humans debugging a live
//! server.

use crate::tree::{PathTree, WalkEvent};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::str::FromStr;

const INDENT: usize = 3;
const XML_NAMESPACE: &str = "urn:nameserv:dump";

/// Output format for [`crate::RegistryService::dump`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DumpFormat {
    #[default]
    Text,
    Xml,
}

impl FromStr for DumpFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plaintext" => Ok(DumpFormat::Text),
            "xml" => Ok(DumpFormat::Xml),
            other => Err(format!("Unknown dump format: {}", other)),
        }
    }
}

fn pad(depth: usize) -> String {
    " ".repeat(depth * INDENT)
}

/// Render the tree as indented plain text.
pub fn render_text(tree: &PathTree) -> String {
    let mut out = String::new();
    tree.walk(|event| {
        // Writing into a String cannot fail
        let _ = match event {
            WalkEvent::EnterScope {
                depth,
                name,
                description,
            } => write!(
                out,
                "{pad}Scope={name}  '{description}'\n{pad}{{\n",
                pad = pad(depth)
            ),
            WalkEvent::Binding {
                depth,
                name,
                description,
                registration,
            } => {
                let _ = writeln!(out, "{}Binding={}  '{}'", pad(depth), name, description);
                for (slot, extra) in registration.extras.iter().enumerate() {
                    if !extra.is_empty() {
                        let _ = writeln!(out, "{}Extra{}={}", pad(depth + 1), slot + 1, extra);
                    }
                }
                Ok(())
            }
            WalkEvent::LeaveScope { depth } => writeln!(out, "{}}}", pad(depth)),
        };
    });
    out
}

/// Render the tree as an XML document.
pub fn render_xml(tree: &PathTree) -> String {
    let mut out = String::from("<?xml version='1.0'?>\n");
    tree.walk(|event| {
        let _ = match event {
            WalkEvent::EnterScope {
                depth,
                name,
                description,
            } => {
                let _ = write!(out, "{}<NS:Scope Name='{}'", pad(depth), escape_xml(name));
                if depth == 0 {
                    let _ = write!(out, " xmlns:NS='{}'", XML_NAMESPACE);
                }
                out.push_str(">\n");
                write_desc(&mut out, depth + 1, description)
            }
            WalkEvent::Binding {
                depth,
                name,
                description,
                ..
            } => {
                let _ = writeln!(out, "{}<NS:Binding Name='{}'>", pad(depth), escape_xml(name));
                let _ = write_desc(&mut out, depth + 1, description);
                writeln!(out, "{}</NS:Binding>", pad(depth))
            }
            WalkEvent::LeaveScope { depth } => writeln!(out, "{}</NS:Scope>", pad(depth)),
        };
    });
    out
}

fn write_desc(out: &mut String, depth: usize, description: &str) -> std::fmt::Result {
    writeln!(out, "{}<NS:Desc>", pad(depth))?;
    writeln!(out, "{}{}", pad(depth + 1), escape_xml(description))?;
    writeln!(out, "{}</NS:Desc>", pad(depth))
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\'' => escaped.push_str("&apos;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
