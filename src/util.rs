use std::{fs, path::Path};
use anyhow::Context;


pub fn read_to_string<P: AsRef<Path>>(p: P) -> anyhow::Result<String> {
Ok(fs::read_to_string(&p).with_context(|| format!("read file {:?}", p.as_ref()))?)
}


/// Minimal escaping for text placed in element bodies and quoted attributes.
pub fn escape_html(s: &str) -> String {
let mut out = String::with_capacity(s.len());
for ch in s.chars() {
match ch {
'&' => out.push_str("&amp;"),
'<' => out.push_str("&lt;"),
'>' => out.push_str("&gt;"),
'"' => out.push_str("&quot;"),
'\'' => out.push_str("&#39;"),
c => out.push(c),
}
}
out
}


#[cfg(test)]
mod tests {
use super::*;

#[test]
fn escapes_markup() {
assert_eq!(escape_html("<b>\"a\" & 'b'</b>"), "&lt;b&gt;&quot;a&quot; &amp; &#39;b&#39;&lt;/b&gt;");
assert_eq!(escape_html("plain"), "plain");
}

#[test]
fn read_missing_file_names_the_path() {
let err = read_to_string("/definitely/not/here.json").unwrap_err();
assert!(format!("{err:#}").contains("not/here.json"));
}
}
