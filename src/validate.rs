use crate::profile::FormProfile;
use anyhow::{anyhow, Result};
use jsonschema::{Draft, JSONSchema};
use serde_json::{json, Value};


/// A submission the form refuses to forward; the message is shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct Rejected(pub String);


pub struct Validator {
compiled: JSONSchema,
}


/// Draft 2020-12 schema for a form submission under the given profile's bounds.
pub fn submission_schema(profile: &FormProfile) -> Value {
json!({
"type": "object",
"required": ["user", "model_id", "max_tokens", "temperature", "top_p", "top_k"],
"properties": {
"system": { "type": "string" },
"user": { "type": "string", "minLength": 1 },
"assistant": { "type": "string" },
"model_id": { "enum": profile.models },
"max_tokens": { "type": "integer", "minimum": profile.max_tokens.min, "maximum": profile.max_tokens.max },
"temperature": { "type": "number", "minimum": profile.temperature.min, "maximum": profile.temperature.max },
"top_p": { "type": "number", "minimum": profile.top_p.min, "maximum": profile.top_p.max },
"top_k": { "type": "integer", "minimum": profile.top_k.min, "maximum": profile.top_k.max }
}
})
}


impl Validator {
pub fn new(schema: &Value) -> Result<Self> {
let compiled = JSONSchema::options()
.with_draft(Draft::Draft202012)
.compile(schema)
.map_err(|e| anyhow!("compile submission schema: {e}"))?;
Ok(Self { compiled })
}


pub fn for_profile(profile: &FormProfile) -> Result<Self> {
Self::new(&submission_schema(profile))
}


/// Reports the first violation only, prefixed with the offending field.
pub fn check(&self, v: &Value) -> Result<(), Rejected> {
if let Err(mut errors) = self.compiled.validate(v) {
if let Some(first) = errors.next() {
let path = first.instance_path.to_string();
let field = path.trim_start_matches('/');
let msg = if field.is_empty() {
first.to_string()
} else if field == "user" {
"User prompt is required".to_string()
} else {
format!("{field}: {first}")
};
return Err(Rejected(msg));
}
}
Ok(())
}
}


#[cfg(test)]
mod tests {
use super::*;

fn submission() -> Value {
json!({
"system": "",
"user": "What should I cook?",
"assistant": "",
"model_id": "anthropic.claude-3-haiku-20240307-v1:0",
"max_tokens": 1000,
"temperature": 0.2,
"top_p": 0.99,
"top_k": 250
})
}

fn validator() -> Validator {
Validator::for_profile(&FormProfile::default()).unwrap()
}

#[test]
fn accepts_defaults_and_extremes() {
let v = validator();
assert_eq!(v.check(&submission()), Ok(()));

let mut s = submission();
s["max_tokens"] = json!(1);
s["temperature"] = json!(0.0);
s["top_p"] = json!(0.0);
s["top_k"] = json!(1);
assert_eq!(v.check(&s), Ok(()));

s["max_tokens"] = json!(8192);
s["temperature"] = json!(1.0);
s["top_p"] = json!(1.0);
s["top_k"] = json!(500);
assert_eq!(v.check(&s), Ok(()));
}

#[test]
fn rejects_out_of_range_numbers() {
let v = validator();
for (field, bad) in [("max_tokens", json!(0)), ("max_tokens", json!(8193)), ("temperature", json!(1.1)), ("top_p", json!(-0.01)), ("top_k", json!(0)), ("top_k", json!(501))] {
let mut s = submission();
s[field] = bad.clone();
let Rejected(msg) = v.check(&s).unwrap_err();
assert!(msg.starts_with(field), "{field}={bad}: {msg}");
}
}

#[test]
fn rejects_unknown_model() {
let mut s = submission();
s["model_id"] = json!("anthropic.claude-v2");
let Rejected(msg) = validator().check(&s).unwrap_err();
assert!(msg.starts_with("model_id"), "{msg}");
}

#[test]
fn rejects_empty_user_prompt() {
let mut s = submission();
s["user"] = json!("");
assert_eq!(validator().check(&s), Err(Rejected("User prompt is required".into())));
}

#[test]
fn narrower_profile_narrows_bounds() {
let profile = FormProfile::from_json(include_str!("../profiles/claude-3-4k.json")).unwrap();
let v = Validator::for_profile(&profile).unwrap();
let mut s = submission();
s["max_tokens"] = json!(8192);
assert!(v.check(&s).is_err());
s["max_tokens"] = json!(4096);
assert!(v.check(&s).is_ok());
}
}
