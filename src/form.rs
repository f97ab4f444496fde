//! The single page: prompt fields, model picker, sampling sliders, and the result panel.

use crate::error::AdapterError;
use crate::model::{Conversation, GenerationRequest, GenerationResponse, SamplingParams};
use crate::profile::{Bounds, FormProfile};
use crate::util::escape_html;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Write};

/// Field values as posted by the form (or the JSON endpoint).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    #[serde(default)]
    pub system: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub assistant: String,
    pub model_id: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
}

impl Submission {
    pub fn from_profile(profile: &FormProfile) -> Self {
        let d = &profile.defaults;
        Self {
            system: d.system.clone(),
            user: d.user.clone(),
            assistant: d.assistant.clone(),
            model_id: profile.default_model().to_string(),
            max_tokens: d.max_tokens,
            temperature: d.temperature,
            top_p: d.top_p,
            top_k: d.top_k,
        }
    }

    pub fn to_request(&self) -> GenerationRequest {
        GenerationRequest {
            model_id: self.model_id.clone(),
            params: SamplingParams {
                max_tokens: self.max_tokens,
                temperature: self.temperature,
                top_p: self.top_p,
                top_k: self.top_k,
            },
            system: Some(self.system.clone()),
            conversation: Conversation::new(self.user.clone(), self.assistant.clone()),
        }
    }
}

pub enum Outcome<'a> {
    Blank,
    Answered {
        response: &'a GenerationResponse,
        elapsed_secs: f64,
    },
    Failed(String),
}

pub fn stats_line(response: &GenerationResponse, elapsed_secs: f64) -> String {
    format!(
        "Input tokens: {} | Output tokens: {} | Response time: {:.2} seconds",
        response.input_tokens, response.output_tokens, elapsed_secs
    )
}

pub fn banner_for(err: &AdapterError) -> String {
    match err {
        AdapterError::ProviderCall { message } => format!("A client error occurred: {message}"),
        AdapterError::ResponseParse { .. } | AdapterError::Envelope { .. } => {
            "Failed to get a valid response from the model.".to_string()
        }
    }
}

const STYLE: &str = "body{font-family:sans-serif;max-width:52rem;margin:2rem auto;padding:0 1rem}\
textarea,select{width:100%;box-sizing:border-box}\
.row{display:flex;gap:2rem}.row label{flex:1}\
.error{background:#fde8e8;color:#9b1c1c;padding:.75rem;border-radius:.25rem}\
.stats{font-family:monospace}";

pub fn render_page(profile: &FormProfile, sub: &Submission, outcome: Outcome<'_>) -> String {
    let mut html = String::with_capacity(8 * 1024);
    let _ = write!(
        html,
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>{title}</title><style>{STYLE}</style></head><body>\
<h3>{title}</h3><p>{desc}</p><form method=\"post\" action=\"/\">\
<h6>Prompts</h6>",
        title = escape_html(&profile.title),
        desc = escape_html(&profile.description),
    );
    text_area(&mut html, "system", "System (Optional)", 3, &sub.system);
    text_area(&mut html, "user", "User (Required)", 16, &sub.user);
    text_area(&mut html, "assistant", "Assistant (Optional)", 3, &sub.assistant);

    html.push_str("<hr><h6>Model</h6><label>Model ID<select name=\"model_id\">");
    for model in &profile.models {
        let selected = if *model == sub.model_id { " selected" } else { "" };
        let m = escape_html(model);
        let _ = write!(html, "<option value=\"{m}\"{selected}>{m}</option>");
    }
    html.push_str("</select></label><hr><h6>Parameters</h6><div class=\"row\">");
    slider(&mut html, "max_tokens", "Max Tokens (Depends on model)", &profile.max_tokens, sub.max_tokens);
    slider(&mut html, "temperature", "Temperature", &profile.temperature, sub.temperature);
    html.push_str("</div><div class=\"row\">");
    slider(&mut html, "top_p", "Top P", &profile.top_p, sub.top_p);
    slider(&mut html, "top_k", "Top K", &profile.top_k, sub.top_k);
    html.push_str("</div><hr><button type=\"submit\">Submit</button></form>");

    match outcome {
        Outcome::Blank => {}
        Outcome::Answered {
            response,
            elapsed_secs,
        } => {
            let _ = write!(
                html,
                "<section id=\"result\"><label>Model response<textarea readonly rows=\"25\">{}</textarea></label>\
<p class=\"stats\">{}</p></section>",
                escape_html(&response.text),
                escape_html(&stats_line(response, elapsed_secs)),
            );
        }
        Outcome::Failed(banner) => {
            let _ = write!(
                html,
                "<div class=\"error\" role=\"alert\">{}</div>",
                escape_html(&banner)
            );
        }
    }
    html.push_str("</body></html>");
    html
}

fn text_area(html: &mut String, name: &str, label: &str, rows: u32, value: &str) {
    let _ = write!(
        html,
        "<label>{label}<textarea name=\"{name}\" rows=\"{rows}\">{}</textarea></label>",
        escape_html(value)
    );
}

fn slider<T: Display>(html: &mut String, name: &str, label: &str, b: &Bounds<T>, value: T) {
    let _ = write!(
        html,
        "<label>{label} <output>{value}</output>\
<input type=\"range\" name=\"{name}\" min=\"{}\" max=\"{}\" step=\"{}\" value=\"{value}\" oninput=\"this.previousElementSibling.value=this.value\"></label>",
        b.min, b.max, b.step
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_line_matches_display_format() {
        let r = GenerationResponse {
            text: "x".into(),
            input_tokens: 120,
            output_tokens: 45,
        };
        assert_eq!(
            stats_line(&r, 1.234),
            "Input tokens: 120 | Output tokens: 45 | Response time: 1.23 seconds"
        );
    }

    #[test]
    fn banners_per_error_kind() {
        let throttled = AdapterError::ProviderCall {
            message: "Rate exceeded".into(),
        };
        assert_eq!(banner_for(&throttled), "A client error occurred: Rate exceeded");
        let parse = AdapterError::ResponseParse {
            message: "missing field `usage`".into(),
        };
        assert_eq!(banner_for(&parse), "Failed to get a valid response from the model.");
    }

    #[test]
    fn submission_maps_to_request() {
        let mut sub = Submission::from_profile(&FormProfile::default());
        sub.system.clear();
        sub.assistant = "Here is".into();
        let req = sub.to_request();
        assert_eq!(req.model_id, "anthropic.claude-3-5-sonnet-20240620-v1:0");
        assert_eq!(req.params.max_tokens, 1000);
        assert_eq!(req.system.as_deref(), Some(""));
        assert_eq!(req.conversation.assistant_prefill.as_deref(), Some("Here is"));
    }

    #[test]
    fn page_escapes_user_text_and_keeps_selection() {
        let profile = FormProfile::default();
        let mut sub = Submission::from_profile(&profile);
        sub.user = "</textarea><script>alert(1)</script>".into();
        sub.model_id = profile.models[2].clone();
        let html = render_page(&profile, &sub, Outcome::Blank);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;/textarea&gt;&lt;script&gt;"));
        assert!(html.contains(&format!("<option value=\"{0}\" selected>{0}</option>", profile.models[2])));
        assert!(!html.contains("class=\"error\""));
    }

    #[test]
    fn page_shows_response_and_stats() {
        let profile = FormProfile::default();
        let sub = Submission::from_profile(&profile);
        let r = GenerationResponse {
            text: "Try grilled salmon.".into(),
            input_tokens: 120,
            output_tokens: 45,
        };
        let html = render_page(
            &profile,
            &sub,
            Outcome::Answered {
                response: &r,
                elapsed_secs: 2.5,
            },
        );
        assert!(html.contains("<textarea readonly rows=\"25\">Try grilled salmon.</textarea>"));
        assert!(html.contains("Input tokens: 120 | Output tokens: 45 | Response time: 2.50 seconds"));
        assert!(html.contains("max=\"8192\""));
    }
}
