use std::time::{Duration, Instant};
use rand::{seq::SliceRandom, thread_rng};
use reqwest::Client;
use hdrhistogram::Histogram;


// Replays sample prompts one at a time against a running form server and
// reports end-to-end latency percentiles.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let url = std::env::args().nth(1).unwrap_or_else(|| "http://127.0.0.1:8080/v1/generate".to_string());
    let total: usize = std::env::args().nth(2).and_then(|n| n.parse().ok()).unwrap_or(20);
    let model_id = std::env::var("PROBE_MODEL_ID").unwrap_or_else(|_| "anthropic.claude-3-haiku-20240307-v1:0".to_string());
    let prompts = vec![
        "Suggest a quick vegetarian dinner for two.",
        "Give me a high-protein breakfast idea.",
        "What is a healthy snack under 200 calories?",
        "Plan a lunch I can prepare in 15 minutes.",
        "Recommend a low-sodium soup recipe.",
    ];

    let client = Client::builder().pool_idle_timeout(Duration::from_secs(10)).build()?;
    let mut hist = Histogram::<u64>::new(3)?;
    let mut errors = 0usize;
    let (mut input_tokens, mut output_tokens) = (0u64, 0u64);

    let start = Instant::now();
    for _ in 0..total {
        let prompt = {
            let mut rng = thread_rng();
            prompts.choose(&mut rng).copied().unwrap_or(prompts[0])
        };
        let body = serde_json::json!({
            "system": "You are a trained dietitian and nutritionist.",
            "user": prompt,
            "model_id": model_id,
            "max_tokens": 256,
            "temperature": 0.2,
            "top_p": 0.99,
            "top_k": 250
        });
        let t0 = Instant::now();
        let res = client.post(&url).json(&body).send().await;
        let dur = t0.elapsed();
        match res {
            Ok(r) if r.status().is_success() => {
                hist.record(dur.as_millis() as u64).ok();
                let v: serde_json::Value = r.json().await?;
                input_tokens += v["input_tokens"].as_u64().unwrap_or(0);
                output_tokens += v["output_tokens"].as_u64().unwrap_or(0);
            }
            Ok(r) => {
                errors += 1;
                eprintln!("{}: {}", r.status(), r.text().await.unwrap_or_default());
            }
            Err(e) => {
                errors += 1;
                eprintln!("request failed: {e}");
            }
        }
    }

    println!("ran {} reqs in {:?}", total, start.elapsed());
    println!("errors: {}", errors);
    println!("tokens in/out: {} / {}", input_tokens, output_tokens);
    println!("p50: {} ms", hist.value_at_quantile(0.50));
    println!("p95: {} ms", hist.value_at_quantile(0.95));
    println!("p99: {} ms", hist.value_at_quantile(0.99));
    Ok(())
}
